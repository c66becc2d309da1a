//! Clue entity model and DTOs.

use cinematoday_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A clue row from the `clues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Clue {
    pub id: DbId,
    pub movie_id: DbId,
    /// Zero-based display position, unique per movie.
    pub order_index: i32,
    pub text: String,
}

/// DTO for inserting a single clue.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClue {
    pub movie_id: DbId,
    pub order_index: i32,
    pub text: String,
}
