//! Daily selection entity: the movie pinned to a calendar date.

use chrono::NaiveDate;
use cinematoday_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `daily_selection` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailySelection {
    pub id: DbId,
    pub game_date: NaiveDate,
    pub movie_id: DbId,
}

/// DTO for pinning a movie to a date.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDailySelection {
    pub game_date: NaiveDate,
    pub movie_id: DbId,
}
