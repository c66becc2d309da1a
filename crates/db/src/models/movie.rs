//! Movie entity model and DTOs.

use cinematoday_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A movie row from the `movies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    /// Catalog (TMDB) identifier, stored as text.
    pub external_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    /// Eligible to be served as today's game.
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a new movie.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovie {
    pub external_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    pub is_active: bool,
}

/// Fresh catalog data applied to an already-known movie during ingestion.
#[derive(Debug, Clone)]
pub struct CatalogRefresh {
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    /// Only used when the stored slug is empty.
    pub fallback_slug: String,
}
