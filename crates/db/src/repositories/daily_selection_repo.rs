//! Repository for the `daily_selection` table.

use chrono::NaiveDate;
use sqlx::PgExecutor;

use crate::models::daily_selection::{CreateDailySelection, DailySelection};

const COLUMNS: &str = "id, game_date, movie_id";

/// Provides lookups and inserts for per-date movie selections.
pub struct DailySelectionRepo;

impl DailySelectionRepo {
    /// Pin a movie to a date. Fails with a unique violation if the date is taken.
    pub async fn create<'e, E: PgExecutor<'e>>(
        db: E,
        input: &CreateDailySelection,
    ) -> Result<DailySelection, sqlx::Error> {
        let query = format!(
            "INSERT INTO daily_selection (game_date, movie_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailySelection>(&query)
            .bind(input.game_date)
            .bind(input.movie_id)
            .fetch_one(db)
            .await
    }

    /// Find the selection for a date, if one was made.
    pub async fn find_by_date<'e, E: PgExecutor<'e>>(
        db: E,
        game_date: NaiveDate,
    ) -> Result<Option<DailySelection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM daily_selection WHERE game_date = $1");
        sqlx::query_as::<_, DailySelection>(&query)
            .bind(game_date)
            .fetch_optional(db)
            .await
    }
}
