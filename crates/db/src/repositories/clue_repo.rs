//! Repository for the `clues` table.

use cinematoday_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::clue::{Clue, CreateClue};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, movie_id, order_index, text";

/// Provides CRUD operations for clues.
pub struct ClueRepo;

impl ClueRepo {
    /// Insert a single clue, returning the created row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        db: E,
        input: &CreateClue,
    ) -> Result<Clue, sqlx::Error> {
        let query = format!(
            "INSERT INTO clues (movie_id, order_index, text)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Clue>(&query)
            .bind(input.movie_id)
            .bind(input.order_index)
            .bind(&input.text)
            .fetch_one(db)
            .await
    }

    /// Insert `texts` as the clues of `movie_id`, positioned by list index.
    ///
    /// Runs on a single connection so callers can pass an open transaction.
    pub async fn insert_ordered(
        conn: &mut PgConnection,
        movie_id: DbId,
        texts: &[String],
    ) -> Result<Vec<Clue>, sqlx::Error> {
        let mut created = Vec::with_capacity(texts.len());
        for (idx, text) in texts.iter().enumerate() {
            let input = CreateClue {
                movie_id,
                order_index: idx as i32,
                text: text.clone(),
            };
            created.push(Self::create(&mut *conn, &input).await?);
        }
        Ok(created)
    }

    /// List a movie's clues ordered by position.
    pub async fn list_for_movie<'e, E: PgExecutor<'e>>(
        db: E,
        movie_id: DbId,
    ) -> Result<Vec<Clue>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM clues WHERE movie_id = $1 ORDER BY order_index ASC");
        sqlx::query_as::<_, Clue>(&query)
            .bind(movie_id)
            .fetch_all(db)
            .await
    }

    /// List every clue, grouped by movie and ordered by position.
    pub async fn list_all<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Clue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clues ORDER BY movie_id, order_index");
        sqlx::query_as::<_, Clue>(&query).fetch_all(db).await
    }

    /// Delete every clue of a movie. Returns the number of rows removed.
    pub async fn delete_for_movie<'e, E: PgExecutor<'e>>(
        db: E,
        movie_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clues WHERE movie_id = $1")
            .bind(movie_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Number of clues stored for a movie.
    pub async fn count_for_movie<'e, E: PgExecutor<'e>>(
        db: E,
        movie_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clues WHERE movie_id = $1")
            .bind(movie_id)
            .fetch_one(db)
            .await?;
        Ok(row.0)
    }
}
