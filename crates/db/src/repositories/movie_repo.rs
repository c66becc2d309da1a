//! Repository for the `movies` table.

use cinematoday_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::movie::{CatalogRefresh, CreateMovie, Movie};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, external_id, title, slug, poster_url, overview, is_active, created_at";

/// Provides CRUD operations for movies.
///
/// Every method is generic over the executor so the same query runs against
/// the pool, a pooled connection, or an open transaction.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie, returning the created row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        db: E,
        input: &CreateMovie,
    ) -> Result<Movie, sqlx::Error> {
        let query = format!(
            "INSERT INTO movies (external_id, title, slug, poster_url, overview, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(&input.external_id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.poster_url)
            .bind(&input.overview)
            .bind(input.is_active)
            .fetch_one(db)
            .await
    }

    /// Find a movie by its internal ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        db: E,
        id: DbId,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a movie by its slug.
    pub async fn find_by_slug<'e, E: PgExecutor<'e>>(
        db: E,
        slug: &str,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE slug = $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(slug)
            .fetch_optional(db)
            .await
    }

    /// Find the first movie carrying the given catalog identifier.
    pub async fn find_by_external_id<'e, E: PgExecutor<'e>>(
        db: E,
        external_id: &str,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM movies WHERE external_id = $1 ORDER BY id LIMIT 1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(external_id)
            .fetch_optional(db)
            .await
    }

    /// Whether any movie already uses `slug`.
    pub async fn slug_exists<'e, E: PgExecutor<'e>>(
        db: E,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM movies WHERE slug = $1)")
            .bind(slug)
            .fetch_one(db)
            .await?;
        Ok(row.0)
    }

    /// Pick one active movie at random. No ordering guarantee across calls.
    pub async fn random_active<'e, E: PgExecutor<'e>>(db: E) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM movies WHERE is_active = true ORDER BY random() LIMIT 1"
        );
        sqlx::query_as::<_, Movie>(&query).fetch_optional(db).await
    }

    /// List movies in insertion order, optionally capped at `limit` rows.
    pub async fn list<'e, E: PgExecutor<'e>>(
        db: E,
        limit: Option<i64>,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies ORDER BY id LIMIT $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(limit)
            .fetch_all(db)
            .await
    }

    /// List active movies in insertion order.
    pub async fn list_active<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE is_active = true ORDER BY id");
        sqlx::query_as::<_, Movie>(&query).fetch_all(db).await
    }

    /// List movies that have no clues yet, in insertion order.
    pub async fn list_without_clues<'e, E: PgExecutor<'e>>(
        db: E,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM movies m
             WHERE NOT EXISTS (SELECT 1 FROM clues c WHERE c.movie_id = m.id)
             ORDER BY id"
        );
        sqlx::query_as::<_, Movie>(&query).fetch_all(db).await
    }

    /// Clear the activation flag on every movie. Returns the number of rows touched.
    pub async fn deactivate_all<'e, E: PgExecutor<'e>>(db: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE movies SET is_active = false")
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Apply fresh catalog data to an existing movie and reactivate it.
    ///
    /// The stored slug is kept unless it is empty. Returns `None` if no row
    /// with the given `id` exists.
    pub async fn refresh_from_catalog<'e, E: PgExecutor<'e>>(
        db: E,
        id: DbId,
        input: &CatalogRefresh,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!(
            "UPDATE movies SET
                title = $2,
                overview = $3,
                poster_url = $4,
                is_active = true,
                slug = CASE WHEN slug = '' THEN $5 ELSE slug END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.overview)
            .bind(&input.poster_url)
            .bind(&input.fallback_slug)
            .fetch_optional(db)
            .await
    }

    /// Total number of movies.
    pub async fn count<'e, E: PgExecutor<'e>>(db: E) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
            .fetch_one(db)
            .await?;
        Ok(row.0)
    }

    /// Permanently delete a movie (its clues cascade). Returns `true` if a row was removed.
    pub async fn delete<'e, E: PgExecutor<'e>>(db: E, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
