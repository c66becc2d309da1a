//! Now-playing ingestion: refresh the `movies` table from the catalog.
//!
//! The catalog is read completely before any write. All writes then happen
//! in one transaction, so after a run the active set is exactly the top
//! [`TOP_N`] titles of that fetch, or unchanged if anything failed.

use std::sync::Arc;

use cinematoday_core::slug::{candidate_slug, disambiguated_slug};
use cinematoday_db::models::movie::{CatalogRefresh, CreateMovie};
use cinematoday_db::repositories::MovieRepo;
use cinematoday_db::DbPool;
use cinematoday_tmdb::{CatalogMovie, MovieCatalog, NowPlayingQuery, DEFAULT_IMAGE_BASE_URL};
use sqlx::PgConnection;

use crate::error::PipelineError;
use crate::tracking::{RunStatus, RunTracker, TrackedRun};

/// Number of titles kept active after a run.
pub const TOP_N: usize = 10;

pub const RUN_NAME: &str = "ingest_now_playing_tmdb";

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub query: NowPlayingQuery,
    /// Prefix for poster paths.
    pub image_base_url: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            query: NowPlayingQuery::default(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub fetched: usize,
    pub selected: usize,
    pub deactivated: u64,
    pub inserted: usize,
    pub updated: usize,
    /// Entries dropped for lacking an id or a title.
    pub skipped: usize,
    /// Titles written, in popularity order.
    pub titles: Vec<String>,
}

/// The `n` most popular entries, most popular first. Ties keep catalog order.
pub fn select_top(mut movies: Vec<CatalogMovie>, n: usize) -> Vec<CatalogMovie> {
    // sort_by is stable
    movies.sort_by(|a, b| b.popularity_score().total_cmp(&a.popularity_score()));
    movies.truncate(n);
    movies
}

/// A catalog entry reduced to what gets stored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    external_id: String,
    title: String,
    overview: Option<String>,
    poster_url: Option<String>,
    slug: String,
}

impl Candidate {
    fn from_catalog(movie: &CatalogMovie, image_base_url: &str) -> Option<Self> {
        let external_id = movie.external_id()?;
        let title = movie.display_title()?.to_string();
        Some(Self {
            slug: candidate_slug(&title, movie.release_date_text()),
            overview: movie.overview_text().map(str::to_string),
            poster_url: movie.poster_url(image_base_url),
            external_id,
            title,
        })
    }
}

enum Upsert {
    Inserted,
    Updated,
}

async fn upsert(conn: &mut PgConnection, candidate: &Candidate) -> Result<Upsert, sqlx::Error> {
    let existing = MovieRepo::find_by_external_id(&mut *conn, &candidate.external_id).await?;
    if let Some(existing) = existing {
        let refresh = CatalogRefresh {
            title: candidate.title.clone(),
            overview: candidate.overview.clone(),
            poster_url: candidate.poster_url.clone(),
            fallback_slug: candidate.slug.clone(),
        };
        MovieRepo::refresh_from_catalog(&mut *conn, existing.id, &refresh).await?;
        return Ok(Upsert::Updated);
    }

    let slug = if MovieRepo::slug_exists(&mut *conn, &candidate.slug).await? {
        let slug = disambiguated_slug(&candidate.slug, &candidate.external_id);
        tracing::debug!(taken = %candidate.slug, slug = %slug, "Slug collision, disambiguating");
        slug
    } else {
        candidate.slug.clone()
    };

    let input = CreateMovie {
        external_id: Some(candidate.external_id.clone()),
        title: candidate.title.clone(),
        slug,
        poster_url: candidate.poster_url.clone(),
        overview: candidate.overview.clone(),
        is_active: true,
    };
    MovieRepo::create(&mut *conn, &input).await?;
    Ok(Upsert::Inserted)
}

async fn write_catalog(
    pool: &DbPool,
    movies: &[CatalogMovie],
    image_base_url: &str,
    summary: &mut IngestSummary,
) -> Result<(), PipelineError> {
    let mut tx = pool.begin().await?;

    summary.deactivated = MovieRepo::deactivate_all(&mut *tx).await?;

    for movie in movies {
        let Some(candidate) = Candidate::from_catalog(movie, image_base_url) else {
            tracing::warn!(id = ?movie.id, "Skipping catalog entry without id or title");
            summary.skipped += 1;
            continue;
        };

        match upsert(&mut *tx, &candidate).await? {
            Upsert::Inserted => summary.inserted += 1,
            Upsert::Updated => summary.updated += 1,
        }
        summary.titles.push(candidate.title);
    }

    tx.commit().await?;
    Ok(())
}

/// Refresh the movie store from the catalog's now-playing listing.
pub async fn ingest_now_playing(
    pool: &DbPool,
    catalog: &dyn MovieCatalog,
    tracker: Arc<dyn RunTracker>,
    options: &IngestOptions,
) -> Result<IngestSummary, PipelineError> {
    let run = TrackedRun::start(tracker, RUN_NAME).await;
    run.param("api_source", "tmdb").await;
    run.param("region", &options.query.region).await;
    run.param("language", &options.query.language).await;
    run.param("max_pages", options.query.max_pages).await;

    let result = run_ingest(pool, catalog, options, &run).await;
    run.finish(RunStatus::from_result(&result)).await;
    result
}

async fn run_ingest(
    pool: &DbPool,
    catalog: &dyn MovieCatalog,
    options: &IngestOptions,
    run: &TrackedRun,
) -> Result<IngestSummary, PipelineError> {
    let fetched = catalog.now_playing(&options.query).await?;
    let mut summary = IngestSummary {
        fetched: fetched.len(),
        ..Default::default()
    };
    tracing::info!(fetched = summary.fetched, "Fetched now-playing catalog");

    let top = select_top(fetched, TOP_N);
    summary.selected = top.len();

    write_catalog(pool, &top, &options.image_base_url, &mut summary).await?;

    tracing::info!(
        deactivated = summary.deactivated,
        inserted = summary.inserted,
        updated = summary.updated,
        skipped = summary.skipped,
        "Ingestion committed"
    );

    run.metric("num_fetched", summary.fetched as f64).await;
    run.metric("num_selected", summary.selected as f64).await;
    run.metric("num_deactivated", summary.deactivated as f64).await;
    run.metric("num_inserted", summary.inserted as f64).await;
    run.metric("num_updated", summary.updated as f64).await;
    run.text_artifact("ingested_movies.txt", &summary.titles.join("\n"))
        .await;

    Ok(summary)
}
