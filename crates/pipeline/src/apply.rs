//! Generate clues for stored movies and persist them.
//!
//! Every model call completes before the store is touched; the deletes and
//! inserts then run in a single transaction.

use std::fmt;
use std::sync::Arc;

use cinematoday_db::models::movie::Movie;
use cinematoday_db::repositories::{ClueRepo, MovieRepo};
use cinematoday_db::DbPool;
use serde_json::{json, Map, Value};

use crate::clues::{ClueGenerator, PROMPT_VERSION};
use crate::error::PipelineError;
use crate::stats::ClueLengthStats;
use crate::tracking::{RunStatus, RunTracker, TrackedRun};

pub const RUN_NAME: &str = "apply_openai_clues_to_db";

/// Which movies receive new clues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Only movies that have no clues yet.
    #[default]
    MissingOnly,
    /// The first `limit` movies by id (all when `None`), replacing existing clues.
    Overwrite { limit: Option<i64> },
}

impl fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOnly => f.write_str("missing_only"),
            Self::Overwrite { .. } => f.write_str("overwrite"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplySummary {
    pub movies_processed: usize,
    pub clues_inserted: usize,
    pub clues_deleted: u64,
    pub lengths: Option<ClueLengthStats>,
}

struct Authored {
    movie: Movie,
    clues: Vec<String>,
}

async fn candidates(pool: &DbPool, mode: ApplyMode) -> Result<Vec<Movie>, sqlx::Error> {
    match mode {
        ApplyMode::MissingOnly => MovieRepo::list_without_clues(pool).await,
        ApplyMode::Overwrite { limit } => MovieRepo::list(pool, limit).await,
    }
}

/// Generate and store clues for the movies selected by `mode`.
pub async fn apply_clues(
    pool: &DbPool,
    generator: &ClueGenerator,
    tracker: Arc<dyn RunTracker>,
    mode: ApplyMode,
) -> Result<ApplySummary, PipelineError> {
    let movies = candidates(pool, mode).await?;
    if movies.is_empty() {
        tracing::info!(%mode, "No movies found");
        return Ok(ApplySummary::default());
    }

    let run = TrackedRun::start(tracker, RUN_NAME).await;
    run.param("model_name", generator.model()).await;
    run.param("prompt_version", PROMPT_VERSION).await;
    run.param("num_movies", movies.len()).await;
    run.param("mode", mode).await;

    let result = run_apply(pool, generator, mode, movies, &run).await;
    run.finish(RunStatus::from_result(&result)).await;
    result
}

async fn run_apply(
    pool: &DbPool,
    generator: &ClueGenerator,
    mode: ApplyMode,
    movies: Vec<Movie>,
    run: &TrackedRun,
) -> Result<ApplySummary, PipelineError> {
    let mut authored = Vec::with_capacity(movies.len());
    for movie in movies {
        tracing::info!(movie_id = movie.id, title = %movie.title, "Generating clues");
        let clues = generator
            .generate(&movie.title, movie.overview.as_deref())
            .await?;
        authored.push(Authored { movie, clues });
    }

    let mut summary = ApplySummary {
        lengths: ClueLengthStats::from_clues(
            authored.iter().flat_map(|a| a.clues.iter().map(String::as_str)),
        ),
        ..Default::default()
    };

    let mut tx = pool.begin().await?;
    for item in &authored {
        if matches!(mode, ApplyMode::Overwrite { .. }) {
            summary.clues_deleted += ClueRepo::delete_for_movie(&mut *tx, item.movie.id).await?;
        }
        let created = ClueRepo::insert_ordered(&mut *tx, item.movie.id, &item.clues).await?;
        summary.clues_inserted += created.len();
        summary.movies_processed += 1;
    }
    tx.commit().await?;

    tracing::info!(
        movies = summary.movies_processed,
        inserted = summary.clues_inserted,
        deleted = summary.clues_deleted,
        "Clues committed"
    );

    if let Some(lengths) = &summary.lengths {
        lengths.log_to(run).await;
    }
    run.metric("num_movies_processed", summary.movies_processed as f64)
        .await;
    run.metric("num_clues_inserted", summary.clues_inserted as f64)
        .await;
    run.metric("num_clues_deleted", summary.clues_deleted as f64)
        .await;
    run.json_artifact("applied_clues.json", &applied_clues_json(&authored))
        .await;

    Ok(summary)
}

fn applied_clues_json(authored: &[Authored]) -> Value {
    let entries: Map<String, Value> = authored
        .iter()
        .map(|a| {
            (
                a.movie.slug.clone(),
                json!({
                    "movie_id": a.movie.id,
                    "title": a.movie.title,
                    "overview": a.movie.overview,
                    "clues": a.clues,
                }),
            )
        })
        .collect();
    Value::Object(entries)
}
