//! Read-only review steps: preview freshly generated clues, or audit the
//! stored ones. Neither writes to the store.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use cinematoday_core::types::DbId;
use cinematoday_db::models::clue::Clue;
use cinematoday_db::models::movie::Movie;
use cinematoday_db::repositories::{ClueRepo, MovieRepo};
use cinematoday_db::DbPool;

use crate::clues::{ClueGenerator, PROMPT_VERSION};
use crate::error::PipelineError;
use crate::stats::{word_count, ClueLengthStats};
use crate::tracking::{RunStatus, RunTracker, TrackedRun};

pub const PREVIEW_RUN_NAME: &str = "openai_clue_generation";
pub const AUDIT_RUN_NAME: &str = "clue_quality_check";

pub const DEFAULT_PREVIEW_LIMIT: i64 = 3;

/// Movies listed in the audit sample artifact.
const AUDIT_SAMPLE_MOVIES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieClues {
    pub slug: String,
    pub title: String,
    pub clues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    pub num_movies: usize,
    pub num_clues: usize,
    pub lengths: Option<ClueLengthStats>,
    pub sample: Vec<MovieClues>,
}

/// Text listing with one block per movie and the word count of every clue.
pub fn render_clue_listing(items: &[MovieClues]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "{} ({})", item.title, item.slug);
        for (idx, clue) in item.clues.iter().enumerate() {
            let _ = writeln!(out, "  [{idx}] ({} words) {clue}", word_count(clue));
        }
        out.push('\n');
    }
    out
}

/// Generate clues for the first `limit` movies and record them to the
/// tracker without storing them.
pub async fn preview_clues(
    pool: &DbPool,
    generator: &ClueGenerator,
    tracker: Arc<dyn RunTracker>,
    limit: i64,
) -> Result<Vec<MovieClues>, PipelineError> {
    let movies = MovieRepo::list(pool, Some(limit)).await?;
    if movies.is_empty() {
        tracing::info!("No movies found");
        return Ok(Vec::new());
    }

    let run = TrackedRun::start(tracker, PREVIEW_RUN_NAME).await;
    run.param("model_name", generator.model()).await;
    run.param("prompt_version", PROMPT_VERSION).await;
    run.param("num_movies", movies.len()).await;

    let result = generate_all(generator, movies).await;
    if let Ok(items) = &result {
        let lengths = ClueLengthStats::from_clues(
            items.iter().flat_map(|i| i.clues.iter().map(String::as_str)),
        );
        if let Some(lengths) = lengths {
            lengths.log_to(&run).await;
        }
        run.text_artifact("generated_clues_openai.txt", &render_clue_listing(items))
            .await;
    }
    run.finish(RunStatus::from_result(&result)).await;
    result
}

async fn generate_all(
    generator: &ClueGenerator,
    movies: Vec<Movie>,
) -> Result<Vec<MovieClues>, PipelineError> {
    let mut items = Vec::with_capacity(movies.len());
    for movie in movies {
        let clues = generator
            .generate(&movie.title, movie.overview.as_deref())
            .await?;
        tracing::info!(slug = %movie.slug, clues = clues.len(), "Generated preview clues");
        items.push(MovieClues {
            slug: movie.slug,
            title: movie.title,
            clues,
        });
    }
    Ok(items)
}

/// Clue statistics across the whole store, plus a sample listing of the
/// clues of the first few movies. Movies without clues are left out of the
/// sample rather than replaced.
pub async fn audit_clues(
    pool: &DbPool,
    tracker: Arc<dyn RunTracker>,
) -> Result<AuditReport, PipelineError> {
    let movies = MovieRepo::list(pool, None).await?;
    if movies.is_empty() {
        tracing::info!("No movies found");
        return Ok(AuditReport::default());
    }
    let clues = ClueRepo::list_all(pool).await?;

    let run = TrackedRun::start(tracker, AUDIT_RUN_NAME).await;
    let report = build_report(&movies, clues);

    run.param("num_movies", report.num_movies).await;
    run.metric("num_clues", report.num_clues as f64).await;
    if let Some(lengths) = &report.lengths {
        lengths.log_to(&run).await;
    }
    run.text_artifact("sample_clues.txt", &render_clue_listing(&report.sample))
        .await;
    run.finish(RunStatus::Finished).await;

    tracing::info!(
        movies = report.num_movies,
        clues = report.num_clues,
        "Clue audit complete"
    );
    Ok(report)
}

fn build_report(movies: &[Movie], clues: Vec<Clue>) -> AuditReport {
    let lengths = ClueLengthStats::from_clues(clues.iter().map(|c| c.text.as_str()));
    let num_clues = clues.len();

    let mut by_movie: BTreeMap<DbId, Vec<String>> = BTreeMap::new();
    for clue in clues {
        by_movie.entry(clue.movie_id).or_default().push(clue.text);
    }

    let sample = movies
        .iter()
        .take(AUDIT_SAMPLE_MOVIES)
        .filter_map(|movie| {
            by_movie.get(&movie.id).map(|texts| MovieClues {
                slug: movie.slug.clone(),
                title: movie.title.clone(),
                clues: texts.clone(),
            })
        })
        .collect();

    AuditReport {
        num_movies: movies.len(),
        num_clues,
        lengths,
        sample,
    }
}
