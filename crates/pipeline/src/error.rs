use cinematoday_llm::LlmError;
use cinematoday_tmdb::TmdbError;

use crate::clues::ClueError;

/// Failures of a pipeline step. Any of these aborts the step before or
/// instead of its single commit.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("catalog fetch failed: {0}")]
    Catalog(#[from] TmdbError),

    #[error("language model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("invalid clues for {title:?}: {source}")]
    Clues {
        title: String,
        #[source]
        source: ClueError,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
