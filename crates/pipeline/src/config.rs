use std::sync::Arc;
use std::time::Duration;

use cinematoday_llm::openai::{OpenAiProvider, DEFAULT_BASE_URL as OPENAI_BASE_URL};
use cinematoday_tmdb::{TmdbClient, DEFAULT_BASE_URL as TMDB_BASE_URL, DEFAULT_IMAGE_BASE_URL};

use crate::clues::{ClueGenerator, DEFAULT_MODEL};
use crate::error::PipelineError;
use crate::tracking::{MlflowTracker, NoopTracker, RunTracker};

/// Pipeline configuration loaded from environment variables.
///
/// | Env Var                | Default                              |
/// |------------------------|--------------------------------------|
/// | `DATABASE_URL`         | required                             |
/// | `TMDB_API_KEY`         | required by `ingest`                 |
/// | `TMDB_BASE_URL`        | `https://api.themoviedb.org/3`       |
/// | `TMDB_IMAGE_BASE_URL`  | `https://image.tmdb.org/t/p/w500`    |
/// | `OPENAI_API_KEY`       | required by `apply` and `preview`    |
/// | `OPENAI_BASE_URL`      | `https://api.openai.com/v1`          |
/// | `OPENAI_MODEL`         | `gpt-5-mini`                         |
/// | `LLM_TIMEOUT_SECS`     | `120`                                |
/// | `MLFLOW_TRACKING_URI`  | unset: tracking disabled             |
/// | `MLFLOW_EXPERIMENT_ID` | `0`                                  |
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub database_url: String,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub mlflow_tracking_uri: Option<String>,
    pub mlflow_experiment_id: String,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| PipelineError::Config("DATABASE_URL must be set".into()))?;

        let llm_timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                PipelineError::Config(format!("LLM_TIMEOUT_SECS must be a valid u64, got {raw:?}"))
            })?,
            None => 120,
        };

        Ok(Self {
            database_url,
            tmdb_api_key: get("TMDB_API_KEY"),
            tmdb_base_url: or("TMDB_BASE_URL", TMDB_BASE_URL),
            tmdb_image_base_url: or("TMDB_IMAGE_BASE_URL", DEFAULT_IMAGE_BASE_URL),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: or("OPENAI_BASE_URL", OPENAI_BASE_URL),
            openai_model: or("OPENAI_MODEL", DEFAULT_MODEL),
            llm_timeout_secs,
            mlflow_tracking_uri: get("MLFLOW_TRACKING_URI"),
            mlflow_experiment_id: or("MLFLOW_EXPERIMENT_ID", "0"),
        })
    }

    pub fn tmdb_client(&self) -> Result<TmdbClient, PipelineError> {
        let key = self
            .tmdb_api_key
            .clone()
            .ok_or_else(|| PipelineError::Config("TMDB_API_KEY must be set for ingest".into()))?;
        Ok(TmdbClient::new(self.tmdb_base_url.clone(), key)?)
    }

    pub fn clue_generator(&self) -> Result<ClueGenerator, PipelineError> {
        let key = self.openai_api_key.clone().ok_or_else(|| {
            PipelineError::Config("OPENAI_API_KEY must be set to generate clues".into())
        })?;
        let provider = OpenAiProvider::new(
            key,
            self.openai_base_url.clone(),
            Duration::from_secs(self.llm_timeout_secs),
        )?;
        Ok(ClueGenerator::new(Arc::new(provider), self.openai_model.clone()))
    }

    /// MLflow tracker when a tracking URI is configured, otherwise a no-op.
    pub fn tracker(&self) -> Arc<dyn RunTracker> {
        match &self.mlflow_tracking_uri {
            Some(uri) => Arc::new(MlflowTracker::new(
                uri.clone(),
                self.mlflow_experiment_id.clone(),
            )),
            None => {
                tracing::info!("MLFLOW_TRACKING_URI not set, run tracking disabled");
                Arc::new(NoopTracker)
            }
        }
    }
}
