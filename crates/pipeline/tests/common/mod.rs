//! Test doubles for the pipeline's external collaborators.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use cinematoday_llm::{ChatRequest, ChatResponse, LlmError, LlmProvider};
use cinematoday_pipeline::clues::{ClueGenerator, DEFAULT_MODEL};
use cinematoday_pipeline::tracking::{RunStatus, RunTracker, TrackingError};
use cinematoday_tmdb::{CatalogMovie, MovieCatalog, NowPlayingQuery, TmdbError};

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Everything a run recorded, in call order.
#[derive(Debug, Default, Clone)]
pub struct RecordedRun {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub metrics: Vec<(String, f64)>,
    pub artifacts: Vec<(String, Vec<u8>)>,
    pub status: Option<RunStatus>,
}

impl RecordedRun {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn artifact_text(&self, path: &str) -> Option<String> {
        self.artifacts
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// In-memory tracker; run ids are indexes into `runs`.
#[derive(Default)]
pub struct RecordingTracker {
    runs: Mutex<Vec<RecordedRun>>,
}

impl RecordingTracker {
    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }

    fn with_run(&self, run_id: &str, f: impl FnOnce(&mut RecordedRun)) {
        let idx: usize = run_id.parse().unwrap();
        f(&mut self.runs.lock().unwrap()[idx]);
    }
}

#[async_trait]
impl RunTracker for RecordingTracker {
    async fn start_run(&self, run_name: &str) -> Result<String, TrackingError> {
        let mut runs = self.runs.lock().unwrap();
        runs.push(RecordedRun {
            name: run_name.to_string(),
            ..Default::default()
        });
        Ok((runs.len() - 1).to_string())
    }

    async fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<(), TrackingError> {
        self.with_run(run_id, |r| r.params.push((key.into(), value.into())));
        Ok(())
    }

    async fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<(), TrackingError> {
        self.with_run(run_id, |r| r.metrics.push((key.into(), value)));
        Ok(())
    }

    async fn log_artifact(
        &self,
        run_id: &str,
        path: &str,
        contents: Vec<u8>,
    ) -> Result<(), TrackingError> {
        self.with_run(run_id, |r| r.artifacts.push((path.into(), contents)));
        Ok(())
    }

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
        self.with_run(run_id, |r| r.status = Some(status));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub fn catalog_entry(id: i64, title: &str, year: &str, popularity: f64) -> CatalogMovie {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "overview": format!("Overview of {title}."),
        "poster_path": format!("/{id}.jpg"),
        "release_date": format!("{year}-01-01"),
        "popularity": popularity,
    }))
    .unwrap()
}

/// Catalog returning a fixed listing, or a fixed error.
pub struct FakeCatalog {
    pub movies: Vec<CatalogMovie>,
    pub fail_with_status: Option<u16>,
}

impl FakeCatalog {
    pub fn new(movies: Vec<CatalogMovie>) -> Self {
        Self {
            movies,
            fail_with_status: None,
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            movies: Vec::new(),
            fail_with_status: Some(status),
        }
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn now_playing(&self, _query: &NowPlayingQuery) -> Result<Vec<CatalogMovie>, TmdbError> {
        match self.fail_with_status {
            Some(status) => Err(TmdbError::ApiError {
                status,
                body: "catalog unavailable".into(),
            }),
            None => Ok(self.movies.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

pub fn four_clue_reply(prefix: &str) -> String {
    json!({
        "clues": (1..=4).map(|i| format!("{prefix} clue {i} here")).collect::<Vec<_>>()
    })
    .to_string()
}

/// Provider answering from a queue of canned replies; once the queue is
/// drained it repeats `fallback`.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    pub calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<String>, fallback: String) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn always(reply: String) -> Arc<Self> {
        Self::new(Vec::new(), reply)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.calls.lock().unwrap().push(req);
        let text = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Ok(ChatResponse { text })
    }
}

pub fn generator(llm: Arc<ScriptedLlm>) -> ClueGenerator {
    ClueGenerator::new(llm, DEFAULT_MODEL.to_string())
}
