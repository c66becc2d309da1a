//! Experiment tracking for pipeline runs.
//!
//! [`RunTracker`] is the contract with the tracking sidecar: named runs,
//! string parameters, scalar metrics and file artifacts. [`MlflowTracker`]
//! talks to an MLflow tracking server over its REST API; [`NoopTracker`] is
//! used when no server is configured.
//!
//! Pipeline steps never talk to a tracker directly. They go through
//! [`TrackedRun`], which downgrades every tracker failure to a warning so
//! that an unreachable sidecar cannot fail or alter a batch.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Errors from a tracking backend.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Tracking server error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid tracking response: {0}")]
    InvalidResponse(String),
}

/// Terminal status recorded when a run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Finished,
    Failed,
}

impl RunStatus {
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Self::Finished
        } else {
            Self::Failed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
        }
    }
}

/// Backend contract for recording runs.
#[async_trait]
pub trait RunTracker: Send + Sync {
    /// Open a run and return its identifier.
    async fn start_run(&self, run_name: &str) -> Result<String, TrackingError>;

    async fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<(), TrackingError>;

    async fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<(), TrackingError>;

    /// Store `contents` as an artifact at relative `path` within the run.
    async fn log_artifact(
        &self,
        run_id: &str,
        path: &str,
        contents: Vec<u8>,
    ) -> Result<(), TrackingError>;

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError>;
}

/// Tracker that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

#[async_trait]
impl RunTracker for NoopTracker {
    async fn start_run(&self, run_name: &str) -> Result<String, TrackingError> {
        Ok(format!("noop-{run_name}"))
    }

    async fn log_param(&self, _: &str, _: &str, _: &str) -> Result<(), TrackingError> {
        Ok(())
    }

    async fn log_metric(&self, _: &str, _: &str, _: f64) -> Result<(), TrackingError> {
        Ok(())
    }

    async fn log_artifact(&self, _: &str, _: &str, _: Vec<u8>) -> Result<(), TrackingError> {
        Ok(())
    }

    async fn end_run(&self, _: &str, _: RunStatus) -> Result<(), TrackingError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: RunPayload,
}

#[derive(Debug, Deserialize)]
struct RunPayload {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
}

/// MLflow tracking server client (REST API 2.0).
///
/// Artifacts are uploaded through the server's proxied artifact endpoint,
/// so the server must run with artifact serving enabled.
pub struct MlflowTracker {
    client: reqwest::Client,
    tracking_uri: String,
    experiment_id: String,
}

impl MlflowTracker {
    pub fn new(tracking_uri: String, experiment_id: String) -> Self {
        Self::with_client(reqwest::Client::new(), tracking_uri, experiment_id)
    }

    pub fn with_client(
        client: reqwest::Client,
        tracking_uri: String,
        experiment_id: String,
    ) -> Self {
        Self {
            client,
            tracking_uri: tracking_uri.trim_end_matches('/').to_string(),
            experiment_id,
        }
    }

    fn api(&self, endpoint: &str) -> String {
        format!("{}/api/2.0/mlflow/{endpoint}", self.tracking_uri)
    }

    async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<String, TrackingError> {
        let response = self.client.post(self.api(endpoint)).json(&body).send().await?;
        Self::read_success(response).await
    }

    async fn read_success(response: reqwest::Response) -> Result<String, TrackingError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if !status.is_success() {
            return Err(TrackingError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
impl RunTracker for MlflowTracker {
    async fn start_run(&self, run_name: &str) -> Result<String, TrackingError> {
        let body = self
            .post(
                "runs/create",
                json!({
                    "experiment_id": self.experiment_id,
                    "run_name": run_name,
                    "start_time": now_millis()
                }),
            )
            .await?;
        let created: CreateRunResponse = serde_json::from_str(&body)
            .map_err(|e| TrackingError::InvalidResponse(format!("{e}, raw={body}")))?;
        Ok(created.run.info.run_id)
    }

    async fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<(), TrackingError> {
        self.post(
            "runs/log-parameter",
            json!({ "run_id": run_id, "key": key, "value": value }),
        )
        .await?;
        Ok(())
    }

    async fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<(), TrackingError> {
        self.post(
            "runs/log-metric",
            json!({
                "run_id": run_id,
                "key": key,
                "value": value,
                "timestamp": now_millis(),
                "step": 0
            }),
        )
        .await?;
        Ok(())
    }

    async fn log_artifact(
        &self,
        run_id: &str,
        path: &str,
        contents: Vec<u8>,
    ) -> Result<(), TrackingError> {
        let url = format!(
            "{}/api/2.0/mlflow-artifacts/artifacts/{}/{}/artifacts/{}",
            self.tracking_uri, self.experiment_id, run_id, path
        );
        let response = self.client.put(url).body(contents).send().await?;
        Self::read_success(response).await?;
        Ok(())
    }

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
        self.post(
            "runs/update",
            json!({
                "run_id": run_id,
                "status": status.as_str(),
                "end_time": now_millis()
            }),
        )
        .await?;
        Ok(())
    }
}

/// A best-effort handle on one tracked run.
///
/// If the run could not be started, every subsequent call is a no-op.
pub struct TrackedRun {
    tracker: Arc<dyn RunTracker>,
    run_id: Option<String>,
    name: String,
}

impl TrackedRun {
    pub async fn start(tracker: Arc<dyn RunTracker>, name: &str) -> Self {
        let run_id = match tracker.start_run(name).await {
            Ok(id) => {
                tracing::debug!(run = name, run_id = %id, "Tracking run started");
                Some(id)
            }
            Err(e) => {
                tracing::warn!(run = name, error = %e, "Could not start tracking run");
                None
            }
        };
        Self {
            tracker,
            run_id,
            name: name.to_string(),
        }
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub async fn param(&self, key: &str, value: impl Display) {
        let Some(run_id) = &self.run_id else { return };
        if let Err(e) = self.tracker.log_param(run_id, key, &value.to_string()).await {
            tracing::warn!(run = %self.name, key, error = %e, "Could not log parameter");
        }
    }

    pub async fn metric(&self, key: &str, value: f64) {
        let Some(run_id) = &self.run_id else { return };
        if let Err(e) = self.tracker.log_metric(run_id, key, value).await {
            tracing::warn!(run = %self.name, key, error = %e, "Could not log metric");
        }
    }

    pub async fn text_artifact(&self, path: &str, text: &str) {
        self.artifact(path, text.as_bytes().to_vec()).await;
    }

    pub async fn json_artifact(&self, path: &str, value: &serde_json::Value) {
        match serde_json::to_vec_pretty(value) {
            Ok(bytes) => self.artifact(path, bytes).await,
            Err(e) => {
                tracing::warn!(run = %self.name, path, error = %e, "Could not encode artifact")
            }
        }
    }

    async fn artifact(&self, path: &str, contents: Vec<u8>) {
        let Some(run_id) = &self.run_id else { return };
        if let Err(e) = self.tracker.log_artifact(run_id, path, contents).await {
            tracing::warn!(run = %self.name, path, error = %e, "Could not log artifact");
        }
    }

    pub async fn finish(self, status: RunStatus) {
        let Some(run_id) = &self.run_id else { return };
        if let Err(e) = self.tracker.end_run(run_id, status).await {
            tracing::warn!(run = %self.name, error = %e, "Could not end tracking run");
        }
    }
}
