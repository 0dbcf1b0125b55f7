//! Recruiting backend client, the only module that talks to the backend HTTP API.
//!
//! The backend is opaque: payload shapes are read as `serde_json::Value` and
//! normalized by `flow` and `candidates`. Calls are never retried here; every
//! recovery is user-initiated (reload or re-drag).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::candidate::CandidateStageUpdate;

#[cfg(test)]
pub mod fake;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The three backend endpoints the board consumes.
///
/// Carried in `AppState` as `Arc<dyn RecruitingBackend>` so tests can swap in
/// an in-memory backend.
#[async_trait]
pub trait RecruitingBackend: Send + Sync {
    /// GET /positions/{positionId}/interviewFlow
    async fn interview_flow(&self, position_id: &str) -> Result<Value, BackendError>;

    /// GET /positions/{positionId}/candidates
    async fn candidates(&self, position_id: &str) -> Result<Value, BackendError>;

    /// PUT /candidates/{candidateId}/stage
    async fn update_candidate_stage(
        &self,
        candidate_id: &str,
        update: &CandidateStageUpdate,
    ) -> Result<Value, BackendError>;
}

fn interview_flow_path(position_id: &str) -> String {
    format!("/positions/{position_id}/interviewFlow")
}

fn candidates_path(position_id: &str) -> String {
    format!("/positions/{position_id}/candidates")
}

fn stage_path(candidate_id: &str) -> String {
    format!("/candidates/{candidate_id}/stage")
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read_json(path: &str, response: Response) -> Result<Value, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Backend {path} returned {status}: {body}");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let body = response.text().await?;
        debug!("Backend {path} succeeded ({} bytes)", body.len());
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn get(&self, path: &str) -> Result<Value, BackendError> {
        let response = self.client.get(self.url(path)).send().await.map_err(|e| {
            error!("Backend GET {path} failed: {e}");
            BackendError::Http(e)
        })?;
        Self::read_json(path, response).await
    }
}

#[async_trait]
impl RecruitingBackend for HttpBackend {
    async fn interview_flow(&self, position_id: &str) -> Result<Value, BackendError> {
        self.get(&interview_flow_path(position_id)).await
    }

    async fn candidates(&self, position_id: &str) -> Result<Value, BackendError> {
        self.get(&candidates_path(position_id)).await
    }

    async fn update_candidate_stage(
        &self,
        candidate_id: &str,
        update: &CandidateStageUpdate,
    ) -> Result<Value, BackendError> {
        let path = stage_path(candidate_id);
        let response = self
            .client
            .put(self.url(&path))
            .json(update)
            .send()
            .await
            .map_err(|e| {
                error!("Backend PUT {path} failed: {e}");
                BackendError::Http(e)
            })?;
        Self::read_json(&path, response).await
    }
}

/// Pulls a human-readable message out of an error body when the backend sends
/// `{ "message": ... }` or `{ "error": ... }`, otherwise returns the body as-is.
fn error_message(body: String) -> String {
    let parsed = serde_json::from_str::<Value>(&body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .unwrap_or(body)
}
