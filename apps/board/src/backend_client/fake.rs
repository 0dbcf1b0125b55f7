//! In-memory `RecruitingBackend` for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{BackendError, RecruitingBackend};
use crate::models::candidate::CandidateStageUpdate;

#[derive(Default)]
pub struct FakeBackend {
    pub flows: Mutex<HashMap<String, Value>>,
    pub candidates: Mutex<HashMap<String, Value>>,
    /// Candidate ids whose stage update fails with a 500.
    pub failing_updates: Mutex<Vec<String>>,
    /// Artificial latency per position for flow fetches.
    pub flow_delays: Mutex<HashMap<String, Duration>>,
    pub stage_updates: Mutex<Vec<(String, CandidateStageUpdate)>>,
    pub flow_fetches: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_position(position_id: &str, flow: Value, candidates: Value) -> Self {
        let backend = Self::default();
        backend.set_flow(position_id, flow);
        backend.set_candidates(position_id, candidates);
        backend
    }

    pub fn set_flow(&self, position_id: &str, flow: Value) {
        self.flows.lock().unwrap().insert(position_id.to_string(), flow);
    }

    pub fn set_candidates(&self, position_id: &str, candidates: Value) {
        self.candidates
            .lock()
            .unwrap()
            .insert(position_id.to_string(), candidates);
    }

    pub fn fail_updates_for(&self, candidate_id: &str) {
        self.failing_updates
            .lock()
            .unwrap()
            .push(candidate_id.to_string());
    }

    pub fn delay_flow(&self, position_id: &str, delay: Duration) {
        self.flow_delays
            .lock()
            .unwrap()
            .insert(position_id.to_string(), delay);
    }

    pub fn recorded_updates(&self) -> Vec<(String, CandidateStageUpdate)> {
        self.stage_updates.lock().unwrap().clone()
    }

    pub fn flow_fetch_count(&self) -> usize {
        self.flow_fetches.lock().unwrap().len()
    }
}

fn not_found(what: &str) -> BackendError {
    BackendError::Status {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl RecruitingBackend for FakeBackend {
    async fn interview_flow(&self, position_id: &str) -> Result<Value, BackendError> {
        self.flow_fetches
            .lock()
            .unwrap()
            .push(position_id.to_string());
        // The response reflects the flow at request time, however late it arrives.
        let flow = self.flows.lock().unwrap().get(position_id).cloned();
        let delay = self.flow_delays.lock().unwrap().get(position_id).copied();
        if let Some(delay) = delay.filter(|d| !d.is_zero()) {
            tokio::time::sleep(delay).await;
        }
        flow.ok_or_else(|| not_found("position"))
    }

    async fn candidates(&self, position_id: &str) -> Result<Value, BackendError> {
        self.candidates
            .lock()
            .unwrap()
            .get(position_id)
            .cloned()
            .ok_or_else(|| not_found("candidates"))
    }

    async fn update_candidate_stage(
        &self,
        candidate_id: &str,
        update: &CandidateStageUpdate,
    ) -> Result<Value, BackendError> {
        self.stage_updates
            .lock()
            .unwrap()
            .push((candidate_id.to_string(), update.clone()));
        if self
            .failing_updates
            .lock()
            .unwrap()
            .iter()
            .any(|id| id == candidate_id)
        {
            return Err(BackendError::Status {
                status: 500,
                message: "stage update rejected".to_string(),
            });
        }
        Ok(json!({"message": "Candidate stage updated"}))
    }
}

/// Flow payload used across tests: "Call" (id 1) then "Tech" (id 2).
pub fn sample_flow() -> Value {
    json!({
        "positionName": "Senior Backend Engineer",
        "interviewFlow": {"interviewFlow": {"interviewSteps": [
            {"id": 2, "name": "Tech", "orderIndex": 2},
            {"id": 1, "name": "Call", "orderIndex": 1}
        ]}}
    })
}

pub fn sample_candidates() -> Value {
    json!([
        {"id": "5", "applicationId": "77", "fullName": "Eva White", "currentInterviewStep": "2", "averageScore": 4},
        {"id": "1", "applicationId": "11", "fullName": "John Doe", "currentInterviewStep": "Call", "averageScore": 3}
    ])
}
