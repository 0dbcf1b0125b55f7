//! Board state for one position and the optimistic drag-and-drop controller.
//!
//! Policy: local stage assignment is authoritative once set; failures are
//! reported, not reverted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::board::transition::{TransitionSlot, TransitionState};
use crate::models::candidate::{Candidate, CandidateStageUpdate};
use crate::models::interview::Position;

/// Where the dashboard's back button leads.
pub const BACK_LINK: &str = "/positions";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("candidate {0} is not on this board")]
    UnknownCandidate(String),

    #[error("candidate {0} has no application id for this position")]
    MissingApplicationId(String),

    #[error("board for position {0} is not loaded")]
    BoardNotLoaded(String),
}

/// A backend stage update produced by an accepted drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageUpdate {
    pub candidate_id: String,
    /// Load generation of the board the move was made on.
    pub generation: u64,
    /// Identifies this move among the candidate's moves; only the latest may settle.
    pub ticket: u64,
    pub body: CandidateStageUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped outside any column or onto the candidate's current column.
    Unchanged,
    /// Local state already rewritten; the update still has to reach the backend.
    Dispatch(StageUpdate),
}

pub struct Board {
    position_id: String,
    position: Position,
    candidates: Vec<Candidate>,
    transitions: HashMap<String, TransitionSlot>,
    /// Load generation; a reloaded board never accepts outcomes of older boards.
    generation: u64,
    next_ticket: u64,
    loaded_at: DateTime<Utc>,
}

impl Board {
    pub fn new(
        position_id: &str,
        generation: u64,
        position: Position,
        candidates: Vec<Candidate>,
    ) -> Self {
        Self {
            position_id: position_id.to_string(),
            position,
            candidates,
            transitions: HashMap::new(),
            generation,
            next_ticket: 0,
            loaded_at: Utc::now(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    #[cfg(test)]
    pub fn candidate(&self, candidate_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }

    pub fn transition(&self, candidate_id: &str) -> TransitionState {
        self.transitions
            .get(candidate_id)
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    /// Handles a drop of `candidate_id` onto the column named `target`
    /// (`None` when dropped outside every column).
    pub fn begin_move(
        &mut self,
        candidate_id: &str,
        target: Option<&str>,
    ) -> Result<MoveOutcome, MoveError> {
        let Some(step) = target.and_then(|name| self.position.step_by_name(name)) else {
            debug!("Drop of candidate {candidate_id} outside any column ignored");
            return Ok(MoveOutcome::Unchanged);
        };
        let (step_id, step_name) = (step.id, step.name.clone());

        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.id == candidate_id)
            .ok_or_else(|| MoveError::UnknownCandidate(candidate_id.to_string()))?;

        if candidate.current_interview_step == step_name {
            return Ok(MoveOutcome::Unchanged);
        }

        let application_id = candidate
            .application_id
            .clone()
            .ok_or_else(|| MoveError::MissingApplicationId(candidate_id.to_string()))?;

        info!(
            "Moving candidate {candidate_id} from '{}' to '{step_name}' on position {}",
            candidate.current_interview_step, self.position_id
        );
        candidate.current_interview_step = step_name;

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.transitions.insert(
            candidate_id.to_string(),
            TransitionSlot {
                state: TransitionState::Pending,
                latest_ticket: ticket,
            },
        );

        Ok(MoveOutcome::Dispatch(StageUpdate {
            candidate_id: candidate_id.to_string(),
            generation: self.generation,
            ticket,
            body: CandidateStageUpdate {
                application_id,
                current_interview_step: step_id.to_string(),
            },
        }))
    }

    /// Records the backend outcome of a move. The optimistic stage is left as is.
    ///
    /// Returns `false` when the outcome is ignored: it belongs to a board
    /// that has since been reloaded, or to a move superseded by a newer move
    /// of the same candidate.
    pub fn settle(&mut self, update: &StageUpdate, outcome: Result<(), String>) -> bool {
        let (candidate_id, ticket) = (update.candidate_id.as_str(), update.ticket);
        if update.generation != self.generation {
            debug!(
                "Ignoring stage update for candidate {candidate_id} from board generation {} (current {})",
                update.generation, self.generation
            );
            return false;
        }
        let Some(slot) = self.transitions.get_mut(candidate_id) else {
            return false;
        };
        if slot.latest_ticket != ticket {
            debug!(
                "Ignoring superseded stage update {ticket} for candidate {candidate_id} (latest {})",
                slot.latest_ticket
            );
            return false;
        }

        slot.state = match outcome {
            Ok(()) => TransitionState::Idle,
            Err(message) => {
                warn!("Stage update for candidate {candidate_id} failed: {message}");
                TransitionState::Errored { message }
            }
        };
        true
    }

    pub fn view(&self) -> BoardView {
        let columns = self
            .position
            .interview_steps
            .iter()
            .map(|step| ColumnView {
                step_id: step.id,
                name: step.name.clone(),
                order_index: step.order_index,
                candidates: self
                    .candidates
                    .iter()
                    .filter(|c| c.current_interview_step == step.name)
                    .map(|c| CardView {
                        id: c.id.clone(),
                        application_id: c.application_id.clone(),
                        full_name: c.full_name.clone(),
                        average_score: c.average_score,
                        transition: self.transition(&c.id),
                    })
                    .collect(),
            })
            .collect();

        BoardView {
            position_id: self.position_id.clone(),
            position_name: self.position.position_name.clone(),
            columns,
            loaded_at: self.loaded_at,
            back_link: BACK_LINK,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rendered board
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub position_id: String,
    pub position_name: String,
    pub columns: Vec<ColumnView>,
    pub loaded_at: DateTime<Utc>,
    pub back_link: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub step_id: i64,
    pub name: String,
    pub order_index: Option<i64>,
    pub candidates: Vec<CardView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: String,
    pub application_id: Option<String>,
    pub full_name: String,
    pub average_score: u8,
    pub transition: TransitionState,
}

impl BoardView {
    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&ColumnView> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
