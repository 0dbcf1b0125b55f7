//! Per-position board cache and the flow → candidates load sequence.
//!
//! Loads are tagged with a generation number per position; a load whose
//! generation is no longer the newest for its position is discarded instead
//! of overwriting fresher state, and its caller is answered with the board
//! the newest load installs. The lock is never held across a backend call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tracing::{info, warn};

use crate::backend_client::{BackendError, RecruitingBackend};
use crate::board::state::{Board, BoardView, MoveError, MoveOutcome, StageUpdate};
use crate::candidates::normalize_candidates;
use crate::flow::{parse_position, FlowError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch interview flow: {0}")]
    Fetch(#[from] BackendError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("a newer load of position {0} failed")]
    NewerLoadFailed(String),
}

#[derive(Default)]
struct RegistryInner {
    boards: HashMap<String, Board>,
    /// Newest load generation started per position.
    generations: HashMap<String, u64>,
    /// Newest load generation that finished (installed or failed) per position.
    finished: HashMap<String, u64>,
    next_generation: u64,
}

#[derive(Clone, Default)]
pub struct BoardRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    /// Woken whenever a newest-generation load finishes.
    load_finished: Arc<Notify>,
}

impl BoardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached board, loading it on first use.
    pub async fn get_or_load(
        &self,
        backend: &dyn RecruitingBackend,
        position_id: &str,
    ) -> Result<BoardView, LoadError> {
        if let Some(board) = self.inner.lock().await.boards.get(position_id) {
            return Ok(board.view());
        }
        self.reload(backend, position_id).await
    }

    /// Rebuilds the board from scratch: flow first, then candidates.
    pub async fn reload(
        &self,
        backend: &dyn RecruitingBackend,
        position_id: &str,
    ) -> Result<BoardView, LoadError> {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.next_generation += 1;
            let generation = inner.next_generation;
            inner
                .generations
                .insert(position_id.to_string(), generation);
            generation
        };
        info!("Loading board for position {position_id} (generation {generation})");

        let loaded = Self::fetch_board(backend, position_id, generation).await;

        let mut inner = self.inner.lock().await;
        if inner.generations.get(position_id) != Some(&generation) {
            drop(inner);
            warn!("Discarding stale load of position {position_id} (generation {generation})");
            return self.await_newest(position_id).await;
        }
        inner
            .finished
            .insert(position_id.to_string(), generation);

        let result = match loaded {
            Ok(board) => {
                let view = board.view();
                info!(
                    "Board for position {position_id} loaded: {} steps, {} candidates",
                    board.position().interview_steps.len(),
                    board.candidates().len()
                );
                inner.boards.insert(position_id.to_string(), board);
                Ok(view)
            }
            Err(e) => {
                warn!("Board for position {position_id} failed to load: {e}");
                inner.boards.remove(position_id);
                Err(e)
            }
        };
        drop(inner);
        self.load_finished.notify_waiters();
        result
    }

    /// Waits until the newest load of `position_id` has finished and returns
    /// the board it installed.
    async fn await_newest(&self, position_id: &str) -> Result<BoardView, LoadError> {
        loop {
            let notified = self.load_finished.notified();
            tokio::pin!(notified);
            // Register before checking so a finish in between is not missed.
            notified.as_mut().enable();

            {
                let inner = self.inner.lock().await;
                let newest = inner.generations.get(position_id).copied().unwrap_or(0);
                let finished = inner.finished.get(position_id).copied().unwrap_or(0);
                if finished >= newest {
                    return inner
                        .boards
                        .get(position_id)
                        .map(Board::view)
                        .ok_or_else(|| LoadError::NewerLoadFailed(position_id.to_string()));
                }
            }

            notified.await;
        }
    }

    async fn fetch_board(
        backend: &dyn RecruitingBackend,
        position_id: &str,
        generation: u64,
    ) -> Result<Board, LoadError> {
        let flow = backend.interview_flow(position_id).await?;
        let position = parse_position(position_id, &flow)?;

        // Candidates need the resolved steps. A failed fetch degrades to an empty board.
        let payload = backend
            .candidates(position_id)
            .await
            .unwrap_or_else(|e| {
                warn!("Candidates for position {position_id} unavailable: {e}");
                Value::Null
            });
        let candidates = normalize_candidates(&payload, &position);

        Ok(Board::new(position_id, generation, position, candidates))
    }

    /// Applies a drop to the loaded board. The returned update, if any, still
    /// has to be sent with [`BoardRegistry::dispatch_stage_update`].
    pub async fn move_candidate(
        &self,
        position_id: &str,
        candidate_id: &str,
        target: Option<&str>,
    ) -> Result<(MoveOutcome, BoardView), MoveError> {
        let mut inner = self.inner.lock().await;
        let board = inner
            .boards
            .get_mut(position_id)
            .ok_or_else(|| MoveError::BoardNotLoaded(position_id.to_string()))?;
        let outcome = board.begin_move(candidate_id, target)?;
        Ok((outcome, board.view()))
    }

    /// Sends a stage update to the backend and records its outcome on the board.
    ///
    /// Updates of different candidates are neither serialized nor queued.
    pub async fn dispatch_stage_update(
        &self,
        backend: &dyn RecruitingBackend,
        position_id: &str,
        update: StageUpdate,
    ) {
        let outcome = backend
            .update_candidate_stage(&update.candidate_id, &update.body)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string());

        let mut inner = self.inner.lock().await;
        match inner.boards.get_mut(position_id) {
            Some(board) => {
                board.settle(&update, outcome);
            }
            None => warn!(
                "Board for position {position_id} is gone, dropping outcome of candidate {} update",
                update.candidate_id
            ),
        }
    }

    #[cfg(test)]
    pub async fn view(&self, position_id: &str) -> Option<BoardView> {
        self.inner
            .lock()
            .await
            .boards
            .get(position_id)
            .map(Board::view)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
