use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::{BoardView, MoveOutcome};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub candidate_id: String,
    /// Column the card was dropped on; `null` when dropped outside every column.
    pub target_stage: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    /// Whether a stage update was sent to the backend.
    pub dispatched: bool,
    pub board: BoardView,
}

/// Route identifiers are interpolated into backend URLs, so only a
/// conservative character set is accepted.
pub fn validate_id(kind: &str, raw: &str) -> Result<String, AppError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AppError::Validation(format!("{kind} id is required")));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::Validation(format!("invalid {kind} id '{raw}'")));
    }
    Ok(id.to_string())
}

/// GET /api/v1/positions/:id/board
pub async fn handle_get_board(
    State(state): State<AppState>,
    Path(position_id): Path<String>,
) -> Result<Json<BoardView>, AppError> {
    let position_id = validate_id("position", &position_id)?;
    let view = state
        .boards
        .get_or_load(state.backend.as_ref(), &position_id)
        .await
        .map_err(|e| AppError::from_load(&position_id, e))?;
    Ok(Json(view))
}

/// POST /api/v1/positions/:id/board/reload
pub async fn handle_reload_board(
    State(state): State<AppState>,
    Path(position_id): Path<String>,
) -> Result<Json<BoardView>, AppError> {
    let position_id = validate_id("position", &position_id)?;
    let view = state
        .boards
        .reload(state.backend.as_ref(), &position_id)
        .await
        .map_err(|e| AppError::from_load(&position_id, e))?;
    Ok(Json(view))
}

/// POST /api/v1/positions/:id/board/moves
///
/// Responds with the optimistic board right away; the backend update runs in
/// the background and its outcome shows up on the card's transition state.
pub async fn handle_move_candidate(
    State(state): State<AppState>,
    Path(position_id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, AppError> {
    let position_id = validate_id("position", &position_id)?;
    let candidate_id = validate_id("candidate", &req.candidate_id)?;

    state
        .boards
        .get_or_load(state.backend.as_ref(), &position_id)
        .await
        .map_err(|e| AppError::from_load(&position_id, e))?;

    let (outcome, board) = state
        .boards
        .move_candidate(&position_id, &candidate_id, req.target_stage.as_deref())
        .await?;

    let dispatched = match outcome {
        MoveOutcome::Unchanged => false,
        MoveOutcome::Dispatch(update) => {
            info!(
                "Dispatching stage update {} for candidate {candidate_id}",
                update.ticket
            );
            let (boards, backend) = (state.boards.clone(), state.backend.clone());
            tokio::spawn(async move {
                boards
                    .dispatch_stage_update(backend.as_ref(), &position_id, update)
                    .await;
            });
            true
        }
    };

    Ok(Json(MoveResponse { dispatched, board }))
}
