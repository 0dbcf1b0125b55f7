pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::board::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Kanban board
        .route(
            "/api/v1/positions/:id/board",
            get(handlers::handle_get_board),
        )
        .route(
            "/api/v1/positions/:id/board/reload",
            post(handlers::handle_reload_board),
        )
        .route(
            "/api/v1/positions/:id/board/moves",
            post(handlers::handle_move_candidate),
        )
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
