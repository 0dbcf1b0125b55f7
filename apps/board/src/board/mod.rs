// Kanban board: per-position board state, the drag controller and the
// registry that loads boards from the recruiting backend.

pub mod handlers;
pub mod registry;
pub mod state;
pub mod transition;

pub use registry::{BoardRegistry, LoadError};
pub use state::{BoardView, MoveError, MoveOutcome};
