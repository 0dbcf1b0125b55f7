use serde::{Deserialize, Serialize};

/// Per-candidate stage-transition state:
/// `Idle → Pending (optimistic) → {Idle (settled), Errored}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransitionState {
    #[default]
    Idle,
    Pending,
    Errored { message: String },
}

#[cfg(test)]
impl TransitionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TransitionState::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TransitionState::Errored { message } => Some(message),
            _ => None,
        }
    }
}

/// Transition state plus the ticket of the latest move issued for a candidate.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransitionSlot {
    pub state: TransitionState,
    pub latest_ticket: u64,
}
