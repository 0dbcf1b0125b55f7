//! Candidate loader: normalizes the candidate list of a position against its
//! already-resolved interview steps.

use serde_json::Value;
use tracing::warn;

use crate::flow::as_integer;
use crate::models::candidate::{Candidate, MAX_SCORE};
use crate::models::interview::Position;

/// Normalizes a raw `GET /positions/{id}/candidates` payload.
///
/// A missing or non-array payload yields no candidates; the stage columns are
/// still worth rendering on their own.
pub fn normalize_candidates(payload: &Value, position: &Position) -> Vec<Candidate> {
    let Some(raw) = payload.as_array() else {
        warn!("Candidate payload is not an array, rendering board without candidates");
        return Vec::new();
    };

    raw.iter()
        .filter_map(|c| normalize_candidate(c, position))
        .collect()
}

fn normalize_candidate(raw: &Value, position: &Position) -> Option<Candidate> {
    let Some(id) = raw.get("id").and_then(as_identifier) else {
        warn!("Skipping candidate without an id: {raw}");
        return None;
    };

    Some(Candidate {
        application_id: raw.get("applicationId").and_then(as_identifier),
        full_name: raw
            .get("fullName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        current_interview_step: resolve_stage(raw.get("currentInterviewStep"), position)?,
        average_score: score(raw.get("averageScore")),
        id,
    })
}

/// Maps a raw stage reference onto a step name of `position`.
///
/// Numeric-looking values (JSON numbers or digit strings) are step ids;
/// anything else is a stage name. Unmatched references fall back to the first
/// step. Returns `None` only when the position has no steps at all.
pub fn resolve_stage(raw: Option<&Value>, position: &Position) -> Option<String> {
    let fallback = position.first_step_name()?;

    let resolved = match raw {
        Some(Value::Number(_)) => raw
            .and_then(as_integer)
            .and_then(|id| position.step_by_id(id)),
        Some(Value::String(s)) if is_numeric(s) => s
            .trim()
            .parse()
            .ok()
            .and_then(|id| position.step_by_id(id)),
        Some(Value::String(s)) => position.step_by_name(s),
        _ => None,
    };

    Some(
        resolved
            .map(|step| step.name.as_str())
            .unwrap_or(fallback)
            .to_string(),
    )
}

fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn score(value: Option<&Value>) -> u8 {
    value
        .and_then(Value::as_f64)
        .map(|s| s.round().clamp(0.0, f64::from(MAX_SCORE)) as u8)
        .unwrap_or(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
