//! Flow loader: turns the interview-flow payload into an ordered `Position`.
//!
//! The backend nests the step list at one of two depths, so extraction is an
//! ordered list of shape strategies; the first one that finds an array wins.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::interview::{InterviewStep, Position};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error(
        "interview flow payload has no step list at interviewFlow.interviewFlow.interviewSteps \
         or interviewFlow.interviewSteps"
    )]
    MissingSteps,

    #[error("interview flow for position {0} defines no interview steps")]
    NoSteps(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Payload shapes
// ────────────────────────────────────────────────────────────────────────────

/// Known layouts of `GET /positions/{id}/interviewFlow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowShape {
    /// `{ interviewFlow: { interviewFlow: { interviewSteps: [...] } } }`
    Nested,
    /// `{ interviewFlow: { interviewSteps: [...] } }`
    Flattened,
}

impl FlowShape {
    /// Probe order. Nested is tried first.
    pub const PROBE_ORDER: [FlowShape; 2] = [FlowShape::Nested, FlowShape::Flattened];

    pub fn extract<'a>(&self, payload: &'a Value) -> Option<&'a Vec<Value>> {
        let outer = payload.get("interviewFlow")?;
        let holder = match self {
            FlowShape::Nested => outer.get("interviewFlow")?,
            FlowShape::Flattened => outer,
        };
        holder.get("interviewSteps")?.as_array()
    }
}

/// Runs the shape strategies in order and returns the first step array found.
pub fn extract_raw_steps(payload: &Value) -> Result<(FlowShape, &Vec<Value>), FlowError> {
    FlowShape::PROBE_ORDER
        .iter()
        .find_map(|shape| shape.extract(payload).map(|steps| (*shape, steps)))
        .ok_or(FlowError::MissingSteps)
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses a flow payload into a `Position` whose steps are sorted by
/// `orderIndex` ascending (missing as 0, ties in payload order).
pub fn parse_position(position_id: &str, payload: &Value) -> Result<Position, FlowError> {
    let (shape, raw_steps) = extract_raw_steps(payload)?;
    debug!(
        "Position {position_id}: found {} raw steps in {shape:?} shape",
        raw_steps.len()
    );

    let mut steps: Vec<InterviewStep> = raw_steps.iter().filter_map(parse_step).collect();
    if steps.is_empty() {
        return Err(FlowError::NoSteps(position_id.to_string()));
    }
    // sort_by_key is stable
    steps.sort_by_key(InterviewStep::sort_key);

    Ok(Position {
        position_name: position_name(position_id, payload),
        interview_steps: steps,
    })
}

fn parse_step(raw: &Value) -> Option<InterviewStep> {
    let Some(id) = raw.get("id").and_then(as_integer) else {
        warn!("Skipping interview step without a usable id: {raw}");
        return None;
    };

    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Step {id}"));

    Some(InterviewStep {
        id,
        name,
        order_index: raw.get("orderIndex").and_then(as_integer),
    })
}

fn position_name(position_id: &str, payload: &Value) -> String {
    [
        payload.get("positionName"),
        payload
            .get("interviewFlow")
            .and_then(|f| f.get("positionName")),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
    .map(str::to_string)
    .unwrap_or_else(|| format!("Position {position_id}"))
}

/// Accepts JSON integers and integer-looking strings.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(position: &Position) -> Vec<&str> {
        position
            .interview_steps
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    #[test]
    fn test_nested_shape_sorted_by_order_index() {
        let payload = json!({"interviewFlow": {"interviewFlow": {"interviewSteps": [
            {"id": 2, "name": "Tech", "orderIndex": 2},
            {"id": 1, "name": "Call", "orderIndex": 1}
        ]}}});

        let position = parse_position("1", &payload).unwrap();
        assert_eq!(names(&position), vec!["Call", "Tech"]);
    }

    #[test]
    fn test_both_shapes_parse_identically() {
        let steps = json!([
            {"id": 3, "name": "Manager", "orderIndex": 3},
            {"id": 1, "name": "Call", "orderIndex": 1},
            {"id": 2, "name": "Tech", "orderIndex": 2}
        ]);
        let nested = json!({"interviewFlow": {"interviewFlow": {"interviewSteps": steps.clone()}}});
        let flattened = json!({"interviewFlow": {"interviewSteps": steps}});

        let a = parse_position("7", &nested).unwrap();
        let b = parse_position("7", &flattened).unwrap();
        assert_eq!(a.interview_steps, b.interview_steps);
        assert_eq!(names(&a), vec!["Call", "Tech", "Manager"]);
    }

    #[test]
    fn test_nested_shape_wins_over_flattened() {
        let payload = json!({"interviewFlow": {
            "interviewFlow": {"interviewSteps": [{"id": 1, "name": "Nested"}]},
            "interviewSteps": [{"id": 9, "name": "Flat"}]
        }});
        let (shape, steps) = extract_raw_steps(&payload).unwrap();
        assert_eq!(shape, FlowShape::Nested);
        assert_eq!(steps.len(), 1);
        assert_eq!(names(&parse_position("1", &payload).unwrap()), vec!["Nested"]);
    }

    #[test]
    fn test_nested_object_without_array_falls_through_to_flattened() {
        let payload = json!({"interviewFlow": {
            "interviewFlow": {"description": "legacy"},
            "interviewSteps": [{"id": 4, "name": "Flat"}]
        }});
        let (shape, _) = extract_raw_steps(&payload).unwrap();
        assert_eq!(shape, FlowShape::Flattened);
    }

    #[test]
    fn test_ties_and_missing_order_index_keep_payload_order() {
        let payload = json!({"interviewFlow": {"interviewSteps": [
            {"id": 5, "name": "Late", "orderIndex": 1},
            {"id": 6, "name": "A"},
            {"id": 7, "name": "B", "orderIndex": 0},
            {"id": 8, "name": "C"}
        ]}});
        let position = parse_position("1", &payload).unwrap();
        assert_eq!(names(&position), vec!["A", "B", "C", "Late"]);
    }

    #[test]
    fn test_missing_name_defaults_to_step_id() {
        let payload = json!({"interviewFlow": {"interviewSteps": [{"id": 12, "orderIndex": 1}]}});
        let position = parse_position("1", &payload).unwrap();
        assert_eq!(names(&position), vec!["Step 12"]);
    }

    #[test]
    fn test_string_ids_are_accepted_and_idless_steps_skipped() {
        let payload = json!({"interviewFlow": {"interviewSteps": [
            {"id": "3", "name": "Culture", "orderIndex": "2"},
            {"name": "Orphan"}
        ]}});
        let position = parse_position("1", &payload).unwrap();
        assert_eq!(position.interview_steps.len(), 1);
        assert_eq!(position.interview_steps[0].id, 3);
        assert_eq!(position.interview_steps[0].order_index, Some(2));
    }

    #[test]
    fn test_missing_steps_is_descriptive_error() {
        for payload in [
            json!({}),
            json!({"interviewFlow": {}}),
            json!({"interviewFlow": {"interviewSteps": "nope"}}),
            json!([1, 2, 3]),
        ] {
            let err = parse_position("1", &payload).unwrap_err();
            assert_eq!(err, FlowError::MissingSteps);
            assert!(err.to_string().contains("interviewSteps"));
        }
    }

    #[test]
    fn test_empty_step_list_is_hard_error() {
        let payload = json!({"interviewFlow": {"interviewSteps": []}});
        assert_eq!(
            parse_position("42", &payload).unwrap_err(),
            FlowError::NoSteps("42".to_string())
        );
    }

    #[test]
    fn test_position_name_lookup_order() {
        let steps = json!([{"id": 1, "name": "Call"}]);

        let top = json!({"positionName": "Top", "interviewFlow": {"positionName": "Inner", "interviewSteps": steps.clone()}});
        assert_eq!(parse_position("1", &top).unwrap().position_name, "Top");

        let inner = json!({"interviewFlow": {"positionName": "Inner", "interviewSteps": steps.clone()}});
        assert_eq!(parse_position("1", &inner).unwrap().position_name, "Inner");

        let none = json!({"interviewFlow": {"interviewSteps": steps}});
        assert_eq!(parse_position("9", &none).unwrap().position_name, "Position 9");
    }
}
