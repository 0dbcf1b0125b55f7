use serde::{Deserialize, Serialize};

/// One stage of a position's hiring pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewStep {
    pub id: i64,
    pub name: String,
    pub order_index: Option<i64>,
}

impl InterviewStep {
    /// Sort key: steps without an order index sort as if it were zero.
    pub fn sort_key(&self) -> i64 {
        self.order_index.unwrap_or(0)
    }
}

/// A position and its ordered interview flow, rebuilt on every load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_name: String,
    pub interview_steps: Vec<InterviewStep>,
}

impl Position {
    pub fn step_by_name(&self, name: &str) -> Option<&InterviewStep> {
        self.interview_steps.iter().find(|s| s.name == name)
    }

    pub fn step_by_id(&self, id: i64) -> Option<&InterviewStep> {
        self.interview_steps.iter().find(|s| s.id == id)
    }

    /// Name of the first defined step, the fallback stage for unmatched candidates.
    pub fn first_step_name(&self) -> Option<&str> {
        self.interview_steps.first().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_position() -> Position {
        Position {
            position_name: "Senior Backend Engineer".to_string(),
            interview_steps: vec![
                InterviewStep {
                    id: 1,
                    name: "Call".to_string(),
                    order_index: Some(1),
                },
                InterviewStep {
                    id: 2,
                    name: "Tech".to_string(),
                    order_index: None,
                },
            ],
        }
    }

    #[test]
    fn test_missing_order_index_sorts_as_zero() {
        let position = make_position();
        assert_eq!(position.interview_steps[1].sort_key(), 0);
        assert_eq!(position.interview_steps[0].sort_key(), 1);
    }

    #[test]
    fn test_lookups_by_name_and_id() {
        let position = make_position();
        assert_eq!(position.step_by_name("Tech").map(|s| s.id), Some(2));
        assert_eq!(position.step_by_id(1).map(|s| s.name.as_str()), Some("Call"));
        assert!(position.step_by_name("Offer").is_none());
        assert_eq!(position.first_step_name(), Some("Call"));
    }
}
