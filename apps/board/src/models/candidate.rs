use serde::{Deserialize, Serialize};

/// Highest value of the 0–5 average interview score.
pub const MAX_SCORE: u8 = 5;

/// A candidate card as placed on the board.
///
/// `id` identifies the candidate record; `application_id` identifies the
/// candidate's application to this position and is what stage updates reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub application_id: Option<String>,
    pub full_name: String,
    /// Stage name; always the name of a step of the loaded position.
    pub current_interview_step: String,
    pub average_score: u8,
}

/// Body of `PUT /candidates/{candidateId}/stage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateStageUpdate {
    pub application_id: String,
    /// Numeric step id, stringified.
    pub current_interview_step: String,
}
