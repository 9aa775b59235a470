use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One anonymous submission. `answers[i]` belongs to question `i`; an empty
/// string marks the question as unanswered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub respondent_name: String,
    pub answers: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Response {
    pub fn new(respondent_name: impl Into<String>, answers: Vec<String>) -> Self {
        Self {
            respondent_name: respondent_name.into(),
            answers,
            submitted_at: Utc::now(),
        }
    }

    pub fn answer_for(&self, index: usize) -> Option<&str> {
        self.answers
            .get(index)
            .map(String::as_str)
            .filter(|a| !a.is_empty())
    }
}
