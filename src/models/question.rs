use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
}

/// Question as authored, before it is given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub text: String,
    pub options: Vec<String>,
}

impl NewQuestion {
    pub fn new(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }

    pub(crate) fn validate(&self, position: usize) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::BadRequest(format!(
                "Question {} must have text",
                position + 1
            )));
        }
        let filled = self
            .options
            .iter()
            .filter(|o| !o.trim().is_empty())
            .count();
        if filled < MIN_OPTIONS || filled != self.options.len() {
            return Err(Error::BadRequest(format!(
                "Question {} must have at least {} non-empty options",
                position + 1,
                MIN_OPTIONS
            )));
        }
        Ok(())
    }

    pub(crate) fn into_question(self) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: self.text,
            options: self.options,
        }
    }
}

impl Question {
    pub fn accepts(&self, answer: &str) -> bool {
        answer.is_empty() || self.options.iter().any(|o| o == answer)
    }
}
