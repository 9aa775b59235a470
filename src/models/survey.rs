use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::question::{NewQuestion, Question};
use super::response::Response;
use crate::error::{Error, Result};

/// A survey together with its questions and responses. The whole value is the
/// unit of consistency: questions never change after creation and responses
/// are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub owner_id: Uuid,
    pub questions: Vec<Question>,
    pub responses: Vec<Response>,
    pub created_at: DateTime<Utc>,
}

impl Survey {
    /// Checks the authored content without touching any store, so callers can
    /// reject bad input before spending a code.
    pub fn validate_draft(title: &str, questions: &[NewQuestion]) -> Result<()> {
        if title.trim().is_empty() {
            return Err(Error::BadRequest("Title is required".to_string()));
        }
        if questions.is_empty() {
            return Err(Error::BadRequest(
                "A survey needs at least one question".to_string(),
            ));
        }
        for (idx, q) in questions.iter().enumerate() {
            q.validate(idx)?;
        }
        Ok(())
    }

    pub fn new(
        title: impl Into<String>,
        owner_id: Uuid,
        questions: Vec<NewQuestion>,
        code: String,
    ) -> Result<Self> {
        let title = title.into();
        Self::validate_draft(&title, &questions)?;

        Ok(Self {
            id: Uuid::new_v4(),
            code,
            title: title.trim().to_string(),
            owner_id,
            questions: questions.into_iter().map(NewQuestion::into_question).collect(),
            responses: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    /// Answers must line up with the questions one to one, and every non-empty
    /// answer must be one of the options of its question, matched exactly.
    pub fn check_answers(&self, answers: &[String]) -> Result<()> {
        if answers.len() != self.questions.len() {
            return Err(Error::BadRequest(format!(
                "Expected {} answers, got {}",
                self.questions.len(),
                answers.len()
            )));
        }
        for (idx, (question, answer)) in self.questions.iter().zip(answers).enumerate() {
            if !question.accepts(answer) {
                return Err(Error::BadRequest(format!(
                    "Answer {} is not an option of question {}",
                    answer,
                    idx + 1
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, options: &[&str]) -> NewQuestion {
        NewQuestion::new(text, options.iter().map(|o| o.to_string()).collect())
    }

    fn survey() -> Survey {
        Survey::new(
            "Lunch",
            Uuid::new_v4(),
            vec![
                question("Main?", &["Pizza", "Pasta"]),
                question("Drink?", &["Water", "Juice", "Tea"]),
            ],
            "123456".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn new_survey_starts_empty_with_fresh_question_ids() {
        let s = survey();
        assert!(s.responses.is_empty());
        assert_eq!(s.questions.len(), 2);
        assert_ne!(s.questions[0].id, s.questions[1].id);
        assert_eq!(s.code, "123456");
    }

    #[test]
    fn rejects_empty_title() {
        let questions = vec![question("Q", &["a", "b"])];
        let err = Survey::new("  ", Uuid::new_v4(), questions, "111111".into()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_no_questions() {
        let err = Survey::new("title", Uuid::new_v4(), vec![], "111111".into()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_single_option_and_blank_options() {
        for options in [&["only"][..], &["a", " "][..]] {
            let err = Survey::new(
                "title",
                Uuid::new_v4(),
                vec![question("Q", options)],
                "111111".into(),
            )
            .unwrap_err();
            assert!(err.is_validation(), "options {:?} accepted", options);
        }
    }

    #[test]
    fn rejects_question_without_text() {
        let questions = vec![question("", &["a", "b"])];
        let err = Survey::new("title", Uuid::new_v4(), questions, "111111".into()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn answers_must_match_question_count_and_options() {
        let s = survey();
        let ok = vec!["Pizza".to_string(), "".to_string()];
        assert!(s.check_answers(&ok).is_ok());

        let short = vec!["Pizza".to_string()];
        assert!(s.check_answers(&short).unwrap_err().is_validation());

        let wrong_case = vec!["pizza".to_string(), "Tea".to_string()];
        assert!(s.check_answers(&wrong_case).unwrap_err().is_validation());
    }
}
