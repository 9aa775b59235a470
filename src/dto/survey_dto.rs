use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{NewQuestion, Question, Response, Survey};
use crate::services::survey_service::SurveyResults;
use crate::services::tabulator::Tabulator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestionPayload {
    #[serde(alias = "questionText")]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSurveyPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "A survey needs between 1 and 100 questions"))]
    pub questions: Vec<CreateQuestionPayload>,
}

impl CreateSurveyPayload {
    pub fn into_parts(self) -> (String, Vec<NewQuestion>) {
        let questions = self
            .questions
            .into_iter()
            .map(|q| NewQuestion::new(q.text, q.options))
            .collect();
        (self.title, questions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitResponsePayload {
    // an absent name is reported by the survey service, after the code lookup
    #[serde(default, alias = "studentName")]
    #[validate(length(max = 100))]
    pub respondent_name: String,
    pub answers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyView {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub response_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Survey> for SurveyView {
    fn from(survey: &Survey) -> Self {
        Self {
            id: survey.id,
            code: survey.code.clone(),
            title: survey.title.clone(),
            questions: survey.questions.clone(),
            response_count: survey.response_count(),
            created_at: survey.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyListResponse {
    pub success: bool,
    pub surveys: Vec<SurveyView>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponseResponse {
    pub success: bool,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<&Response> for SubmitResponseResponse {
    fn from(response: &Response) -> Self {
        Self {
            success: true,
            message: "Response submitted successfully".to_string(),
            submitted_at: response.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionResult {
    pub option: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: Uuid,
    pub text: String,
    pub options: Vec<OptionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResultsResponse {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub total_responses: u64,
    pub stats: Vec<QuestionResult>,
}

impl From<SurveyResults> for SurveyResultsResponse {
    fn from(results: SurveyResults) -> Self {
        let total = results.total_responses;
        let stats = results
            .stats
            .into_iter()
            .map(|q| QuestionResult {
                question_id: q.question_id,
                text: q.text,
                options: q
                    .counts
                    .into_iter()
                    .map(|c| OptionResult {
                        percentage: Tabulator::percentage(c.count, total),
                        option: c.option,
                        count: c.count,
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: results.id,
            code: results.code,
            title: results.title,
            total_responses: total,
            stats,
        }
    }
}
