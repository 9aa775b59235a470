use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::repository::SurveyRepository;
use crate::error::{Error, Result};
use crate::models::{Question, Response, Survey};

#[derive(Debug, FromRow)]
struct SurveyRow {
    id: Uuid,
    code: String,
    title: String,
    owner_id: Uuid,
    questions: Json<Vec<Question>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ResponseRow {
    survey_id: Uuid,
    respondent_name: String,
    answers: Json<Vec<String>>,
    submitted_at: DateTime<Utc>,
}

impl SurveyRow {
    fn into_survey(self, responses: Vec<Response>) -> Survey {
        Survey {
            id: self.id,
            code: self.code,
            title: self.title,
            owner_id: self.owner_id,
            questions: self.questions.0,
            responses,
            created_at: self.created_at,
        }
    }
}

impl From<ResponseRow> for Response {
    fn from(row: ResponseRow) -> Self {
        Response {
            respondent_name: row.respondent_name,
            answers: row.answers.0,
            submitted_at: row.submitted_at,
        }
    }
}

/// Surveys live in `surveys`; each submission is its own row in
/// `survey_responses`, so appends are plain inserts and cannot overwrite one
/// another. Submission order is the `BIGSERIAL` id.
#[derive(Clone)]
pub struct PgSurveyRepository {
    pool: PgPool,
}

impl PgSurveyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_responses(&self, survey_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Response>>> {
        if survey_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT survey_id, respondent_name, answers, submitted_at
            FROM survey_responses
            WHERE survey_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(survey_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Response>> = HashMap::new();
        for row in rows {
            grouped.entry(row.survey_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn hydrate_one(&self, row: Option<SurveyRow>) -> Result<Option<Survey>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let mut responses = self.load_responses(&[row.id]).await?;
        let own = responses.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_survey(own)))
    }
}

const SURVEY_COLUMNS: &str = "id, code, title, owner_id, questions, created_at";

impl SurveyRepository for PgSurveyRepository {
    async fn insert(&self, survey: &Survey) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO surveys (id, code, title, owner_id, questions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(survey.id)
        .bind(&survey.code)
        .bind(&survey.title)
        .bind(survey.owner_id)
        .bind(Json(&survey.questions))
        .bind(survey.created_at)
        .execute(&mut *tx)
        .await?;

        for response in &survey.responses {
            sqlx::query(
                r#"
                INSERT INTO survey_responses (survey_id, respondent_name, answers, submitted_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(survey.id)
            .bind(&response.respondent_name)
            .bind(Json(&response.answers))
            .bind(response.submitted_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Survey>> {
        let row = sqlx::query_as::<_, SurveyRow>(&format!(
            "SELECT {} FROM surveys WHERE id = $1",
            SURVEY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate_one(row).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Survey>> {
        let row = sqlx::query_as::<_, SurveyRow>(&format!(
            "SELECT {} FROM surveys WHERE code = $1",
            SURVEY_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate_one(row).await
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM surveys WHERE code = $1)",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Survey>> {
        let rows = sqlx::query_as::<_, SurveyRow>(&format!(
            "SELECT {} FROM surveys WHERE owner_id = $1 ORDER BY created_at ASC, id ASC",
            SURVEY_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut responses = self.load_responses(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let own = responses.remove(&row.id).unwrap_or_default();
                row.into_survey(own)
            })
            .collect())
    }

    async fn append_response(&self, survey_id: Uuid, response: &Response) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO survey_responses (survey_id, respondent_name, answers, submitted_at)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (SELECT 1 FROM surveys WHERE id = $1)
            "#,
        )
        .bind(survey_id)
        .bind(&response.respondent_name)
        .bind(Json(&response.answers))
        .bind(response.submitted_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            // survey deleted between the existence check and the insert
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("health check failed: {}", e)))?;
        Ok(())
    }
}
