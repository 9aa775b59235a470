use std::sync::Arc;

use uuid::Uuid;

use crate::config::SurveySettings;
use crate::database::SurveyRepository;
use crate::error::{Error, Result};
use crate::models::{NewQuestion, Response, Survey};
use crate::services::tabulator::{QuestionStats, Tabulator};
use crate::utils::code::{generate_unique_code, CodeSource, ThreadRngSource};

#[derive(Debug, Clone)]
pub struct SurveyResults {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub total_responses: u64,
    pub stats: Vec<QuestionStats>,
}

#[derive(Clone)]
pub struct SurveyService<R: SurveyRepository> {
    repo: R,
    codes: Arc<dyn CodeSource>,
    settings: SurveySettings,
}

impl<R: SurveyRepository> SurveyService<R> {
    pub fn new(repo: R, settings: SurveySettings) -> Self {
        Self::with_code_source(repo, settings, Arc::new(ThreadRngSource))
    }

    pub fn with_code_source(
        repo: R,
        settings: SurveySettings,
        codes: Arc<dyn CodeSource>,
    ) -> Self {
        Self {
            repo,
            codes,
            settings,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a survey under a fresh code. Losing the race for a code to a
    /// concurrent creation restarts the whole creation with a new code.
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: String,
        questions: Vec<NewQuestion>,
    ) -> Result<Survey> {
        Survey::validate_draft(&title, &questions)?;

        let attempts = self.settings.create_max_attempts.max(1);
        for attempt in 1..=attempts {
            let repo = &self.repo;
            let code = generate_unique_code(
                self.codes.as_ref(),
                self.settings.code_max_attempts,
                |candidate| async move { repo.exists_by_code(&candidate).await },
            )
            .await?;

            let survey = Survey::new(title.clone(), owner_id, questions.clone(), code)?;
            match self.repo.insert(&survey).await {
                Ok(()) => {
                    tracing::info!(
                        survey_id = %survey.id,
                        code = %survey.code,
                        owner_id = %owner_id,
                        questions = survey.questions.len(),
                        "survey created"
                    );
                    return Ok(survey);
                }
                Err(Error::Conflict(reason)) => {
                    tracing::warn!(
                        attempt,
                        code = %survey.code,
                        %reason,
                        "survey insert conflicted, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::CodeSpaceExhausted(attempts))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Survey> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Survey not found".to_string()))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Survey> {
        self.repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| Error::NotFound("Survey not found".to_string()))
    }

    /// Teachers reach a survey by id, students by code; one lookup serves
    /// both. The id wins when the identifier could be either.
    pub async fn find_by_id_or_code(&self, identifier: &str) -> Result<Survey> {
        if let Ok(id) = Uuid::parse_str(identifier) {
            if let Some(survey) = self.repo.find_by_id(id).await? {
                return Ok(survey);
            }
        }
        match self.repo.find_by_code(identifier).await? {
            Some(survey) => Ok(survey),
            None => {
                tracing::debug!(identifier, "no survey for identifier");
                Err(Error::NotFound("Survey not found".to_string()))
            }
        }
    }

    pub async fn submit_response(
        &self,
        code: &str,
        respondent_name: &str,
        answers: Option<Vec<String>>,
    ) -> Result<Response> {
        let survey = self.find_by_code(code).await?;

        let name = respondent_name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("Respondent name is required".to_string()));
        }
        let answers =
            answers.ok_or_else(|| Error::BadRequest("Answers are required".to_string()))?;
        survey.check_answers(&answers)?;

        let response = Response::new(name, answers);
        if !self.repo.append_response(survey.id, &response).await? {
            return Err(Error::NotFound("Survey not found".to_string()));
        }
        tracing::info!(survey_id = %survey.id, code, "response recorded");
        Ok(response)
    }

    pub async fn delete(&self, id: Uuid, requester: Uuid) -> Result<()> {
        let survey = self.find_by_id(id).await?;
        if !survey.is_owned_by(requester) {
            return Err(Error::Forbidden(
                "Not authorized to delete this survey".to_string(),
            ));
        }
        if !self.repo.delete_by_id(id).await? {
            return Err(Error::NotFound("Survey not found".to_string()));
        }
        tracing::info!(survey_id = %id, "survey deleted");
        Ok(())
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Survey>> {
        self.repo.find_all_by_owner(owner_id).await
    }

    pub async fn results(&self, id: Uuid, requester: Uuid) -> Result<SurveyResults> {
        let survey = self.find_by_id(id).await?;
        if !survey.is_owned_by(requester) {
            return Err(Error::Forbidden(
                "Not authorized to view these results".to_string(),
            ));
        }
        let stats = Tabulator::compute_stats(&survey);
        Ok(SurveyResults {
            id: survey.id,
            total_responses: survey.response_count() as u64,
            code: survey.code,
            title: survey.title,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemorySurveyRepository;
    use crate::utils::code::SequenceSource;
    use std::collections::HashSet;

    fn questions() -> Vec<NewQuestion> {
        vec![NewQuestion::new("Favourite?", vec!["A".into(), "B".into()])]
    }

    fn service() -> SurveyService<MemorySurveyRepository> {
        SurveyService::new(MemorySurveyRepository::new(), SurveySettings::default())
    }

    #[tokio::test]
    async fn codes_are_unique_across_many_surveys() {
        let svc = service();
        let owner = Uuid::new_v4();
        let mut codes = HashSet::new();
        for i in 0..200 {
            let s = svc.create(owner, format!("Survey {}", i), questions()).await.unwrap();
            assert!(codes.insert(s.code.clone()), "duplicate code {}", s.code);
        }
    }

    #[tokio::test]
    async fn taken_code_is_skipped() {
        let repo = MemorySurveyRepository::new();
        let svc = SurveyService::with_code_source(
            repo,
            SurveySettings::default(),
            Arc::new(SequenceSource::new(vec![111_111, 111_111, 222_222])),
        );
        let owner = Uuid::new_v4();
        let first = svc.create(owner, "one".into(), questions()).await.unwrap();
        let second = svc.create(owner, "two".into(), questions()).await.unwrap();

        assert_eq!(first.code, "111111");
        assert_eq!(second.code, "222222");
    }

    /// Answers every existence check with a stale "free", the way a
    /// concurrent creation looks between check and insert.
    #[derive(Clone, Default)]
    struct StaleReads(MemorySurveyRepository);

    impl SurveyRepository for StaleReads {
        async fn insert(&self, survey: &Survey) -> Result<()> {
            self.0.insert(survey).await
        }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Survey>> {
            self.0.find_by_id(id).await
        }
        async fn find_by_code(&self, code: &str) -> Result<Option<Survey>> {
            self.0.find_by_code(code).await
        }
        async fn exists_by_code(&self, _code: &str) -> Result<bool> {
            Ok(false)
        }
        async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Survey>> {
            self.0.find_all_by_owner(owner_id).await
        }
        async fn append_response(&self, survey_id: Uuid, response: &Response) -> Result<bool> {
            self.0.append_response(survey_id, response).await
        }
        async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
            self.0.delete_by_id(id).await
        }
        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn insert_conflict_restarts_creation_with_new_code() {
        let svc = SurveyService::with_code_source(
            StaleReads::default(),
            SurveySettings::default(),
            Arc::new(SequenceSource::new(vec![444_444, 444_444, 555_555])),
        );
        let owner = Uuid::new_v4();
        let first = svc.create(owner, "one".into(), questions()).await.unwrap();
        let second = svc.create(owner, "two".into(), questions()).await.unwrap();

        assert_eq!(first.code, "444444");
        assert_eq!(second.code, "555555");
    }

    #[tokio::test]
    async fn persistent_conflicts_are_not_surfaced_as_conflict() {
        let svc = SurveyService::with_code_source(
            StaleReads::default(),
            SurveySettings {
                code_max_attempts: 10,
                create_max_attempts: 3,
            },
            Arc::new(SequenceSource::new(vec![666_666])),
        );
        let owner = Uuid::new_v4();
        svc.create(owner, "one".into(), questions()).await.unwrap();

        let err = svc.create(owner, "two".into(), questions()).await.unwrap_err();
        assert!(matches!(err, Error::CodeSpaceExhausted(3)));
    }

    #[tokio::test]
    async fn exhausted_code_space_is_reported() {
        let svc = SurveyService::with_code_source(
            MemorySurveyRepository::new(),
            SurveySettings {
                code_max_attempts: 5,
                create_max_attempts: 2,
            },
            Arc::new(SequenceSource::new(vec![333_333])),
        );
        let owner = Uuid::new_v4();
        svc.create(owner, "one".into(), questions()).await.unwrap();

        let err = svc.create(owner, "two".into(), questions()).await.unwrap_err();
        assert!(matches!(err, Error::CodeSpaceExhausted(5)));
    }

    #[tokio::test]
    async fn invalid_drafts_are_rejected_before_a_code_is_drawn() {
        let svc = service();
        let owner = Uuid::new_v4();

        let err = svc.create(owner, "title".into(), vec![]).await.unwrap_err();
        assert!(err.is_validation());
        let err = svc.create(owner, "".into(), questions()).await.unwrap_err();
        assert!(err.is_validation());
        let one_option = vec![NewQuestion::new("Q", vec!["only".into()])];
        let err = svc.create(owner, "title".into(), one_option).await.unwrap_err();
        assert!(err.is_validation());

        assert!(svc.repository().is_empty().await);
    }

    #[tokio::test]
    async fn submissions_append_in_order() {
        let svc = service();
        let survey = svc.create(Uuid::new_v4(), "t".into(), questions()).await.unwrap();

        svc.submit_response(&survey.code, "Ann", Some(vec!["A".into()]))
            .await
            .unwrap();
        svc.submit_response(&survey.code, "Ben", Some(vec!["B".into()]))
            .await
            .unwrap();

        let stored = svc.find_by_code(&survey.code).await.unwrap();
        assert_eq!(stored.responses.len(), 2);
        assert_eq!(stored.responses[0].respondent_name, "Ann");
        assert_eq!(stored.responses[1].respondent_name, "Ben");
    }

    #[tokio::test]
    async fn submission_errors() {
        let svc = service();
        let survey = svc.create(Uuid::new_v4(), "t".into(), questions()).await.unwrap();

        let err = svc
            .submit_response("999999", "Ann", Some(vec!["A".into()]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = svc
            .submit_response(&survey.code, "  ", Some(vec!["A".into()]))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = svc.submit_response(&survey.code, "Ann", None).await.unwrap_err();
        assert!(err.is_validation());

        let err = svc
            .submit_response(&survey.code, "Ann", Some(vec!["C".into()]))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = svc
            .submit_response(&survey.code, "Ann", Some(vec!["A".into(), "B".into()]))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert!(svc.find_by_code(&survey.code).await.unwrap().responses.is_empty());
    }

    #[tokio::test]
    async fn only_the_owner_may_delete_or_view_results() {
        let svc = service();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let survey = svc.create(owner, "t".into(), questions()).await.unwrap();

        assert!(matches!(
            svc.results(survey.id, other).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            svc.delete(survey.id, other).await,
            Err(Error::Forbidden(_))
        ));

        let results = svc.results(survey.id, owner).await.unwrap();
        assert_eq!(results.total_responses, 0);
        svc.delete(survey.id, owner).await.unwrap();
        assert!(matches!(
            svc.find_by_id(survey.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn results_tabulate_responses() {
        let svc = service();
        let owner = Uuid::new_v4();
        let survey = svc.create(owner, "t".into(), questions()).await.unwrap();
        for answer in ["A", "B", "A"] {
            svc.submit_response(&survey.code, "s", Some(vec![answer.into()]))
                .await
                .unwrap();
        }

        let results = svc.results(survey.id, owner).await.unwrap();
        assert_eq!(results.total_responses, 3);
        assert_eq!(results.stats[0].count_for("A"), Some(2));
        assert_eq!(results.stats[0].count_for("B"), Some(1));
    }

    #[tokio::test]
    async fn lookup_falls_back_from_id_to_code() {
        let svc = service();
        let survey = svc.create(Uuid::new_v4(), "t".into(), questions()).await.unwrap();

        let by_code = svc.find_by_id_or_code(&survey.code).await.unwrap();
        assert_eq!(by_code.id, survey.id);
        let by_id = svc.find_by_id_or_code(&survey.id.to_string()).await.unwrap();
        assert_eq!(by_id.id, survey.id);
        assert!(matches!(
            svc.find_by_id_or_code(&Uuid::new_v4().to_string()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_returns_only_own_surveys_in_creation_order() {
        let svc = service();
        let owner = Uuid::new_v4();
        svc.create(owner, "first".into(), questions()).await.unwrap();
        svc.create(Uuid::new_v4(), "foreign".into(), questions()).await.unwrap();
        svc.create(owner, "second".into(), questions()).await.unwrap();

        let titles: Vec<String> = svc
            .list_by_owner(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
    }
}
