use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::SurveyRepository;
use crate::error::{Error, Result};
use crate::models::{Response, Survey};

/// Process-local store. Every write happens under one lock, which gives the
/// same guarantees as the unique index and row inserts of the Postgres store.
#[derive(Clone, Default)]
pub struct MemorySurveyRepository {
    surveys: Arc<RwLock<Vec<Survey>>>,
}

impl MemorySurveyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.surveys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.surveys.read().await.is_empty()
    }
}

impl SurveyRepository for MemorySurveyRepository {
    async fn insert(&self, survey: &Survey) -> Result<()> {
        let mut guard = self.surveys.write().await;
        if guard.iter().any(|s| s.code == survey.code) {
            return Err(Error::Conflict(format!(
                "survey code {} is already in use",
                survey.code
            )));
        }
        if guard.iter().any(|s| s.id == survey.id) {
            return Err(Error::Conflict(format!("survey {} already exists", survey.id)));
        }
        guard.push(survey.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Survey>> {
        let guard = self.surveys.read().await;
        Ok(guard.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Survey>> {
        let guard = self.surveys.read().await;
        Ok(guard.iter().find(|s| s.code == code).cloned())
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool> {
        let guard = self.surveys.read().await;
        Ok(guard.iter().any(|s| s.code == code))
    }

    async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Survey>> {
        let guard = self.surveys.read().await;
        Ok(guard
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn append_response(&self, survey_id: Uuid, response: &Response) -> Result<bool> {
        let mut guard = self.surveys.write().await;
        match guard.iter_mut().find(|s| s.id == survey_id) {
            Some(survey) => {
                survey.responses.push(response.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let mut guard = self.surveys.write().await;
        let before = guard.len();
        guard.retain(|s| s.id != id);
        Ok(guard.len() != before)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewQuestion;

    fn survey(code: &str, owner: Uuid) -> Survey {
        Survey::new(
            "Quiz",
            owner,
            vec![NewQuestion::new("Q1", vec!["a".into(), "b".into()])],
            code.to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_code_is_a_conflict() {
        let repo = MemorySurveyRepository::new();
        let owner = Uuid::new_v4();
        repo.insert(&survey("100001", owner)).await.unwrap();

        let err = repo.insert(&survey("100001", owner)).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn code_lookup_is_exact() {
        let repo = MemorySurveyRepository::new();
        repo.insert(&survey("100002", Uuid::new_v4())).await.unwrap();

        assert!(repo.find_by_code("100002").await.unwrap().is_some());
        assert!(repo.find_by_code("10000").await.unwrap().is_none());
        assert!(repo.find_by_code(" 100002").await.unwrap().is_none());
        assert!(repo.exists_by_code("100002").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let repo = MemorySurveyRepository::new();
        let s = survey("100003", Uuid::new_v4());
        repo.insert(&s).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..50 {
            let repo = repo.clone();
            let id = s.id;
            handles.push(tokio::spawn(async move {
                let resp = Response::new(format!("student {}", i), vec!["a".into()]);
                repo.append_response(id, &resp).await
            }));
        }
        for h in handles {
            assert!(h.await.unwrap().unwrap());
        }

        let stored = repo.find_by_id(s.id).await.unwrap().unwrap();
        assert_eq!(stored.responses.len(), 50);
    }

    #[tokio::test]
    async fn delete_and_append_to_missing_survey() {
        let repo = MemorySurveyRepository::new();
        let s = survey("100004", Uuid::new_v4());
        repo.insert(&s).await.unwrap();

        assert!(repo.delete_by_id(s.id).await.unwrap());
        assert!(!repo.delete_by_id(s.id).await.unwrap());
        let resp = Response::new("late", vec!["a".into()]);
        assert!(!repo.append_response(s.id, &resp).await.unwrap());
        assert!(repo.is_empty().await);
        tokio_test::assert_ok!(repo.health_check().await);
    }
}
