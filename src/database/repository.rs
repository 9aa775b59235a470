use std::future::Future;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Response, Survey};

/// Durable home of survey aggregates.
///
/// Surveys are written once by `insert` and afterwards only grow through
/// `append_response`, which must never lose a concurrent submission.
pub trait SurveyRepository: Clone + Send + Sync + 'static {
    /// Stores a new survey. Fails with `Error::Conflict` when the code is
    /// already taken.
    fn insert(&self, survey: &Survey) -> impl Future<Output = Result<()>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<Survey>>> + Send;

    /// Exact, case-sensitive match on the stored code.
    fn find_by_code(&self, code: &str) -> impl Future<Output = Result<Option<Survey>>> + Send;

    fn exists_by_code(&self, code: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Surveys of one owner, oldest first.
    fn find_all_by_owner(&self, owner_id: Uuid)
        -> impl Future<Output = Result<Vec<Survey>>> + Send;

    /// Returns false when the survey no longer exists.
    fn append_response(
        &self,
        survey_id: Uuid,
        response: &Response,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Removes the survey and its responses. Returns false when nothing was
    /// deleted.
    fn delete_by_id(&self, id: Uuid) -> impl Future<Output = Result<bool>> + Send;

    fn health_check(&self) -> impl Future<Output = Result<()>> + Send;
}
