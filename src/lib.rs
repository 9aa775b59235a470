pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::SurveySettings;
use crate::database::{PgSurveyRepository, SurveyRepository};
use crate::services::{access_control::AccessControl, survey_service::SurveyService};

#[derive(Clone)]
pub struct AppState<R: SurveyRepository = PgSurveyRepository> {
    pub survey_service: SurveyService<R>,
    pub access: Arc<dyn AccessControl>,
}

impl<R: SurveyRepository> AppState<R> {
    pub fn new(repo: R, access: Arc<dyn AccessControl>, settings: SurveySettings) -> Self {
        Self {
            survey_service: SurveyService::new(repo, settings),
            access,
        }
    }

    pub fn with_service(survey_service: SurveyService<R>, access: Arc<dyn AccessControl>) -> Self {
        Self {
            survey_service,
            access,
        }
    }
}
