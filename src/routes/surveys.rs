use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::database::SurveyRepository;
use crate::dto::survey_dto::{
    CreateSurveyPayload, SubmitResponsePayload, SubmitResponseResponse, SurveyListResponse,
    SurveyResultsResponse, SurveyView,
};
use crate::error::{Error, Result};
use crate::services::access_control::{Action, Identity};
use crate::routes::extract::AppJson;
use crate::utils::code::is_valid_code;
use crate::AppState;

pub async fn create_survey<R: SurveyRepository>(
    State(state): State<AppState<R>>,
    Extension(identity): Extension<Identity>,
    AppJson(payload): AppJson<CreateSurveyPayload>,
) -> Result<impl IntoResponse> {
    state.access.authorize(&identity, Action::CreateSurvey)?;
    payload.validate()?;

    let (title, questions) = payload.into_parts();
    let survey = state
        .survey_service
        .create(identity.user_id, title, questions)
        .await?;

    let response = json!({
        "success": true,
        "message": "Survey created successfully",
        "survey": SurveyView::from(&survey),
    });
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_my_surveys<R: SurveyRepository>(
    State(state): State<AppState<R>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    state.access.authorize(&identity, Action::ListSurveys)?;
    let surveys = state.survey_service.list_by_owner(identity.user_id).await?;
    let surveys: Vec<SurveyView> = surveys.iter().map(SurveyView::from).collect();
    Ok(Json(SurveyListResponse {
        success: true,
        total: surveys.len(),
        surveys,
    }))
}

/// Public lookup. Accepts a survey id or a student code.
pub async fn get_survey<R: SurveyRepository>(
    State(state): State<AppState<R>>,
    Path(identifier): Path<String>,
) -> Result<impl IntoResponse> {
    if Uuid::parse_str(&identifier).is_err() && !is_valid_code(&identifier) {
        return Err(Error::NotFound("Survey not found".to_string()));
    }
    let survey = state.survey_service.find_by_id_or_code(&identifier).await?;
    Ok(Json(json!({
        "success": true,
        "survey": SurveyView::from(&survey),
    })))
}

pub async fn submit_response<R: SurveyRepository>(
    State(state): State<AppState<R>>,
    Path(code): Path<String>,
    AppJson(payload): AppJson<SubmitResponsePayload>,
) -> Result<impl IntoResponse> {
    if !is_valid_code(&code) {
        return Err(Error::NotFound("Survey not found".to_string()));
    }
    payload.validate()?;

    let response = state
        .survey_service
        .submit_response(&code, &payload.respondent_name, payload.answers)
        .await?;
    Ok(Json(SubmitResponseResponse::from(&response)))
}

pub async fn get_results<R: SurveyRepository>(
    State(state): State<AppState<R>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.access.authorize(&identity, Action::ViewResults)?;
    let id = parse_survey_id(&id)?;
    let results = state.survey_service.results(id, identity.user_id).await?;
    Ok(Json(json!({
        "success": true,
        "results": SurveyResultsResponse::from(results),
    })))
}

pub async fn delete_survey<R: SurveyRepository>(
    State(state): State<AppState<R>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.access.authorize(&identity, Action::DeleteSurvey)?;
    let id = parse_survey_id(&id)?;
    state.survey_service.delete(id, identity.user_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Survey deleted successfully",
    })))
}

// Anything that is not a UUID cannot name a stored survey.
fn parse_survey_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::NotFound("Survey not found".to_string()))
}
