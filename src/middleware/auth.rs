use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::database::SurveyRepository;
use crate::AppState;

/// Resolves the bearer token to an `Identity` and stores it in the request
/// extensions. Role checks happen per action in the handlers.
pub async fn require_bearer_auth<R: SurveyRepository>(
    State(state): State<AppState<R>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    match state.access.authenticate(token.trim()) {
        Ok(identity) => {
            tracing::debug!(
                user_id = %identity.user_id,
                role = identity.role.as_str(),
                "caller authenticated"
            );
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
