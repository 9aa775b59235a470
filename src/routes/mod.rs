pub mod extract;
pub mod health;
pub mod surveys;

use std::time::Duration;

use axum::{
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::database::SurveyRepository;
use crate::middleware::auth::require_bearer_auth;
use crate::AppState;

/// Full HTTP surface: public lookup and submission, teacher-only management.
pub fn router<R: SurveyRepository>(state: AppState<R>, request_timeout: Duration) -> Router {
    let base_routes = Router::new().route("/health", get(health::health::<R>));

    // auth wraps individual handlers so unknown methods still get a 405
    let auth = from_fn_with_state(state.clone(), require_bearer_auth::<R>);

    let survey_api = Router::new()
        .route(
            "/api/surveys",
            get(surveys::list_my_surveys::<R>.layer(auth.clone()))
                .post(surveys::create_survey::<R>.layer(auth.clone())),
        )
        .route(
            "/api/surveys/:id",
            get(surveys::get_survey::<R>)
                .delete(surveys::delete_survey::<R>.layer(auth.clone())),
        )
        .route("/api/surveys/:id/submit", post(surveys::submit_response::<R>))
        .route(
            "/api/surveys/:id/results",
            get(surveys::get_results::<R>.layer(auth)),
        );

    base_routes
        .merge(survey_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
