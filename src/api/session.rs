//! Session endpoints
//!
//! Each action runs to completion and answers with the resulting
//! snapshot. Failures of the action itself are part of the snapshot
//! (`error`), not HTTP errors.

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};

use super::dto::{LanguageRequest, LanguageResponse, SubmitRequest};
use crate::AppState;
use crate::data::LanguageCode;
use crate::error::AppError;
use crate::metrics::HTTP_REQUESTS_TOTAL;
use crate::service::SessionView;

/// Create session router
///
/// Routes:
/// - GET  /languages
/// - GET  /session
/// - POST /session/submit
/// - POST /session/language
/// - POST /session/regenerate
/// - POST /session/reset
pub fn session_router() -> Router<AppState> {
    Router::new()
        .route("/languages", get(languages))
        .route("/session", get(session))
        .route("/session/submit", post(submit))
        .route("/session/language", post(change_language))
        .route("/session/regenerate", post(regenerate))
        .route("/session/reset", post(reset))
}

fn record(method: &str, endpoint: &str) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, "200"])
        .inc();
}

/// Unwrap a JSON body, reporting a malformed one as a validation error
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// GET /api/languages
async fn languages() -> Json<Vec<LanguageResponse>> {
    record("GET", "/api/languages");
    Json(LanguageCode::ALL.into_iter().map(Into::into).collect())
}

/// GET /api/session
async fn session(State(state): State<AppState>) -> Json<SessionView> {
    record("GET", "/api/session");
    Json(state.session.view().await)
}

/// POST /api/session/submit
async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let request = body(payload)?;
    let view = state.session.submit(&request.url).await;
    record("POST", "/api/session/submit");
    Ok(Json(view))
}

/// POST /api/session/language
async fn change_language(
    State(state): State<AppState>,
    payload: Result<Json<LanguageRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let language: LanguageCode = body(payload)?.language.parse()?;
    let view = state.session.change_language(language).await;
    record("POST", "/api/session/language");
    Ok(Json(view))
}

/// POST /api/session/regenerate
async fn regenerate(State(state): State<AppState>) -> Json<SessionView> {
    let view = state.session.regenerate().await;
    record("POST", "/api/session/regenerate");
    Json(view)
}

/// POST /api/session/reset
async fn reset(State(state): State<AppState>) -> Json<SessionView> {
    let view = state.session.reset().await;
    record("POST", "/api/session/reset");
    Json(view)
}
