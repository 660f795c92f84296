use crate::error::ApiError;
use crate::state::AppState;
use application_form::{parse_application_id, FormError};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route(
            "/api/applications/download/:application_id",
            get(download_application),
        )
        .with_state(state)
}

pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Render the filled form and send it as an attachment
pub async fn download_application(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_application_id(&application_id)?;

    let generator = state.generator.clone();
    let pdf = tokio::task::spawn_blocking(move || generator.generate(id))
        .await
        .map_err(|err| FormError::Internal(format!("render task failed: {err}")))??;

    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", pdf.filename))
        .map_err(|err| FormError::Internal(format!("invalid download filename: {err}")))?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
        (header::CONTENT_DISPOSITION, disposition),
        (header::CONTENT_LENGTH, HeaderValue::from(pdf.bytes.len())),
    ];

    Ok((StatusCode::OK, headers, pdf.bytes).into_response())
}
