use application_form::FormError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// A failed request, rendered as `{"status":"error","message":...}`
#[derive(Debug)]
pub struct ApiError(pub FormError);

impl From<FormError> for ApiError {
    fn from(value: FormError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            FormError::BadRequest(message) | FormError::NotFound(message) => {
                tracing::info!(%status, %message, "request rejected");
                message.clone()
            }
            other => {
                tracing::error!(%status, error = %other, "request failed");
                "Failed to generate application form".to_string()
            }
        };

        let body = Json(json!({ "status": "error", "message": message }));
        (status, body).into_response()
    }
}
