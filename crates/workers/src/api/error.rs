use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::store::ConfigError;

#[derive(Debug)]
pub struct ApiError(pub ConfigError);

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ConfigError::Duplicate { .. } => StatusCode::CONFLICT,
            ConfigError::NotFound(_) => StatusCode::NOT_FOUND,
            ConfigError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ConfigError::MissingName
            | ConfigError::InvalidTopic(_)
            | ConfigError::InvalidRule(_)
            | ConfigError::NoActions => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}
