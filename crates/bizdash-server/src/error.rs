use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bizdash_core::error::DashError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<DashError>() {
            Some(e) => match e {
                DashError::NotFound { .. } => StatusCode::NOT_FOUND,
                DashError::Invalid { .. }
                | DashError::InvalidWeek(_)
                | DashError::InvalidQuarter(_)
                | DashError::InvalidMonth { .. }
                | DashError::UnknownVariant { .. } => StatusCode::BAD_REQUEST,
                DashError::Backend { .. } | DashError::MalformedRow(_) | DashError::Http(_) => {
                    StatusCode::BAD_GATEWAY
                }
                DashError::ConfigExists(_) => StatusCode::CONFLICT,
                DashError::ConfigMissing(_)
                | DashError::HomeNotFound
                | DashError::Io(_)
                | DashError::Yaml(_)
                | DashError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
