use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use weather_core::AppError;

use crate::render;

/// The single place where workflow failures become HTTP responses.
#[derive(Debug)]
pub struct ErrorPage {
    pub status_code: StatusCode,
    pub message: String,
}

impl ErrorPage {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("No page at {path}."))
    }
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::CapacityExceeded | AppError::Duplicate(_) => StatusCode::CONFLICT,
        AppError::InvalidExternalId(_) => StatusCode::BAD_REQUEST,
        AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AppError> for ErrorPage {
    fn from(err: AppError) -> Self {
        let status_code = status_for(&err);
        let detail = err.detail().unwrap_or_default();

        if err.is_user_error() {
            tracing::info!(status = %status_code, %detail, "{err}");
        } else {
            tracing::warn!(status = %status_code, %detail, "{err}");
        }

        Self::new(status_code, err.to_string())
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (self.status_code, Html(render::error_page(&self.message))).into_response()
    }
}

pub type PageResult<T> = Result<T, ErrorPage>;
