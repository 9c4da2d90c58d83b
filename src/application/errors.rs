use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info};

use crate::domain::RepositoryError;

/// Body sent for every server-side failure. Callers cannot tell which stage
/// failed.
pub const SERVER_ERROR_BODY: &str = "Something went wrong!";
pub const NOT_FOUND_BODY: &str = "Not found";

#[derive(Debug, Error)]
pub enum AppError {
    /// The completion or image-generation API failed or returned nothing usable.
    #[error("upstream failure: {0}")]
    Upstream(String),
    /// Fetching the generated image's bytes failed.
    #[error("download failure: {0}")]
    Download(String),
    /// The store rejected or could not complete the write or read.
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("not found")]
    NotFound,
}

impl AppError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound,
            other => AppError::persistence(other.to_string()),
        }
    }
}

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream(_) | AppError::Download(_) | AppError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            AppError::NotFound => {
                info!("requested image not found");
                (status, NOT_FOUND_BODY).into_response()
            }
            err => {
                error!(error = %err, "request failed");
                (status, SERVER_ERROR_BODY).into_response()
            }
        }
    }
}
