use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codeforces_wrapped_libs::{
    api::ErrorResponse, codeforces::CodeforcesError, stats::StatsError, WrappedError,
};
use std::any::Any;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to fetch data from Codeforces API")]
    UpstreamFailure(#[from] CodeforcesError),
    #[error("{0}")]
    Computation(#[from] StatsError),
    #[error("Too many requests")]
    RateLimited,
    #[error("Not found")]
    NotFound,
    #[error("An unexpected error occurred")]
    Unexpected(#[from] anyhow::Error),
}

impl From<WrappedError> for AppError {
    fn from(value: WrappedError) -> Self {
        match value {
            WrappedError::UpstreamFailure(e) => AppError::UpstreamFailure(e),
            WrappedError::ComputationError(e) => AppError::Computation(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::UpstreamFailure(_) | AppError::Computation(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(message) => tracing::warn!("Validation error: {}", message),
            AppError::RateLimited => tracing::warn!("rate limit exceeded"),
            AppError::NotFound => {}
            AppError::UpstreamFailure(e) => tracing::error!("request failed cause: {:?}", e),
            AppError::Computation(e) => tracing::error!("computation failed cause: {:?}", e),
            AppError::Unexpected(e) => tracing::error!("an unexpected error occurred: {:?}", e),
        }

        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Turns a panic inside a handler into the generic 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        String::from("unknown panic")
    };

    AppError::Unexpected(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}
