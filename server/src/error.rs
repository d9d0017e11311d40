use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("place store unavailable: {0}")]
    Repository(StoreError),

    #[error("auth service error: {0}")]
    Auth(StoreError),

    #[error("{0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Repository { .. } | AppError::Auth { .. } => StatusCode::BAD_GATEWAY,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}
