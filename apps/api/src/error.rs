use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taskdeck_core::AppError;
use tracing::error;

mod types;

pub use types::{ErrorResponse, HandlerFailure};

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) | AppError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        let mut response = (status, Json(ErrorResponse::new(message.clone()))).into_response();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(%message, "request failed");
            response.extensions_mut().insert(HandlerFailure(message));
        }

        response
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
