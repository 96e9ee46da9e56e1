mod rate_limit;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use taskdeck_core::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

pub use rate_limit::{RateLimitOptions, with_rate_limit};

/// Admits admin and superadmin callers, exposing their identity to handlers.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers()).map(ToOwned::to_owned);
    let identity = state
        .traffic_guard
        .identify(token.as_deref())
        .await
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    if !identity.role().is_admin() {
        return Err(AppError::Forbidden("admin access required".to_owned()).into());
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Returns the credentials of an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
