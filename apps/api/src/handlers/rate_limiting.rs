use axum::extract::{Query, State};
use axum::{Extension, Json};
use taskdeck_application::{DEFAULT_ANALYTICS_WINDOW_MS, SystemLogInput};
use taskdeck_core::{AppError, UserIdentity};
use taskdeck_domain::{LogLevel, RateLimitConfig, RequestLogFilter};

use crate::dto::{
    DataResponse, EndpointRateLimitResponse, MessageResponse, RateLimitActionRequest,
    RateLimitStatusResponse, RateLimitingDashboardResponse, RateLimitingQuery,
    RequestLogEntryResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

const RECENT_LOG_LIMIT: usize = 50;

pub async fn rate_limiting_dashboard_handler(
    State(state): State<AppState>,
    Query(query): Query<RateLimitingQuery>,
) -> ApiResult<Json<DataResponse<RateLimitingDashboardResponse>>> {
    let guard = &state.traffic_guard;
    let window_ms = query.time_window.unwrap_or(DEFAULT_ANALYTICS_WINDOW_MS);

    let analytics = guard.analytics().get_analytics(window_ms).await?;
    let statuses = guard.rate_limits().current_status().await?;
    let recent_logs = guard
        .request_logs()
        .query(&RequestLogFilter {
            limit: Some(RECENT_LOG_LIMIT),
            ..RequestLogFilter::default()
        })
        .await?;
    let configs = guard.rate_limits().list_configs().await?;
    let total_stats = guard.total_stats().await?;

    Ok(Json(DataResponse::new(RateLimitingDashboardResponse {
        analytics: analytics.into(),
        statuses: statuses
            .into_iter()
            .map(RateLimitStatusResponse::from)
            .collect(),
        recent_logs: recent_logs
            .into_iter()
            .map(RequestLogEntryResponse::from)
            .collect(),
        configs: configs
            .into_iter()
            .map(EndpointRateLimitResponse::from)
            .collect(),
        total_stats: total_stats.into(),
    })))
}

pub async fn rate_limiting_action_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RateLimitActionRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let endpoint = payload
        .endpoint
        .filter(|endpoint| !endpoint.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Endpoint is required".to_owned()))?;
    let rate_limits = state.traffic_guard.rate_limits();

    let message = match payload.action.as_deref() {
        Some("updateConfig") => {
            let (Some(window_ms), Some(max_requests)) = (payload.window_ms, payload.max_requests)
            else {
                return Err(AppError::Validation(
                    "windowMs and maxRequests are required for updateConfig".to_owned(),
                )
                .into());
            };

            let config = RateLimitConfig::from_signed(window_ms, max_requests)?;
            rate_limits
                .set_config(&endpoint, config.window_ms(), config.max_requests())
                .await?;
            format!("Rate limit configuration updated for {endpoint}")
        }
        Some("resetLimits") => {
            rate_limits.reset_limits(&endpoint).await?;
            format!("Rate limits reset for {endpoint}")
        }
        _ => {
            return Err(AppError::Validation(
                "Invalid action. Supported actions: updateConfig, resetLimits".to_owned(),
            )
            .into());
        }
    };

    state
        .system_log_service
        .log(
            SystemLogInput::new(LogLevel::Info, message.clone(), "admin.action")
                .with_user(user.user_id()),
        )
        .await?;

    Ok(Json(MessageResponse::new(message)))
}
