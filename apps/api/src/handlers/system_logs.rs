use std::str::FromStr;

use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::DateTime;
use taskdeck_application::SystemLogInput;
use taskdeck_core::{AppError, UserIdentity, UserRole};
use taskdeck_domain::{LogLevel, SystemLogQuery};

use crate::dto::{
    CreateSystemLogRequest, DataResponse, MessageResponse, SystemLogQueryParams,
    SystemLogResponse, SystemLogsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_SYSTEM_LOG_LIMIT: usize = 50;
const DEFAULT_LOOKBACK_MS: i64 = 24 * 60 * 60 * 1_000;

pub async fn list_system_logs_handler(
    State(state): State<AppState>,
    Query(params): Query<SystemLogQueryParams>,
) -> ApiResult<Json<DataResponse<SystemLogsResponse>>> {
    let since_ms = match params.since.as_deref() {
        Some(since) => DateTime::parse_from_rfc3339(since)
            .map(|value| value.timestamp_millis())
            .map_err(|error| AppError::Validation(format!("invalid since: {error}")))?,
        None => state.traffic_guard.now_ms().saturating_sub(DEFAULT_LOOKBACK_MS),
    };

    let query = SystemLogQuery {
        level: params
            .level
            .as_deref()
            .map(LogLevel::from_str)
            .transpose()?,
        source: params.source,
        since_ms: Some(since_ms),
        limit: Some(params.limit.unwrap_or(DEFAULT_SYSTEM_LOG_LIMIT)),
    };

    let logs = state.system_log_service.list(&query).await?;
    let stats = state.system_log_service.stats(Some(since_ms)).await?;

    Ok(Json(DataResponse::new(SystemLogsResponse {
        logs: logs.into_iter().map(SystemLogResponse::from).collect(),
        stats: stats.into(),
    })))
}

pub async fn create_system_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateSystemLogRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (Some(level), Some(message), Some(source)) = (
        payload.level.filter(|value| !value.trim().is_empty()),
        payload.message.filter(|value| !value.trim().is_empty()),
        payload.source.filter(|value| !value.trim().is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Missing required fields: level, message, source".to_owned(),
        )
        .into());
    };

    let mut input =
        SystemLogInput::new(LogLevel::from_str(&level)?, message, source).with_user(user.user_id());
    if let Some(metadata) = payload.metadata {
        input = input.with_metadata(metadata);
    }

    state.system_log_service.log(input).await?;

    Ok(Json(MessageResponse::new("Log entry created successfully")))
}

pub async fn clear_system_logs_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<MessageResponse>> {
    if user.role() != UserRole::Superadmin {
        return Err(
            AppError::Forbidden("Only superadmin can clear system logs".to_owned()).into(),
        );
    }

    state.system_log_service.clear().await?;

    let actor = user.email().unwrap_or(user.user_id());
    state
        .system_log_service
        .log(
            SystemLogInput::new(
                LogLevel::Info,
                format!("System logs cleared by {actor}"),
                "admin.action",
            )
            .with_user(user.user_id()),
        )
        .await?;

    Ok(Json(MessageResponse::new("System logs cleared successfully")))
}
