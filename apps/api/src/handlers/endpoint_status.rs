use std::str::FromStr;

use axum::extract::State;
use axum::{Extension, Json};
use taskdeck_application::SystemLogInput;
use taskdeck_core::{AppError, UserIdentity};
use taskdeck_domain::{EndpointAvailability, EndpointStatusUpdate, LogLevel};

use crate::dto::{
    DataResponse, EndpointStatusResponse, MessageResponse, UpdateEndpointStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_endpoint_statuses_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<EndpointStatusResponse>>>> {
    let records = state.traffic_guard.endpoint_statuses().list().await?;

    Ok(Json(DataResponse::new(
        records
            .into_iter()
            .map(EndpointStatusResponse::from)
            .collect(),
    )))
}

pub async fn update_endpoint_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<UpdateEndpointStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (Some(method), Some(path)) = (
        payload.method.filter(|value| !value.trim().is_empty()),
        payload.path.filter(|value| !value.trim().is_empty()),
    ) else {
        return Err(AppError::Validation("Method and path are required".to_owned()).into());
    };

    let update = EndpointStatusUpdate {
        status: payload
            .status
            .as_deref()
            .map(EndpointAvailability::from_str)
            .transpose()?,
        rate_limit: payload.rate_limit,
        requires_auth: payload.requires_auth,
    };

    let entry = state
        .traffic_guard
        .endpoint_statuses()
        .update(&method, &path, update)
        .await?;

    let message = format!("Endpoint {method} {path} status updated successfully");
    state
        .system_log_service
        .log(
            SystemLogInput::new(
                LogLevel::Info,
                format!("Endpoint {method} {path} set to {}", entry.status.as_str()),
                "admin.action",
            )
            .with_user(user.user_id()),
        )
        .await?;

    Ok(Json(MessageResponse::new(message)))
}
