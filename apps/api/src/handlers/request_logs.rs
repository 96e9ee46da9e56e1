use axum::Json;
use axum::extract::{Query, State};
use taskdeck_domain::RequestLogFilter;

use crate::dto::{DataResponse, RequestLogEntryResponse, RequestLogQuery};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_REQUEST_LOG_LIMIT: usize = 100;

pub async fn list_request_logs_handler(
    State(state): State<AppState>,
    Query(query): Query<RequestLogQuery>,
) -> ApiResult<Json<DataResponse<Vec<RequestLogEntryResponse>>>> {
    let mut filter = RequestLogFilter::from(query);
    filter.limit = filter.limit.or(Some(DEFAULT_REQUEST_LOG_LIMIT));

    let entries = state.traffic_guard.request_logs().query(&filter).await?;

    Ok(Json(DataResponse::new(
        entries
            .into_iter()
            .map(RequestLogEntryResponse::from)
            .collect(),
    )))
}
