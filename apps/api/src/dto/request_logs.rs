use serde::{Deserialize, Serialize};
use taskdeck_domain::{RequestLogEntry, RequestLogFilter};
use ts_rs::TS;

/// Query string of the request log listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogQuery {
    pub endpoint: Option<String>,
    pub ip: Option<String>,
    pub user_id: Option<String>,
    pub blocked: Option<bool>,
    pub since: Option<i64>,
    pub limit: Option<usize>,
}

impl From<RequestLogQuery> for RequestLogFilter {
    fn from(value: RequestLogQuery) -> Self {
        Self {
            endpoint: value.endpoint,
            ip: value.ip,
            user_id: value.user_id,
            blocked: value.blocked,
            since_ms: value.since,
            limit: value.limit,
        }
    }
}

/// API representation of an intercepted request.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/request-log-entry-response.ts"
)]
pub struct RequestLogEntryResponse {
    pub id: String,
    pub method: String,
    pub endpoint: String,
    pub ip: String,
    pub user_agent: Option<String>,
    pub user_id: Option<String>,
    pub timestamp: i64,
    pub response_time: Option<u64>,
    pub status_code: Option<u16>,
    pub blocked: bool,
    pub reason: Option<String>,
}

impl From<RequestLogEntry> for RequestLogEntryResponse {
    fn from(value: RequestLogEntry) -> Self {
        Self {
            id: value.id.to_string(),
            method: value.method,
            endpoint: value.endpoint,
            ip: value.client_ip,
            user_agent: value.user_agent,
            user_id: value.user_id,
            timestamp: value.timestamp_ms,
            response_time: value.response_time_ms,
            status_code: value.status_code,
            blocked: value.blocked,
            reason: value.reason,
        }
    }
}
