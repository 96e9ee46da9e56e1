use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskdeck_application::{SystemLogActivity, SystemLogStats};
use taskdeck_domain::SystemLogEntry;
use ts_rs::TS;

use super::common::iso_timestamp;

/// Query string of the system log listing.
#[derive(Debug, Default, Deserialize)]
pub struct SystemLogQueryParams {
    pub level: Option<String>,
    pub source: Option<String>,
    pub limit: Option<usize>,
    pub since: Option<String>,
}

/// Incoming custom system log entry.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-system-log-request.ts"
)]
pub struct CreateSystemLogRequest {
    pub level: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub metadata: Option<Value>,
}

/// API representation of a system log entry.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/system-log-response.ts"
)]
pub struct SystemLogResponse {
    pub id: String,
    pub timestamp: String,
    pub level: String,
    pub message: String,
    pub source: String,
    pub user_id: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub metadata: Option<Value>,
}

impl From<SystemLogEntry> for SystemLogResponse {
    fn from(value: SystemLogEntry) -> Self {
        Self {
            id: value.id.to_string(),
            timestamp: iso_timestamp(value.timestamp_ms),
            level: value.level.as_str().to_owned(),
            message: value.message,
            source: value.source,
            user_id: value.user_id,
            metadata: value.metadata,
        }
    }
}

/// Condensed recent system log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/system-log-activity-response.ts"
)]
pub struct SystemLogActivityResponse {
    pub timestamp: String,
    pub message: String,
    pub level: String,
}

impl From<SystemLogActivity> for SystemLogActivityResponse {
    fn from(value: SystemLogActivity) -> Self {
        Self {
            timestamp: iso_timestamp(value.timestamp_ms),
            message: value.message,
            level: value.level.as_str().to_owned(),
        }
    }
}

/// System log summary.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/system-log-stats-response.ts"
)]
pub struct SystemLogStatsResponse {
    pub total: usize,
    pub by_level: BTreeMap<String, usize>,
    pub recent_activity: Vec<SystemLogActivityResponse>,
}

impl From<SystemLogStats> for SystemLogStatsResponse {
    fn from(value: SystemLogStats) -> Self {
        Self {
            total: value.total,
            by_level: value
                .by_level
                .into_iter()
                .map(|(level, count)| (level.as_str().to_owned(), count))
                .collect(),
            recent_activity: value
                .recent_activity
                .into_iter()
                .map(SystemLogActivityResponse::from)
                .collect(),
        }
    }
}

/// System log listing with its summary.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/system-logs-response.ts"
)]
pub struct SystemLogsResponse {
    pub logs: Vec<SystemLogResponse>,
    pub stats: SystemLogStatsResponse,
}
