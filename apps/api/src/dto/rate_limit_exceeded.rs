use serde::Serialize;
use ts_rs::TS;

/// Body returned when a caller has spent its request budget.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rate-limit-exceeded-response.ts"
)]
pub struct RateLimitExceededResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    pub retry_after: u64,
}
