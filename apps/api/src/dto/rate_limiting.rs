use serde::{Deserialize, Serialize};
use taskdeck_application::{
    EndpointRateLimit, MinuteTraffic, RateLimitStatus, TrafficAnalytics, TrafficCount,
    TrafficTotals,
};
use ts_rs::TS;

use super::RequestLogEntryResponse;

/// Query string of the rate limiting dashboard.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingQuery {
    pub time_window: Option<u64>,
}

/// Incoming admin action on an endpoint's rate limit.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rate-limit-action-request.ts"
)]
pub struct RateLimitActionRequest {
    pub endpoint: Option<String>,
    pub action: Option<String>,
    pub window_ms: Option<i64>,
    pub max_requests: Option<i64>,
}

/// Everything the rate limiting dashboard renders.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rate-limiting-dashboard-response.ts"
)]
pub struct RateLimitingDashboardResponse {
    pub analytics: TrafficAnalyticsResponse,
    pub statuses: Vec<RateLimitStatusResponse>,
    pub recent_logs: Vec<RequestLogEntryResponse>,
    pub configs: Vec<EndpointRateLimitResponse>,
    pub total_stats: TrafficTotalsResponse,
}

/// Aggregated request log analytics.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/traffic-analytics-response.ts"
)]
pub struct TrafficAnalyticsResponse {
    pub requests_per_minute: Vec<MinuteTrafficResponse>,
    pub top_endpoints: Vec<EndpointTrafficResponse>,
    #[serde(rename = "topIPs")]
    pub top_ips: Vec<IpTrafficResponse>,
    pub total_requests: usize,
    pub total_blocked: usize,
    pub average_response_time: u64,
}

/// One minute of traffic.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/minute-traffic-response.ts"
)]
pub struct MinuteTrafficResponse {
    pub timestamp: i64,
    pub count: usize,
    pub blocked: usize,
}

/// Traffic attributed to one endpoint.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/endpoint-traffic-response.ts"
)]
pub struct EndpointTrafficResponse {
    pub endpoint: String,
    pub count: usize,
    pub blocked: usize,
}

/// Traffic attributed to one client address.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ip-traffic-response.ts"
)]
pub struct IpTrafficResponse {
    pub ip: String,
    pub count: usize,
    pub blocked: usize,
}

/// Active window of a rate limit key.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rate-limit-status-response.ts"
)]
pub struct RateLimitStatusResponse {
    pub key: String,
    pub count: u32,
    pub remaining: u32,
    pub reset_time: i64,
    pub endpoint: String,
}

/// Explicit policy of an endpoint.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/endpoint-rate-limit-response.ts"
)]
pub struct EndpointRateLimitResponse {
    pub endpoint: String,
    pub window_ms: u64,
    pub max_requests: u32,
}

/// Limiter and request log totals.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/traffic-totals-response.ts"
)]
pub struct TrafficTotalsResponse {
    pub active_rate_limits: usize,
    pub total_endpoints: usize,
    pub total_requests: usize,
    pub configured_endpoints: Vec<EndpointRateLimitResponse>,
}

impl From<MinuteTraffic> for MinuteTrafficResponse {
    fn from(value: MinuteTraffic) -> Self {
        Self {
            timestamp: value.minute_start_ms,
            count: value.count,
            blocked: value.blocked,
        }
    }
}

impl From<TrafficCount> for EndpointTrafficResponse {
    fn from(value: TrafficCount) -> Self {
        Self {
            endpoint: value.name,
            count: value.count,
            blocked: value.blocked,
        }
    }
}

impl From<TrafficCount> for IpTrafficResponse {
    fn from(value: TrafficCount) -> Self {
        Self {
            ip: value.name,
            count: value.count,
            blocked: value.blocked,
        }
    }
}

impl From<TrafficAnalytics> for TrafficAnalyticsResponse {
    fn from(value: TrafficAnalytics) -> Self {
        Self {
            requests_per_minute: value
                .requests_per_minute
                .into_iter()
                .map(MinuteTrafficResponse::from)
                .collect(),
            top_endpoints: value
                .top_endpoints
                .into_iter()
                .map(EndpointTrafficResponse::from)
                .collect(),
            top_ips: value
                .top_ips
                .into_iter()
                .map(IpTrafficResponse::from)
                .collect(),
            total_requests: value.total_requests,
            total_blocked: value.total_blocked,
            average_response_time: value.average_response_time_ms,
        }
    }
}

impl From<RateLimitStatus> for RateLimitStatusResponse {
    fn from(value: RateLimitStatus) -> Self {
        Self {
            key: value.key.to_string(),
            count: value.count,
            remaining: value.remaining,
            reset_time: value.reset_at_ms,
            endpoint: value.endpoint,
        }
    }
}

impl From<EndpointRateLimit> for EndpointRateLimitResponse {
    fn from(value: EndpointRateLimit) -> Self {
        Self {
            endpoint: value.endpoint,
            window_ms: value.config.window_ms(),
            max_requests: value.config.max_requests(),
        }
    }
}

impl From<TrafficTotals> for TrafficTotalsResponse {
    fn from(value: TrafficTotals) -> Self {
        Self {
            active_rate_limits: value.active_rate_limits,
            total_endpoints: value.total_endpoints,
            total_requests: value.total_requests,
            configured_endpoints: value
                .configured_endpoints
                .into_iter()
                .map(EndpointRateLimitResponse::from)
                .collect(),
        }
    }
}
