//! Application services and ports.

#![forbid(unsafe_code)]

mod endpoint_status_service;
mod rate_limit_service;
mod request_log_service;
mod system_log_service;
mod traffic_analytics_service;
mod traffic_guard;
mod traffic_ports;

#[cfg(test)]
mod test_support;

pub use endpoint_status_service::EndpointStatusService;
pub use rate_limit_service::{RateLimitService, RateLimitStatus};
pub use request_log_service::RequestLogService;
pub use system_log_service::{
    SystemLogActivity, SystemLogInput, SystemLogService, SystemLogStats,
};
pub use traffic_analytics_service::{
    DEFAULT_ANALYTICS_WINDOW_MS, MinuteTraffic, TrafficAnalytics, TrafficAnalyticsService,
    TrafficCount,
};
pub use traffic_guard::{TrafficGuard, TrafficTotals};
pub use traffic_ports::{
    Clock, EndpointRateLimit, EndpointStatusRecord, EndpointStatusRepository, IdentityVerifier,
    RateLimitRepository, RequestLogRepository, SystemLogRepository, TrackedRateLimit,
};
