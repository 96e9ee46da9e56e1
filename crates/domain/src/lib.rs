//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod endpoint_status;
mod rate_limit;
mod rate_limit_key;
mod request_log;
mod system_log;

pub use endpoint_status::{
    EndpointAvailability, EndpointRoute, EndpointStatusEntry, EndpointStatusUpdate,
};
pub use rate_limit::{
    DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MS, RateLimitConfig, RateLimitDecision, RateLimitEntry,
    STALE_ENTRY_GRACE_MS, WindowEvaluation, evaluate_window,
};
pub use rate_limit_key::RateLimitKey;
pub use request_log::{
    DEFAULT_REQUEST_LOG_CAPACITY, NewRequestLogEntry, RequestCompletion, RequestLogEntry,
    RequestLogFilter, RequestLogId,
};
pub use system_log::{DEFAULT_SYSTEM_LOG_CAPACITY, LogLevel, SystemLogEntry, SystemLogQuery};
