mod common;
mod endpoint_status;
mod rate_limit_exceeded;
mod rate_limiting;
mod request_logs;
mod system_logs;

pub use common::{DataResponse, HealthResponse, MessageResponse};
pub use endpoint_status::{
    EndpointStatusResponse, EndpointUnavailableResponse, UpdateEndpointStatusRequest,
};
pub use rate_limit_exceeded::RateLimitExceededResponse;
pub use rate_limiting::{
    EndpointRateLimitResponse, RateLimitActionRequest, RateLimitStatusResponse,
    RateLimitingDashboardResponse, RateLimitingQuery,
};
pub use request_logs::{RequestLogEntryResponse, RequestLogQuery};
pub use system_logs::{
    CreateSystemLogRequest, SystemLogQueryParams, SystemLogResponse, SystemLogsResponse,
};
