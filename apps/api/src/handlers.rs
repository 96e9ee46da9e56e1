pub mod endpoint_status;
pub mod health;
pub mod rate_limiting;
pub mod request_logs;
pub mod system_logs;
