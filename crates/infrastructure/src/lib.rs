//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod clock;
mod in_memory_endpoint_status_repository;
mod in_memory_rate_limit_repository;
mod in_memory_request_log_repository;
mod in_memory_system_log_repository;
mod jwt_identity_verifier;

pub use clock::{ManualClock, SystemClock};
pub use in_memory_endpoint_status_repository::InMemoryEndpointStatusRepository;
pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
pub use in_memory_request_log_repository::InMemoryRequestLogRepository;
pub use in_memory_system_log_repository::InMemorySystemLogRepository;
pub use jwt_identity_verifier::{JwtIdentityVerifier, MIN_JWT_SECRET_LEN};
