//! Taskdeck API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use taskdeck_application::{
    Clock, EndpointStatusService, RateLimitService, RequestLogService, SystemLogService,
    TrafficGuard,
};
use taskdeck_core::AppError;
use taskdeck_infrastructure::{
    InMemoryEndpointStatusRepository, InMemoryRateLimitRepository, InMemoryRequestLogRepository,
    InMemorySystemLogRepository, JwtIdentityVerifier, SystemClock,
};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let system_log_service = SystemLogService::new(
        Arc::new(InMemorySystemLogRepository::with_capacity(
            config.system_log_capacity,
        )?),
        clock.clone(),
    );
    system_log_service.record_startup().await?;

    let rate_limits = RateLimitService::new(
        Arc::new(InMemoryRateLimitRepository::new()),
        clock.clone(),
    )
    .with_default_config(config.default_rate_limit);
    rate_limits.apply_default_configs().await?;

    let request_logs = RequestLogService::new(
        Arc::new(InMemoryRequestLogRepository::with_capacity(
            config.request_log_capacity,
        )?),
        clock.clone(),
    );
    let endpoint_statuses =
        EndpointStatusService::new(Arc::new(InMemoryEndpointStatusRepository::seeded()?));

    let traffic_guard = TrafficGuard::new(rate_limits, request_logs, endpoint_statuses, clock)
        .with_identity_verifier(Arc::new(JwtIdentityVerifier::new(&config.jwt_secret)?));

    let app_state = AppState {
        traffic_guard,
        system_log_service,
    };
    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, "taskdeck-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("API server failed: {error}")))
}
