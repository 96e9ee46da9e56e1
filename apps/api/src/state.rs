use taskdeck_application::{SystemLogService, TrafficGuard};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub traffic_guard: TrafficGuard,
    pub system_log_service: SystemLogService,
}
