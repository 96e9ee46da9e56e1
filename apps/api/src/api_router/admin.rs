use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, get};

use crate::handlers;
use crate::middleware::{self, RateLimitOptions, with_rate_limit};
use crate::state::AppState;

pub(super) fn build_admin_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(guarded_route(
            app_state,
            "/api/admin/rate-limiting",
            get(handlers::rate_limiting::rate_limiting_dashboard_handler)
                .post(handlers::rate_limiting::rate_limiting_action_handler),
        ))
        .merge(guarded_route(
            app_state,
            "/api/admin/request-logs",
            get(handlers::request_logs::list_request_logs_handler),
        ))
        .merge(guarded_route(
            app_state,
            "/api/admin/endpoint-status",
            get(handlers::endpoint_status::list_endpoint_statuses_handler)
                .post(handlers::endpoint_status::update_endpoint_status_handler),
        ))
        .merge(guarded_route(
            app_state,
            "/api/admin/system-logs",
            get(handlers::system_logs::list_system_logs_handler)
                .post(handlers::system_logs::create_system_log_handler)
                .delete(handlers::system_logs::clear_system_logs_handler),
        ))
}

/// Admin check runs inside the interceptor so refused calls are logged too.
fn guarded_route(
    app_state: &AppState,
    path: &str,
    method_router: MethodRouter<AppState>,
) -> Router<AppState> {
    let router = Router::new()
        .route(path, method_router)
        .route_layer(from_fn_with_state(app_state.clone(), middleware::require_admin));

    with_rate_limit(
        router,
        app_state.traffic_guard.clone(),
        path,
        RateLimitOptions::default(),
    )
}
