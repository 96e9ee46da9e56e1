mod admin;
mod cors;

use axum::Router;
use axum::routing::get;
use taskdeck_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(admin::build_admin_routes(&app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
