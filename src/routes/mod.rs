// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: Main router assembly and middleware
// - purge.rs: Sponsored sweep endpoint (full relay pipeline)
// - analyze.rs: Gatekeeper dry-run endpoint
// - health.rs: Health, status and metrics endpoints
// - middleware.rs: Request logging, security headers
//
// ============================================================================

mod analyze;
mod health;
mod middleware;
mod purge;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    Router::new()
        // Health and monitoring
        .route("/health", get(health::health_check))
        .route("/status", get(health::status))
        .route("/metrics", get(health::metrics))
        // Relay
        .route("/purge", post(purge::purge))
        .route("/analyze", post(analyze::analyze))
        // Apply middleware (order matters - last added runs first)
        .layer(
            ServiceBuilder::new()
                // Tracing layer (outermost - runs first)
                .layer(TraceLayer::new_for_http())
                // Request logging
                .layer(axum::middleware::from_fn(
                    crate::routes::middleware::request_logging,
                ))
                // Security headers
                .layer(axum::middleware::from_fn(
                    crate::routes::middleware::add_security_headers,
                ))
                .into_inner(),
        )
        .with_state(app_context)
}
