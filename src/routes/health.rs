// ============================================================================
// Health, Status and Metrics Routes
// ============================================================================
//
// Endpoints:
// - GET /health - Liveness (sponsor account reachable)
// - GET /status - Operator snapshot: nonce, balances, queue
// - GET /metrics - Prometheus metrics
//
// ============================================================================

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::context::AppContext;
use crate::health::{self, RelayerStatus};
use crate::metrics;

/// GET /health
/// 200 while the sponsor account can be read, 503 otherwise
pub async fn health_check(State(app_context): State<Arc<AppContext>>) -> impl IntoResponse {
    if let Err(e) = health::health_check(app_context.chain.as_ref()).await {
        tracing::error!(error = %e, "Health check failed");
        return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable");
    }
    (StatusCode::OK, "OK")
}

/// GET /status
pub async fn status(State(app_context): State<Arc<AppContext>>) -> Json<RelayerStatus> {
    let cached_responses = app_context.idempotency.len().await;
    let snapshot = health::relayer_status(
        app_context.chain.as_ref(),
        app_context.config.destination_chain_id,
        app_context.dispatch.status(),
        cached_responses,
    )
    .await;

    Json(snapshot)
}

/// GET /metrics
pub async fn metrics() -> Response {
    match metrics::gather_metrics() {
        Ok(metrics_data) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            metrics_data,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to gather metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
