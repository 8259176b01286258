// ============================================================================
// Analyze Route
// ============================================================================
//
// Endpoints:
// - POST /analyze - Run the gatekeeper over client-priced candidates
//
// Nothing is dispatched; the decision is returned as-is.
// ============================================================================

use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::AppError;
use crate::gatekeeper::{self, AssetCandidate, PurgeDecision};
use crate::utils::extract_client_ip;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub assets: Vec<AssetCandidate>,
}

/// POST /analyze
pub async fn analyze(
    State(app_context): State<Arc<AppContext>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<PurgeDecision>, AppError> {
    let client_ip = extract_client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr.ip()));
    app_context.rate_limiter.check(&client_ip).await?;

    let Json(request) = body.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    if request.assets.len() > app_context.config.security.max_assets {
        return Err(AppError::validation(format!(
            "too many assets: {} (maximum {})",
            request.assets.len(),
            app_context.config.security.max_assets
        )));
    }

    let decision = gatekeeper::analyze(&request.assets);
    tracing::debug!(
        assets = request.assets.len(),
        status = ?decision.status,
        "Analyzed batch"
    );

    Ok(Json(decision))
}
