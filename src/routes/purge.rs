// ============================================================================
// Purge Route
// ============================================================================
//
// Endpoints:
// - POST /purge - Sponsor a dust sweep for a signed batch
//
// Pipeline (each stage can reject; nothing before dispatch touches a nonce):
// rate limit -> validate -> authenticate -> idempotency reservation ->
// pre-flight -> gatekeeper -> dispatch queue -> cache the receipt
//
// Dispatch and caching run in a detached task, so a client that disconnects
// mid-dispatch still leaves the receipt behind for its retry.
//
// ============================================================================

use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::auth;
use crate::chain::SweepCall;
use crate::context::AppContext;
use crate::dispatch::DispatchError;
use crate::error::AppError;
use crate::gatekeeper;
use crate::idempotency::{IdempotencyKey, Reservation};
use crate::metrics;
use crate::oracle;
use crate::preflight;
use crate::receipt::{CachedPurgeReceipt, PurgeReceipt};
use crate::utils::extract_client_ip;
use crate::validation::PurgeRequestBody;

enum PurgeOutcome {
    Dispatched(PurgeReceipt),
    Cached(CachedPurgeReceipt),
}

/// POST /purge
/// Validates, authenticates and, if worthwhile, sponsors a sweep
pub async fn purge(
    State(app_context): State<Arc<AppContext>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<PurgeRequestBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let client_ip = extract_client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr.ip()));

    match run_pipeline(&app_context, &client_ip, body).await {
        Ok(PurgeOutcome::Dispatched(receipt)) => {
            metrics::PURGE_REQUESTS_TOTAL
                .with_label_values(&["dispatched"])
                .inc();
            Ok((StatusCode::OK, Json(receipt)).into_response())
        }
        Ok(PurgeOutcome::Cached(cached)) => {
            metrics::PURGE_REQUESTS_TOTAL
                .with_label_values(&["cached"])
                .inc();
            Ok((StatusCode::OK, Json(cached)).into_response())
        }
        Err(e) => {
            metrics::PURGE_REQUESTS_TOTAL
                .with_label_values(&[e.error_code()])
                .inc();
            Err(e)
        }
    }
}

async fn run_pipeline(
    app_context: &AppContext,
    client_ip: &str,
    body: Result<Json<PurgeRequestBody>, JsonRejection>,
) -> Result<PurgeOutcome, AppError> {
    // Rate limiting runs before the body is even looked at
    app_context.rate_limiter.check(client_ip).await?;

    let Json(body) = body.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let request = app_context.validator.validate(body)?;
    let requester = app_context
        .config
        .logging
        .requester_label(&request.requester_raw);

    if let Err(e) = auth::authenticate(&request) {
        tracing::warn!(
            requester = %requester,
            client_ip = %client_ip,
            "Rejected purge request with invalid signature"
        );
        return Err(e);
    }

    let key = IdempotencyKey::derive(&request.requester, &request.assets, &request.amounts);
    let reservation = match app_context.idempotency.reserve(&key).await {
        Reservation::Cached(hit) => {
            metrics::IDEMPOTENCY_HITS_TOTAL.inc();
            tracing::info!(
                requester = %requester,
                age_ms = hit.age.as_millis(),
                "Returning cached purge receipt"
            );
            return Ok(PurgeOutcome::Cached(CachedPurgeReceipt::new(
                hit.response,
                hit.age,
            )));
        }
        Reservation::Acquired(reservation) => reservation,
    };

    preflight::verify_arrival(
        app_context.chain.as_ref(),
        &request.requester,
        &request.assets,
    )
    .await?;

    let candidates = oracle::price_arrived_assets(
        app_context.oracle.as_ref(),
        &request.assets,
        &request.amounts,
    )
    .await;
    let decision = gatekeeper::analyze(&candidates);
    if !decision.is_purge() {
        tracing::info!(
            requester = %requester,
            status = ?decision.status,
            reason = %decision.reason,
            "Gatekeeper declined batch"
        );
        return Err(AppError::gatekeeper(decision.reason));
    }
    let net_value = decision.net_value.unwrap_or_default();

    tracing::info!(
        requester = %requester,
        assets = request.assets.len(),
        net_value = net_value,
        "Dispatching sponsored sweep"
    );

    let call = SweepCall {
        requester: request.requester,
        assets: request.assets,
        amounts: request.amounts,
        signature: auth::decode_signature(&request.signature)?.into(),
    };

    let dispatch = app_context.dispatch.clone();
    let idempotency = app_context.idempotency.clone();
    let receipt = tokio::spawn(async move {
        let sweep = dispatch.dispatch(call).await?;
        let receipt = PurgeReceipt::from_sweep(&sweep, net_value);
        idempotency.complete(reservation, receipt.clone()).await;
        Ok::<_, DispatchError>(receipt)
    })
    .await
    .map_err(|e| AppError::internal(format!("dispatch task failed: {}", e)))??;

    Ok(PurgeOutcome::Dispatched(receipt))
}
