// ============================================================================
// Status, Health and Analyze API Tests
// ============================================================================

use alloy::signers::local::PrivateKeySigner;
use serde_json::{Value, json};
use std::sync::atomic::Ordering;

mod test_utils;
use test_utils::{DOT_LIKE, signed_purge_body, spawn_app};

#[tokio::test]
async fn test_health_reflects_sponsor_reachability() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");

    app.chain.unreachable.store(true, Ordering::SeqCst);
    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_status_reports_nonce_balances_and_queue() {
    let app = spawn_app().await;
    let signer = PrivateKeySigner::random();
    app.chain.fund(signer.address(), DOT_LIKE, 2_000_000_000);
    let response = app
        .post_purge(&signed_purge_body(&signer, &[DOT_LIKE], &[2_000_000_000]))
        .await;
    assert_eq!(response.status(), 200);

    let status: Value = app
        .client
        .get(app.url("/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["nonce"], 1);
    assert_eq!(status["inFlight"], 0);
    assert_eq!(status["queueDepth"], 0);
    assert_eq!(status["workerBusy"], false);
    assert_eq!(status["isRelayer"], true);
    assert_eq!(status["gasTank"], "2500000000000000000");
    assert_eq!(status["gasTankDot"], 2.5);
    assert_eq!(status["collectedFees"], "42");
    assert_eq!(status["cachedResponses"], 1);
    assert_eq!(status["destinationChainId"], 420420421);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_relay_counters() {
    let app = spawn_app().await;
    // Touch the purge path so its counter family is registered
    app.post_purge(&json!({})).await;

    let response = app.client.get(app.url("/metrics")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let text = response.text().await.unwrap();
    assert!(text.contains("dust_relayer_purge_requests_total"));
}

#[tokio::test]
async fn test_analyze_returns_gatekeeper_decision() {
    let app = spawn_app().await;

    let purge: Value = app
        .client
        .post(app.url("/analyze"))
        .json(&json!({
            "assets": [{
                "chain": "Polkadot",
                "symbol": "DOT",
                "amount": 2_000_000_000u64,
                "decimals": 10,
                "estimatedValueDot": 0.2,
                "sourceChainXcmFee": 0.019,
                "nativeBalance": 1,
                "isNative": true,
                "isSufficient": true
            }]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(purge["status"], "PURGE");
    assert_eq!(purge["method"], "Direct-to-Omnipool");

    let blocked: Value = app
        .client
        .post(app.url("/analyze"))
        .json(&json!({
            "assets": [{
                "chain": "Astar",
                "symbol": "ASTR",
                "amount": 5_000_000_000_000_000_000u64,
                "decimals": 18,
                "estimatedValueDot": 1.0,
                "sourceChainXcmFee": 0.001,
                "nativeBalance": 0,
                "isNative": false,
                "isSufficient": false
            }]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(blocked["status"], "BLOCKED");

    let empty: Value = app
        .client
        .post(app.url("/analyze"))
        .json(&json!({ "assets": [] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty["status"], "BURN");
    assert_eq!(empty["reason"], "No assets selected.");
}
