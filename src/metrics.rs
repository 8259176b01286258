use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder, opts,
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
};

/// Purge requests by final outcome (dispatched, cached, or the rejecting error code)
pub static PURGE_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "dust_relayer_purge_requests_total",
            "Total number of purge requests by outcome"
        ),
        &["outcome"]
    )
    .unwrap()
});

pub static IDEMPOTENCY_HITS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "dust_relayer_idempotency_hits_total",
        "Total number of requests answered from the idempotency cache"
    ))
    .unwrap()
});

pub static IDEMPOTENCY_EVICTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "dust_relayer_idempotency_evicted_total",
        "Total number of expired idempotency records evicted"
    ))
    .unwrap()
});

pub static IDEMPOTENCY_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(opts!(
        "dust_relayer_idempotency_records",
        "Idempotency records currently held"
    ))
    .unwrap()
});

pub static SWEEPS_DISPATCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "dust_relayer_sweeps_dispatched_total",
        "Total number of sweep transactions confirmed on-chain"
    ))
    .unwrap()
});

pub static DISPATCH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "dust_relayer_dispatch_failures_total",
        "Total number of queued transactions that failed to submit or confirm"
    ))
    .unwrap()
});

pub static DISPATCH_QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(opts!(
        "dust_relayer_dispatch_queue_depth",
        "Transactions waiting for the dispatch worker"
    ))
    .unwrap()
});

pub static DISPATCH_TIME: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "dust_relayer_dispatch_time_seconds",
        "Histogram of submit-to-confirmation times"
    )
    .unwrap()
});

/// Text exposition of every registered metric
pub fn gather_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
}
