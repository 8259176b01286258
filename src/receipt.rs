use serde::{Deserialize, Serialize};

use crate::chain::SweepReceipt;

pub const DISPATCHED: &str = "DISPATCHED";

/// Successful `POST /purge` response; also what the idempotency store caches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeReceipt {
    pub status: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    /// Commission realized on-chain, in the sweeper contract's base units
    pub commission: String,
    /// Net value promised by the gatekeeper, in DOT
    pub net_value: f64,
    /// RFC 3339 dispatch time
    pub timestamp: String,
}

impl PurgeReceipt {
    pub fn from_sweep(receipt: &SweepReceipt, net_value: f64) -> Self {
        Self {
            status: DISPATCHED.to_string(),
            tx_hash: receipt.tx_hash.to_string(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            commission: receipt.commission.to_string(),
            net_value,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A receipt replayed from the idempotency store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPurgeReceipt {
    #[serde(flatten)]
    pub receipt: PurgeReceipt,
    pub cached: bool,
    /// Seconds since the original dispatch
    pub age: f64,
}

impl CachedPurgeReceipt {
    pub fn new(receipt: PurgeReceipt, age: std::time::Duration) -> Self {
        Self {
            receipt,
            cached: true,
            age: age.as_secs_f64(),
        }
    }
}
