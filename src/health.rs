use alloy::primitives::U256;
use anyhow::Result;
use serde::Serialize;

use crate::chain::SweeperChain;
use crate::chain::units::{DOT_DECIMALS_SUBSTRATE, from_revive_decimals, to_decimal};
use crate::dispatch::QueueStatus;

/// Liveness: the sponsor account must be readable on the destination chain
pub async fn health_check(chain: &dyn SweeperChain) -> Result<()> {
    chain.sponsor_balance().await?;
    Ok(())
}

/// Operator snapshot served on `GET /status`.
///
/// On-chain fields are `None` when the corresponding view call failed; the
/// snapshot is still served so queue state stays observable during RPC outages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerStatus {
    pub sponsor: String,
    pub destination_chain_id: u64,
    /// Nonce the next sponsored transaction will use
    pub nonce: u64,
    pub in_flight: usize,
    pub queue_depth: usize,
    pub worker_busy: bool,
    /// Gas tank in 18-decimal EVM units
    pub gas_tank: Option<String>,
    /// Gas tank in whole DOT
    pub gas_tank_dot: Option<f64>,
    pub collected_fees: Option<String>,
    pub is_relayer: Option<bool>,
    pub cached_responses: usize,
}

pub async fn relayer_status(
    chain: &dyn SweeperChain,
    destination_chain_id: u64,
    queue: QueueStatus,
    cached_responses: usize,
) -> RelayerStatus {
    let gas_tank = chain
        .gas_tank()
        .await
        .map_err(|e| tracing::warn!(error = %e, "Failed to read gas tank"))
        .ok();
    let collected_fees = chain
        .collected_fees()
        .await
        .map_err(|e| tracing::warn!(error = %e, "Failed to read collected fees"))
        .ok();
    let is_relayer = chain
        .is_relayer()
        .await
        .map_err(|e| tracing::warn!(error = %e, "Failed to read relayer authorization"))
        .ok();

    if is_relayer == Some(false) {
        tracing::error!(
            sponsor = %chain.sponsor(),
            "Sponsor is not an authorized relayer; every sweep will revert"
        );
    }

    RelayerStatus {
        sponsor: chain.sponsor().to_string(),
        destination_chain_id,
        nonce: queue.next_nonce,
        in_flight: queue.in_flight,
        queue_depth: queue.depth,
        worker_busy: queue.busy,
        gas_tank: gas_tank.map(|v| v.to_string()),
        gas_tank_dot: gas_tank.map(revive_to_dot),
        collected_fees: collected_fees.map(|v| v.to_string()),
        is_relayer,
        cached_responses,
    }
}

fn revive_to_dot(amount: U256) -> f64 {
    let plancks = u128::try_from(from_revive_decimals(amount)).unwrap_or(u128::MAX);
    to_decimal(plancks, DOT_DECIMALS_SUBSTRATE)
}
