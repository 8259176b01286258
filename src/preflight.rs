// ============================================================================
// Pre-flight Verifier
// ============================================================================
//
// Confirms every claimed asset has already landed at the requester's mapped
// account on the destination chain before any sponsor gas is committed.
// One missing asset rejects the whole batch: a partial sweep would pay gas
// for assets that cannot be consolidated.
// ============================================================================

use alloy::primitives::Address;

use crate::chain::{AccountId32, SweeperChain};
use crate::error::AppError;

/// Check that `requester` holds a non-zero balance of every asset in `assets`
pub async fn verify_arrival(
    chain: &dyn SweeperChain,
    requester: &Address,
    assets: &[Address],
) -> Result<(), AppError> {
    let account = AccountId32::from_evm(requester);
    let mut missing = Vec::new();

    for asset in assets {
        let balance = chain.asset_balance(&account, *asset).await.map_err(|e| {
            tracing::error!(
                asset = %asset,
                error = %e,
                "Balance query failed during pre-flight"
            );
            AppError::chain(format!("balance query for {:#x} failed: {:#}", asset, e))
        })?;

        if balance.is_zero() {
            missing.push(format!("{:#x}", asset));
        }
    }

    if !missing.is_empty() {
        tracing::info!(
            account = %account,
            missing = missing.len(),
            "Pre-flight found assets still in transit"
        );
        return Err(AppError::not_ready(format!(
            "no balance yet for {}",
            missing.join(", ")
        )));
    }

    Ok(())
}
