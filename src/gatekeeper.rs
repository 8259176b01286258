// ============================================================================
// Net-Value Gatekeeper
// ============================================================================
//
// Decides whether a batch of dust is worth sponsoring. Pure: no I/O, no
// shared state, same input -> same decision.
//
// Evaluation order is part of the contract:
// 1. Per asset, in list order: accumulate value, note dust traps, and
//    short-circuit with BURN on the first asset whose fee stack eats it.
// 2. BLOCKED if any dust trap was seen (beats every aggregate check).
// 3. BURN if the batch total is under the minimum.
// 4. BURN if the dispatch fee eats the batch, else PURGE net of commission.
//
// All values are in the settlement unit (DOT-equivalent).
// ============================================================================

use serde::{Deserialize, Serialize};

/// Smallest batch (and smallest per-asset net) worth sponsoring
pub const MIN_BATCH_VALUE_DOT: f64 = 0.05;
/// Minimum net value an individual asset must keep after its fee stack
pub const MIN_NET_VALUE_DOT: f64 = 0.05;
/// Headroom on source-chain fees for weight estimation volatility
pub const GAS_SAFETY_BUFFER: f64 = 1.2;
/// Destination-side execution fee charged per asset
pub const DEST_XCM_FEE_DOT: f64 = 0.005;
/// Gas rebate paid back to the relayer per asset
pub const RELAYER_REBATE_DOT: f64 = 0.002;
/// Fee for the single sponsored dispatch of the whole batch
pub const ESTIMATED_DISPATCH_FEE_DOT: f64 = 0.015;
pub const COMMISSION_RATE: f64 = 0.05;

const PURGE_METHOD: &str = "Direct-to-Omnipool";

/// How an asset reaches the destination from its source chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingTier {
    /// Source sends straight to the destination
    Direct,
    /// Source -> Asset Hub -> destination
    MultiHop,
}

impl RoutingTier {
    /// Routing tier for a source chain.
    ///
    /// Chains missing from the table are treated as multi-hop, the most
    /// expensive route. New chains must be added here or they will be
    /// priced conservatively.
    pub fn for_chain(chain: &str) -> Self {
        match chain {
            "Polkadot" | "AssetHub" | "Hydration" => RoutingTier::Direct,
            "Astar" | "Moonbeam" => RoutingTier::MultiHop,
            _ => RoutingTier::MultiHop,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            RoutingTier::Direct => 1.0,
            RoutingTier::MultiHop => 2.5,
        }
    }

    fn label(self) -> &'static str {
        match self {
            RoutingTier::Direct => "TIER 1_DIRECT",
            RoutingTier::MultiHop => "TIER 2_MULTI_HOP",
        }
    }
}

/// One asset a user wants to consolidate, priced for a single decision pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCandidate {
    /// Source chain name, e.g. "Astar"
    pub chain: String,
    pub symbol: String,
    /// Raw amount in the asset's smallest unit
    pub amount: u128,
    pub decimals: u8,
    pub estimated_value_dot: f64,
    /// Source-chain transfer fee estimate
    #[serde(alias = "sourceFeeDot")]
    pub source_chain_xcm_fee: f64,
    /// Holder's native balance on the asset's chain
    pub native_balance: u128,
    #[serde(default)]
    pub is_native: bool,
    /// Asset can pay its own existential deposit / fees
    #[serde(default)]
    pub is_sufficient: bool,
}

impl AssetCandidate {
    /// Asset cannot leave its chain: non-native, not self-sufficient, and
    /// the holder has no native gas there.
    pub fn is_dust_trap(&self) -> bool {
        !self.is_native && !self.is_sufficient && self.native_balance == 0
    }

    /// Full per-asset fee stack, including the routing multiplier and buffer
    pub fn total_fees(&self) -> f64 {
        let tier = RoutingTier::for_chain(&self.chain);
        let adjusted_source_fee = self.source_chain_xcm_fee * tier.multiplier() * GAS_SAFETY_BUFFER;
        adjusted_source_fee + DEST_XCM_FEE_DOT + RELAYER_REBATE_DOT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurgeStatus {
    Purge,
    Burn,
    Blocked,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeDecision {
    pub status: PurgeStatus,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl PurgeDecision {
    fn burn(reason: String, net_value: Option<f64>) -> Self {
        Self {
            status: PurgeStatus::Burn,
            reason,
            net_value,
            method: None,
        }
    }

    pub fn is_purge(&self) -> bool {
        self.status == PurgeStatus::Purge
    }
}

/// Run the gatekeeper over a batch
pub fn analyze(assets: &[AssetCandidate]) -> PurgeDecision {
    if assets.is_empty() {
        return PurgeDecision::burn("No assets selected.".to_string(), None);
    }

    let mut total_batch_value = 0.0;
    let mut has_dust_trap = false;

    for asset in assets {
        total_batch_value += asset.estimated_value_dot;

        if asset.is_dust_trap() {
            has_dust_trap = true;
        }

        let tier = RoutingTier::for_chain(&asset.chain);
        let total_fees = asset.total_fees();
        let value_after_fees = asset.estimated_value_dot - total_fees;

        if value_after_fees <= 0.0 {
            return PurgeDecision::burn(
                format!(
                    "Fees ({:.3} DOT) exceed asset value due to {} complexity.",
                    total_fees,
                    tier.label()
                ),
                Some(value_after_fees),
            );
        }

        if value_after_fees < MIN_NET_VALUE_DOT {
            return PurgeDecision::burn(
                format!(
                    "Net value ({:.3} DOT) is below the {} threshold after complexity adjustments.",
                    value_after_fees, MIN_NET_VALUE_DOT
                ),
                Some(value_after_fees),
            );
        }
    }

    if has_dust_trap {
        return PurgeDecision {
            status: PurgeStatus::Blocked,
            reason: "Dust Trap Detected: You lack native tokens for gas on one or more chains."
                .to_string(),
            net_value: None,
            method: None,
        };
    }

    if total_batch_value < MIN_BATCH_VALUE_DOT {
        return PurgeDecision::burn(
            format!(
                "Batch value ({:.4} DOT) is below the safety threshold ({} DOT). Add more dust.",
                total_batch_value, MIN_BATCH_VALUE_DOT
            ),
            None,
        );
    }

    let net_value = total_batch_value - ESTIMATED_DISPATCH_FEE_DOT;
    if net_value <= 0.0 {
        return PurgeDecision::burn("Fees exceed value.".to_string(), None);
    }

    PurgeDecision {
        status: PurgeStatus::Purge,
        reason: "Batch optimized for execution.".to_string(),
        net_value: Some(net_value * (1.0 - COMMISSION_RATE)),
        method: Some(PURGE_METHOD.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(chain: &str, value: f64, source_fee: f64) -> AssetCandidate {
        AssetCandidate {
            chain: chain.to_string(),
            symbol: "DUST".to_string(),
            amount: 1_000_000,
            decimals: 6,
            estimated_value_dot: value,
            source_chain_xcm_fee: source_fee,
            native_balance: 1,
            is_native: false,
            is_sufficient: false,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_purge_reports_net_after_dispatch_fee_and_commission() {
        // 0.0191666.. * 1.0 * 1.2 + 0.007 = 0.03 total fees
        let asset = candidate("AssetHub", 0.2, 0.023 / 1.2);
        assert!(approx(asset.total_fees(), 0.03));

        let decision = analyze(&[asset]);
        assert_eq!(decision.status, PurgeStatus::Purge);
        assert_eq!(decision.method.as_deref(), Some("Direct-to-Omnipool"));
        let expected = (0.2 - ESTIMATED_DISPATCH_FEE_DOT) * 0.95;
        assert!(approx(decision.net_value.unwrap(), expected));
    }

    #[test]
    fn test_small_batch_burns_with_threshold_reason() {
        let decision = analyze(&[candidate("AssetHub", 0.03, 0.0)]);
        assert_eq!(decision.status, PurgeStatus::Burn);
        assert!(decision.reason.contains("below the 0.05 threshold"));
    }

    #[test]
    fn test_dust_trap_blocks_valuable_batch() {
        let mut trapped = candidate("Astar", 5.0, 0.01);
        trapped.native_balance = 0;
        let decision = analyze(&[candidate("Hydration", 10.0, 0.01), trapped]);
        assert_eq!(decision.status, PurgeStatus::Blocked);
        assert!(decision.reason.starts_with("Dust Trap Detected"));
    }

    #[test]
    fn test_native_or_sufficient_asset_is_not_a_trap() {
        let mut native = candidate("Astar", 1.0, 0.01);
        native.native_balance = 0;
        native.is_native = true;
        assert!(!native.is_dust_trap());

        let mut sufficient = candidate("Astar", 1.0, 0.01);
        sufficient.native_balance = 0;
        sufficient.is_sufficient = true;
        assert!(!sufficient.is_dust_trap());

        assert_eq!(analyze(&[native, sufficient]).status, PurgeStatus::Purge);
    }

    #[test]
    fn test_per_asset_burn_beats_dust_trap() {
        let mut trapped = candidate("Astar", 5.0, 0.01);
        trapped.native_balance = 0;
        // Fees: 0.1 * 2.5 * 1.2 + 0.007 = 0.307 > 0.2
        let expensive = candidate("Moonbeam", 0.2, 0.1);
        let decision = analyze(&[trapped, expensive]);
        assert_eq!(decision.status, PurgeStatus::Burn);
        assert!(decision.reason.contains("exceed asset value"));
        assert!(decision.reason.contains("TIER 2_MULTI_HOP"));
    }

    #[test]
    fn test_first_burning_asset_short_circuits() {
        let fee_burn = candidate("Moonbeam", 0.2, 0.1);
        let threshold_burn = candidate("AssetHub", 0.05, 0.0);
        let decision = analyze(&[fee_burn.clone(), threshold_burn.clone()]);
        assert!(decision.reason.contains("exceed asset value"));

        let decision = analyze(&[threshold_burn, fee_burn]);
        assert!(decision.reason.contains("below the 0.05 threshold"));
    }

    #[test]
    fn test_fee_exceeding_asset_burns_regardless_of_batch() {
        let rich = candidate("Hydration", 1000.0, 0.0);
        let poor = candidate("AssetHub", 0.006, 0.0);
        let decision = analyze(&[rich, poor]);
        assert_eq!(decision.status, PurgeStatus::Burn);
        assert!(decision.net_value.unwrap() <= 0.0);
    }

    #[test]
    fn test_unknown_chain_is_priced_as_multi_hop() {
        assert_eq!(RoutingTier::for_chain("Zeitgeist"), RoutingTier::MultiHop);
        let unknown = candidate("Zeitgeist", 1.0, 0.1);
        let known = candidate("Astar", 1.0, 0.1);
        assert!(approx(unknown.total_fees(), known.total_fees()));
    }

    #[test]
    fn test_empty_batch_burns() {
        let decision = analyze(&[]);
        assert_eq!(decision.status, PurgeStatus::Burn);
        assert_eq!(decision.reason, "No assets selected.");
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let batch = vec![
            candidate("AssetHub", 0.4, 0.001),
            candidate("Astar", 0.3, 0.002),
        ];
        assert_eq!(analyze(&batch), analyze(&batch));
    }

    #[test]
    fn test_decision_serializes_uppercase_status() {
        let decision = analyze(&[candidate("AssetHub", 0.03, 0.0)]);
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["status"], "BURN");
        assert!(json.get("method").is_none());
    }
}
