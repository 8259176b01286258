// ============================================================================
// Price Oracle Client
// ============================================================================
//
// Supplies DOT-equivalent valuations per asset so the relay can build the
// gatekeeper's input. The gatekeeper itself never calls the oracle.
//
// A missing or failed quote values the asset at zero: the gatekeeper then
// burns the batch instead of sponsoring something we cannot price.
// ============================================================================

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chain::units::to_decimal;
use crate::gatekeeper::AssetCandidate;

const ORACLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Valuation of one asset as reported by the price feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuote {
    pub symbol: String,
    pub decimals: u8,
    /// Price of one whole token in DOT
    pub price_dot: f64,
    /// Chain the asset originates from
    pub chain: String,
    /// Estimated source-chain transfer fee in DOT
    #[serde(default)]
    pub source_fee_dot: f64,
    #[serde(default)]
    pub is_sufficient: bool,
}

#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Quote for `asset`, `None` if the feed does not know it
    async fn quote(&self, asset: Address) -> Result<Option<AssetQuote>>;
}

/// Price feed reachable over HTTP: `GET {base_url}/assets/{address}`
pub struct HttpPriceOracle {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPriceOracle {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(ORACLE_TIMEOUT)
            .build()
            .context("Failed to build oracle HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn quote(&self, asset: Address) -> Result<Option<AssetQuote>> {
        let url = format!("{}/assets/{:#x}", self.base_url, asset);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Oracle request failed: {}", url))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let quote = response
            .error_for_status()
            .context("Oracle returned an error status")?
            .json::<AssetQuote>()
            .await
            .context("Oracle returned a malformed quote")?;

        Ok(Some(quote))
    }
}

/// Build gatekeeper candidates for assets that have already arrived on the
/// destination chain.
///
/// The sponsor pays destination gas, so every candidate is marked as having
/// native balance: arrived assets cannot be dust-trapped.
pub async fn price_arrived_assets(
    oracle: &dyn PriceOracle,
    assets: &[Address],
    amounts: &[U256],
) -> Vec<AssetCandidate> {
    let mut candidates = Vec::with_capacity(assets.len());

    for (asset, amount) in assets.iter().zip(amounts) {
        let raw_amount = u128::try_from(*amount).unwrap_or(u128::MAX);

        let quote = match oracle.quote(*asset).await {
            Ok(Some(quote)) => Some(quote),
            Ok(None) => {
                tracing::warn!(asset = %asset, "Asset not known to price oracle, valuing at zero");
                None
            }
            Err(e) => {
                tracing::warn!(asset = %asset, error = %e, "Price lookup failed, valuing at zero");
                None
            }
        };

        let candidate = match quote {
            Some(q) => AssetCandidate {
                estimated_value_dot: to_decimal(raw_amount, q.decimals) * q.price_dot,
                chain: q.chain,
                symbol: q.symbol,
                amount: raw_amount,
                decimals: q.decimals,
                source_chain_xcm_fee: q.source_fee_dot,
                native_balance: 1,
                is_native: false,
                is_sufficient: q.is_sufficient,
            },
            None => AssetCandidate {
                chain: "Unknown".to_string(),
                symbol: format!("{:#x}", asset),
                amount: raw_amount,
                decimals: 0,
                estimated_value_dot: 0.0,
                source_chain_xcm_fee: 0.0,
                native_balance: 1,
                is_native: false,
                is_sufficient: false,
            },
        };
        candidates.push(candidate);
    }

    candidates
}
