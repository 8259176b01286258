// ============================================================================
// Chain Configuration
// ============================================================================

use anyhow::{Context, Result};

#[derive(Clone)]
pub struct ChainConfig {
    /// HTTP JSON-RPC endpoint of the destination chain's EVM layer
    pub rpc_url: String,
    /// Sponsor private key (hex). Never logged.
    pub relayer_key: String,
    /// Address of the sweeper contract on the destination chain
    pub sweeper_address: String,
    /// Base URL of the price feed used to value incoming assets
    pub oracle_url: String,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("relayer_key", &"***")
            .field("sweeper_address", &self.sweeper_address)
            .field("oracle_url", &self.oracle_url)
            .finish()
    }
}

impl ChainConfig {
    pub(crate) fn from_env() -> Result<Self> {
        Ok(Self {
            rpc_url: std::env::var("RPC_URL").context("RPC_URL must be set")?,
            relayer_key: std::env::var("RELAYER_KEY").context("RELAYER_KEY must be set")?,
            sweeper_address: std::env::var("SWEEPER_ADDRESS")
                .context("SWEEPER_ADDRESS must be set")?,
            oracle_url: std::env::var("ORACLE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3002".to_string()),
        })
    }

    pub(crate) fn placeholder() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            relayer_key: String::new(),
            sweeper_address: "0x0000000000000000000000000000000000000000".to_string(),
            oracle_url: "http://127.0.0.1:3002".to_string(),
        }
    }
}
