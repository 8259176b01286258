use anyhow::Result;

mod chain;
mod dispatch;
mod logging;
mod security;

pub use chain::ChainConfig;
pub use dispatch::DispatchConfig;
pub use logging::LoggingConfig;
pub use security::SecurityConfig;

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_PORT: u16 = 3001;

/// Revive (EVM on Asset Hub) chain id
pub const DEFAULT_DESTINATION_CHAIN_ID: u64 = 420420421;

// Idempotency window: a retried request inside this window gets the cached
// response instead of a second sponsored transaction.
const DEFAULT_IDEMPOTENCY_TTL_SECS: u64 = 300;
const DEFAULT_IDEMPOTENCY_SWEEP_INTERVAL_SECS: u64 = 60;

pub const SECONDS_PER_MINUTE: u64 = 60;

/// Reads an optional env var, falling back to `default` when unset or unparsable
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Chain id the relayer submits to; requests targeting another chain are rejected
    pub destination_chain_id: u64,
    pub idempotency_ttl_secs: u64,
    pub idempotency_sweep_interval_secs: u64,
    pub chain: ChainConfig,
    pub dispatch: DispatchConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_or("PORT", DEFAULT_PORT),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            destination_chain_id: env_or("DESTINATION_CHAIN_ID", DEFAULT_DESTINATION_CHAIN_ID),
            idempotency_ttl_secs: env_or("IDEMPOTENCY_TTL_SECS", DEFAULT_IDEMPOTENCY_TTL_SECS),
            idempotency_sweep_interval_secs: env_or(
                "IDEMPOTENCY_SWEEP_INTERVAL_SECS",
                DEFAULT_IDEMPOTENCY_SWEEP_INTERVAL_SECS,
            ),
            chain: ChainConfig::from_env()?,
            dispatch: DispatchConfig::from_env(),
            security: SecurityConfig::from_env(),
            logging: LoggingConfig::from_env(),
        })
    }

    /// Configuration with every optional value at its default and placeholder
    /// chain endpoints. Used by tests that wire in their own chain client.
    pub fn with_defaults() -> Self {
        Self {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            destination_chain_id: DEFAULT_DESTINATION_CHAIN_ID,
            idempotency_ttl_secs: DEFAULT_IDEMPOTENCY_TTL_SECS,
            idempotency_sweep_interval_secs: DEFAULT_IDEMPOTENCY_SWEEP_INTERVAL_SECS,
            chain: ChainConfig::placeholder(),
            dispatch: DispatchConfig::default(),
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
