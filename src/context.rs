use crate::chain::SweeperChain;
use crate::config::Config;
use crate::dispatch::DispatchQueue;
use crate::idempotency::IdempotencyStore;
use crate::oracle::PriceOracle;
use crate::rate_limit::RateLimiter;
use crate::receipt::PurgeReceipt;
use crate::validation::PurgeRequestValidator;
use std::sync::Arc;
use std::time::Duration;

/// Application context containing shared dependencies
/// This reduces parameter passing and makes it easier to swap collaborators in tests
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub validator: Arc<PurgeRequestValidator>,
    pub rate_limiter: Arc<RateLimiter>,
    pub idempotency: Arc<IdempotencyStore<PurgeReceipt>>,
    pub chain: Arc<dyn SweeperChain>,
    pub oracle: Arc<dyn PriceOracle>,
    /// Handle to the single worker that owns the sponsor nonce
    pub dispatch: DispatchQueue,
}

impl AppContext {
    /// Creates a new application context
    pub fn new(
        config: Arc<Config>,
        chain: Arc<dyn SweeperChain>,
        oracle: Arc<dyn PriceOracle>,
        dispatch: DispatchQueue,
    ) -> Self {
        let validator = PurgeRequestValidator::new(
            config.security.max_assets,
            config.destination_chain_id,
        );

        Self {
            validator: Arc::new(validator),
            rate_limiter: Arc::new(RateLimiter::from_config(&config.security)),
            idempotency: Arc::new(IdempotencyStore::new(Duration::from_secs(
                config.idempotency_ttl_secs,
            ))),
            config,
            chain,
            oracle,
            dispatch,
        }
    }
}
