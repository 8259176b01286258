// ============================================================================
// Security Configuration
// ============================================================================

use super::env_or;

/// Largest batch a single request may sweep
pub const DEFAULT_MAX_ASSETS: usize = 20;

/// Rate limiting and request bounds
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Maximum sponsorship requests per IP per minute
    pub max_requests_per_ip_per_minute: u32,
    /// Maximum sponsorship requests across all clients per minute
    pub max_requests_global_per_minute: u32,
    /// Maximum number of assets in one batch
    pub max_assets: usize,
}

impl SecurityConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            max_requests_per_ip_per_minute: env_or("RATE_LIMIT_PER_IP_PER_MINUTE", 10),
            // Coarse ceiling so a distributed client set cannot drain the gas tank
            max_requests_global_per_minute: env_or("RATE_LIMIT_GLOBAL_PER_MINUTE", 100),
            max_assets: env_or("MAX_ASSETS", DEFAULT_MAX_ASSETS),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_requests_per_ip_per_minute: 10,
            max_requests_global_per_minute: 100,
            max_assets: DEFAULT_MAX_ASSETS,
        }
    }
}
