// ============================================================================
// Dispatch Configuration
// ============================================================================
//
// Submission and confirmation are retried independently: confirmation
// latency depends on block time and is always longer than a submission
// round-trip, so it gets its own (slower) backoff.
// ============================================================================

use std::time::Duration;

use super::env_or;
use crate::dispatch::RetryPolicy;

const DEFAULT_SUBMIT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_SUBMIT_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_CONFIRM_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_CONFIRM_BASE_DELAY_MS: u64 = 5_000;

#[derive(Clone, Debug)]
pub struct DispatchConfig {
    pub submit: RetryPolicy,
    pub confirm: RetryPolicy,
}

impl DispatchConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            submit: RetryPolicy::new(
                env_or("SUBMIT_MAX_ATTEMPTS", DEFAULT_SUBMIT_MAX_ATTEMPTS),
                Duration::from_millis(env_or("SUBMIT_BASE_DELAY_MS", DEFAULT_SUBMIT_BASE_DELAY_MS)),
            ),
            confirm: RetryPolicy::new(
                env_or("CONFIRM_MAX_ATTEMPTS", DEFAULT_CONFIRM_MAX_ATTEMPTS),
                Duration::from_millis(env_or(
                    "CONFIRM_BASE_DELAY_MS",
                    DEFAULT_CONFIRM_BASE_DELAY_MS,
                )),
            ),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            submit: RetryPolicy::new(
                DEFAULT_SUBMIT_MAX_ATTEMPTS,
                Duration::from_millis(DEFAULT_SUBMIT_BASE_DELAY_MS),
            ),
            confirm: RetryPolicy::new(
                DEFAULT_CONFIRM_MAX_ATTEMPTS,
                Duration::from_millis(DEFAULT_CONFIRM_BASE_DELAY_MS),
            ),
        }
    }
}
