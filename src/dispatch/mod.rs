// ============================================================================
// Sponsored Transaction Dispatch
// ============================================================================
//
// Every sponsor-signed transaction funnels through one worker task:
// - queue.rs: FIFO channel + the single worker that owns the nonce state
// - nonce.rs: collision-free nonce allocation for the sponsor account
// - retry.rs: bounded exponential-backoff wrapper for one remote call
//
// Requests that fail validation, authentication, pre-flight or the gatekeeper
// never reach this module and never consume a nonce.
// ============================================================================

mod nonce;
mod queue;
mod retry;

use alloy::primitives::B256;
use thiserror::Error;

pub use nonce::NonceAllocator;
pub use queue::{DispatchQueue, QueueStatus};
pub use retry::{RetryPolicy, retry};

/// Failure of a queued transaction after nonce acquisition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("submission failed: {0}")]
    Submission(String),

    #[error("confirmation failed: {0}")]
    Confirmation(String),

    #[error("transaction {0} reverted on-chain")]
    Reverted(B256),

    #[error("dispatch worker is not running")]
    WorkerUnavailable,
}

impl DispatchError {
    /// Underlying cause, safe to return to the requester
    pub fn cause_summary(&self) -> String {
        match self {
            DispatchError::Submission(cause) => format!("submission failed: {}", cause),
            DispatchError::Confirmation(cause) => format!("confirmation failed: {}", cause),
            DispatchError::Reverted(hash) => format!("transaction {} reverted", hash),
            DispatchError::WorkerUnavailable => "dispatch worker unavailable".to_string(),
        }
    }
}
