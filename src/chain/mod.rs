// ============================================================================
// Destination Chain Access
// ============================================================================
//
// Everything the relay pipeline needs from the destination chain goes through
// the `SweeperChain` trait:
// - mod.rs: trait, call/receipt types, account mapping
// - evm.rs: alloy-backed implementation against the sweeper contract
// - units.rs: DOT decimal conversions between substrate and EVM views
//
// ============================================================================

mod evm;
pub mod units;

use alloy::primitives::{Address, B256, Bytes, U256};
use anyhow::Result;
use async_trait::async_trait;

pub use evm::EvmSweeperChain;

/// Suffix Revive appends to a 20-byte EVM address to form its 32-byte
/// substrate account id.
pub const ACCOUNT_MAPPING_SUFFIX: [u8; 12] = [0xEE; 12];

/// 32-byte account id on the destination chain's native account space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId32(pub [u8; 32]);

impl AccountId32 {
    /// Maps an EVM address into the destination chain's account space
    pub fn from_evm(address: &Address) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..20].copy_from_slice(address.as_slice());
        bytes[20..].copy_from_slice(&ACCOUNT_MAPPING_SUFFIX);
        Self(bytes)
    }

    /// Recovers the EVM address of a mapped account; `None` for native
    /// accounts that never came from an EVM address.
    pub fn to_evm(&self) -> Option<Address> {
        if self.0[20..] == ACCOUNT_MAPPING_SUFFIX {
            Some(Address::from_slice(&self.0[..20]))
        } else {
            None
        }
    }
}

impl std::fmt::Display for AccountId32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Arguments of the sponsor-only `sweepAndRepay` entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepCall {
    pub requester: Address,
    pub assets: Vec<Address>,
    pub amounts: Vec<U256>,
    pub signature: Bytes,
}

/// Outcome of a mined sweep transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    /// False when the transaction was mined but reverted
    pub success: bool,
    /// Commission realized on-chain, read from the `CommissionTaken` event
    pub commission: U256,
}

/// Destination-chain operations consumed by the relay pipeline
#[async_trait]
pub trait SweeperChain: Send + Sync {
    /// Address of the sponsor account signing sweep transactions
    fn sponsor(&self) -> Address;

    /// Next nonce for the sponsor account, including pending transactions
    async fn pending_nonce(&self) -> Result<u64>;

    /// Signs and broadcasts a sweep with an explicit nonce; returns its hash
    async fn submit_sweep(&self, nonce: u64, call: &SweepCall) -> Result<B256>;

    /// Receipt of a previously submitted transaction, `None` while unmined
    async fn receipt(&self, tx_hash: B256) -> Result<Option<SweepReceipt>>;

    /// Balance of `asset` held by `account` on the destination chain
    async fn asset_balance(&self, account: &AccountId32, asset: Address) -> Result<U256>;

    /// Native balance of the sponsor account
    async fn sponsor_balance(&self) -> Result<U256>;

    /// Sweeper contract gas-tank balance
    async fn gas_tank(&self) -> Result<U256>;

    /// Commission collected by the sweeper contract so far
    async fn collected_fees(&self) -> Result<U256>;

    /// Whether the sponsor is on the contract's relayer allow-list
    async fn is_relayer(&self) -> Result<bool>;
}
