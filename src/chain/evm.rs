// ============================================================================
// EVM Sweeper Chain Client
// ============================================================================
//
// alloy-backed `SweeperChain` talking to the sweeper contract on the
// destination chain's EVM layer (Revive). The sponsor key lives inside the
// provider's wallet filler; nonces are always set explicitly by the dispatch
// queue, so the provider's own nonce filler never kicks in for sweeps.
//
// ============================================================================

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;

use super::{AccountId32, SweepCall, SweepReceipt, SweeperChain};
use crate::config::ChainConfig;

sol! {
    #[sol(rpc)]
    interface ISweeper {
        event Swept(address indexed user, uint256 assetCount, string destination);
        event CommissionTaken(address indexed user, uint256 amount);

        function sweepAndRepay(
            address user,
            address[] calldata assets,
            uint256[] calldata amounts,
            bytes calldata signature
        ) external;

        function gasTank() external view returns (uint256);
        function collectedFees() external view returns (uint256);
        function isRelayer(address account) external view returns (bool);
    }

    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
    }
}

pub struct EvmSweeperChain {
    provider: DynProvider,
    sweeper: ISweeper::ISweeperInstance<DynProvider>,
    sponsor: Address,
}

impl EvmSweeperChain {
    /// Build a client from configuration. Does not touch the network.
    pub fn connect(config: &ChainConfig) -> Result<Self> {
        let signer: PrivateKeySigner = config
            .relayer_key
            .parse()
            .context("RELAYER_KEY is not a valid secp256k1 private key")?;
        let sponsor = signer.address();

        let rpc_url: reqwest::Url = config.rpc_url.parse().context("RPC_URL is not a valid URL")?;
        let sweeper_address: Address = config
            .sweeper_address
            .parse()
            .context("SWEEPER_ADDRESS is not a valid address")?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();
        let sweeper = ISweeper::new(sweeper_address, provider.clone());

        tracing::info!(
            sponsor = %sponsor,
            sweeper = %sweeper_address,
            "EVM sweeper client configured"
        );

        Ok(Self {
            provider,
            sweeper,
            sponsor,
        })
    }
}

#[async_trait]
impl SweeperChain for EvmSweeperChain {
    fn sponsor(&self) -> Address {
        self.sponsor
    }

    async fn pending_nonce(&self) -> Result<u64> {
        let nonce = self
            .provider
            .get_transaction_count(self.sponsor)
            .pending()
            .await
            .context("Failed to fetch sponsor nonce")?;
        Ok(nonce)
    }

    async fn submit_sweep(&self, nonce: u64, call: &SweepCall) -> Result<B256> {
        let pending = self
            .sweeper
            .sweepAndRepay(
                call.requester,
                call.assets.clone(),
                call.amounts.clone(),
                call.signature.clone(),
            )
            .nonce(nonce)
            .send()
            .await
            .context("sweepAndRepay submission rejected")?;

        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<SweepReceipt>> {
        let Some(receipt) = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .context("Failed to fetch transaction receipt")?
        else {
            return Ok(None);
        };

        let sweeper_address = *self.sweeper.address();
        let commission = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == sweeper_address)
            .find_map(|log| log.log_decode::<ISweeper::CommissionTaken>().ok())
            .map(|event| event.inner.data.amount)
            .unwrap_or(U256::ZERO);

        Ok(Some(SweepReceipt {
            tx_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used,
            success: receipt.status(),
            commission,
        }))
    }

    async fn asset_balance(&self, account: &AccountId32, asset: Address) -> Result<U256> {
        // Assets are exposed to the EVM layer as ERC-20 precompiles, which
        // address mapped accounts by their original 20-byte form.
        let owner = account
            .to_evm()
            .ok_or_else(|| anyhow!("account {} has no EVM representation", account))?;

        let token = IERC20::new(asset, self.provider.clone());
        let balance = token
            .balanceOf(owner)
            .call()
            .await
            .with_context(|| format!("balanceOf failed for asset {}", asset))?;
        Ok(balance)
    }

    async fn sponsor_balance(&self) -> Result<U256> {
        let balance = self
            .provider
            .get_balance(self.sponsor)
            .await
            .context("Failed to fetch sponsor balance")?;
        Ok(balance)
    }

    async fn gas_tank(&self) -> Result<U256> {
        Ok(self.sweeper.gasTank().call().await?)
    }

    async fn collected_fees(&self) -> Result<U256> {
        Ok(self.sweeper.collectedFees().call().await?)
    }

    async fn is_relayer(&self) -> Result<bool> {
        Ok(self.sweeper.isRelayer(self.sponsor).call().await?)
    }
}
