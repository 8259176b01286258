#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256, address};
use alloy::signers::{SignerSync, local::PrivateKeySigner};
use anyhow::Result;
use async_trait::async_trait;
use dust_relayer::{
    auth::canonical_message,
    chain::{AccountId32, SweepCall, SweepReceipt, SweeperChain},
    config::Config,
    dispatch::RetryPolicy,
    oracle::{AssetQuote, PriceOracle},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;

/// Destination chain double: balances are set by the test, every submitted
/// sweep is mined immediately.
pub struct InMemoryChain {
    sponsor: Address,
    start_nonce: u64,
    balances: Mutex<HashMap<(AccountId32, Address), U256>>,
    receipts: Mutex<HashMap<B256, SweepReceipt>>,
    submitted: Mutex<Vec<u64>>,
    pub fail_submits: AtomicBool,
    pub unreachable: AtomicBool,
    /// Latency added to every submission, in milliseconds
    pub submit_delay_ms: AtomicU64,
}

impl InMemoryChain {
    pub fn new(start_nonce: u64) -> Self {
        Self {
            sponsor: Address::repeat_byte(0x5a),
            start_nonce,
            balances: Mutex::new(HashMap::new()),
            receipts: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            fail_submits: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
            submit_delay_ms: AtomicU64::new(0),
        }
    }

    /// Credit `asset` to the requester's mapped destination account
    pub fn fund(&self, requester: Address, asset: Address, amount: u128) {
        self.balances.lock().unwrap().insert(
            (AccountId32::from_evm(&requester), asset),
            U256::from(amount),
        );
    }

    pub fn submitted_nonces(&self) -> Vec<u64> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SweeperChain for InMemoryChain {
    fn sponsor(&self) -> Address {
        self.sponsor
    }

    async fn pending_nonce(&self) -> Result<u64> {
        Ok(self.start_nonce)
    }

    async fn submit_sweep(&self, nonce: u64, call: &SweepCall) -> Result<B256> {
        if self.fail_submits.load(Ordering::SeqCst) {
            anyhow::bail!("insufficient funds for gas");
        }
        assert_eq!(call.signature.len(), 65);
        let delay = self.submit_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.submitted.lock().unwrap().push(nonce);

        let tx_hash = B256::left_padding_from(&nonce.to_be_bytes());
        self.receipts.lock().unwrap().insert(
            tx_hash,
            SweepReceipt {
                tx_hash,
                block_number: 1_000 + nonce,
                gas_used: 150_000,
                success: true,
                commission: U256::from(42u64),
            },
        );
        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<SweepReceipt>> {
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn asset_balance(&self, account: &AccountId32, asset: Address) -> Result<U256> {
        if self.unreachable.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(*account, asset))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn sponsor_balance(&self) -> Result<U256> {
        if self.unreachable.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(U256::from(10u64).pow(U256::from(18u64)))
    }

    async fn gas_tank(&self) -> Result<U256> {
        Ok(U256::from(2_500_000_000_000_000_000u128))
    }

    async fn collected_fees(&self) -> Result<U256> {
        Ok(U256::from(42u64))
    }

    async fn is_relayer(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Fixed price table
pub struct TableOracle(pub HashMap<Address, AssetQuote>);

#[async_trait]
impl PriceOracle for TableOracle {
    async fn quote(&self, asset: Address) -> Result<Option<AssetQuote>> {
        Ok(self.0.get(&asset).cloned())
    }
}

/// A 10-decimal asset from a direct-route chain, priced 1:1 with DOT
pub const DOT_LIKE: Address = address!("d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0");
/// A second priced asset for multi-asset batches
pub const USDT_LIKE: Address = address!("0707070707070707070707070707070707070707");

pub fn default_quotes() -> HashMap<Address, AssetQuote> {
    HashMap::from([
        (
            DOT_LIKE,
            AssetQuote {
                symbol: "DOT".to_string(),
                decimals: 10,
                price_dot: 1.0,
                chain: "Polkadot".to_string(),
                source_fee_dot: 0.001,
                is_sufficient: true,
            },
        ),
        (
            USDT_LIKE,
            AssetQuote {
                symbol: "USDT".to_string(),
                decimals: 6,
                price_dot: 0.2,
                chain: "AssetHub".to_string(),
                source_fee_dot: 0.001,
                is_sufficient: true,
            },
        ),
    ])
}

pub struct TestApp {
    pub address: String,
    pub chain: Arc<InMemoryChain>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub async fn post_purge(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/purge"))
            .json(body)
            .send()
            .await
            .expect("Failed to send purge request")
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let mut config = Config::with_defaults();
    config.dispatch.submit = RetryPolicy::new(2, Duration::from_millis(10));
    config.dispatch.confirm = RetryPolicy::new(2, Duration::from_millis(10));
    configure(&mut config);

    let chain = Arc::new(InMemoryChain::new(0));
    let oracle = Arc::new(TableOracle(default_quotes()));

    let app_context = dust_relayer::build_context(Arc::new(config), chain.clone(), oracle)
        .await
        .expect("Failed to build app context");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    tokio::spawn(dust_relayer::serve(listener, app_context));

    TestApp {
        address,
        chain,
        client: reqwest::Client::new(),
    }
}

/// Build a signed `/purge` body for `assets` with decimal-string amounts
pub fn signed_purge_body(signer: &PrivateKeySigner, assets: &[Address], amounts: &[u128]) -> Value {
    let requester = signer.address().to_string();
    let asset_strings: Vec<String> = assets.iter().map(|a| a.to_string()).collect();
    let message = canonical_message(&requester, &asset_strings);
    let signature = signer
        .sign_message_sync(message.as_bytes())
        .expect("Failed to sign");

    json!({
        "requesterAddress": requester,
        "assets": asset_strings,
        "amounts": amounts.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
        "signature": format!("0x{}", hex::encode(signature.as_bytes())),
        "targetChainId": 420420421u64,
    })
}
