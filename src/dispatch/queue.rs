use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::{DispatchError, NonceAllocator, retry};
use crate::chain::{SweepCall, SweepReceipt, SweeperChain};
use crate::config::DispatchConfig;
use crate::metrics;

type Completion = oneshot::Sender<Result<SweepReceipt, DispatchError>>;

/// A sweep waiting for the worker, plus the handle that reports its outcome
struct QueuedTransaction {
    call: SweepCall,
    respond_to: Completion,
}

/// Point-in-time view of the queue for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    /// Transactions enqueued but not yet picked up by the worker
    pub depth: usize,
    /// Whether the worker is currently submitting or confirming
    pub busy: bool,
    /// Nonce the next transaction will be signed with
    pub next_nonce: u64,
    pub in_flight: usize,
}

#[derive(Debug, Default)]
struct SharedStatus {
    depth: AtomicUsize,
    busy: AtomicBool,
    next_nonce: AtomicU64,
    in_flight: AtomicUsize,
}

/// Handle to the single dispatch worker.
///
/// Cloning the handle shares the same worker; the worker exits once every
/// handle is dropped and the channel drains.
#[derive(Clone)]
pub struct DispatchQueue {
    sender: mpsc::UnboundedSender<QueuedTransaction>,
    status: Arc<SharedStatus>,
}

impl DispatchQueue {
    /// Spawn the worker. `initial_nonce` is the sponsor's pending nonce as
    /// reported by the chain at startup.
    pub fn start(chain: Arc<dyn SweeperChain>, initial_nonce: u64, config: DispatchConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let status = Arc::new(SharedStatus::default());
        status.next_nonce.store(initial_nonce, Ordering::SeqCst);

        let worker = DispatchWorker {
            chain,
            nonces: NonceAllocator::new(initial_nonce),
            config,
            receiver,
            status: status.clone(),
        };
        tokio::spawn(worker.run());

        tracing::info!(initial_nonce = initial_nonce, "Dispatch worker started");

        Self { sender, status }
    }

    /// Append `call` to the queue. Position in the queue is fixed when this
    /// returns; await the receiver for the outcome.
    pub fn enqueue(
        &self,
        call: SweepCall,
    ) -> Result<oneshot::Receiver<Result<SweepReceipt, DispatchError>>, DispatchError> {
        let (respond_to, outcome) = oneshot::channel();

        self.status.depth.fetch_add(1, Ordering::SeqCst);
        if self
            .sender
            .send(QueuedTransaction { call, respond_to })
            .is_err()
        {
            self.status.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(DispatchError::WorkerUnavailable);
        }
        metrics::DISPATCH_QUEUE_DEPTH.set(self.status.depth.load(Ordering::SeqCst) as i64);

        Ok(outcome)
    }

    /// Enqueue and wait until the transaction is confirmed or has failed
    pub async fn dispatch(&self, call: SweepCall) -> Result<SweepReceipt, DispatchError> {
        let outcome = self.enqueue(call)?;
        outcome.await.map_err(|_| DispatchError::WorkerUnavailable)?
    }

    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            depth: self.status.depth.load(Ordering::SeqCst),
            busy: self.status.busy.load(Ordering::SeqCst),
            next_nonce: self.status.next_nonce.load(Ordering::SeqCst),
            in_flight: self.status.in_flight.load(Ordering::SeqCst),
        }
    }
}

/// Sole owner of the sponsor nonce state
struct DispatchWorker {
    chain: Arc<dyn SweeperChain>,
    nonces: NonceAllocator,
    config: DispatchConfig,
    receiver: mpsc::UnboundedReceiver<QueuedTransaction>,
    status: Arc<SharedStatus>,
}

impl DispatchWorker {
    async fn run(mut self) {
        while let Some(item) = self.receiver.recv().await {
            let depth = self.status.depth.fetch_sub(1, Ordering::SeqCst) - 1;
            metrics::DISPATCH_QUEUE_DEPTH.set(depth as i64);
            self.status.busy.store(true, Ordering::SeqCst);

            let outcome = self.execute(&item.call).await;

            match &outcome {
                Ok(receipt) => {
                    metrics::SWEEPS_DISPATCHED_TOTAL.inc();
                    tracing::info!(
                        tx_hash = %receipt.tx_hash,
                        block_number = receipt.block_number,
                        gas_used = receipt.gas_used,
                        "Sweep confirmed"
                    );
                }
                Err(e) => {
                    metrics::DISPATCH_FAILURES_TOTAL.inc();
                    tracing::error!(error = %e, "Sweep dispatch failed");
                }
            }

            self.status.busy.store(false, Ordering::SeqCst);

            // The requester may have disconnected; the transaction outcome stands either way
            if item.respond_to.send(outcome).is_err() {
                tracing::debug!("Dispatch outcome dropped, requester no longer waiting");
            }
        }

        tracing::info!("Dispatch worker stopped");
    }

    /// Acquire a nonce, submit, confirm, and release the nonce on every path
    async fn execute(&mut self, call: &SweepCall) -> Result<SweepReceipt, DispatchError> {
        let nonce = self.nonces.acquire();
        self.publish_nonce_state();
        tracing::debug!(nonce = nonce, assets = call.assets.len(), "Nonce acquired");

        let started = Instant::now();
        let outcome = self.submit_and_confirm(nonce, call).await;
        metrics::DISPATCH_TIME.observe(started.elapsed().as_secs_f64());

        self.nonces.release(nonce);
        self.publish_nonce_state();
        tracing::debug!(nonce = nonce, "Nonce released");

        outcome
    }

    async fn submit_and_confirm(
        &self,
        nonce: u64,
        call: &SweepCall,
    ) -> Result<SweepReceipt, DispatchError> {
        let chain: &dyn SweeperChain = self.chain.as_ref();

        let tx_hash = retry(self.config.submit, "submit_sweep", move |_| {
            chain.submit_sweep(nonce, call)
        })
        .await
        .map_err(|e| DispatchError::Submission(format!("{:#}", e)))?;

        tracing::info!(nonce = nonce, tx_hash = %tx_hash, "Sweep submitted");

        let receipt = retry(self.config.confirm, "await_receipt", move |_| async move {
            let mined: Option<SweepReceipt> = chain.receipt(tx_hash).await?;
            mined.ok_or_else(|| anyhow::anyhow!("transaction {} not yet mined", tx_hash))
        })
        .await
        .map_err(|e| DispatchError::Confirmation(format!("{:#}", e)))?;

        if !receipt.success {
            return Err(DispatchError::Reverted(tx_hash));
        }

        Ok(receipt)
    }

    fn publish_nonce_state(&self) {
        self.status
            .next_nonce
            .store(self.nonces.next(), Ordering::SeqCst);
        self.status
            .in_flight
            .store(self.nonces.in_flight_len(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::AccountId32;
    use crate::dispatch::RetryPolicy;
    use alloy::primitives::{Address, B256, Bytes, U256};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Chain double: records submissions and mines every transaction at once,
    /// except nonces listed in `unmined_nonces`
    #[derive(Default)]
    struct RecordingChain {
        submitted: Mutex<Vec<(u64, Address)>>,
        failing_submits: AtomicUsize,
        failing_receipts: AtomicUsize,
        reverting_nonces: Vec<u64>,
        unmined_nonces: Vec<u64>,
        receipts: Mutex<HashMap<B256, SweepReceipt>>,
    }

    #[async_trait]
    impl SweeperChain for RecordingChain {
        fn sponsor(&self) -> Address {
            Address::repeat_byte(0x55)
        }

        async fn pending_nonce(&self) -> Result<u64> {
            Ok(0)
        }

        async fn submit_sweep(&self, nonce: u64, call: &SweepCall) -> Result<B256> {
            if self.failing_submits.load(Ordering::SeqCst) > 0 {
                self.failing_submits.fetch_sub(1, Ordering::SeqCst);
                anyhow::bail!("nonce too low");
            }
            self.submitted.lock().await.push((nonce, call.requester));

            let tx_hash = B256::left_padding_from(&nonce.to_be_bytes());
            if self.unmined_nonces.contains(&nonce) {
                return Ok(tx_hash);
            }
            self.receipts.lock().await.insert(
                tx_hash,
                SweepReceipt {
                    tx_hash,
                    block_number: 100 + nonce,
                    gas_used: 21_000,
                    success: !self.reverting_nonces.contains(&nonce),
                    commission: U256::from(5u64),
                },
            );
            Ok(tx_hash)
        }

        async fn receipt(&self, tx_hash: B256) -> Result<Option<SweepReceipt>> {
            if self.failing_receipts.load(Ordering::SeqCst) > 0 {
                self.failing_receipts.fetch_sub(1, Ordering::SeqCst);
                anyhow::bail!("rpc timeout");
            }
            Ok(self.receipts.lock().await.get(&tx_hash).cloned())
        }

        async fn asset_balance(&self, _account: &AccountId32, _asset: Address) -> Result<U256> {
            Ok(U256::ZERO)
        }

        async fn sponsor_balance(&self) -> Result<U256> {
            Ok(U256::ZERO)
        }

        async fn gas_tank(&self) -> Result<U256> {
            Ok(U256::ZERO)
        }

        async fn collected_fees(&self) -> Result<U256> {
            Ok(U256::ZERO)
        }

        async fn is_relayer(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn fast_config() -> DispatchConfig {
        DispatchConfig {
            submit: RetryPolicy::new(2, Duration::from_millis(10)),
            confirm: RetryPolicy::new(2, Duration::from_millis(10)),
        }
    }

    fn call(tag: u8) -> SweepCall {
        SweepCall {
            requester: Address::repeat_byte(tag),
            assets: vec![Address::repeat_byte(0xA0)],
            amounts: vec![U256::from(1u64)],
            signature: Bytes::from(vec![0u8; 65]),
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_distinct_nonces_in_enqueue_order() {
        let chain = Arc::new(RecordingChain::default());
        let queue = DispatchQueue::start(chain.clone(), 7, fast_config());

        let pending: Vec<_> = (1..=5u8).map(|tag| queue.enqueue(call(tag)).unwrap()).collect();
        let mut receipts = Vec::new();
        for outcome in pending {
            receipts.push(outcome.await.unwrap().unwrap());
        }

        let submitted = chain.submitted.lock().await.clone();
        let expected: Vec<(u64, Address)> = (1..=5u8)
            .map(|tag| (6 + tag as u64, Address::repeat_byte(tag)))
            .collect();
        assert_eq!(submitted, expected);
        assert_eq!(receipts.last().unwrap().block_number, 111);

        let status = queue.status();
        assert_eq!(status.next_nonce, 12);
        assert_eq!(status.in_flight, 0);
        assert_eq!(status.depth, 0);
        assert!(!status.busy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_releases_nonce() {
        let chain = Arc::new(RecordingChain::default());
        chain.failing_submits.store(2, Ordering::SeqCst);
        let queue = DispatchQueue::start(chain.clone(), 0, fast_config());

        let result = queue.dispatch(call(1)).await;
        assert!(matches!(result, Err(DispatchError::Submission(ref cause)) if cause.contains("nonce too low")));
        assert_eq!(queue.status().in_flight, 0);

        // The failed nonce is not reused; the next request moves on
        let receipt = queue.dispatch(call(2)).await.unwrap();
        assert_eq!(receipt.block_number, 101);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_submit_failure_is_retried() {
        let chain = Arc::new(RecordingChain::default());
        chain.failing_submits.store(1, Ordering::SeqCst);
        let queue = DispatchQueue::start(chain.clone(), 3, fast_config());

        let receipt = queue.dispatch(call(1)).await.unwrap();
        assert_eq!(receipt.block_number, 103);
        assert_eq!(chain.submitted.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_dispatch_error() {
        let chain = Arc::new(RecordingChain {
            reverting_nonces: vec![0],
            ..Default::default()
        });
        let queue = DispatchQueue::start(chain, 0, fast_config());

        let result = queue.dispatch(call(1)).await;
        assert!(matches!(result, Err(DispatchError::Reverted(_))));
        assert_eq!(queue.status().in_flight, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmined_transaction_fails_confirmation_and_releases_nonce() {
        let chain = Arc::new(RecordingChain {
            unmined_nonces: vec![0],
            ..Default::default()
        });
        let queue = DispatchQueue::start(chain.clone(), 0, fast_config());

        let result = queue.dispatch(call(1)).await;
        assert!(matches!(result, Err(DispatchError::Confirmation(ref cause)) if cause.contains("not yet mined")));
        assert_eq!(queue.status().in_flight, 0);

        let receipt = queue.dispatch(call(2)).await.unwrap();
        assert_eq!(receipt.block_number, 101);
        assert_eq!(queue.status().next_nonce, 2);
        assert_eq!(queue.status().in_flight, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_receipt_rpc_errors_fail_confirmation_and_release_nonce() {
        let chain = Arc::new(RecordingChain::default());
        // One error per confirmation attempt
        chain.failing_receipts.store(2, Ordering::SeqCst);
        let queue = DispatchQueue::start(chain.clone(), 0, fast_config());

        let result = queue.dispatch(call(1)).await;
        assert!(matches!(result, Err(DispatchError::Confirmation(ref cause)) if cause.contains("rpc timeout")));
        assert_eq!(queue.status().in_flight, 0);

        let receipt = queue.dispatch(call(2)).await.unwrap();
        assert_eq!(receipt.block_number, 101);
        assert_eq!(chain.submitted.lock().await.len(), 2);
    }
}
