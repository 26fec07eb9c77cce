//! Polling for transaction receipts under a fixed wait budget.

use std::time::Duration;

use alloy::primitives::B256;
use tokio::time::Instant;

use super::error::ChainError;
use super::rpc::{ChainRpc, ReceiptSummary};

/// Lower bound on the poll interval so a zero interval cannot spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for a receipt and how often to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl ConfirmationPolicy {
    pub const fn new(max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            max_wait,
            poll_interval,
        }
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(120), Duration::from_secs(15))
    }
}

/// Poll until `hash` has a receipt or `policy.max_wait` elapses.
///
/// RPC errors while polling are logged and polling continues. On timeout the
/// elapsed time is at least `max_wait` and at most `max_wait + poll_interval`
/// (plus RPC latency).
pub async fn wait_for_receipt<R>(
    rpc: &R,
    hash: B256,
    policy: ConfirmationPolicy,
) -> Result<ReceiptSummary, ChainError>
where
    R: ChainRpc + ?Sized,
{
    let start = Instant::now();
    let interval = policy.poll_interval.max(MIN_POLL_INTERVAL);

    while start.elapsed() < policy.max_wait {
        match rpc.transaction_receipt(hash).await {
            Ok(Some(receipt)) => return Ok(receipt),
            Ok(None) => {}
            Err(e) => tracing::warn!(tx_hash = %hash, error = %e, "Error checking transaction receipt"),
        }

        tracing::info!(tx_hash = %hash, "Waiting for transaction to be mined");
        tokio::time::sleep(interval).await;
    }

    tracing::warn!(
        tx_hash = %hash,
        waited_secs = policy.max_wait.as_secs(),
        "Transaction not mined within wait budget"
    );
    Err(ChainError::ConfirmationTimeout {
        tx_hash: hash.to_string(),
        waited: policy.max_wait,
    })
}
