//! Error types for EVM interaction.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while signing, broadcasting or confirming transactions.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid calldata: {0}")]
    InvalidCalldata(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// JSON-RPC or transport failure
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// No receipt appeared within the confirmation budget
    #[error("Transaction {tx_hash} not mined after {} seconds", waited.as_secs())]
    ConfirmationTimeout { tx_hash: String, waited: Duration },

    /// Mined with a failure status
    #[error("Transaction {tx_hash} reverted in block {block_number}")]
    TransactionReverted { tx_hash: String, block_number: u64 },
}

impl ChainError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ChainError::ConfirmationTimeout { .. })
    }
}
