//! Ethereum JSON-RPC access used by the step executor.

use async_trait::async_trait;

use alloy::network::{Ethereum, ReceiptResponse as _};
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, RootProvider};

use super::error::ChainError;

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    /// `false` when execution reverted
    pub success: bool,
}

/// The RPC calls the step executor makes against a node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Transaction count including pending transactions.
    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError>;

    /// Suggested legacy gas price in wei.
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Broadcast a signed, encoded transaction; returns its hash.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError>;

    /// `None` while the transaction is not mined.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ReceiptSummary>, ChainError>;
}

/// [`ChainRpc`] over an alloy HTTP provider.
#[derive(Clone)]
pub struct EvmRpc {
    provider: RootProvider<Ethereum>,
}

impl EvmRpc {
    pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        Ok(Self {
            provider: RootProvider::new_http(url),
        })
    }

    pub fn provider(&self) -> &RootProvider<Ethereum> {
        &self.provider
    }
}

#[async_trait]
impl ChainRpc for EvmRpc {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get chain id: {}", e)))
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get nonce: {}", e)))
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get gas price: {}", e)))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to send transaction: {}", e)))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ReceiptSummary>, ChainError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get receipt: {}", e)))?;

        Ok(receipt.map(|receipt| ReceiptSummary {
            tx_hash: hash,
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: receipt.gas_used,
            success: receipt.status(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rpc_url() {
        assert!(matches!(
            EvmRpc::new("not a url"),
            Err(ChainError::InvalidRpcUrl(_))
        ));
    }

    #[test]
    fn test_valid_rpc_url() {
        assert!(EvmRpc::new("https://sepolia.example.org").is_ok());
    }
}
