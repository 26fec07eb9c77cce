//! Service API client implementation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::api::client::{ApiTransport, ApiTransportBuilder, RetryConfig};
use crate::api::error::{ApiError, ApiResult};
use crate::error::SdkResult;
use crate::network::Network;
use crate::service::types::*;
use crate::shared::scaling::{HumanAmount, NativeAmount, SymbolDecimals};

const ILKS_PATH: &str = "/v2/stablecoin-system/ilks";
const CREATE_VAULT_TX_PATH: &str = "/v2/stablecoin-system/vaults/tx/create";
const REPAY_ZAR_TX_PATH: &str = "/v2/stablecoin-system/vaults/tx/repay-zar";
const LOGS_PATH: &str = "/v2/common/logs";
const STAKING_WITHDRAW_TX_PATH: &str = "/v2/staking/tx/withdraw";

/// Builder for configuring [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    inner: ApiTransportBuilder,
}

impl ServiceClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            inner: ApiTransportBuilder::new(base_url),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.inner = self.inner.with_retry(config);
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.auth_token(token);
        self
    }

    pub fn build(self) -> ApiResult<ServiceClient> {
        Ok(ServiceClient {
            transport: self.inner.build()?,
            symbol_cache: Arc::new(RwLock::new(None)),
        })
    }
}

/// Client for the Zarban service API (stablecoin system, staking, logs).
///
/// Cloning is cheap; clones share the HTTP connection pool and the symbol cache.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    transport: ApiTransport,
    symbol_cache: Arc<RwLock<Option<SymbolDecimals>>>,
}

impl ServiceClient {
    /// Create a client with default settings.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        ServiceClientBuilder::new(base_url).build()
    }

    pub fn for_network(network: Network) -> ApiResult<Self> {
        Self::new(network.service_url())
    }

    pub fn builder(base_url: impl Into<String>) -> ServiceClientBuilder {
        ServiceClientBuilder::new(base_url)
    }

    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.transport.set_auth_token(token);
    }

    pub fn clear_auth_token(&mut self) {
        self.transport.clear_auth_token();
    }

    // =========================================================================
    // Stablecoin system endpoints
    // =========================================================================

    /// All collateral types.
    pub async fn get_all_ilks(&self) -> ApiResult<IlksResponse> {
        self.transport.get(ILKS_PATH).await
    }

    /// Steps for creating a vault.
    pub async fn create_stablecoin_vault(
        &self,
        request: &CreateVaultTxRequest,
    ) -> ApiResult<ChainActivity> {
        Self::validate_address(&request.user)?;
        if request.ilk_name.is_empty() {
            return Err(ApiError::InvalidParameter("ilk_name cannot be empty".to_string()));
        }
        self.transport.post(CREATE_VAULT_TX_PATH, request).await
    }

    /// Steps for repaying ZAR debt on a vault.
    pub async fn repay_stablecoin_vault(
        &self,
        request: &RepayZarTxRequest,
    ) -> ApiResult<ChainActivity> {
        Self::validate_address(&request.user)?;
        self.transport.post(REPAY_ZAR_TX_PATH, request).await
    }

    /// Decoded event logs emitted by a transaction.
    pub async fn get_logs_by_tx_hash(&self, tx_hash: &str) -> ApiResult<EventDetailsResponse> {
        if tx_hash.is_empty() {
            return Err(ApiError::InvalidParameter("tx_hash cannot be empty".to_string()));
        }
        let path = format!("{}/{}", LOGS_PATH, urlencoding::encode(tx_hash));
        self.transport.get(&path).await
    }

    // =========================================================================
    // Staking endpoints
    // =========================================================================

    /// Steps for withdrawing from staking.
    pub async fn staking_withdraw(
        &self,
        request: &StakingWithdrawTxRequest,
    ) -> ApiResult<ChainActivity> {
        Self::validate_address(&request.user)?;
        self.transport.post(STAKING_WITHDRAW_TX_PATH, request).await
    }

    // =========================================================================
    // Symbol decimals
    // =========================================================================

    /// Known symbols and their decimals: `ZAR` plus every ilk symbol.
    ///
    /// The first call fetches the ilk list; later calls are served from cache
    /// until [`clear_symbol_cache`](Self::clear_symbol_cache).
    pub async fn symbol_decimals(&self) -> ApiResult<SymbolDecimals> {
        // Fast path: read lock
        {
            let cache = self.symbol_cache.read().await;
            if let Some(known) = cache.as_ref() {
                return Ok(known.clone());
            }
        }

        // Slow path: fetch + write lock
        let ilks = self.get_all_ilks().await?;
        let known = SymbolDecimals::from_ilk_symbols(ilks.data.into_iter().map(|ilk| ilk.symbol));
        tracing::debug!(
            symbols = ?known.symbols().collect::<Vec<_>>(),
            "Cached symbol decimals"
        );

        *self.symbol_cache.write().await = Some(known.clone());
        Ok(known)
    }

    pub async fn clear_symbol_cache(&self) {
        *self.symbol_cache.write().await = None;
    }

    /// Convert a human amount of `symbol` into native units.
    pub async fn to_native<A: HumanAmount>(&self, symbol: &str, amount: A) -> SdkResult<NativeAmount> {
        let known = self.symbol_decimals().await?;
        Ok(known.to_native(symbol, amount)?)
    }

    // =========================================================================
    // Validation helpers
    // =========================================================================

    fn validate_address(address: &str) -> ApiResult<()> {
        let hex_part = address.strip_prefix("0x").unwrap_or(address);
        if hex_part.len() != 40 || hex::decode(hex_part).is_err() {
            return Err(ApiError::InvalidParameter(format!(
                "user must be a 20-byte hex address, got '{}'",
                address
            )));
        }
        Ok(())
    }
}
