//! # Zarban Rust SDK
//!
//! A Rust SDK for the Zarban wallet and service APIs.
//!
//! ## Modules
//!
//! This SDK provides two REST clients:
//! - [`wallet`]: accounts, child users and loans
//! - [`service`]: stablecoin vaults, staking and decoded transaction logs
//!
//! On-chain execution (behind the default `chain` feature):
//! - [`chain`]: keys, legacy transaction signing, JSON-RPC and receipt polling
//! - [`steps`]: step-by-step execution of multi-transaction plans and the transaction log
//!
//! Plus shared modules:
//! - [`api`]: HTTP transport and response classification
//! - [`shared`]: human-to-native amount conversion and serde helpers
//!
//! ## Quick Start - Wallet
//!
//! ```rust,ignore
//! use zarban::network::Network;
//! use zarban::wallet::{LoanCreateRequest, LoanToValueOption, WalletClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut wallet = WalletClient::for_network(Network::Testnet)?;
//!     wallet.login("user@example.com", "password").await?;
//!
//!     let preview =
//!         LoanCreateRequest::with_collateral("DAIA", "DAI", "100", LoanToValueOption::Safe)
//!             .preview();
//!     let loan = wallet.create_loan(&preview).await?;
//!     println!("Liquidation price: {:?}", loan.liquidation_price);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start - Vault Creation
//!
//! ```rust,ignore
//! use zarban::chain::{address_of, signer_from_hex, EvmRpc};
//! use zarban::service::{ServiceClient, VaultCreation};
//! use zarban::steps::{ExecutorConfig, StepExecutor, TransactionLog, DEFAULT_LOG_FILE};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ServiceClient::new("https://testapi.zarban.io")?;
//!     let user = address_of(&private_key)?;
//!
//!     let vault = VaultCreation::prepare(&service, "ETHA", "ETH", &user, 0.001, 100.0).await?;
//!     let executor = StepExecutor::new(
//!         EvmRpc::new(&rpc_url)?,
//!         signer_from_hex(&private_key)?,
//!         TransactionLog::new(DEFAULT_LOG_FILE),
//!         ExecutorConfig::vault_creation(),
//!     );
//!
//!     let report = executor.execute(&vault).await?;
//!     println!("Vault id: {:?}", report.derived_id);
//!     Ok(())
//! }
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// HTTP transport and response classification shared by both clients.
pub mod api;

/// Top-level error type.
pub mod error;

/// Wallet and service base URLs per network.
pub mod network;

/// Service API client and plan-producing operations.
pub mod service;

/// Amount conversion and serde helpers.
pub mod shared;

/// Wallet API client.
pub mod wallet;

/// EVM signing, RPC and receipt polling.
#[cfg(feature = "chain")]
pub mod chain;

/// Step executor and transaction log.
#[cfg(feature = "chain")]
pub mod steps;

pub use error::{SdkError, SdkResult};

// ============================================================================
// PRELUDE
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use zarban::prelude::*;
/// ```
pub mod prelude {
    // Errors
    pub use crate::error::{SdkError, SdkResult};

    // Transport and response classification
    pub use crate::api::{
        ApiError, ApiResult, ApiTransport, ErrorBody, ErrorKind, ErrorResponse, RetryConfig,
    };

    // Network constants
    pub use crate::network::{
        Network, SERVICE_MAINNET_URL, SERVICE_TESTNET_URL, WALLET_MAINNET_URL, WALLET_TESTNET_URL,
    };

    // Wallet
    pub use crate::wallet::{
        LoanCreateIntent, LoanCreateRequest, LoanToValueOption, LoansResponse, RepayLoanIntent,
        WalletClient, WalletClientBuilder,
    };

    // Service
    pub use crate::service::{
        ChainActivity, PlanSource, PreparedTx, ServiceClient, ServiceClientBuilder,
        StakingWithdrawal, VaultCreation, VaultRepayment,
    };

    // Amount conversion
    pub use crate::shared::{
        to_native, HumanAmount, NativeAmount, ScalingError, SymbolDecimals,
        DEFAULT_TOKEN_DECIMALS,
    };

    // Chain (conditionally exported)
    #[cfg(feature = "chain")]
    pub use crate::chain::{
        address_of, signer_from_hex, ChainError, ChainRpc, ConfirmationPolicy, EvmRpc,
        PrivateKeySigner,
    };

    #[cfg(feature = "chain")]
    pub use crate::steps::{
        ExecutionReport, ExecutorConfig, StepExecutor, TimeoutPolicy, TransactionLog,
        DEFAULT_LOG_FILE, DEFAULT_REPAY_LOG_FILE,
    };
}
