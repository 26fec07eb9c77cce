//! Multi-step on-chain operations and their transaction log.
//!
//! ```rust,ignore
//! use zarban::chain::{signer_from_hex, EvmRpc};
//! use zarban::service::{ServiceClient, VaultCreation};
//! use zarban::steps::{ExecutorConfig, StepExecutor, TransactionLog, DEFAULT_LOG_FILE};
//!
//! let executor = StepExecutor::new(
//!     EvmRpc::new(&rpc_url)?,
//!     signer_from_hex(&private_key)?,
//!     TransactionLog::new(DEFAULT_LOG_FILE),
//!     ExecutorConfig::vault_creation(),
//! );
//!
//! let vault = VaultCreation::prepare(&client, "ETHA", "ETH", &address, 0.001, 100.0).await?;
//! let report = executor.execute(&vault).await?;
//! println!("vault id: {:?}", report.derived_id);
//! ```

pub mod executor;
pub mod tx_log;

pub use executor::{
    DerivedIdRule, ExecutionReport, ExecutorConfig, PlanError, StepExecutor, SubmittedStep,
    TimeoutPolicy,
};
pub use tx_log::{
    SubmittedTransaction, TransactionLog, TransactionLogEntry, TxLogError, DEFAULT_LOG_FILE,
    DEFAULT_REPAY_LOG_FILE, UNKNOWN_VAULT_ID,
};
