//! Client for the Zarban service API.
//!
//! Covers the stablecoin system (ilks, vault create/repay plans), staking
//! withdrawals and decoded transaction logs. Plan-producing operations are
//! wrapped as [`PlanSource`]s for the step executor.
//!
//! ```rust,ignore
//! use zarban::service::{ServiceClient, VaultCreation};
//!
//! let client = ServiceClient::new("https://testapi.zarban.io")?;
//!
//! // Symbols are validated against the ilk list
//! let native = client.to_native("ETH", 0.001).await?;
//! assert_eq!(native.as_str(), "1000000000000000");
//!
//! let vault = VaultCreation::prepare(&client, "ETHA", "ETH", &address, 0.001, 100.0).await?;
//! let plan = vault.fetch_plan().await?;
//! println!("step {}/{}", plan.step_number, plan.number_of_steps);
//! ```

pub mod client;
pub mod operations;
pub mod types;

pub use client::{ServiceClient, ServiceClientBuilder};
pub use operations::{PlanSource, StakingWithdrawal, VaultCreation, VaultRepayment};
pub use types::*;
