//! Client for the Zarban wallet API.
//!
//! Covers email/password auth, child users and loans.
//!
//! ```rust,ignore
//! use zarban::wallet::{LoanCreateRequest, LoanToValueOption, WalletClient};
//! use zarban::network::Network;
//!
//! let mut client = WalletClient::for_network(Network::Testnet)?;
//! client.login("user@example.com", "your_secure_password").await?;
//!
//! // Act on behalf of a child user
//! let child = client.with_child_user("child_user_test");
//! let loan = child
//!     .create_loan(&LoanCreateRequest::with_collateral(
//!         "DAIA",
//!         "DAI",
//!         "1000",
//!         LoanToValueOption::Safe,
//!     ))
//!     .await?;
//!
//! let details = client.get_loan_details(&loan.id).await?;
//! println!("State: {:?}", details.state_en());
//! ```

pub mod client;
pub mod types;

pub use client::{WalletClient, WalletClientBuilder};
pub use types::*;
