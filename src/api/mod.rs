//! Shared REST layer for the Zarban wallet and service APIs.
//!
//! [`ApiTransport`] sends requests and hands every response to
//! [`classify_response`], which yields either the decoded body or an
//! [`ApiError`] carrying one of three error shapes:
//!
//! - **User error**: localized messages with suggested solutions, keyed by locale
//! - **API error**: an operational message plus a list of reasons
//! - **Unhandled**: anything else, kept as raw text
//!
//! # Error Handling
//!
//! ```rust,ignore
//! use zarban::api::ApiError;
//!
//! match client.get_loan_details("DAIA#2825").await {
//!     Ok(loan) => println!("State: {:?}", loan.state_en()),
//!     Err(e) if e.is_not_found() => println!("No such loan"),
//!     Err(e) => println!("{}", e.pretty()),
//! }
//! ```
//!
//! # Transport Configuration
//!
//! ```rust,ignore
//! use zarban::api::{ApiTransport, RetryConfig};
//! use std::time::Duration;
//!
//! let transport = ApiTransport::builder("https://testapi.zarban.io")
//!     .timeout(Duration::from_secs(60))
//!     .with_retry(RetryConfig::new(3))
//!     .auth_token(token)
//!     .build()?;
//! ```

pub mod client;
pub mod error;

pub use client::{ApiTransport, ApiTransportBuilder, RetryConfig, CHILD_USER_HEADER};
pub use error::{
    classify_response, ApiError, ApiResult, ErrorBody, ErrorKind, ErrorResponse, GenericError,
    LocalizedMessage, RequestMeta, UserError, REQUEST_ID_HEADER,
};
