//! Unified SDK error types.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::shared::scaling::ScalingError;

#[cfg(feature = "chain")]
use crate::chain::error::ChainError;
#[cfg(feature = "chain")]
use crate::steps::executor::PlanError;
#[cfg(feature = "chain")]
use crate::steps::tx_log::TxLogError;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Amount conversion error: {0}")]
    Scaling(#[from] ScalingError),

    #[cfg(feature = "chain")]
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[cfg(feature = "chain")]
    #[error("Transaction log error: {0}")]
    TxLog(#[from] TxLogError),

    #[cfg(feature = "chain")]
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),
}

/// Result type alias for SDK operations.
pub type SdkResult<T> = Result<T, SdkError>;

impl SdkError {
    /// The API error, if this came from a REST call.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            SdkError::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Multi-line console report; structured for API errors.
    pub fn pretty(&self) -> String {
        match self {
            SdkError::Api(e) => e.pretty(),
            other => format!("{}\n", other),
        }
    }
}
