//! Shared utilities used across the API and chain modules.

pub mod scaling;
pub mod serde_util;

pub use scaling::{
    to_native, HumanAmount, NativeAmount, ScalingError, SymbolDecimals, DEFAULT_TOKEN_DECIMALS,
    ZAR_SYMBOL,
};
