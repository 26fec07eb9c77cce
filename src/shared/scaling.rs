//! Conversion of human-readable token amounts into native on-chain units.
//!
//! Every input is reduced to its plain decimal digit string and scaled by
//! shifting the decimal point, so neither the integer nor the fractional
//! part is bound by a fixed-width type. No async, no network calls.
//!
//! ```text
//! native = amount * 10^decimals      (must be an exact integer)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places used by ZAR and every ilk collateral token.
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Symbol of the Zarban stablecoin.
pub const ZAR_SYMBOL: &str = "ZAR";

/// Errors that can occur while converting to native units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalingError {
    /// The scaled amount has a fractional part.
    PrecisionLoss { amount: String, decimals: u32 },
    UnknownSymbol(String),
    Negative(String),
    NotFinite(String),
    InvalidDecimal { input: String, reason: String },
}

impl fmt::Display for ScalingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingError::PrecisionLoss { amount, decimals } => write!(
                f,
                "Lost precision converting {} to {} decimals",
                amount, decimals
            ),
            ScalingError::UnknownSymbol(s) => write!(f, "Unknown symbol: {}", s),
            ScalingError::Negative(v) => write!(f, "Amount must not be negative, got {}", v),
            ScalingError::NotFinite(v) => write!(f, "Amount must be finite, got {}", v),
            ScalingError::InvalidDecimal { input, reason } => {
                write!(f, "Invalid decimal '{}': {}", input, reason)
            }
        }
    }
}

impl std::error::Error for ScalingError {}

// ─── HumanAmount ─────────────────────────────────────────────────────────────

/// A human-readable amount with an exact plain decimal representation.
///
/// `f64` goes through its shortest round-trip decimal representation, so
/// `0.01_f64` is exactly one hundredth rather than its binary approximation.
pub trait HumanAmount {
    /// Digits with an optional sign and decimal point, no exponent.
    fn decimal_string(&self) -> Result<String, ScalingError>;
}

impl HumanAmount for Decimal {
    fn decimal_string(&self) -> Result<String, ScalingError> {
        Ok(self.to_string())
    }
}

impl HumanAmount for f64 {
    fn decimal_string(&self) -> Result<String, ScalingError> {
        if !self.is_finite() {
            return Err(ScalingError::NotFinite(self.to_string()));
        }
        // Display for f64 never uses exponent notation.
        Ok(self.to_string())
    }
}

impl HumanAmount for &str {
    fn decimal_string(&self) -> Result<String, ScalingError> {
        Ok(self.trim().to_string())
    }
}

impl HumanAmount for String {
    fn decimal_string(&self) -> Result<String, ScalingError> {
        Ok(self.trim().to_string())
    }
}

/// Split a plain decimal into `(negative, integer digits, fraction digits)`.
fn split_decimal(input: &str) -> Result<(bool, &str, &str), ScalingError> {
    let invalid = |reason: &str| ScalingError::InvalidDecimal {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if integer.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected digits with an optional decimal point"));
    }
    Ok((negative, integer, fraction))
}

// ─── NativeAmount ────────────────────────────────────────────────────────────

/// Integer count of a token's smallest unit, as a minimal decimal string.
///
/// No leading zeros, no sign. Serializes as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeAmount(String);

impl NativeAmount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NativeAmount> for String {
    fn from(amount: NativeAmount) -> Self {
        amount.0
    }
}

/// Convert `amount` into native units at `decimals` places.
///
/// Fails with [`ScalingError::PrecisionLoss`] when `amount` has more
/// fractional digits than `decimals` allows.
pub fn to_native<A: HumanAmount>(amount: A, decimals: u32) -> Result<NativeAmount, ScalingError> {
    let raw = amount.decimal_string()?;
    let (negative, integer, fraction) = split_decimal(&raw)?;
    let integer = integer.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');

    if integer.is_empty() && fraction.is_empty() {
        return Ok(NativeAmount("0".to_string()));
    }
    if negative {
        return Err(ScalingError::Negative(raw));
    }

    // Trailing zeros are gone, so every remaining fractional digit counts.
    if fraction.len() > decimals as usize {
        return Err(ScalingError::PrecisionLoss {
            amount: format!("{}.{}", if integer.is_empty() { "0" } else { integer }, fraction),
            decimals,
        });
    }

    let mut digits = String::with_capacity(integer.len() + decimals as usize);
    digits.push_str(integer);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

    let minimal = digits.trim_start_matches('0');
    Ok(NativeAmount(if minimal.is_empty() {
        "0".to_string()
    } else {
        minimal.to_string()
    }))
}

// ─── SymbolDecimals ──────────────────────────────────────────────────────────

/// Known token symbols and their decimal places.
///
/// Always contains `ZAR`; the remaining symbols come from the service API's
/// ilk list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDecimals {
    precision: BTreeMap<String, u32>,
}

impl Default for SymbolDecimals {
    fn default() -> Self {
        let mut precision = BTreeMap::new();
        precision.insert(ZAR_SYMBOL.to_string(), DEFAULT_TOKEN_DECIMALS);
        Self { precision }
    }
}

impl SymbolDecimals {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ZAR` plus each unique ilk symbol, all at 18 decimals.
    pub fn from_ilk_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known = Self::default();
        for symbol in symbols {
            known.insert(symbol, DEFAULT_TOKEN_DECIMALS);
        }
        known
    }

    pub fn insert(&mut self, symbol: impl Into<String>, decimals: u32) {
        self.precision.insert(symbol.into(), decimals);
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.precision.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.precision.keys().map(String::as_str)
    }

    pub fn decimals(&self, symbol: &str) -> Result<u32, ScalingError> {
        self.precision
            .get(symbol)
            .copied()
            .ok_or_else(|| ScalingError::UnknownSymbol(symbol.to_string()))
    }

    /// Validate `symbol` and convert `amount` at its precision.
    pub fn to_native<A: HumanAmount>(
        &self,
        symbol: &str,
        amount: A,
    ) -> Result<NativeAmount, ScalingError> {
        to_native(amount, self.decimals(symbol)?)
    }
}

impl FromStr for NativeAmount {
    type Err = ScalingError;

    /// Parse an already-native integer string, normalizing leading zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScalingError::InvalidDecimal {
                input: s.to_string(),
                reason: "expected a non-negative integer".to_string(),
            });
        }
        let digits = trimmed.trim_start_matches('0');
        Ok(NativeAmount(if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }))
    }
}
