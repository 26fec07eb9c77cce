//! Wire types for the Zarban wallet API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth
// ============================================================================

/// Email/password credentials for login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Email/password credentials for signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

/// JWT issued on successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtResponse {
    pub token: String,
}

/// Acknowledgement body returned by endpoints without a typed payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleResponse {
    /// Free-form, server-defined acknowledgement messages
    #[serde(default)]
    pub messages: Option<serde_json::Value>,
}

// ============================================================================
// Users
// ============================================================================

/// Request to create a child user under the authenticated superuser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChildUserRequest {
    pub username: String,
}

/// User profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

// ============================================================================
// Loans
// ============================================================================

/// Whether a create-loan call should execute or only preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanCreateIntent {
    Create,
    Preview,
}

/// Whether a repay-loan call should execute or only preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepayLoanIntent {
    Preview,
    Repay,
}

/// Risk profile used to derive the loan-to-value ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanToValueOption {
    #[default]
    Safe,
    Normal,
    Risky,
}

/// Create (or preview) a loan. Exactly one of `collateral` and `debt` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanCreateRequest {
    pub intent: LoanCreateIntent,
    /// Loan plan, e.g. `DAIA` or `DAIB`
    pub plan_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt: Option<String>,
    /// Coin symbol of the collateral
    pub symbol: String,
    pub loan_to_value_option: LoanToValueOption,
}

impl LoanCreateRequest {
    /// Loan sized by the collateral the user puts up.
    pub fn with_collateral(
        plan_name: impl Into<String>,
        symbol: impl Into<String>,
        collateral: impl Into<String>,
        ltv: LoanToValueOption,
    ) -> Self {
        Self {
            intent: LoanCreateIntent::Create,
            plan_name: plan_name.into(),
            collateral: Some(collateral.into()),
            debt: None,
            symbol: symbol.into(),
            loan_to_value_option: ltv,
        }
    }

    /// Loan sized by the debt the user wants to receive.
    pub fn with_debt(
        plan_name: impl Into<String>,
        symbol: impl Into<String>,
        debt: impl Into<String>,
        ltv: LoanToValueOption,
    ) -> Self {
        Self {
            intent: LoanCreateIntent::Create,
            plan_name: plan_name.into(),
            collateral: None,
            debt: Some(debt.into()),
            symbol: symbol.into(),
            loan_to_value_option: ltv,
        }
    }

    pub fn preview(mut self) -> Self {
        self.intent = LoanCreateIntent::Preview;
        self
    }
}

/// Repay (or preview repaying) a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepayLoanRequest {
    pub loan_id: String,
    pub intent: RepayLoanIntent,
}

/// Localized liquidation price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidationPrice {
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Loan details as returned by create, repay and get-details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoansResponse {
    pub id: String,
    /// Localized state text keyed by locale (`LocaleEn`, `LocaleFa`)
    #[serde(default)]
    pub state: BTreeMap<String, String>,
    #[serde(default)]
    pub collateral: serde_json::Value,
    #[serde(default)]
    pub debt: serde_json::Value,
    #[serde(default)]
    pub liquidation_price: LiquidationPrice,
    #[serde(default)]
    pub loan_to_value: serde_json::Value,
    #[serde(default)]
    pub collateralization_ratio: serde_json::Value,
    #[serde(default)]
    pub plan: serde_json::Value,
}

/// English state text of a settled loan.
pub const LOAN_SETTLED: &str = "Loan settled";

/// English state text of a failed settlement.
pub const LOAN_SETTLEMENT_FAILED: &str = "Loan settlement failed";

impl LoansResponse {
    pub fn state_en(&self) -> Option<&str> {
        self.state.get("LocaleEn").map(String::as_str)
    }

    pub fn is_settled(&self) -> bool {
        self.state_en() == Some(LOAN_SETTLED)
    }

    pub fn settlement_failed(&self) -> bool {
        self.state_en() == Some(LOAN_SETTLEMENT_FAILED)
    }
}
