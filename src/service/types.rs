//! Wire types for the Zarban service API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shared::serde_util::u64_or_string;

/// Locale key used for display labels.
pub const LABEL_LOCALE: &str = "en-US";

// ============================================================================
// Ilks
// ============================================================================

/// Collateral type configuration in the stablecoin system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ilk {
    /// Ilk name, e.g. `ETHA`
    #[serde(default)]
    pub name: String,
    /// Collateral token symbol, e.g. `ETH`
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IlksResponse {
    #[serde(default)]
    pub data: Vec<Ilk>,
}

// ============================================================================
// Transaction plans
// ============================================================================

/// Request the steps that create a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVaultTxRequest {
    /// Collateral in native units of the ilk's token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_amount: Option<String>,
    /// ZAR to mint, in native units
    pub mint_amount: String,
    /// Address of the vault owner
    pub user: String,
    pub ilk_name: String,
}

/// Request the steps that repay ZAR debt on a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepayZarTxRequest {
    /// ZAR to repay in native units; `null` repays everything
    pub amount: Option<String>,
    pub user: String,
    pub vault_id: i64,
}

/// Request the steps that withdraw from staking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingWithdrawTxRequest {
    /// Amount in native units; `null` withdraws everything
    pub amount: Option<String>,
    pub user: String,
}

/// Target of a prepared contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParameters {
    pub to: String,
    /// `0x`-prefixed hex calldata
    pub calldata: String,
    /// Native-unit value as a decimal string
    #[serde(default = "zero_value")]
    pub value: String,
}

fn zero_value() -> String {
    "0".to_string()
}

/// A transaction the API has prepared for the client to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTx {
    /// Display label keyed by locale
    #[serde(default)]
    pub label: BTreeMap<String, String>,
    pub method_parameters: MethodParameters,
    #[serde(with = "u64_or_string")]
    pub gas_use_estimate: u64,
}

impl PreparedTx {
    /// Label in [`LABEL_LOCALE`], or an empty string.
    pub fn display_label(&self) -> &str {
        self.label.get(LABEL_LOCALE).map(String::as_str).unwrap_or_default()
    }
}

/// Payload of a plan step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepData {
    PreparedTx(PreparedTx),
    /// A step kind this client does not execute.
    Unsupported(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub data: StepData,
}

impl Step {
    pub fn prepared_tx(&self) -> Option<&PreparedTx> {
        match &self.data {
            StepData::PreparedTx(tx) => Some(tx),
            StepData::Unsupported(_) => None,
        }
    }
}

/// Step plan for a multi-transaction operation.
///
/// The server recomputes this on every request; `step_number` (1-based)
/// names the one step that is actionable now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainActivity {
    pub number_of_steps: u32,
    pub step_number: u32,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl ChainActivity {
    /// The actionable step, if `step_number` is in range.
    pub fn current_step(&self) -> Option<&Step> {
        let index = self.step_number.checked_sub(1)? as usize;
        self.steps.get(index)
    }

    /// Whether `step_number` lies within `1..=number_of_steps`.
    pub fn step_in_range(&self) -> bool {
        (1..=self.number_of_steps).contains(&self.step_number)
    }

    /// Steps after the current one, including it.
    pub fn remaining(&self) -> u32 {
        self.number_of_steps
            .saturating_add(1)
            .saturating_sub(self.step_number)
    }

    pub fn is_last_step(&self) -> bool {
        self.step_number == self.number_of_steps
    }
}

// ============================================================================
// Event logs
// ============================================================================

/// A decoded contract event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    /// Contract role, e.g. `Cdpmanager`
    pub contract: String,
    #[serde(default)]
    pub decoded: Option<BTreeMap<String, serde_json::Value>>,
}

impl EventLog {
    /// A decoded field rendered as text. Numbers are accepted as well as strings.
    pub fn decoded_field(&self, field: &str) -> Option<String> {
        match self.decoded.as_ref()?.get(field)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetailsResponse {
    #[serde(default)]
    pub data: Vec<EventLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "numberOfSteps": 2,
        "stepNumber": 1,
        "steps": [
            {"data": {
                "label": {"en-US": "Approve ETH", "fa-IR": "تایید"},
                "methodParameters": {"to": "0x1111111111111111111111111111111111111111", "calldata": "0x095ea7b3", "value": "0"},
                "gasUseEstimate": 60000
            }},
            {"data": {
                "label": {"en-US": "Create vault"},
                "methodParameters": {"to": "0x2222222222222222222222222222222222222222", "calldata": "0xabcdef", "value": "1000000000000000"},
                "gasUseEstimate": "350000"
            }}
        ]
    }"#;

    #[test]
    fn test_chain_activity_decoding() {
        let plan: ChainActivity = serde_json::from_str(PLAN).unwrap();
        assert_eq!(plan.number_of_steps, 2);
        assert_eq!(plan.remaining(), 2);
        assert!(!plan.is_last_step());

        let current = plan.current_step().unwrap().prepared_tx().unwrap();
        assert_eq!(current.display_label(), "Approve ETH");
        assert_eq!(current.gas_use_estimate, 60_000);

        let next = plan.steps[1].prepared_tx().unwrap();
        assert_eq!(next.gas_use_estimate, 350_000);
        assert_eq!(next.method_parameters.value, "1000000000000000");
    }

    #[test]
    fn test_step_number_out_of_range() {
        let mut plan: ChainActivity = serde_json::from_str(PLAN).unwrap();
        plan.step_number = 0;
        assert!(plan.current_step().is_none());
        assert!(!plan.step_in_range());
        plan.step_number = 3;
        assert!(plan.current_step().is_none());
        assert!(!plan.step_in_range());
        assert_eq!(plan.remaining(), 0);
    }

    #[test]
    fn test_remaining_saturates_at_max_steps() {
        let mut plan: ChainActivity = serde_json::from_str(PLAN).unwrap();
        plan.number_of_steps = u32::MAX;
        plan.step_number = 1;
        assert_eq!(plan.remaining(), u32::MAX);
        assert!(plan.step_in_range());
    }

    #[test]
    fn test_unsupported_step() {
        let step: Step = serde_json::from_str(r#"{"data": {"signature": "0x"}}"#).unwrap();
        assert!(step.prepared_tx().is_none());
    }

    #[test]
    fn test_repay_request_serializes_null_amount() {
        let request = RepayZarTxRequest {
            amount: None,
            user: "0xabc".to_string(),
            vault_id: 42,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"amount":null,"user":"0xabc","vaultId":42}"#
        );
    }

    #[test]
    fn test_event_log_decoded_field() {
        let logs: EventDetailsResponse = serde_json::from_str(
            r#"{"data": [
                {"contract": "Vat", "decoded": null},
                {"contract": "Cdpmanager", "decoded": {"Cdp": "812", "Usr": "0xabc"}},
                {"contract": "Jug", "decoded": {"Cdp": 7}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(logs.data[0].decoded_field("Cdp"), None);
        assert_eq!(logs.data[1].decoded_field("Cdp").as_deref(), Some("812"));
        assert_eq!(logs.data[2].decoded_field("Cdp").as_deref(), Some("7"));
    }
}
