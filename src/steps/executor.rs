//! Step-wise execution of multi-transaction operations.
//!
//! The service API describes an operation (approve + create vault, repay,
//! withdraw) as a [`ChainActivity`] plan whose `step_number` names the one
//! actionable step. The executor runs a single re-poll loop:
//!
//! ```text
//! plan = fetch_plan()
//! repeat (total - current + 1) times:
//!     sign + broadcast plan.steps[current - 1]
//!     append to transaction log, wait for receipt
//!     if current == total: derive id from logs, patch log, stop
//!     plan = fetch_plan()
//! ```
//!
//! Only the current step is ever submitted; the others are logged for
//! operator visibility.

use std::time::Duration;

use alloy::primitives::{B256, U256};
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

use crate::chain::error::ChainError;
use crate::chain::receipt::{wait_for_receipt, ConfirmationPolicy};
use crate::chain::rpc::{ChainRpc, ReceiptSummary};
use crate::chain::signing::{
    apply_gas_markup, decode_calldata, parse_address, parse_value, sign_legacy, UnsignedLegacyTx,
};
use crate::error::SdkResult;
use crate::service::operations::PlanSource;
use crate::service::types::{ChainActivity, EventLog, PreparedTx};
use crate::steps::tx_log::{
    SubmittedTransaction, TransactionLog, TransactionLogEntry, UNKNOWN_VAULT_ID,
};

/// Contract role that issues vault ids.
pub const VAULT_MANAGER_CONTRACT: &str = "Cdpmanager";

/// Decoded event field carrying the vault id.
pub const VAULT_ID_FIELD: &str = "Cdp";

/// Errors in the shape of a plan or its logs.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("No steps found in the response")]
    NoSteps,

    #[error("Step number {step_number} is out of range ({len} steps, {total} total)")]
    StepIndexOutOfRange { step_number: u32, total: u32, len: usize },

    #[error("Step {step_number} is not a prepared transaction")]
    UnsupportedStep { step_number: u32 },

    #[error("Log from {contract} has no '{field}' field")]
    MissingDerivedField { contract: String, field: String },

    #[error("Log field '{field}' is not an integer: {value}")]
    InvalidDerivedId { field: String, value: String },
}

/// What to do when a receipt does not arrive in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Fail the whole operation.
    Abort,
    /// Log a warning and move on to the next poll.
    Continue,
}

/// Where to find an identifier produced by the final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedIdRule {
    pub contract: String,
    pub field: String,
}

impl DerivedIdRule {
    pub fn new(contract: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            field: field.into(),
        }
    }

    /// Vault id issued by the CDP manager.
    pub fn vault_id() -> Self {
        Self::new(VAULT_MANAGER_CONTRACT, VAULT_ID_FIELD)
    }

    /// Integer from the first log of `contract`, or `None` if no such log.
    pub fn extract(&self, logs: &[EventLog]) -> Result<Option<i64>, PlanError> {
        let Some(log) = logs.iter().find(|log| log.contract == self.contract) else {
            return Ok(None);
        };

        let raw = log
            .decoded_field(&self.field)
            .ok_or_else(|| PlanError::MissingDerivedField {
                contract: self.contract.clone(),
                field: self.field.clone(),
            })?;

        raw.trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| PlanError::InvalidDerivedId {
                field: self.field.clone(),
                value: raw,
            })
    }
}

/// Per-operation executor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub confirmation: ConfirmationPolicy,
    pub on_timeout: TimeoutPolicy,
    /// Added to the node's suggested gas price, in percent
    pub gas_price_markup_percent: u32,
    /// `vault_id` written with each new log entry
    pub initial_vault_id: i64,
    /// Identifier to extract after the final step, if any
    pub derived_id: Option<DerivedIdRule>,
}

impl ExecutorConfig {
    /// 120s / 15s confirmation, timeouts abort, vault id derived from logs.
    pub fn vault_creation() -> Self {
        Self {
            confirmation: ConfirmationPolicy::new(Duration::from_secs(120), Duration::from_secs(15)),
            on_timeout: TimeoutPolicy::Abort,
            gas_price_markup_percent: 0,
            initial_vault_id: UNKNOWN_VAULT_ID,
            derived_id: Some(DerivedIdRule::vault_id()),
        }
    }

    /// 60s / 5s confirmation, timeouts continue, gas price +10%.
    pub fn vault_repayment(vault_id: i64) -> Self {
        Self {
            confirmation: ConfirmationPolicy::new(Duration::from_secs(60), Duration::from_secs(5)),
            on_timeout: TimeoutPolicy::Continue,
            gas_price_markup_percent: 10,
            initial_vault_id: vault_id,
            derived_id: None,
        }
    }

    /// 120s / 15s confirmation, timeouts abort, gas price +10%.
    pub fn staking_withdrawal() -> Self {
        Self {
            confirmation: ConfirmationPolicy::new(Duration::from_secs(120), Duration::from_secs(15)),
            on_timeout: TimeoutPolicy::Abort,
            gas_price_markup_percent: 10,
            initial_vault_id: UNKNOWN_VAULT_ID,
            derived_id: None,
        }
    }
}

/// One step the executor signed and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedStep {
    pub step_number: u32,
    pub label: String,
    pub tx_hash: B256,
    /// `None` if confirmation timed out under [`TimeoutPolicy::Continue`]
    pub receipt: Option<ReceiptSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub submitted: Vec<SubmittedStep>,
    /// `true` once the final step was submitted
    pub completed: bool,
    pub derived_id: Option<i64>,
}

impl ExecutionReport {
    pub fn last_tx_hash(&self) -> Option<B256> {
        self.submitted.last().map(|s| s.tx_hash)
    }
}

/// Signs and submits the steps of a plan, one poll at a time.
pub struct StepExecutor<R> {
    rpc: R,
    signer: PrivateKeySigner,
    log: TransactionLog,
    config: ExecutorConfig,
}

impl<R: ChainRpc> StepExecutor<R> {
    pub fn new(rpc: R, signer: PrivateKeySigner, log: TransactionLog, config: ExecutorConfig) -> Self {
        Self {
            rpc,
            signer,
            log,
            config,
        }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the operation described by `source` to completion.
    pub async fn execute<P>(&self, source: &P) -> SdkResult<ExecutionReport>
    where
        P: PlanSource + ?Sized,
    {
        let chain_id = self.rpc.chain_id().await?;
        let mut plan = source.fetch_plan().await?;
        if plan.steps.is_empty() {
            return Err(PlanError::NoSteps.into());
        }
        Self::check_range(&plan)?;

        let budget = plan.remaining();
        let mut report = ExecutionReport::default();
        tracing::debug!(
            total = plan.number_of_steps,
            current = plan.step_number,
            budget,
            chain_id,
            "Executing plan"
        );

        for iteration in 0..budget {
            if iteration > 0 {
                plan = source.fetch_plan().await?;
            }

            let step_number = plan.step_number;
            let prepared = Self::current_tx(&plan)?;
            let tx_hash = self.submit(prepared, chain_id).await?;
            let receipt = self.confirm(tx_hash).await?;

            report.submitted.push(SubmittedStep {
                step_number,
                label: prepared.display_label().to_string(),
                tx_hash,
                receipt: receipt.clone(),
            });

            if step_number == plan.number_of_steps {
                report.completed = true;
                if receipt.is_some() {
                    report.derived_id = self.derive_id(source, tx_hash).await?;
                } else if self.config.derived_id.is_some() {
                    tracing::warn!(tx_hash = %tx_hash, "Final step unconfirmed, skipping id lookup");
                }
                break;
            }
        }

        Ok(report)
    }

    /// Log every label and return the actionable step.
    fn current_tx(plan: &ChainActivity) -> Result<&PreparedTx, PlanError> {
        for (index, step) in plan.steps.iter().enumerate() {
            let label = step
                .prepared_tx()
                .map(PreparedTx::display_label)
                .unwrap_or("<unsupported step>");
            tracing::info!(step = index + 1, label, "Step");
        }

        Self::check_range(plan)?;
        let step = plan.current_step().ok_or_else(|| out_of_range(plan))?;

        tracing::info!(step = plan.step_number, "Processing");
        step.prepared_tx().ok_or(PlanError::UnsupportedStep {
            step_number: plan.step_number,
        })
    }

    fn check_range(plan: &ChainActivity) -> Result<(), PlanError> {
        if plan.step_in_range() {
            Ok(())
        } else {
            Err(out_of_range(plan))
        }
    }

    /// Sign, broadcast and log one prepared transaction.
    async fn submit(&self, prepared: &PreparedTx, chain_id: u64) -> SdkResult<B256> {
        let params = &prepared.method_parameters;
        let to = parse_address(&params.to)?;
        let value = parse_value(&params.value)?;
        let input = decode_calldata(&params.calldata)?;

        let from = self.signer.address();
        let nonce = self.rpc.pending_nonce(from).await?;
        let suggested = self.rpc.gas_price().await?;
        let gas_price = apply_gas_markup(suggested, self.config.gas_price_markup_percent);

        let signed = sign_legacy(
            &self.signer,
            UnsignedLegacyTx {
                chain_id,
                nonce,
                gas_price,
                gas_limit: prepared.gas_use_estimate,
                to,
                value,
                input,
            },
        )?;

        let tx_hash = self.rpc.send_raw_transaction(&signed.raw).await?;
        tracing::info!(tx_hash = %tx_hash, nonce, gas_price = %gas_price, "Transaction sent");

        let record = SubmittedTransaction {
            from: from.to_checksum(None),
            to: params.to.clone(),
            value,
            gas: prepared.gas_use_estimate,
            gas_price: U256::from(gas_price),
            nonce,
            chain_id: U256::from(chain_id),
            data: params.calldata.clone(),
        };
        self.log.append(TransactionLogEntry::now(
            record,
            tx_hash.to_string(),
            self.config.initial_vault_id,
        ))?;

        Ok(tx_hash)
    }

    /// Wait for the receipt, applying the timeout policy. Reverts are fatal.
    async fn confirm(&self, tx_hash: B256) -> SdkResult<Option<ReceiptSummary>> {
        match wait_for_receipt(&self.rpc, tx_hash, self.config.confirmation).await {
            Ok(receipt) if !receipt.success => Err(ChainError::TransactionReverted {
                tx_hash: tx_hash.to_string(),
                block_number: receipt.block_number,
            }
            .into()),
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = %tx_hash,
                    block = receipt.block_number,
                    "Transaction mined"
                );
                Ok(Some(receipt))
            }
            Err(e) if e.is_timeout() && self.config.on_timeout == TimeoutPolicy::Continue => {
                tracing::warn!(tx_hash = %tx_hash, error = %e, "Continuing after confirmation timeout");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Extract the configured id from the final transaction's logs and patch the log.
    async fn derive_id<P>(&self, source: &P, tx_hash: B256) -> SdkResult<Option<i64>>
    where
        P: PlanSource + ?Sized,
    {
        let Some(rule) = &self.config.derived_id else {
            return Ok(None);
        };

        let logs = source.fetch_logs(&tx_hash.to_string()).await?;
        match rule.extract(&logs)? {
            Some(id) => {
                self.log.patch_last_vault_id(id)?;
                tracing::info!(tx_hash = %tx_hash, id, contract = %rule.contract, "Derived id recorded");
                Ok(Some(id))
            }
            None => {
                tracing::warn!(
                    tx_hash = %tx_hash,
                    contract = %rule.contract,
                    "No log from contract, id not recorded"
                );
                Ok(None)
            }
        }
    }
}

fn out_of_range(plan: &ChainActivity) -> PlanError {
    PlanError::StepIndexOutOfRange {
        step_number: plan.step_number,
        total: plan.number_of_steps,
        len: plan.steps.len(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn log(contract: &str, fields: &[(&str, serde_json::Value)]) -> EventLog {
        EventLog {
            contract: contract.to_string(),
            decoded: Some(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }

    #[test]
    fn test_extract_vault_id() {
        let logs = vec![
            log("Vat", &[("Cdp", "1".into())]),
            log("Cdpmanager", &[("Cdp", "812".into())]),
        ];
        assert_eq!(DerivedIdRule::vault_id().extract(&logs).unwrap(), Some(812));
    }

    #[test]
    fn test_extract_without_matching_log() {
        let logs = vec![log("Vat", &[("Cdp", "1".into())])];
        assert_eq!(DerivedIdRule::vault_id().extract(&logs).unwrap(), None);
    }

    #[test]
    fn test_extract_missing_or_bad_field() {
        let missing = vec![log("Cdpmanager", &[("Usr", "0xabc".into())])];
        assert!(matches!(
            DerivedIdRule::vault_id().extract(&missing),
            Err(PlanError::MissingDerivedField { .. })
        ));

        let bad = vec![log("Cdpmanager", &[("Cdp", "abc".into())])];
        assert!(matches!(
            DerivedIdRule::vault_id().extract(&bad),
            Err(PlanError::InvalidDerivedId { .. })
        ));
    }

    #[test]
    fn test_presets() {
        let create = ExecutorConfig::vault_creation();
        assert_eq!(create.on_timeout, TimeoutPolicy::Abort);
        assert_eq!(create.confirmation.max_wait, Duration::from_secs(120));
        assert_eq!(create.initial_vault_id, -1);

        let repay = ExecutorConfig::vault_repayment(42);
        assert_eq!(repay.on_timeout, TimeoutPolicy::Continue);
        assert_eq!(repay.confirmation.poll_interval, Duration::from_secs(5));
        assert_eq!(repay.gas_price_markup_percent, 10);
        assert_eq!(repay.initial_vault_id, 42);
        assert!(repay.derived_id.is_none());
    }
}
