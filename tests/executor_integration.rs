//! Integration tests for the step executor.
//!
//! The service API and the node are both scripted: plans come from a queue
//! and receipts follow a fixed outcome. Transactions are really signed.

#![cfg(feature = "chain")]

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, B256, U256};
use async_trait::async_trait;
use serde_json::json;

use zarban::api::ApiResult;
use zarban::chain::{signer_from_hex, ChainError, ChainRpc, ReceiptSummary};
use zarban::service::{ChainActivity, EventLog, PlanSource};
use zarban::steps::{
    ExecutorConfig, PlanError, StepExecutor, TransactionLog, DEFAULT_LOG_FILE, UNKNOWN_VAULT_ID,
};
use zarban::SdkError;

const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const TEST_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";
const CHAIN_ID: u64 = 11155111;
const GAS_PRICE: u128 = 1_000_000_000;

// =============================================================================
// Scripted node
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Mined,
    Reverted,
    Pending,
}

struct MockRpc {
    outcome: Outcome,
    nonce: Mutex<u64>,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockRpc {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            nonce: Mutex::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(CHAIN_ID)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
        assert_eq!(address.to_checksum(None), TEST_ADDRESS);
        Ok(*self.nonce.lock().unwrap())
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(GAS_PRICE)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError> {
        self.sent.lock().unwrap().push(raw.to_vec());
        *self.nonce.lock().unwrap() += 1;
        Ok(keccak256(raw))
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<ReceiptSummary>, ChainError> {
        let receipt = |success| ReceiptSummary {
            tx_hash: hash,
            block_number: 7_000_000,
            gas_used: 55_000,
            success,
        };
        Ok(match self.outcome {
            Outcome::Mined => Some(receipt(true)),
            Outcome::Reverted => Some(receipt(false)),
            Outcome::Pending => None,
        })
    }
}

// =============================================================================
// Scripted service API
// =============================================================================

/// Hands out queued plans; the last one repeats once the queue runs dry.
struct ScriptedPlans {
    plans: Mutex<VecDeque<ChainActivity>>,
    last: Mutex<Option<ChainActivity>>,
    fetches: Mutex<u32>,
    logs: Vec<EventLog>,
}

impl ScriptedPlans {
    fn new(plans: Vec<ChainActivity>, logs: Vec<EventLog>) -> Self {
        Self {
            plans: Mutex::new(plans.into()),
            last: Mutex::new(None),
            fetches: Mutex::new(0),
            logs,
        }
    }

    fn fetches(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl PlanSource for ScriptedPlans {
    async fn fetch_plan(&self) -> ApiResult<ChainActivity> {
        *self.fetches.lock().unwrap() += 1;
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.plans.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        Ok(last.clone().expect("no plans scripted"))
    }

    async fn fetch_logs(&self, _tx_hash: &str) -> ApiResult<Vec<EventLog>> {
        Ok(self.logs.clone())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn step(n: u32) -> serde_json::Value {
    json!({"data": {
        "label": {"en-US": format!("Step {}", n)},
        "methodParameters": {
            "to": "0x1111111111111111111111111111111111111111",
            "calldata": "0x095ea7b3",
            "value": "0"
        },
        "gasUseEstimate": "60000"
    }})
}

fn plan(total: u32, current: u32) -> ChainActivity {
    let steps: Vec<_> = (1..=total).map(step).collect();
    serde_json::from_value(json!({
        "numberOfSteps": total,
        "stepNumber": current,
        "steps": steps,
    }))
    .unwrap()
}

fn vault_log(id: &str) -> EventLog {
    serde_json::from_value(json!({"contract": "Cdpmanager", "decoded": {"Cdp": id}})).unwrap()
}

fn executor(
    dir: &tempfile::TempDir,
    outcome: Outcome,
    config: ExecutorConfig,
) -> StepExecutor<MockRpc> {
    StepExecutor::new(
        MockRpc::new(outcome),
        signer_from_hex(TEST_KEY).unwrap(),
        TransactionLog::new(dir.path().join(DEFAULT_LOG_FILE)),
        config,
    )
}

// =============================================================================
// Plan progression
// =============================================================================

mod progression {
    use super::*;

    #[tokio::test]
    async fn test_two_step_plan_derives_vault_id() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let source = ScriptedPlans::new(vec![plan(2, 1), plan(2, 2)], vec![vault_log("812")]);

        let report = exec.execute(&source).await.unwrap();

        assert!(report.completed);
        assert_eq!(report.derived_id, Some(812));
        assert_eq!(
            report.submitted.iter().map(|s| s.step_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(report.submitted[1].label, "Step 2");
        assert_eq!(exec.rpc().sent_count(), 2);
        assert_eq!(source.fetches(), 2);

        let entries = exec.log().entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].vault_id, UNKNOWN_VAULT_ID);
        assert_eq!(entries[1].vault_id, 812);
        assert_eq!(entries[0].tx.nonce, 0);
        assert_eq!(entries[1].tx.nonce, 1);
        assert_eq!(entries[1].tx_hash, report.submitted[1].tx_hash.to_string());
    }

    #[tokio::test]
    async fn test_stale_plan_never_skips_ahead() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let source = ScriptedPlans::new(vec![plan(2, 1)], vec![vault_log("812")]);

        let report = exec.execute(&source).await.unwrap();

        // The server kept pointing at step 1, so step 2 was never sent
        assert!(!report.completed);
        assert_eq!(report.derived_id, None);
        assert!(report.submitted.iter().all(|s| s.step_number == 1));
        assert_eq!(exec.rpc().sent_count(), 2);
        assert!(exec
            .log()
            .entries()
            .unwrap()
            .iter()
            .all(|e| e.vault_id == UNKNOWN_VAULT_ID));
    }

    #[tokio::test]
    async fn test_resumes_from_current_step() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let source = ScriptedPlans::new(vec![plan(3, 3)], vec![vault_log("9")]);

        let report = exec.execute(&source).await.unwrap();

        assert_eq!(report.submitted.len(), 1);
        assert_eq!(report.submitted[0].step_number, 3);
        assert_eq!(report.derived_id, Some(9));
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_missing_vault_log_leaves_entry_unpatched() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let other: EventLog =
            serde_json::from_value(json!({"contract": "Vat", "decoded": {"Cdp": "1"}})).unwrap();
        let source = ScriptedPlans::new(vec![plan(1, 1)], vec![other]);

        let report = exec.execute(&source).await.unwrap();

        assert!(report.completed);
        assert_eq!(report.derived_id, None);
        assert_eq!(exec.log().entries().unwrap()[0].vault_id, UNKNOWN_VAULT_ID);
    }

    #[tokio::test]
    async fn test_logged_transaction_fields() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::staking_withdrawal());
        let source = ScriptedPlans::new(vec![plan(1, 1)], vec![]);

        let report = exec.execute(&source).await.unwrap();
        let raw = exec.rpc().sent.lock().unwrap()[0].clone();
        assert_eq!(report.last_tx_hash(), Some(keccak256(&raw)));

        let tx = &exec.log().entries().unwrap()[0].tx;
        assert_eq!(tx.from, TEST_ADDRESS);
        assert_eq!(tx.to, "0x1111111111111111111111111111111111111111");
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.gas, 60_000);
        assert_eq!(tx.gas_price, U256::from(1_100_000_000u64));
        assert_eq!(tx.chain_id, U256::from(CHAIN_ID));
        assert_eq!(tx.data, "0x095ea7b3");
    }
}

// =============================================================================
// Failure handling
// =============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_empty_plan() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let empty: ChainActivity =
            serde_json::from_value(json!({"numberOfSteps": 0, "stepNumber": 0, "steps": []}))
                .unwrap();
        let source = ScriptedPlans::new(vec![empty], vec![]);

        let result = exec.execute(&source).await;
        assert!(matches!(result, Err(SdkError::Plan(PlanError::NoSteps))));
        assert_eq!(exec.rpc().sent_count(), 0);
    }

    #[tokio::test]
    async fn test_step_number_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let mut short = plan(3, 3);
        short.steps.truncate(2);
        let source = ScriptedPlans::new(vec![short], vec![]);

        let result = exec.execute(&source).await;
        assert!(matches!(
            result,
            Err(SdkError::Plan(PlanError::StepIndexOutOfRange { step_number: 3, len: 2, .. }))
        ));
        assert!(exec.log().entries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_step_beyond_total_fails() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let source = ScriptedPlans::new(vec![plan(2, 3)], vec![]);

        let result = exec.execute(&source).await;
        assert!(matches!(
            result,
            Err(SdkError::Plan(PlanError::StepIndexOutOfRange {
                step_number: 3,
                total: 2,
                ..
            }))
        ));
        assert_eq!(exec.rpc().sent_count(), 0);
        assert!(exec.log().entries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_current_step() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Mined, ExecutorConfig::vault_creation());
        let unsupported: ChainActivity = serde_json::from_value(json!({
            "numberOfSteps": 1,
            "stepNumber": 1,
            "steps": [{"data": {"kind": "signature", "message": "0xabc"}}]
        }))
        .unwrap();
        let source = ScriptedPlans::new(vec![unsupported], vec![]);

        let result = exec.execute(&source).await;
        assert!(matches!(
            result,
            Err(SdkError::Plan(PlanError::UnsupportedStep { step_number: 1 }))
        ));
    }

    #[tokio::test]
    async fn test_revert_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Reverted, ExecutorConfig::vault_repayment(42));
        let source = ScriptedPlans::new(vec![plan(2, 1), plan(2, 2)], vec![]);

        let result = exec.execute(&source).await;
        assert!(matches!(
            result,
            Err(SdkError::Chain(ChainError::TransactionReverted { block_number: 7_000_000, .. }))
        ));
        // Logged before confirmation, never re-polled
        assert_eq!(exec.log().entries().unwrap().len(), 1);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborts_vault_creation() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Pending, ExecutorConfig::vault_creation());
        let source = ScriptedPlans::new(vec![plan(2, 1), plan(2, 2)], vec![]);

        match exec.execute(&source).await {
            Err(SdkError::Chain(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(exec.rpc().sent_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_continues_vault_repayment() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, Outcome::Pending, ExecutorConfig::vault_repayment(42));
        let source = ScriptedPlans::new(vec![plan(2, 1), plan(2, 2)], vec![]);

        let report = exec.execute(&source).await.unwrap();

        assert!(report.completed);
        assert!(report.submitted.iter().all(|s| s.receipt.is_none()));
        assert_eq!(exec.rpc().sent_count(), 2);

        let entries = exec.log().entries().unwrap();
        assert!(entries.iter().all(|e| e.vault_id == 42));
        assert_eq!(entries[0].tx.gas_price, U256::from(1_100_000_000u64));
    }
}
