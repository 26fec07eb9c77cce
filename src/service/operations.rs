//! Plan sources for multi-step on-chain operations.
//!
//! Each operation knows how to ask the service API for a fresh
//! [`ChainActivity`] and how to read the event logs of a mined transaction.
//! Amounts are converted to native units once, up front.

use async_trait::async_trait;

use crate::api::error::ApiResult;
use crate::error::SdkResult;
use crate::service::client::ServiceClient;
use crate::service::types::*;
use crate::shared::scaling::{
    to_native, HumanAmount, NativeAmount, ScalingError, DEFAULT_TOKEN_DECIMALS, ZAR_SYMBOL,
};

/// Source of step plans for one logical operation.
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Fetch a freshly computed plan.
    async fn fetch_plan(&self) -> ApiResult<ChainActivity>;

    /// Decoded event logs of a mined transaction.
    async fn fetch_logs(&self, tx_hash: &str) -> ApiResult<Vec<EventLog>>;
}

// ─── Vault creation ──────────────────────────────────────────────────────────

/// Open a vault: deposit collateral of an ilk and mint ZAR.
#[derive(Debug, Clone)]
pub struct VaultCreation {
    client: ServiceClient,
    request: CreateVaultTxRequest,
}

impl VaultCreation {
    /// Validate `symbol` against the known symbols and convert both amounts.
    pub async fn prepare<C: HumanAmount, M: HumanAmount>(
        client: &ServiceClient,
        ilk_name: &str,
        symbol: &str,
        user: &str,
        collateral_amount: C,
        mint_amount: M,
    ) -> SdkResult<Self> {
        let collateral = client.to_native(symbol, collateral_amount).await?;
        let mint = client.to_native(ZAR_SYMBOL, mint_amount).await?;

        Ok(Self {
            client: client.clone(),
            request: CreateVaultTxRequest {
                collateral_amount: Some(collateral.into_string()),
                mint_amount: mint.into_string(),
                user: user.to_string(),
                ilk_name: ilk_name.to_string(),
            },
        })
    }

    pub fn request(&self) -> &CreateVaultTxRequest {
        &self.request
    }
}

#[async_trait]
impl PlanSource for VaultCreation {
    async fn fetch_plan(&self) -> ApiResult<ChainActivity> {
        self.client.create_stablecoin_vault(&self.request).await
    }

    async fn fetch_logs(&self, tx_hash: &str) -> ApiResult<Vec<EventLog>> {
        Ok(self.client.get_logs_by_tx_hash(tx_hash).await?.data)
    }
}

// ─── Vault repayment ─────────────────────────────────────────────────────────

/// Repay ZAR debt on an existing vault.
#[derive(Debug, Clone)]
pub struct VaultRepayment {
    client: ServiceClient,
    request: RepayZarTxRequest,
}

impl VaultRepayment {
    /// `amount` of ZAR to repay; `None` or zero repays the whole debt.
    pub fn new<A: HumanAmount>(
        client: &ServiceClient,
        user: &str,
        vault_id: i64,
        amount: Option<A>,
    ) -> Result<Self, ScalingError> {
        Ok(Self {
            client: client.clone(),
            request: RepayZarTxRequest {
                amount: optional_native(amount)?.map(NativeAmount::into_string),
                user: user.to_string(),
                vault_id,
            },
        })
    }

    pub fn vault_id(&self) -> i64 {
        self.request.vault_id
    }

    pub fn request(&self) -> &RepayZarTxRequest {
        &self.request
    }
}

#[async_trait]
impl PlanSource for VaultRepayment {
    async fn fetch_plan(&self) -> ApiResult<ChainActivity> {
        self.client.repay_stablecoin_vault(&self.request).await
    }

    async fn fetch_logs(&self, tx_hash: &str) -> ApiResult<Vec<EventLog>> {
        Ok(self.client.get_logs_by_tx_hash(tx_hash).await?.data)
    }
}

// ─── Staking withdrawal ──────────────────────────────────────────────────────

/// Withdraw staked tokens.
#[derive(Debug, Clone)]
pub struct StakingWithdrawal {
    client: ServiceClient,
    request: StakingWithdrawTxRequest,
}

impl StakingWithdrawal {
    /// `amount` to withdraw; `None` or zero withdraws everything.
    pub fn new<A: HumanAmount>(
        client: &ServiceClient,
        user: &str,
        amount: Option<A>,
    ) -> Result<Self, ScalingError> {
        Ok(Self {
            client: client.clone(),
            request: StakingWithdrawTxRequest {
                amount: optional_native(amount)?.map(NativeAmount::into_string),
                user: user.to_string(),
            },
        })
    }

    pub fn request(&self) -> &StakingWithdrawTxRequest {
        &self.request
    }
}

#[async_trait]
impl PlanSource for StakingWithdrawal {
    async fn fetch_plan(&self) -> ApiResult<ChainActivity> {
        self.client.staking_withdraw(&self.request).await
    }

    async fn fetch_logs(&self, tx_hash: &str) -> ApiResult<Vec<EventLog>> {
        Ok(self.client.get_logs_by_tx_hash(tx_hash).await?.data)
    }
}

/// Zero and absent amounts both mean "everything" and are sent as `null`.
fn optional_native<A: HumanAmount>(amount: Option<A>) -> Result<Option<NativeAmount>, ScalingError> {
    match amount {
        Some(a) => {
            let native = to_native(a, DEFAULT_TOKEN_DECIMALS)?;
            Ok((!native.is_zero()).then_some(native))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    fn client() -> ServiceClient {
        ServiceClient::new("https://testapi.zarban.io").unwrap()
    }

    #[test]
    fn test_repayment_zero_amount_is_null() {
        let repay = VaultRepayment::new(&client(), USER, 812, Some(0.0_f64)).unwrap();
        assert_eq!(repay.request().amount, None);
        assert_eq!(repay.vault_id(), 812);

        let repay = VaultRepayment::new(&client(), USER, 812, None::<f64>).unwrap();
        assert_eq!(repay.request().amount, None);
    }

    #[test]
    fn test_repayment_amount_in_native_units() {
        let repay = VaultRepayment::new(&client(), USER, 1, Some("2.5")).unwrap();
        assert_eq!(repay.request().amount.as_deref(), Some("2500000000000000000"));
    }

    #[test]
    fn test_repayment_rejects_precision_loss() {
        let result = VaultRepayment::new(&client(), USER, 1, Some("0.0000000000000000001"));
        assert!(matches!(result, Err(ScalingError::PrecisionLoss { .. })));
    }

    #[test]
    fn test_staking_withdrawal_request() {
        let withdraw = StakingWithdrawal::new(&client(), USER, Some(10.0_f64)).unwrap();
        assert_eq!(withdraw.request().amount.as_deref(), Some("10000000000000000000"));
        assert_eq!(withdraw.request().user, USER);
    }
}
