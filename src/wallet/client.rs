//! Wallet API client implementation.

use std::time::Duration;

use crate::api::client::{ApiTransport, ApiTransportBuilder, RetryConfig};
use crate::api::error::{ApiError, ApiResult};
use crate::network::Network;
use crate::wallet::types::*;

const LOGIN_PATH: &str = "/auth/email/login";
const SIGNUP_PATH: &str = "/auth/email/signup";
const CHILD_USERS_PATH: &str = "/users/children";
const PROFILE_PATH: &str = "/users/me/profile";
const LOAN_CREATE_PATH: &str = "/loans/create";
const LOAN_REPAY_PATH: &str = "/loans/repay";
const LOANS_PATH: &str = "/loans";

/// Builder for configuring [`WalletClient`].
#[derive(Debug, Clone)]
pub struct WalletClientBuilder {
    inner: ApiTransportBuilder,
}

impl WalletClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            inner: ApiTransportBuilder::new(base_url),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.inner = self.inner.with_retry(config);
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.auth_token(token);
        self
    }

    pub fn child_user(mut self, username: impl Into<String>) -> Self {
        self.inner = self.inner.child_user(username);
        self
    }

    pub fn build(self) -> ApiResult<WalletClient> {
        Ok(WalletClient {
            transport: self.inner.build()?,
        })
    }
}

/// Client for the Zarban wallet API (auth, users, loans).
#[derive(Debug, Clone)]
pub struct WalletClient {
    transport: ApiTransport,
}

impl WalletClient {
    /// Create a client with default settings.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        WalletClientBuilder::new(base_url).build()
    }

    pub fn for_network(network: Network) -> ApiResult<Self> {
        Self::new(network.wallet_url())
    }

    pub fn builder(base_url: impl Into<String>) -> WalletClientBuilder {
        WalletClientBuilder::new(base_url)
    }

    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.transport.set_auth_token(token);
    }

    pub fn clear_auth_token(&mut self) {
        self.transport.clear_auth_token();
    }

    pub fn has_auth_token(&self) -> bool {
        self.transport.has_auth_token()
    }

    /// A copy of this client that acts on behalf of `username`.
    pub fn with_child_user(&self, username: impl Into<String>) -> Self {
        let mut client = self.clone();
        client.transport.set_child_user(username);
        client
    }

    /// A copy of this client without the child-user header.
    pub fn without_child_user(&self) -> Self {
        let mut client = self.clone();
        client.transport.clear_child_user();
        client
    }

    pub fn child_user(&self) -> Option<&str> {
        self.transport.child_user()
    }

    // =========================================================================
    // Auth endpoints
    // =========================================================================

    /// Log in with email and password.
    ///
    /// On success the returned token is also installed as this client's
    /// bearer token.
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<JwtResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: JwtResponse = self.transport.post(LOGIN_PATH, &request).await?;
        tracing::debug!("Login successful, installing bearer token");
        self.transport.set_auth_token(response.token.clone());
        Ok(response)
    }

    pub async fn signup(&self, email: &str, password: &str) -> ApiResult<SimpleResponse> {
        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.transport.post(SIGNUP_PATH, &request).await
    }

    // =========================================================================
    // User endpoints
    // =========================================================================

    /// Create a child user under the authenticated superuser.
    pub async fn create_child_user(&self, username: &str) -> ApiResult<User> {
        if username.is_empty() {
            return Err(ApiError::InvalidParameter("username cannot be empty".to_string()));
        }
        let request = CreateChildUserRequest {
            username: username.to_string(),
        };
        self.transport.post(CHILD_USERS_PATH, &request).await
    }

    /// Profile of the authenticated user, or of the child user when one is set.
    pub async fn get_user_profile(&self) -> ApiResult<User> {
        self.transport.get(PROFILE_PATH).await
    }

    // =========================================================================
    // Loan endpoints
    // =========================================================================

    /// Create or preview a loan.
    pub async fn create_loan(&self, request: &LoanCreateRequest) -> ApiResult<LoansResponse> {
        Self::validate_loan_request(request)?;
        self.transport.post(LOAN_CREATE_PATH, request).await
    }

    /// Repay or preview repaying a loan.
    pub async fn repay_loan(&self, loan_id: &str, intent: RepayLoanIntent) -> ApiResult<LoansResponse> {
        Self::validate_loan_id(loan_id)?;
        let request = RepayLoanRequest {
            loan_id: loan_id.to_string(),
            intent,
        };
        self.transport.post(LOAN_REPAY_PATH, &request).await
    }

    pub async fn get_loan_details(&self, loan_id: &str) -> ApiResult<LoansResponse> {
        Self::validate_loan_id(loan_id)?;
        let path = format!("{}/{}", LOANS_PATH, urlencoding::encode(loan_id));
        self.transport.get(&path).await
    }

    // =========================================================================
    // Validation helpers
    // =========================================================================

    fn validate_loan_id(loan_id: &str) -> ApiResult<()> {
        if loan_id.is_empty() {
            return Err(ApiError::InvalidParameter("loan_id cannot be empty".to_string()));
        }
        Ok(())
    }

    fn validate_loan_request(request: &LoanCreateRequest) -> ApiResult<()> {
        if request.plan_name.is_empty() {
            return Err(ApiError::InvalidParameter("plan_name cannot be empty".to_string()));
        }
        let has_collateral = request.collateral.as_deref().is_some_and(|c| !c.is_empty());
        let has_debt = request.debt.as_deref().is_some_and(|d| !d.is_empty());
        if has_collateral == has_debt {
            return Err(ApiError::InvalidParameter(
                "exactly one of collateral and debt must be set".to_string(),
            ));
        }
        Ok(())
    }
}
