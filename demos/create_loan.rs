//! Create a loan on behalf of a child user, then check its state.
//!
//! To run: `ZARBAN_ACCESS_TOKEN=... cargo run --example create_loan`

use std::env;

use zarban::api::ApiResult;
use zarban::network::Network;
use zarban::wallet::{LoanCreateRequest, LoanToValueOption, LoansResponse, WalletClient};

// Only DAIA and DAIB are supported
const PLAN_NAME: &str = "DAIA";
const COLLATERAL: &str = "1000";
const SYMBOL: &str = "DAI";

fn print_loan(loan: &LoansResponse) {
    println!("Loan Details for ID: {}", loan.id);
    println!("State: {:?}", loan.state);
    println!("Collateral: {}", loan.collateral);
    println!("Debt: {}", loan.debt);
    println!("Liquidation Price: {:?}", loan.liquidation_price.values);
    println!("Loan To Value: {}", loan.loan_to_value);
}

async fn run(token: String, child_user: String) -> ApiResult<()> {
    let client = WalletClient::builder(Network::Testnet.wallet_url())
        .auth_token(token)
        .build()?;

    let request =
        LoanCreateRequest::with_collateral(PLAN_NAME, SYMBOL, COLLATERAL, LoanToValueOption::Safe);
    let created = client.with_child_user(child_user).create_loan(&request).await?;
    println!("Loan created successfully. Loan ID: {}", created.id);

    println!("\nTracking loan status...");
    let details = client.get_loan_details(&created.id).await?;
    print_loan(&details);
    println!("Loan status: {}", details.state_en().unwrap_or("unknown"));
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let token = env::var("ZARBAN_ACCESS_TOKEN").unwrap_or_default();
    let child = env::var("ZARBAN_CHILD_USER").unwrap_or_else(|_| "child_user_test".to_string());

    if let Err(e) = run(token, child).await {
        eprint!("{}", e.pretty());
        std::process::exit(1);
    }
}
