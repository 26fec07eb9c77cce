//! Preview a loan repayment, confirm on stdin, then poll until it settles.
//!
//! To run: `ZARBAN_ACCESS_TOKEN=... ZARBAN_LOAN_ID=DAIA#2825 cargo run --example repay_loan`

use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use zarban::api::ApiResult;
use zarban::network::Network;
use zarban::wallet::{RepayLoanIntent, WalletClient};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

fn confirmed() -> bool {
    print!("\nDo you want to proceed with the repayment? (y/n): ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).is_ok() && line.trim() == "y"
}

async fn run(token: String, child_user: String, loan_id: String) -> ApiResult<()> {
    let client = WalletClient::builder(Network::Testnet.wallet_url())
        .auth_token(token)
        .child_user(child_user)
        .build()?;

    println!("Previewing loan repayment...");
    let preview = client.repay_loan(&loan_id, RepayLoanIntent::Preview).await?;
    println!("\nRepayment preview details:");
    println!("Collateral to be returned: {}", preview.collateral);
    println!("Debt to be repaid: {}", preview.debt);

    if !confirmed() {
        println!("Repayment cancelled.");
        return Ok(());
    }

    let repayment = client.repay_loan(&loan_id, RepayLoanIntent::Repay).await?;
    println!("repayment in progress...");

    loop {
        let loan = client.get_loan_details(&repayment.id).await?;
        if loan.is_settled() {
            println!("\nLoan repayment successful!");
            println!("Collateralization Ratio: {}", loan.collateralization_ratio);
            println!("Loan Plan: {}", loan.plan);
            break;
        }
        if loan.settlement_failed() {
            println!("{}", loan.state_en().unwrap_or_default());
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
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
    let loan_id = env::var("ZARBAN_LOAN_ID").unwrap_or_else(|_| "DAIA#2825".to_string());

    if let Err(e) = run(token, child, loan_id).await {
        eprint!("{}", e.pretty());
        std::process::exit(1);
    }
}
