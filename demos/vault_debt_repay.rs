//! Repay ZAR debt on an existing vault.
//!
//! `AMOUNT` of 0 (the default) repays the whole debt. This sends real
//! transactions. Keep the private key out of source control.
//!
//! To run: `RPC_URL=... PRIVATE_KEY=... VAULT_ID=812 AMOUNT=50 cargo run --example vault_debt_repay`

use std::env;

use rust_decimal::Decimal;
use zarban::chain::{address_of, signer_from_hex, EvmRpc};
use zarban::network::Network;
use zarban::service::{ServiceClient, VaultRepayment};
use zarban::steps::{ExecutorConfig, StepExecutor, TransactionLog, DEFAULT_REPAY_LOG_FILE};
use zarban::SdkResult;

async fn run(rpc_url: &str, private_key: &str, vault_id: i64, amount: Decimal) -> SdkResult<()> {
    let user = address_of(private_key)?;
    let client = ServiceClient::for_network(Network::Testnet)?;
    let repayment = VaultRepayment::new(&client, &user, vault_id, Some(amount))?;

    let executor = StepExecutor::new(
        EvmRpc::new(rpc_url)?,
        signer_from_hex(private_key)?,
        TransactionLog::new(DEFAULT_REPAY_LOG_FILE),
        ExecutorConfig::vault_repayment(vault_id),
    );

    let report = executor.execute(&repayment).await?;
    for step in &report.submitted {
        let status = match &step.receipt {
            Some(receipt) => format!("mined in block {}", receipt.block_number),
            None => "not confirmed".to_string(),
        };
        println!("Step {} ({}): {} {}", step.step_number, step.label, step.tx_hash, status);
    }
    if report.completed {
        println!("Vault debt repayment submitted.");
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} is not valid: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (Ok(rpc_url), Ok(private_key)) = (env::var("RPC_URL"), env::var("PRIVATE_KEY")) else {
        eprintln!("RPC_URL and PRIVATE_KEY must be set");
        std::process::exit(1);
    };
    let (vault_id, amount) = match (parse_env("VAULT_ID", 0i64), parse_env("AMOUNT", Decimal::ZERO)) {
        (Ok(vault_id), Ok(amount)) => (vault_id, amount),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&rpc_url, &private_key, vault_id, amount).await {
        eprint!("{}", e.pretty());
        std::process::exit(1);
    }
}
