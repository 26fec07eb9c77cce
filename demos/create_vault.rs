//! Open a stablecoin vault: deposit collateral, mint ZAR, record the vault id.
//!
//! This sends real transactions. Keep the private key out of source control.
//!
//! To run: `RPC_URL=... PRIVATE_KEY=... cargo run --example create_vault`

use std::env;

use zarban::chain::{address_of, signer_from_hex, EvmRpc};
use zarban::network::Network;
use zarban::service::{ServiceClient, VaultCreation};
use zarban::steps::{ExecutorConfig, StepExecutor, TransactionLog, DEFAULT_LOG_FILE};
use zarban::SdkResult;

const ILK_NAME: &str = "ETHA";
const SYMBOL: &str = "ETH";
const COLLATERAL_AMOUNT: f64 = 0.001;
const LOAN_AMOUNT: f64 = 100.0;

async fn run(rpc_url: &str, private_key: &str) -> SdkResult<()> {
    let user = address_of(private_key)?;
    let client = ServiceClient::for_network(Network::Testnet)?;

    let vault = VaultCreation::prepare(
        &client,
        ILK_NAME,
        SYMBOL,
        &user,
        COLLATERAL_AMOUNT,
        LOAN_AMOUNT,
    )
    .await?;

    let executor = StepExecutor::new(
        EvmRpc::new(rpc_url)?,
        signer_from_hex(private_key)?,
        TransactionLog::new(DEFAULT_LOG_FILE),
        ExecutorConfig::vault_creation(),
    );

    let report = executor.execute(&vault).await?;
    if !report.completed {
        println!("Plan did not reach its final step; run again to resume.");
        return Ok(());
    }

    println!("Vault was created successfully.");
    if let Some(tx_hash) = report.last_tx_hash() {
        println!("TX HASH: {}", tx_hash);
    }
    match report.derived_id {
        Some(id) => println!("VAULT ID: {}", id),
        None => println!("VAULT ID: not found in transaction logs"),
    }
    Ok(())
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

    if let Err(e) = run(&rpc_url, &private_key).await {
        eprint!("{}", e.pretty());
        std::process::exit(1);
    }
}
