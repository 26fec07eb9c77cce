//! Register a new account with email and password.
//!
//! To run: `ZARBAN_EMAIL=... ZARBAN_PASSWORD=... cargo run --example signup`

use std::env;

use zarban::network::Network;
use zarban::wallet::WalletClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let email = env::var("ZARBAN_EMAIL").unwrap_or_else(|_| "user@example.com".to_string());
    let password =
        env::var("ZARBAN_PASSWORD").unwrap_or_else(|_| "yourSecurePassword".to_string());

    let client = match WalletClient::for_network(Network::Testnet) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create wallet client: {}", e);
            std::process::exit(1);
        }
    };

    match client.signup(&email, &password).await {
        Ok(response) => println!("Signup successful: {:?}", response.messages),
        Err(e) => {
            eprint!("{}", e.pretty());
            std::process::exit(1);
        }
    }
}
