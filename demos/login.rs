//! Log in with email and password and print the issued token.
//!
//! To run: `ZARBAN_EMAIL=... ZARBAN_PASSWORD=... cargo run --example login`

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
        env::var("ZARBAN_PASSWORD").unwrap_or_else(|_| "your_secure_password".to_string());

    let mut client = match WalletClient::for_network(Network::Testnet) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create wallet client: {}", e);
            std::process::exit(1);
        }
    };

    match client.login(&email, &password).await {
        Ok(jwt) => {
            println!("login successful!");
            println!("Token: {}", jwt.token);
        }
        Err(e) => {
            eprint!("{}", e.pretty());
            std::process::exit(1);
        }
    }
}
