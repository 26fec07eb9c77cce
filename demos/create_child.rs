//! Log in as a superuser, create a child user and read its profile.
//!
//! To run: `ZARBAN_EMAIL=... ZARBAN_PASSWORD=... cargo run --example create_child`

use std::env;

use zarban::api::ApiResult;
use zarban::network::Network;
use zarban::wallet::WalletClient;

async fn run(email: &str, password: &str, child_username: &str) -> ApiResult<()> {
    let mut client = WalletClient::for_network(Network::Testnet)?;

    let jwt = client.login(email, password).await?;
    println!("Superuser login successful");
    println!("Token: {}", jwt.token);

    let child = client.create_child_user(child_username).await?;
    let username = child.username.unwrap_or_else(|| child_username.to_string());
    println!("Child user created. Username: {}", username);

    let profile = client.with_child_user(username).get_user_profile().await?;
    println!("Child user profile:");
    println!("{:#?}", profile);
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let email = env::var("ZARBAN_EMAIL").unwrap_or_else(|_| "user@example.com".to_string());
    let password =
        env::var("ZARBAN_PASSWORD").unwrap_or_else(|_| "your_secure_password".to_string());
    let child = env::var("ZARBAN_CHILD_USER").unwrap_or_else(|_| "child_user_test".to_string());

    if let Err(e) = run(&email, &password, &child).await {
        eprint!("{}", e.pretty());
        std::process::exit(1);
    }
}
