//! Network URL constants for the Zarban SDK.

/// Wallet API (identity, auth, loans) on mainnet.
pub const WALLET_MAINNET_URL: &str = "https://wapi.zarban.io";

/// Wallet API on testnet.
pub const WALLET_TESTNET_URL: &str = "https://testwapi.zarban.io";

/// Service API (stablecoin system, staking) on mainnet.
pub const SERVICE_MAINNET_URL: &str = "https://api.zarban.io";

/// Service API on testnet.
pub const SERVICE_TESTNET_URL: &str = "https://testapi.zarban.io";

/// Deployment the API clients talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn wallet_url(&self) -> &'static str {
        match self {
            Network::Mainnet => WALLET_MAINNET_URL,
            Network::Testnet => WALLET_TESTNET_URL,
        }
    }

    pub fn service_url(&self) -> &'static str {
        match self {
            Network::Mainnet => SERVICE_MAINNET_URL,
            Network::Testnet => SERVICE_TESTNET_URL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_network_is_testnet() {
        assert_eq!(Network::default(), Network::Testnet);
        assert_eq!(Network::default().wallet_url(), WALLET_TESTNET_URL);
        assert_eq!(Network::default().service_url(), SERVICE_TESTNET_URL);
    }

    #[test]
    fn test_mainnet_urls() {
        assert_eq!(Network::Mainnet.wallet_url(), "https://wapi.zarban.io");
        assert_eq!(Network::Mainnet.service_url(), "https://api.zarban.io");
    }
}
