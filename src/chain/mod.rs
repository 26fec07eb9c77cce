//! EVM chain access: keys, legacy signing, JSON-RPC and receipt polling.
//!
//! ```rust,ignore
//! use zarban::chain::{address_of, signer_from_hex, EvmRpc, ChainRpc};
//!
//! let signer = signer_from_hex(&private_key)?;
//! let address = address_of(&private_key)?;
//! let rpc = EvmRpc::new("https://sepolia.example.org")?;
//! println!("chain {} nonce {}", rpc.chain_id().await?, rpc.pending_nonce(signer.address()).await?);
//! ```

pub mod error;
pub mod receipt;
pub mod rpc;
pub mod signing;

pub use error::ChainError;
pub use receipt::{wait_for_receipt, ConfirmationPolicy};
pub use rpc::{ChainRpc, EvmRpc, ReceiptSummary};
pub use signing::{
    address_of, apply_gas_markup, decode_calldata, parse_address, parse_value, sign_legacy,
    signer_from_hex, SignedRawTx, UnsignedLegacyTx,
};

pub use alloy::primitives::{Address, B256, U256};
pub use alloy::signers::local::PrivateKeySigner;
