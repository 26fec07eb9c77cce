//! Key handling and EIP-155 legacy transaction signing.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::signers::local::PrivateKeySigner;

use super::error::ChainError;

/// Create a signer from a hex private key, with or without `0x`.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
    let trimmed = private_key_hex.trim();
    let key_bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))
}

/// Checksummed address controlled by a hex private key.
pub fn address_of(private_key_hex: &str) -> Result<String, ChainError> {
    Ok(signer_from_hex(private_key_hex)?.address().to_checksum(None))
}

pub fn parse_address(address: &str) -> Result<Address, ChainError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|e| ChainError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Decode `0x`-prefixed (or bare) hex calldata. `"0x"` and `""` are empty.
pub fn decode_calldata(calldata: &str) -> Result<Bytes, ChainError> {
    let trimmed = calldata.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map(Bytes::from)
        .map_err(|e| ChainError::InvalidCalldata(e.to_string()))
}

/// Parse a base-10 native-unit value.
pub fn parse_value(value: &str) -> Result<U256, ChainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|e| ChainError::InvalidValue(format!("{}: {}", value, e)))
}

/// Raise a gas price by `percent`, rounding down.
pub fn apply_gas_markup(gas_price: u128, percent: u32) -> u128 {
    gas_price.saturating_mul(100 + percent as u128) / 100
}

/// Fields of a legacy transaction ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedLegacyTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
}

/// A signed transaction in its broadcastable encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRawTx {
    pub hash: B256,
    pub raw: Vec<u8>,
}

/// Sign with replay protection for `tx.chain_id`.
pub fn sign_legacy(
    signer: &PrivateKeySigner,
    tx: UnsignedLegacyTx,
) -> Result<SignedRawTx, ChainError> {
    let mut legacy = TxLegacy {
        chain_id: Some(tx.chain_id),
        nonce: tx.nonce,
        gas_price: tx.gas_price,
        gas_limit: tx.gas_limit,
        to: TxKind::Call(tx.to),
        value: tx.value,
        input: tx.input,
    };

    let signature = signer
        .sign_transaction_sync(&mut legacy)
        .map_err(|e| ChainError::Signing(e.to_string()))?;

    let signed = legacy.into_signed(signature);
    let hash = *signed.hash();
    let raw = TxEnvelope::from(signed).encoded_2718();

    Ok(SignedRawTx { hash, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const TEST_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    #[test]
    fn test_address_of() {
        assert_eq!(address_of(TEST_KEY).unwrap(), TEST_ADDRESS);
        assert_eq!(address_of(&format!("0x{}", TEST_KEY)).unwrap(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            signer_from_hex("not-a-key"),
            Err(ChainError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            signer_from_hex("0x1234"),
            Err(ChainError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_decode_calldata() {
        assert_eq!(decode_calldata("0x").unwrap(), Bytes::new());
        assert_eq!(decode_calldata("0x095ea7b3").unwrap().to_vec(), vec![0x09, 0x5e, 0xa7, 0xb3]);
        assert!(matches!(decode_calldata("0xzz"), Err(ChainError::InvalidCalldata(_))));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("0").unwrap(), U256::ZERO);
        assert_eq!(parse_value("").unwrap(), U256::ZERO);
        assert_eq!(
            parse_value("100000000000000000000").unwrap(),
            U256::from(100_000_000_000_000_000_000u128)
        );
        assert!(matches!(parse_value("1.5"), Err(ChainError::InvalidValue(_))));
    }

    #[test]
    fn test_gas_markup() {
        assert_eq!(apply_gas_markup(1_000_000_000, 10), 1_100_000_000);
        assert_eq!(apply_gas_markup(15, 10), 16);
        assert_eq!(apply_gas_markup(7, 0), 7);
    }

    #[test]
    fn test_sign_legacy_is_deterministic() {
        let signer = signer_from_hex(TEST_KEY).unwrap();
        let tx = UnsignedLegacyTx {
            chain_id: 1,
            nonce: 0,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
            to: parse_address("0x3535353535353535353535353535353535353535").unwrap(),
            value: U256::from(1_000_000_000_000_000_000u128),
            input: Bytes::new(),
        };

        let a = sign_legacy(&signer, tx.clone()).unwrap();
        let b = sign_legacy(&signer, tx).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.hash, B256::ZERO);
        // RLP list prefix of a legacy transaction
        assert!(a.raw[0] >= 0xc0);
    }
}
