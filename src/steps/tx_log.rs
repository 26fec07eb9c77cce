//! Durable JSON log of submitted transactions.
//!
//! The file holds a pretty-printed JSON array of [`TransactionLogEntry`] in
//! append order. Every operation reads the whole array and rewrites the whole
//! file through a temp file + rename. There is no protection against
//! concurrent writers from other processes.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use alloy::primitives::U256;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::serde_util::u256_decimal;

/// Log file used by vault creation.
pub const DEFAULT_LOG_FILE: &str = "transaction_log.json";

/// Log file used by vault repayment.
pub const DEFAULT_REPAY_LOG_FILE: &str = "repay_transaction_log.json";

/// `vault_id` of an entry whose vault is not yet known.
pub const UNKNOWN_VAULT_ID: i64 = -1;

#[derive(Debug, Error)]
pub enum TxLogError {
    #[error("Transaction log I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Transaction log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No transactions in {} to update", path.display())]
    Empty { path: PathBuf },
}

/// A broadcast transaction as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedTransaction {
    pub from: String,
    pub to: String,
    #[serde(with = "u256_decimal")]
    pub value: U256,
    pub gas: u64,
    #[serde(with = "u256_decimal")]
    pub gas_price: U256,
    pub nonce: u64,
    #[serde(with = "u256_decimal")]
    pub chain_id: U256,
    /// Calldata exactly as the API provided it
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLogEntry {
    /// RFC 3339 submission time
    pub timestamp: String,
    pub tx: SubmittedTransaction,
    pub tx_hash: String,
    pub vault_id: i64,
}

impl TransactionLogEntry {
    /// Entry stamped with the current time.
    pub fn now(tx: SubmittedTransaction, tx_hash: impl Into<String>, vault_id: i64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tx,
            tx_hash: tx_hash.into(),
            vault_id,
        }
    }
}

/// Append-only transaction log backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    path: PathBuf,
}

impl TransactionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in append order. A missing file is an empty log.
    pub fn entries(&self) -> Result<Vec<TransactionLogEntry>, TxLogError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn append(&self, entry: TransactionLogEntry) -> Result<(), TxLogError> {
        let mut entries = self.entries()?;
        entries.push(entry);
        self.write(&entries)?;

        tracing::info!(
            path = %self.path.display(),
            entries = entries.len(),
            "Transaction details saved"
        );
        Ok(())
    }

    /// Set `vault_id` on the most recent entry; earlier entries are untouched.
    pub fn patch_last_vault_id(&self, vault_id: i64) -> Result<(), TxLogError> {
        let mut entries = self.entries()?;
        let last = entries.last_mut().ok_or_else(|| TxLogError::Empty {
            path: self.path.clone(),
        })?;
        last.vault_id = vault_id;
        self.write(&entries)?;

        tracing::info!(path = %self.path.display(), vault_id, "Transaction details updated");
        Ok(())
    }

    fn write(&self, entries: &[TransactionLogEntry]) -> Result<(), TxLogError> {
        // Write to temp file first, then rename
        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
