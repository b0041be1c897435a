use std::path::PathBuf;
use thiserror::Error;

use crate::address::Chain;

#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] bip39::Error),

    #[error("malformed derivation path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("{chain} key derivation failed: {reason}")]
    KeyDerivation { chain: Chain, reason: String },

    #[error("{chain} address encoding failed: {reason}")]
    Encoding { chain: Chain, reason: String },
}

impl DeriveError {
    pub(crate) fn path(path: &str, reason: impl Into<String>) -> Self {
        DeriveError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed wallet document {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Derive(#[from] DeriveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
