use bip39::Mnemonic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::address::{CosmosAddress, EvmAddress, SolanaAddress, TaprootAddress};
use crate::config::KeysDir;
use crate::error::{DeriveError, StoreError, WalletError};
use crate::generator::{derive_addresses, DerivationOptions};
use crate::mnemonic::Seed;

/// The persisted unit: one mnemonic and the addresses derived from it.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    pub mnemonic: String,
    pub evm: EvmAddress,
    pub taproot: TaprootAddress,
    pub celestia: CosmosAddress,
    pub solana: SolanaAddress,
}

// Only the `mnemonic` field is needed to rebuild a wallet.
#[derive(Deserialize)]
struct StoredMnemonic {
    mnemonic: String,
}

impl WalletRecord {
    pub fn build(mnemonic: &Mnemonic, options: &DerivationOptions) -> Result<Self, DeriveError> {
        let seed = Seed::from_mnemonic(mnemonic);
        let addresses = derive_addresses(&seed, options)?;

        Ok(WalletRecord {
            mnemonic: mnemonic.to_string(),
            evm: addresses.evm,
            taproot: addresses.taproot,
            celestia: addresses.cosmos,
            solana: addresses.solana,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.evm)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|e| StoreError::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("mnemonic", &"<redacted>")
            .field("evm", &self.evm)
            .field("taproot", &self.taproot)
            .field("celestia", &self.celestia)
            .field("solana", &self.solana)
            .finish()
    }
}

/// Reads the mnemonic out of a saved wallet file, ignoring every other field.
pub fn load_mnemonic(path: &Path) -> Result<String, StoreError> {
    let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let stored: StoredMnemonic =
        serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(stored.mnemonic)
}

/// Builds the record for `mnemonic` and saves it as `<evm>.json` in `keys_dir`.
/// Returns the record and the path written.
pub fn save_wallet(
    mnemonic: &Mnemonic,
    options: &DerivationOptions,
    keys_dir: &KeysDir,
) -> Result<(WalletRecord, PathBuf), WalletError> {
    let record = WalletRecord::build(mnemonic, options)?;
    let path = keys_dir.wallet_path(&record.file_name());
    record.write_to(&path)?;
    Ok((record, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic;
    use tempfile::TempDir;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn saves_under_evm_address() {
        let dir = TempDir::new().unwrap();
        let keys_dir = KeysDir::new(dir.path());
        let mnemonic = mnemonic::parse(ABANDON).unwrap();

        let (record, path) =
            save_wallet(&mnemonic, &DerivationOptions::default(), &keys_dir).unwrap();

        assert_eq!(
            path,
            dir.path().join("0x9858EfFD232B4033E47d90003D41EC34EcaEda94.json")
        );
        assert_eq!(WalletRecord::load(&path).unwrap(), record);
        assert_eq!(load_mnemonic(&path).unwrap(), ABANDON);
    }

    #[test]
    fn document_layout() {
        let record = WalletRecord::build(
            &mnemonic::parse(ABANDON).unwrap(),
            &DerivationOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_string_pretty(&record).unwrap();

        let expected = format!(
            "{{\n  \"mnemonic\": \"{}\",\n  \"evm\": \"{}\",\n  \"taproot\": \"{}\",\n  \"celestia\": \"{}\",\n  \"solana\": \"{}\"\n}}",
            ABANDON,
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94",
            "bc1p0rfs59422j53guun2lazp5f53evv2p73egc256wqpuectr07sg0smu952p",
            "celestia19rl4cm2hmr8afy4kldpxz3fka4jguq0ad2ud9c",
            "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk",
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn mnemonic_only_documents_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seeded.json");
        fs::write(&path, format!("{{\"mnemonic\": \"{}\", \"note\": 1}}", ABANDON)).unwrap();

        assert_eq!(load_mnemonic(&path).unwrap(), ABANDON);
        assert!(matches!(
            WalletRecord::load(&path),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn malformed_documents_are_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_mnemonic(&path), Err(StoreError::Malformed { .. })));
        assert!(matches!(
            load_mnemonic(&dir.path().join("missing.json")),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn debug_output_hides_mnemonic() {
        let record = WalletRecord::build(
            &mnemonic::parse(ABANDON).unwrap(),
            &DerivationOptions::default(),
        )
        .unwrap();
        let debug = format!("{:?}", record);
        assert!(!debug.contains("abandon"));
        assert!(debug.contains("0x9858EfFD232B4033E47d90003D41EC34EcaEda94"));
    }
}
