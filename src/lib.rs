pub mod address;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod mnemonic;
pub mod paths;
pub mod slip10;
pub mod wallet;

pub use address::{Chain, CosmosAddress, EvmAddress, SolanaAddress, TaprootAddress};
pub use cli::{Args, Command};
pub use config::{BatchOptions, Config, KeysDir};
pub use error::{DeriveError, StoreError, WalletError};
pub use generator::{derive_addresses, DerivationOptions, DerivedAddresses, TaprootOptions};
pub use wallet::{save_wallet, WalletRecord};
