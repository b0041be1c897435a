use bech32::{Bech32, Hrp};
use bitcoin::{Address, Network};
use ed25519_dalek::SigningKey;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use tiny_hderive::bip32::ExtendedPrivKey;
use zeroize::Zeroizing;

use crate::address::{Chain, CosmosAddress, EvmAddress, SolanaAddress, TaprootAddress};
use crate::error::DeriveError;
use crate::mnemonic::Seed;
use crate::paths;
use crate::slip10;

// Pre-compute and cache the secp256k1 context
thread_local! {
    static SECP: Secp256k1<secp256k1::All> = Secp256k1::new();
}

/// Which keys the Bitcoin keyring materialises.
///
/// Each active index `i` selects the key at `<hd_path>/i`, the layout used by
/// browser-extension keyrings, so files they produced regenerate unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaprootOptions {
    pub hd_path: String,
    pub active_indexes: Vec<u32>,
}

impl Default for TaprootOptions {
    fn default() -> Self {
        TaprootOptions {
            hd_path: paths::TAPROOT_DEFAULT_HD_PATH.to_string(),
            active_indexes: vec![0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationOptions {
    pub evm_path: String,
    pub taproot: TaprootOptions,
    pub cosmos_path: String,
    pub cosmos_prefix: String,
    pub solana_path: String,
}

impl Default for DerivationOptions {
    fn default() -> Self {
        DerivationOptions {
            evm_path: paths::EVM_DEFAULT_PATH.to_string(),
            taproot: TaprootOptions::default(),
            cosmos_path: paths::COSMOS_DEFAULT_PATH.to_string(),
            cosmos_prefix: paths::COSMOS_DEFAULT_PREFIX.to_string(),
            solana_path: paths::SOLANA_DEFAULT_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAddresses {
    pub evm: EvmAddress,
    pub taproot: TaprootAddress,
    pub cosmos: CosmosAddress,
    pub solana: SolanaAddress,
}

/// Derives all four chains in a fixed order: EVM, Bitcoin, Cosmos, Solana.
/// The first failure aborts the rest.
pub fn derive_addresses(
    seed: &Seed,
    options: &DerivationOptions,
) -> Result<DerivedAddresses, DeriveError> {
    let evm = generate_evm_address(seed, &options.evm_path)?;
    let taproot = generate_taproot_address(seed, &options.taproot)?;
    let cosmos = generate_cosmos_address(seed, &options.cosmos_path, &options.cosmos_prefix)?;
    let solana = generate_solana_address(seed, &options.solana_path)?;

    Ok(DerivedAddresses {
        evm,
        taproot,
        cosmos,
        solana,
    })
}

#[inline]
fn derive_secret_key(seed: &Seed, path: &str, chain: Chain) -> Result<SecretKey, DeriveError> {
    // tiny-hderive only understands the `'` notation and reports opaque errors,
    // so validate and normalise first
    let normalized = paths::format(&paths::parse(path)?);

    let derived = ExtendedPrivKey::derive(seed.as_bytes(), normalized.as_str()).map_err(|e| {
        DeriveError::KeyDerivation {
            chain,
            reason: format!("{:?}", e),
        }
    })?;
    let private_key = Zeroizing::new(derived.secret());

    SecretKey::from_slice(&private_key[..]).map_err(|e| DeriveError::KeyDerivation {
        chain,
        reason: e.to_string(),
    })
}

#[inline]
fn public_key(secret_key: &SecretKey) -> PublicKey {
    SECP.with(|secp| PublicKey::from_secret_key(secp, secret_key))
}

pub fn generate_evm_address(seed: &Seed, path: &str) -> Result<EvmAddress, DeriveError> {
    let secret_key = derive_secret_key(seed, path, Chain::Evm)?;
    let public_key = public_key(&secret_key);

    // Keccak256 of uncompressed pubkey
    let pubkey_uncompressed = public_key.serialize_uncompressed();
    let keccak_hash = Keccak256::digest(&pubkey_uncompressed[1..]); // Skip 0x04

    Ok(EvmAddress::new(to_checksum_address(&keccak_hash[12..])))
}

pub fn to_checksum_address(address_bytes: &[u8]) -> String {
    let lower = hex::encode(address_bytes);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut checksummed = String::with_capacity(2 + lower.len());
    checksummed.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

/// P2TR mainnet addresses, one per active index, in the order given.
pub fn generate_taproot_addresses(
    seed: &Seed,
    options: &TaprootOptions,
) -> Result<Vec<TaprootAddress>, DeriveError> {
    options
        .active_indexes
        .iter()
        .map(|&index| {
            let path = paths::child_path(&options.hd_path, index);
            let secret_key = derive_secret_key(seed, &path, Chain::Taproot)?;
            let (internal_key, _parity) = public_key(&secret_key).x_only_public_key();

            let address =
                SECP.with(|secp| Address::p2tr(secp, internal_key, None, Network::Bitcoin));
            Ok(TaprootAddress::new(address.to_string()))
        })
        .collect()
}

pub fn generate_taproot_address(
    seed: &Seed,
    options: &TaprootOptions,
) -> Result<TaprootAddress, DeriveError> {
    let first = options
        .active_indexes
        .first()
        .copied()
        .ok_or_else(|| DeriveError::path(&options.hd_path, "no active index selected"))?;

    let single = TaprootOptions {
        hd_path: options.hd_path.clone(),
        active_indexes: vec![first],
    };
    generate_taproot_addresses(seed, &single)?
        .pop()
        .ok_or_else(|| DeriveError::path(&options.hd_path, "no active index selected"))
}

/// Standard Cosmos-SDK account address: bech32(prefix, RIPEMD160(SHA256(compressed pubkey))).
pub fn generate_cosmos_address(
    seed: &Seed,
    path: &str,
    prefix: &str,
) -> Result<CosmosAddress, DeriveError> {
    let hrp = Hrp::parse(prefix).map_err(|e| DeriveError::Encoding {
        chain: Chain::Cosmos,
        reason: format!("invalid prefix `{}`: {}", prefix, e),
    })?;

    let secret_key = derive_secret_key(seed, path, Chain::Cosmos)?;
    let pubkey_compressed = public_key(&secret_key).serialize();

    // SHA256 -> RIPEMD160
    let sha256_hash = Sha256::digest(pubkey_compressed);
    let ripemd_hash = Ripemd160::digest(sha256_hash);

    let address = bech32::encode::<Bech32>(hrp, &ripemd_hash[..]).map_err(|e| {
        DeriveError::Encoding {
            chain: Chain::Cosmos,
            reason: e.to_string(),
        }
    })?;
    Ok(CosmosAddress::new(address))
}

pub fn generate_solana_address(seed: &Seed, path: &str) -> Result<SolanaAddress, DeriveError> {
    let secret = slip10::derive_ed25519(seed.as_bytes(), path)?;
    let signing_key = SigningKey::from_bytes(&secret);
    let public_key = signing_key.verifying_key().to_bytes();

    Ok(SolanaAddress::new(bs58::encode(public_key).into_string()))
}
