use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::address::Chain;
use crate::error::DeriveError;
use crate::paths;

type HmacSha512 = Hmac<Sha512>;

const MASTER_SECRET: &[u8] = b"ed25519 seed";

/// Derives the 32-byte ed25519 secret at `path` from a BIP-39 seed.
pub fn derive_ed25519(seed: &[u8], path: &str) -> Result<Zeroizing<[u8; 32]>, DeriveError> {
    let levels = paths::parse(path)?;
    if let Some(level) = levels.iter().find(|level| !level.hardened) {
        return Err(DeriveError::path(
            path,
            format!("ed25519 requires hardened levels, found `{}`", level.index),
        ));
    }

    let mut node = hmac_sha512(MASTER_SECRET, &[seed])?;
    for level in &levels {
        let index = level.raw().to_be_bytes();
        let (key, chain_code) = node.split_at(32);
        node = hmac_sha512(chain_code, &[&[0x00u8], key, &index])?;
    }

    let mut secret = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(&node[..32]);
    Ok(secret)
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, DeriveError> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|e| DeriveError::KeyDerivation {
        chain: Chain::Solana,
        reason: e.to_string(),
    })?;
    for part in parts {
        mac.update(part);
    }

    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}
