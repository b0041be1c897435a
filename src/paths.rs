use crate::error::DeriveError;

pub const EVM_DEFAULT_PATH: &str = "m/44'/60'/0'/0/0";

/// Base path of the Bitcoin keyring; active indexes are appended below it.
pub const TAPROOT_DEFAULT_HD_PATH: &str = "m/86'/0'/0'/0/0";

pub const COSMOS_DEFAULT_PATH: &str = "m/44'/118'/0'/0/0";

pub const COSMOS_DEFAULT_PREFIX: &str = "celestia";

pub const SOLANA_DEFAULT_PATH: &str = "m/44'/501'/0'/0'";

pub const HARDENED_OFFSET: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildIndex {
    pub index: u32,
    pub hardened: bool,
}

impl ChildIndex {
    /// Index as serialized into the derivation data, hardened bit included.
    pub fn raw(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

/// EVM sub-address path, e.g. index 1 gives `m/44'/60'/0'/0/1`.
pub fn evm_path(index: u32) -> String {
    format!("m/44'/60'/0'/0/{}", index)
}

/// Solana sub-account path, e.g. account 1 gives `m/44'/501'/1'/0'`.
pub fn solana_path(account: u32) -> String {
    format!("m/44'/501'/{}'/0'", account)
}

pub fn child_path(base: &str, index: u32) -> String {
    format!("{}/{}", base.trim_end_matches('/'), index)
}

pub fn format(levels: &[ChildIndex]) -> String {
    let mut path = String::from("m");
    for level in levels {
        path.push('/');
        path.push_str(&level.index.to_string());
        if level.hardened {
            path.push('\'');
        }
    }
    path
}

/// Parses `m/44'/60'/0'/0/0` style paths. Both `'` and `h` mark hardened levels.
pub fn parse(path: &str) -> Result<Vec<ChildIndex>, DeriveError> {
    let trimmed = path.trim();
    let rest = trimmed
        .strip_prefix("m/")
        .ok_or_else(|| DeriveError::path(path, "must start with `m/`"))?;

    if rest.is_empty() {
        return Err(DeriveError::path(path, "no levels after `m/`"));
    }

    rest.split('/')
        .map(|segment| {
            let (digits, hardened) = match segment
                .strip_suffix('\'')
                .or_else(|| segment.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (segment, false),
            };

            let index: u32 = digits
                .parse()
                .map_err(|_| DeriveError::path(path, format!("invalid level `{}`", segment)))?;

            if index >= HARDENED_OFFSET {
                return Err(DeriveError::path(
                    path,
                    format!("level `{}` is out of range", segment),
                ));
            }

            Ok(ChildIndex { index, hardened })
        })
        .collect()
}
