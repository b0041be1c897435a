use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Evm,
    Taproot,
    Cosmos,
    Solana,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Chain::Evm => "evm",
            Chain::Taproot => "taproot",
            Chain::Cosmos => "cosmos",
            Chain::Solana => "solana",
        };
        f.write_str(name)
    }
}

macro_rules! chain_address {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub(crate) fn new(encoded: String) -> Self {
                Self(encoded)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

chain_address! {
    EvmAddress
}

chain_address! {
    TaprootAddress
}

chain_address! {
    CosmosAddress
}

chain_address! {
    SolanaAddress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_serialize_as_bare_strings() {
        let addr = EvmAddress::new("0x9858EfFD232B4033E47d90003D41EC34EcaEda94".to_string());
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x9858EfFD232B4033E47d90003D41EC34EcaEda94\"");

        let back: EvmAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn chain_names() {
        assert_eq!(Chain::Evm.to_string(), "evm");
        assert_eq!(Chain::Solana.to_string(), "solana");
    }
}
