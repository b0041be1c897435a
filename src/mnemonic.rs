use bip39::Mnemonic;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::DeriveError;

pub const DEFAULT_WORD_COUNT: usize = 12;

pub const SUPPORTED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

pub fn generate(word_count: usize) -> Result<Mnemonic, DeriveError> {
    if !SUPPORTED_WORD_COUNTS.contains(&word_count) {
        return Err(bip39::Error::BadWordCount(word_count).into());
    }

    // 32 bits of entropy per 3 words
    let mut entropy = Zeroizing::new(vec![0u8; word_count / 3 * 4]);
    rand::thread_rng().fill_bytes(&mut entropy);
    Ok(Mnemonic::from_entropy(&entropy)?)
}

pub fn parse(phrase: &str) -> Result<Mnemonic, DeriveError> {
    Ok(Mnemonic::parse(phrase)?)
}

pub struct Seed(Zeroizing<[u8; 64]>);

impl Seed {
    pub fn from_mnemonic(mnemonic: &Mnemonic) -> Self {
        Seed(Zeroizing::new(mnemonic.to_seed("")))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn generated_phrases_are_checksum_valid() {
        for &words in SUPPORTED_WORD_COUNTS.iter() {
            let mnemonic = generate(words).unwrap();
            assert_eq!(mnemonic.word_count(), words);
            assert!(parse(&mnemonic.to_string()).is_ok());
        }
    }

    #[test]
    fn default_generation_has_twelve_words() {
        let mnemonic = generate(DEFAULT_WORD_COUNT).unwrap();
        assert_eq!(mnemonic.to_string().split_whitespace().count(), 12);
    }

    #[test]
    fn consecutive_phrases_differ() {
        let a = generate(DEFAULT_WORD_COUNT).unwrap();
        let b = generate(DEFAULT_WORD_COUNT).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unsupported_word_count_is_rejected() {
        for words in [0, 11, 13, 25] {
            assert!(matches!(generate(words), Err(DeriveError::InvalidMnemonic(_))));
        }
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let phrase = ["abandon"; 12].join(" ");
        assert!(matches!(parse(&phrase), Err(DeriveError::InvalidMnemonic(_))));
        assert!(parse("not a mnemonic").is_err());
    }

    #[test]
    fn seed_matches_bip39_vector() {
        let seed = Seed::from_mnemonic(&parse(ABANDON).unwrap());
        assert_eq!(
            hex::encode(&seed.as_bytes()[..16]),
            "5eb00bbddcf069084889a8ab91555681"
        );
    }
}
