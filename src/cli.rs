use clap::error::{Error, ErrorKind};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::mnemonic::{DEFAULT_WORD_COUNT, SUPPORTED_WORD_COUNTS};

pub const DEFAULT_COUNT: usize = 100;

pub const USAGE_HINT: &str = "Please use either \"new\" or \"regen\" command.";

#[derive(Parser, Debug)]
#[command(author, version, about = "Bulk-generate multi-chain wallets from BIP-39 mnemonics", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Number of wallets to generate (ignored by `regen`)
    #[arg(short, long, global = true, default_value_t = DEFAULT_COUNT)]
    pub count: usize,

    /// Directory holding wallet files [default: `keys` next to the executable]
    #[arg(short, long, global = true)]
    pub keys_dir: Option<PathBuf>,

    /// Number of parallel threads (0 = auto-detect, 1 = sequential)
    #[arg(short, long, global = true, default_value_t = 1)]
    pub threads: usize,

    /// Stop at the first wallet that fails instead of reporting it and continuing
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate new wallets
    New {
        /// Mnemonic length in words
        #[arg(short, long, default_value_t = DEFAULT_WORD_COUNT, value_parser = parse_word_count)]
        words: usize,
    },
    /// Regenerate addresses from existing mnemonics
    Regen,
}

/// True when the parse failed because no known command was given, as
/// opposed to a bad value for a known one.
pub fn is_unrecognized_command(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::InvalidSubcommand
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn parse_word_count(s: &str) -> Result<usize, String> {
    let words: usize = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if SUPPORTED_WORD_COUNTS.contains(&words) {
        Ok(words)
    } else {
        Err(format!("word count must be one of {:?}", SUPPORTED_WORD_COUNTS))
    }
}
