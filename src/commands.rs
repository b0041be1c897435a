use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::cli::{self, Args, Command};
use crate::config::{BatchOptions, Config};
use crate::error::{StoreError, WalletError};
use crate::logging;
use crate::mnemonic;
use crate::wallet::{self, save_wallet, WalletRecord};

#[derive(Debug, Default)]
pub struct BatchReport {
    // distinct wallet files, in completion order
    pub written: Vec<PathBuf>,
    pub failures: Vec<String>,
}

impl BatchReport {
    pub fn into_result(self) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(anyhow!(
            "{} of {} wallets failed",
            self.failures.len(),
            self.failures.len() + self.written.len()
        ))
    }
}

/// Entry point for a full command line. An unrecognised or missing command
/// prints a usage hint and succeeds without touching the keys directory; bad
/// values for a known command exit through clap as usual.
pub fn dispatch<I, T>(argv: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) if cli::is_unrecognized_command(&err) => {
            eprintln!("{}", cli::USAGE_HINT);
            eprintln!("{}", err);
            return Ok(());
        }
        Err(err) => err.exit(),
    };

    logging::init(args.verbose);
    run(args)
}

pub fn run(args: Args) -> Result<()> {
    let config = Config::from_args(&args)?;
    config
        .keys_dir
        .ensure_exists()
        .context("Failed to prepare keys directory")?;
    info!(keys_dir = %config.keys_dir.path().display(), "using keys directory");

    let report = match args.command {
        Command::New { words } => new_wallets(&config, args.count, words)?,
        Command::Regen => regen_wallets(&config)?,
    };
    report.into_result()
}

pub fn new_wallets(config: &Config, count: usize, word_count: usize) -> Result<BatchReport> {
    info!(count, word_count, "generating wallets");

    run_batch((1..=count).collect::<Vec<usize>>(), &config.batch, "Wallet saved to", |n| {
        let mnemonic = mnemonic::generate(word_count)
            .with_context(|| format!("wallet #{}: mnemonic generation failed", n))?;
        let (_, path) = save_wallet(&mnemonic, &config.derivation, &config.keys_dir)
            .with_context(|| format!("wallet #{}", n))?;
        Ok(path)
    })
}

pub fn regen_wallets(config: &Config) -> Result<BatchReport> {
    let files = config
        .keys_dir
        .wallet_files()
        .context("Failed to list wallet files")?;
    info!(count = files.len(), "regenerating wallets");

    run_batch(files, &config.batch, "Wallet updated at", |path| {
        regen_wallet(&path, config).with_context(|| format!("{}", path.display()))
    })
}

/// Rebuilds one wallet from its stored mnemonic, keeping the file it came from
/// as its identity. A changed EVM address renames that file instead of leaving
/// a stale copy behind.
pub fn regen_wallet(path: &Path, config: &Config) -> Result<PathBuf, WalletError> {
    let phrase = wallet::load_mnemonic(path)?;
    let mnemonic = mnemonic::parse(&phrase)?;
    let record = WalletRecord::build(&mnemonic, &config.derivation)?;
    record.write_to(path)?;

    let target = config.keys_dir.wallet_path(&record.file_name());
    if target != path {
        if target.exists() {
            warn!(
                from = %path.display(),
                to = %target.display(),
                "another wallet file holds the same mnemonic, overwriting it"
            );
        }
        fs::rename(path, &target).map_err(|e| StoreError::io(path, e))?;
        warn!(
            from = %path.display(),
            to = %target.display(),
            "derived EVM address changed, wallet file renamed"
        );
    }
    Ok(target)
}

fn run_batch<T, F>(
    items: Vec<T>,
    options: &BatchOptions,
    action: &str,
    job: F,
) -> Result<BatchReport>
where
    T: Send,
    F: Fn(T) -> Result<PathBuf> + Sync,
{
    let started = Instant::now();
    let progress = progress_bar(items.len() as u64, options.show_progress)?;
    let written = Mutex::new(Vec::with_capacity(items.len()));
    let failures = Mutex::new(Vec::new());

    let process = |item: T| -> Result<()> {
        let outcome = job(item);
        progress.inc(1);

        match outcome {
            Ok(path) => {
                progress.suspend(|| println!("{} {}", action, path.display()));
                lock(&written).push(path);
                Ok(())
            }
            Err(err) if options.fail_fast => Err(err),
            Err(err) => {
                let rendered = format!("{:#}", err);
                progress.suspend(|| error!("{}", rendered));
                lock(&failures).push(rendered);
                Ok(())
            }
        }
    };

    let threads = options.worker_threads();
    let outcome = if threads <= 1 {
        items.into_iter().try_for_each(process)
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build worker pool")?;
        pool.install(|| items.into_par_iter().try_for_each(process))
    };

    if let Err(err) = outcome {
        progress.abandon_with_message("aborted");
        return Err(err);
    }
    progress.finish_with_message("done");

    // two sources can land on one file when regen merges duplicate mnemonics
    let mut seen = HashSet::new();
    let mut written = into_inner(written);
    written.retain(|path| seen.insert(path.clone()));

    let report = BatchReport {
        written,
        failures: into_inner(failures),
    };
    info!(
        written = report.written.len(),
        failed = report.failures.len(),
        threads,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
    Ok(report)
}

fn progress_bar(len: u64, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn into_inner<T>(mutex: Mutex<T>) -> T {
    mutex
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeysDir;
    use tempfile::TempDir;

    #[test]
    fn report_without_failures_is_ok() {
        let report = BatchReport {
            written: vec![PathBuf::from("a.json")],
            failures: Vec::new(),
        };
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn report_with_failures_is_an_error() {
        let report = BatchReport {
            written: vec![PathBuf::from("a.json")],
            failures: vec!["broken".to_string()],
        };
        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 wallets failed");
    }

    #[test]
    fn batch_continues_past_failures() {
        let options = BatchOptions::default();
        let report = run_batch(vec![1, 2, 3], &options, "ok", |n| {
            if n == 2 {
                Err(anyhow!("wallet {} failed", n))
            } else {
                Ok(PathBuf::from(format!("{}.json", n)))
            }
        })
        .unwrap();

        assert_eq!(
            report.written,
            vec![PathBuf::from("1.json"), PathBuf::from("3.json")]
        );
        assert_eq!(report.failures, vec!["wallet 2 failed".to_string()]);
    }

    #[test]
    fn batch_counts_each_file_once() {
        let options = BatchOptions::default();
        let report = run_batch(vec![1, 2, 3], &options, "ok", |n| {
            if n == 3 {
                Err(anyhow!("wallet {} failed", n))
            } else {
                Ok(PathBuf::from("same.json"))
            }
        })
        .unwrap();

        assert_eq!(report.written, vec![PathBuf::from("same.json")]);
        assert_eq!(report.into_result().unwrap_err().to_string(), "1 of 2 wallets failed");
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let options = BatchOptions {
            fail_fast: true,
            ..BatchOptions::default()
        };
        let seen = Mutex::new(Vec::new());
        let result = run_batch(vec![1, 2, 3], &options, "ok", |n| {
            lock(&seen).push(n);
            if n == 2 {
                Err(anyhow!("wallet {} failed", n))
            } else {
                Ok(PathBuf::from(format!("{}.json", n)))
            }
        });

        assert!(result.is_err());
        assert_eq!(into_inner(seen), vec![1, 2]);
    }

    #[test]
    fn parallel_batch_processes_every_item() {
        let options = BatchOptions {
            threads: 3,
            ..BatchOptions::default()
        };
        let report = run_batch((0..10).collect::<Vec<u32>>(), &options, "ok", |n| {
            Ok(PathBuf::from(format!("{}.json", n)))
        })
        .unwrap();

        let mut written = report.written;
        written.sort();
        let mut expected: Vec<PathBuf> =
            (0..10).map(|n| PathBuf::from(format!("{}.json", n))).collect();
        expected.sort();
        assert_eq!(written, expected);
    }

    #[test]
    fn regen_rejects_invalid_stored_mnemonic() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(KeysDir::new(dir.path()));
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"mnemonic": "abandon abandon abandon"}"#).unwrap();

        let err = regen_wallet(&path, &config).unwrap_err();
        assert!(matches!(err, WalletError::Derive(_)));
        assert!(path.exists());
    }
}
