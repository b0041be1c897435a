use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::Args;
use crate::error::StoreError;
use crate::generator::DerivationOptions;

pub const KEYS_DIR_NAME: &str = "keys";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysDir {
    path: PathBuf,
}

impl KeysDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        KeysDir { path: path.into() }
    }

    pub fn next_to_executable() -> Result<Self, StoreError> {
        let exe = std::env::current_exe().map_err(|e| StoreError::io("<current executable>", e))?;
        let parent = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(KeysDir::new(parent.join(KEYS_DIR_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_exists(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    pub fn wallet_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Every `*.json` regular file in the directory, sorted by path.
    pub fn wallet_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = fs::read_dir(&self.path).map_err(|e| StoreError::io(&self.path, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.path, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| StoreError::io(&path, e))?;

            let is_json = path.extension().map_or(false, |ext| ext == "json");
            if file_type.is_file() && is_json {
                files.push(path);
            } else {
                debug!(path = %path.display(), "skipping non-wallet entry");
            }
        }

        files.sort();
        Ok(files)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads; 1 runs sequentially, 0 uses every core.
    pub threads: usize,
    pub fail_fast: bool,
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            threads: 1,
            fail_fast: false,
            show_progress: false,
        }
    }
}

impl BatchOptions {
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub keys_dir: KeysDir,
    pub batch: BatchOptions,
    pub derivation: DerivationOptions,
}

impl Config {
    pub fn new(keys_dir: KeysDir) -> Self {
        Config {
            keys_dir,
            batch: BatchOptions::default(),
            derivation: DerivationOptions::default(),
        }
    }

    pub fn from_args(args: &Args) -> Result<Self, StoreError> {
        let keys_dir = match &args.keys_dir {
            Some(path) => KeysDir::new(path),
            None => KeysDir::next_to_executable()?,
        };

        Ok(Config {
            keys_dir,
            batch: BatchOptions {
                threads: args.threads,
                fail_fast: args.fail_fast,
                show_progress: true,
            },
            derivation: DerivationOptions::default(),
        })
    }
}
