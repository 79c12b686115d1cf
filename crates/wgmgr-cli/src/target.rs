//! Which PKI a command operates on.

use std::fmt;

use wgmgr_pki::{PkiFile, PkiRegistry, PkiStore, Result};

use crate::cli::Cli;
use crate::error::CliError;

/// A single PKI file, or one named PKI inside a registry directory.
#[derive(Debug)]
pub enum Target {
    /// `--config-file`.
    File(PkiFile),
    /// `--state-dir` plus `--pki`.
    Registry {
        /// The state directory.
        registry: PkiRegistry,
        /// The selected PKI.
        name: String,
    },
}

impl Target {
    /// Selects the target from the global options. `--pki` wins over
    /// `--config-file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created.
    pub fn from_cli(cli: &Cli) -> std::result::Result<Self, CliError> {
        match &cli.pki {
            Some(name) => Ok(Self::Registry {
                registry: PkiRegistry::open(&cli.state_dir)?,
                name: name.clone(),
            }),
            None => Ok(Self::File(PkiFile::new(&cli.config_file))),
        }
    }

    /// Loads, mutates and saves the PKI.
    pub fn transact<T>(&self, f: impl FnOnce(&mut PkiStore) -> Result<T>) -> Result<T> {
        match self {
            Self::File(file) => file.transact(f),
            Self::Registry { registry, name } => registry.transact(name, f),
        }
    }

    /// Replaces the PKI with what `f` builds from an empty store.
    pub fn replace<T>(&self, f: impl FnOnce(&mut PkiStore) -> Result<T>) -> Result<T> {
        match self {
            Self::File(file) => file.replace(f),
            Self::Registry { registry, name } => registry.replace(name, f),
        }
    }

    /// Loads the PKI for reading.
    pub fn read<T>(&self, f: impl FnOnce(&PkiStore) -> Result<T>) -> Result<T> {
        match self {
            Self::File(file) => file.read(f),
            Self::Registry { registry, name } => registry.read(name, f),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(file) => write!(f, "{}", file.path().display()),
            Self::Registry { registry, name } => {
                write!(f, "{name} in {}", registry.root().display())
            }
        }
    }
}
