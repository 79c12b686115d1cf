//! CLI error types and exit codes.

use std::fmt;

use wgmgr_pki::{ErrorKind, PkiError};

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// A PKI operation failed.
    Pki(PkiError),
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// Code 2 is left to clap's usage errors.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Pki(err) => match err.kind() {
                ErrorKind::Io => 1,
                ErrorKind::NotInitialized => 3,
                ErrorKind::AlreadyInitialized => 4,
                ErrorKind::InvalidClientName => 5,
                ErrorKind::InvalidKeyFormat => 6,
                ErrorKind::DuplicateClient => 7,
                ErrorKind::DuplicateIpAddress => 8,
                ErrorKind::NetworkExhausted => 9,
                ErrorKind::NoSuchClient => 10,
                ErrorKind::InvalidInput => 11,
                ErrorKind::Parse => 12,
            },
            Self::Format(_) | Self::Io(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pki(e) => write!(f, "{e}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pki(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PkiError> for CliError {
    fn from(err: PkiError) -> Self {
        Self::Pki(err)
    }
}
