//! PKI error types.

use std::net::IpAddr;

use ipnet::IpNet;
use thiserror::Error;
use wgmgr_keys::KeyError;

/// Result type for PKI operations.
pub type Result<T> = std::result::Result<T, PkiError>;

/// PKI error variants.
#[derive(Debug, Error)]
pub enum PkiError {
    /// The PKI already has a server record.
    #[error("PKI is already initialized")]
    AlreadyInitialized,

    /// The PKI has no server record yet.
    #[error("PKI is not initialized")]
    NotInitialized,

    /// The name is reserved or cannot be used as a section header.
    #[error("invalid client name: {0:?}")]
    InvalidClientName(String),

    /// A supplied key is not a 44-character base64 token.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(#[from] KeyError),

    /// A client with this name already exists.
    #[error("a client named {0:?} already exists")]
    DuplicateClient(String),

    /// The address is already issued.
    #[error("IP address {0} is already in use")]
    DuplicateIpAddress(IpAddr),

    /// Every non-reserved host address of the network is issued.
    #[error("no free addresses left in network {0}")]
    NetworkExhausted(IpNet),

    /// No client with this name exists.
    #[error("no such client: {0:?}")]
    NoSuchClient(String),

    /// The network or the server address is unusable.
    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    /// An explicitly supplied client address lies outside the PKI network.
    #[error("address {address} is outside network {network}")]
    AddressOutsideNetwork {
        /// The rejected address.
        address: IpAddr,
        /// The PKI network.
        network: IpNet,
    },

    /// The endpoint lacks a valid trailing `:port`.
    #[error("invalid endpoint {0:?}: expected host:port")]
    InvalidEndpoint(String),

    /// A free-text server field cannot be stored as a single line.
    #[error("invalid {field} {value:?}: must be one line without surrounding whitespace")]
    InvalidServerField {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The PKI name cannot be used as a registry entry.
    #[error("invalid PKI name: {0:?}")]
    InvalidPkiName(String),

    /// A persisted PKI file is malformed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// One-based line number (0 when the error concerns the whole file).
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Filesystem error while loading or saving a PKI.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category, independent of the payload carried by [`PkiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`PkiError::AlreadyInitialized`].
    AlreadyInitialized,
    /// See [`PkiError::NotInitialized`].
    NotInitialized,
    /// See [`PkiError::InvalidClientName`].
    InvalidClientName,
    /// See [`PkiError::InvalidKeyFormat`].
    InvalidKeyFormat,
    /// See [`PkiError::DuplicateClient`].
    DuplicateClient,
    /// See [`PkiError::DuplicateIpAddress`].
    DuplicateIpAddress,
    /// See [`PkiError::NetworkExhausted`].
    NetworkExhausted,
    /// See [`PkiError::NoSuchClient`].
    NoSuchClient,
    /// Invalid network, endpoint, server field, out-of-range address or PKI name.
    InvalidInput,
    /// See [`PkiError::Parse`].
    Parse,
    /// See [`PkiError::Io`].
    Io,
}

impl PkiError {
    /// Returns the category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::InvalidClientName(_) => ErrorKind::InvalidClientName,
            Self::InvalidKeyFormat(_) => ErrorKind::InvalidKeyFormat,
            Self::DuplicateClient(_) => ErrorKind::DuplicateClient,
            Self::DuplicateIpAddress(_) => ErrorKind::DuplicateIpAddress,
            Self::NetworkExhausted(_) => ErrorKind::NetworkExhausted,
            Self::NoSuchClient(_) => ErrorKind::NoSuchClient,
            Self::InvalidNetwork(_)
            | Self::AddressOutsideNetwork { .. }
            | Self::InvalidEndpoint(_)
            | Self::InvalidServerField { .. }
            | Self::InvalidPkiName(_) => ErrorKind::InvalidInput,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
