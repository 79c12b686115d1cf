//! Error types for WireGuard key operations.

use thiserror::Error;

/// Errors that can occur while decoding or validating key tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The token does not have the 44-character length of an encoded key.
    #[error("invalid key token length: expected 44 characters, got {0}")]
    InvalidTokenLength(usize),

    /// Invalid base64 encoding.
    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(String),

    /// Decoded key has the wrong number of bytes.
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),
}
