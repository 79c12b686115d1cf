//! WireGuard key material for wgmgr.
//!
//! This crate provides the Curve25519 key types stored in a PKI file, the
//! 44-character token validation applied to operator-supplied keys, and the
//! [`KeyService`] boundary through which the PKI engine obtains fresh keys.

#![forbid(unsafe_code)]

pub mod error;
mod keys;
mod service;

pub use error::KeyError;
pub use keys::{
    validate_token, KeyPair, PresharedKey, PrivateKey, PublicKey, KEY_SIZE, TOKEN_LEN,
};
pub use service::{KeyService, OsKeyService};
