//! WireGuard PKI management.
//!
//! A PKI is one WireGuard server identity plus a roster of named clients,
//! each with a public key and an address from the server's network. This
//! crate holds that state ([`PkiStore`]), mutates it ([`PkiEngine`]),
//! persists it ([`PkiFile`], [`PkiRegistry`]) and renders the configuration
//! files a deployment needs (see [`render`]).
//!
//! # Example
//!
//! ```
//! use wgmgr_pki::{InitParams, PkiEngine, PkiStore};
//!
//! let mut engine = PkiEngine::with_os_keys(PkiStore::new());
//! engine.init(InitParams::new(
//!     "10.0.0.0/24".parse().unwrap(),
//!     "10.0.0.1".parse().unwrap(),
//!     "vpn.example.com:51820",
//! ))?;
//!
//! let client = engine.add_client(
//!     "AgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgI=",
//!     None,
//!     Some("alice"),
//! )?;
//! assert_eq!(client.address.to_string(), "10.0.0.2");
//!
//! let config = engine.render_client_config("alice")?;
//! assert!(config.contains("Endpoint = vpn.example.com:51820"));
//! # Ok::<(), wgmgr_pki::PkiError>(())
//! ```

#![forbid(unsafe_code)]

pub mod allocation;
pub mod engine;
pub mod error;
pub mod file;
pub mod ini;
pub mod registry;
pub mod render;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use allocation::{allocate, AddressAllocator};
pub use engine::PkiEngine;
pub use error::{ErrorKind, PkiError, Result};
pub use file::PkiFile;
pub use registry::{validate_pki_name, PkiRegistry};
pub use render::PRIVATE_KEY_PLACEHOLDER;
pub use store::PkiStore;
pub use types::{
    endpoint_port, host_cidr, validate_client_name, Client, InitParams, Server,
    DEFAULT_DEVICE_NAME, SERVER_SECTION,
};
pub use wgmgr_keys::{KeyService, OsKeyService, PublicKey};
