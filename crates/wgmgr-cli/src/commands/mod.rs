//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`init`] - PKI initialization
//! - [`client`] - Client management and client config dumps
//! - [`server`] - Server config dumps
//! - [`pki`] - Listing PKIs in a state directory

pub mod client;
pub mod init;
pub mod pki;
pub mod server;

pub use client::ClientCommand;
pub use init::InitCommand;
pub use pki::PkiCommand;
pub use server::ServerCommand;
