//! # wgmgr-cli
//!
//! Command-line interface for managing WireGuard PKIs.
//!
//! Provides commands for:
//! - Initializing a PKI (server key pair, network, endpoint)
//! - Adding, modifying, removing and listing clients
//! - Dumping client configs and the server's systemd-networkd netdev config
//!
//! A command operates either on a single PKI file (`--config-file`) or on a
//! named PKI inside a state directory (`--state-dir` plus `--pki`). Every
//! mutation is a load, mutate, save transaction on that PKI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod target;

pub use cli::{ClientCommands, Cli, Commands, Format, InitArgs, PkiCommands, ServerCommands};
pub use error::CliError;
pub use output::OutputFormat;
pub use target::Target;
