//! Command-line argument parsing with clap.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use wgmgr_pki::DEFAULT_DEVICE_NAME;

/// Manage a WireGuard PKI: server identity, clients and their addresses.
#[derive(Parser, Debug, Clone)]
#[command(name = "wgmgr")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// PKI file to operate on.
    #[arg(short, long, env = "WGMGR_CONFIG", default_value = "pki.conf")]
    pub config_file: PathBuf,

    /// Directory holding named PKIs (used with --pki and by `pki list`).
    #[arg(long, env = "WGMGR_STATE_DIR", default_value = ".")]
    pub state_dir: PathBuf,

    /// Operate on the named PKI inside --state-dir instead of --config-file.
    #[arg(long, env = "WGMGR_PKI")]
    pub pki: Option<String>,

    /// Overwrite an existing PKI on init.
    #[arg(short, long)]
    pub force: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize the PKI with a fresh server key pair.
    Init(InitArgs),

    /// Client management commands.
    Client {
        /// Client subcommand to execute.
        #[command(subcommand)]
        command: ClientCommands,
    },

    /// Server configuration commands.
    Server {
        /// Server subcommand to execute.
        #[command(subcommand)]
        command: ServerCommands,
    },

    /// Commands on the PKI directory.
    Pki {
        /// PKI subcommand to execute.
        #[command(subcommand)]
        command: PkiCommands,
    },
}

/// Arguments for the init command.
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Network shared by server and clients, e.g. 10.0.0.0/24.
    pub network: String,

    /// The server's address inside the network.
    pub address: String,

    /// Externally reachable host:port of the server.
    pub endpoint: String,

    /// WireGuard device name.
    #[arg(short, long, default_value = DEFAULT_DEVICE_NAME)]
    pub name: String,

    /// Description written to the netdev config.
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Generate a preshared key shared by all clients.
    #[arg(short, long)]
    pub psk: bool,
}

/// Client subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ClientCommands {
    /// Add a client.
    ///
    /// Without --address the lowest free address of the network is issued.
    Add {
        /// The client's public key (44 characters of base64).
        pubkey: String,

        /// Address to issue instead of the next free one.
        #[arg(short, long)]
        address: Option<IpAddr>,

        /// Client name; defaults to the public key.
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Change a client's public key and/or address.
    #[command(group(
        ArgGroup::new("change")
            .required(true)
            .multiple(true)
            .args(["pubkey", "address"])
    ))]
    Modify {
        /// Client to change.
        name: String,

        /// New public key.
        #[arg(short, long)]
        pubkey: Option<String>,

        /// New address.
        #[arg(short, long)]
        address: Option<IpAddr>,
    },

    /// Remove a client.
    Remove {
        /// Client to remove.
        name: String,
    },

    /// List clients.
    List,

    /// Print a client's WireGuard config.
    Dump {
        /// Client to dump.
        name: String,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        out_file: Option<PathBuf>,
    },
}

/// Server subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ServerCommands {
    /// Print the systemd-networkd netdev config.
    Dump {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        out_file: Option<PathBuf>,
    },
}

/// PKI directory subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum PkiCommands {
    /// List the PKIs in --state-dir.
    List,
}
