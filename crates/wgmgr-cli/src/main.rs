//! wgmgr CLI binary entrypoint.
//!
//! This is the main entry point for the `wgmgr` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wgmgr_cli::cli::{Cli, Commands};
use wgmgr_cli::commands::{ClientCommand, InitCommand, PkiCommand, ServerCommand};
use wgmgr_cli::output::OutputFormat;
use wgmgr_cli::{CliError, Target};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

const fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Init(args) => {
            let target = Target::from_cli(cli)?;
            InitCommand::new(&target).execute(&mut stdout, &format, args, cli.force)?;
        }
        Commands::Client { command } => {
            let target = Target::from_cli(cli)?;
            ClientCommand::new(&target).execute(&mut stdout, &format, command)?;
        }
        Commands::Server { command } => {
            let target = Target::from_cli(cli)?;
            ServerCommand::new(&target).execute(&mut stdout, command)?;
        }
        Commands::Pki { command } => {
            PkiCommand::new(&cli.state_dir).execute(&mut stdout, &format, command)?;
        }
    }

    Ok(())
}
