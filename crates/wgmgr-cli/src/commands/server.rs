//! Server config dump.

use std::io::Write;
use std::path::Path;

use wgmgr_pki::render;

use crate::cli::ServerCommands;
use crate::error::CliError;
use crate::output::write_text;
use crate::target::Target;

/// Handler for server subcommands.
pub struct ServerCommand<'a> {
    target: &'a Target,
}

impl<'a> ServerCommand<'a> {
    /// Creates a new server command handler.
    #[must_use]
    pub const fn new(target: &'a Target) -> Self {
        Self { target }
    }

    /// Executes the server subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the PKI is not initialized or the output cannot be
    /// written.
    pub fn execute<W: Write>(&self, out: &mut W, command: &ServerCommands) -> Result<(), CliError> {
        match command {
            ServerCommands::Dump { out_file } => self.dump(out, out_file.as_deref()),
        }
    }

    fn dump<W: Write>(&self, out: &mut W, out_file: Option<&Path>) -> Result<(), CliError> {
        let text = self.target.read(render::server_config)?;
        write_text(out, out_file, &text)
    }
}
