//! Listing the PKIs in a state directory.

use std::io::Write;
use std::path::Path;

use wgmgr_pki::PkiRegistry;

use crate::cli::PkiCommands;
use crate::error::CliError;
use crate::output::{OutputFormat, PkiList};

/// Handler for pki subcommands.
pub struct PkiCommand<'a> {
    state_dir: &'a Path,
}

impl<'a> PkiCommand<'a> {
    /// Creates a new pki command handler for `state_dir`.
    #[must_use]
    pub const fn new(state_dir: &'a Path) -> Self {
        Self { state_dir }
    }

    /// Executes the pki subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the state directory cannot be read.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &PkiCommands,
    ) -> Result<(), CliError> {
        match command {
            PkiCommands::List => {
                let names = PkiRegistry::open(self.state_dir)?.names()?;
                format.write(out, &PkiList { names })
            }
        }
    }
}
