//! Client management command implementation.
//!
//! Handles adding, modifying, removing and listing clients, and dumping a
//! client's WireGuard config.

use std::io::Write;
use std::net::IpAddr;
use std::path::Path;

use tracing::debug;
use wgmgr_pki::{render, OsKeyService, PkiEngine, PkiStore};

use crate::cli::ClientCommands;
use crate::error::CliError;
use crate::output::{write_text, ClientList, ClientRow, OutputFormat};
use crate::target::Target;

/// Handler for client subcommands.
pub struct ClientCommand<'a> {
    target: &'a Target,
}

impl<'a> ClientCommand<'a> {
    /// Creates a new client command handler.
    #[must_use]
    pub const fn new(target: &'a Target) -> Self {
        Self { target }
    }

    /// Executes the client subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &ClientCommands,
    ) -> Result<(), CliError> {
        match command {
            ClientCommands::Add {
                pubkey,
                address,
                name,
            } => self.add(out, format, pubkey, *address, name.as_deref()),
            ClientCommands::Modify {
                name,
                pubkey,
                address,
            } => self.modify(out, format, name, pubkey.as_deref(), *address),
            ClientCommands::Remove { name } => self.remove(name),
            ClientCommands::List => self.list(out, format),
            ClientCommands::Dump { name, out_file } => {
                self.dump(out, name, out_file.as_deref())
            }
        }
    }

    fn add<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        pubkey: &str,
        address: Option<IpAddr>,
        name: Option<&str>,
    ) -> Result<(), CliError> {
        let row = self.target.transact(|store: &mut PkiStore| {
            PkiEngine::apply(store, OsKeyService, |engine| {
                engine.add_client(pubkey, address, name).map(ClientRow::from)
            })
        })?;
        format.write(out, &row)
    }

    fn modify<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        name: &str,
        pubkey: Option<&str>,
        address: Option<IpAddr>,
    ) -> Result<(), CliError> {
        let row = self.target.transact(|store: &mut PkiStore| {
            PkiEngine::apply(store, OsKeyService, |engine| {
                engine.modify_client(name, pubkey, address).map(ClientRow::from)
            })
        })?;
        format.write(out, &row)
    }

    fn remove(&self, name: &str) -> Result<(), CliError> {
        self.target.transact(|store: &mut PkiStore| {
            PkiEngine::apply(store, OsKeyService, |engine| engine.remove_client(name))
        })?;
        Ok(())
    }

    fn list<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let list = self.target.read(|store| {
            store.require_server()?;
            Ok(ClientList {
                clients: store.clients().map(ClientRow::from).collect(),
            })
        })?;
        debug!(pki = %self.target, clients = list.clients.len(), "listing clients");
        format.write(out, &list)
    }

    fn dump<W: Write>(
        &self,
        out: &mut W,
        name: &str,
        out_file: Option<&Path>,
    ) -> Result<(), CliError> {
        let text = self
            .target
            .read(|store| render::client_config(store, name))?;
        write_text(out, out_file, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Format, InitArgs};
    use crate::commands::InitCommand;
    use tempfile::TempDir;
    use wgmgr_pki::{PkiError, PkiFile};

    const ALICE: &str = "AgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgI=";

    fn initialized(dir: &TempDir) -> Target {
        let target = Target::File(PkiFile::new(dir.path().join("pki.conf")));
        let args = InitArgs {
            network: "10.0.0.0/24".into(),
            address: "10.0.0.1".into(),
            endpoint: "vpn.example.com:51820".into(),
            name: "dev0".into(),
            description: String::new(),
            psk: false,
        };
        InitCommand::new(&target)
            .execute(&mut Vec::new(), &OutputFormat::default(), &args, false)
            .expect("init");
        target
    }

    fn run(target: &Target, format: Format, command: ClientCommands) -> Result<String, CliError> {
        let mut out = Vec::new();
        ClientCommand::new(target).execute(&mut out, &OutputFormat::new(format), &command)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    fn add_alice() -> ClientCommands {
        ClientCommands::Add {
            pubkey: ALICE.into(),
            address: None,
            name: Some("alice".into()),
        }
    }

    #[test]
    fn add_prints_issued_address() {
        let dir = TempDir::new().expect("tempdir");
        let target = initialized(&dir);
        let out = run(&target, Format::Table, add_alice()).expect("add");
        assert!(out.starts_with("alice"));
        assert!(out.contains("10.0.0.2"));
    }

    #[test]
    fn list_json_after_add() {
        let dir = TempDir::new().expect("tempdir");
        let target = initialized(&dir);
        run(&target, Format::Table, add_alice()).expect("add");

        let out = run(&target, Format::Json, ClientCommands::List).expect("list");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value[0]["public_key"], ALICE);
    }

    #[test]
    fn remove_prints_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let target = initialized(&dir);
        run(&target, Format::Table, add_alice()).expect("add");

        let out = run(
            &target,
            Format::Table,
            ClientCommands::Remove {
                name: "alice".into(),
            },
        )
        .expect("remove");
        assert!(out.is_empty());

        let err = run(
            &target,
            Format::Table,
            ClientCommands::Remove {
                name: "alice".into(),
            },
        )
        .expect_err("already removed");
        assert!(matches!(err, CliError::Pki(PkiError::NoSuchClient(_))));
    }

    #[test]
    fn dump_writes_client_config() {
        let dir = TempDir::new().expect("tempdir");
        let target = initialized(&dir);
        run(&target, Format::Table, add_alice()).expect("add");

        let out = run(
            &target,
            Format::Table,
            ClientCommands::Dump {
                name: "alice".into(),
                out_file: None,
            },
        )
        .expect("dump");
        assert!(out.starts_with("[Interface]\n"));
        assert!(out.contains("Address = 10.0.0.2/32\n"));
    }

    #[test]
    fn list_before_init_fails() {
        let dir = TempDir::new().expect("tempdir");
        let target = Target::File(PkiFile::new(dir.path().join("pki.conf")));
        let err = run(&target, Format::Table, ClientCommands::List).expect_err("uninitialized");
        assert_eq!(err.exit_code(), 3);
    }
}
