//! Output formatting for CLI commands.
//!
//! Listings support table (human-readable) and JSON output. Rendered configs
//! are plain text and go to stdout or a file.

use std::fs;
use std::io::Write;
use std::net::IpAddr;
use std::path::Path;

use serde::Serialize;
use tracing::info;
use wgmgr_pki::{Client, Server};

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Writes rendered config text to `out_file`, or to `out` when no file is
/// given.
pub fn write_text<W: Write>(
    out: &mut W,
    out_file: Option<&Path>,
    text: &str,
) -> Result<(), CliError> {
    match out_file {
        Some(path) => {
            fs::write(path, text)?;
            info!(path = %path.display(), "wrote config");
        }
        None => out.write_all(text.as_bytes())?,
    }
    Ok(())
}

/// One client as shown by `client list`, `client add` and `client modify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRow {
    /// Client name.
    pub name: String,
    /// Issued address.
    pub address: IpAddr,
    /// Base64 public key.
    pub public_key: String,
}

impl From<&Client> for ClientRow {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            address: client.address,
            public_key: client.public_key.to_base64(),
        }
    }
}

impl ClientRow {
    fn write_row<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "{:<24}  {:<15}  {}",
            self.name, self.address, self.public_key
        )?;
        Ok(())
    }
}

impl TableDisplay for ClientRow {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        self.write_row(writer)
    }
}

/// Client roster, serialized as a JSON array.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClientList {
    /// Clients in insertion order.
    pub clients: Vec<ClientRow>,
}

impl TableDisplay for ClientList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.clients.is_empty() {
            writeln!(writer, "No clients")?;
            return Ok(());
        }

        writeln!(writer, "{:<24}  {:<15}  {}", "NAME", "ADDRESS", "PUBLIC KEY")?;
        writeln!(writer, "{}", "─".repeat(87))?;
        for client in &self.clients {
            client.write_row(writer)?;
        }
        Ok(())
    }
}

/// Summary printed after `init`.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSummary {
    /// Device name.
    pub name: String,
    /// PKI network.
    pub network: String,
    /// Server address.
    pub address: IpAddr,
    /// Server endpoint.
    pub endpoint: String,
    /// Server public key.
    pub public_key: String,
    /// Whether a preshared key was generated.
    pub preshared_key: bool,
}

impl From<&Server> for ServerSummary {
    fn from(server: &Server) -> Self {
        Self {
            name: server.name.clone(),
            network: server.network.to_string(),
            address: server.address,
            endpoint: server.endpoint.clone(),
            public_key: server.public_key.to_base64(),
            preshared_key: server.preshared_key.is_some(),
        }
    }
}

impl TableDisplay for ServerSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Device:         {}", self.name)?;
        writeln!(writer, "Network:        {}", self.network)?;
        writeln!(writer, "Address:        {}", self.address)?;
        writeln!(writer, "Endpoint:       {}", self.endpoint)?;
        writeln!(writer, "Public key:     {}", self.public_key)?;
        writeln!(
            writer,
            "Preshared key:  {}",
            if self.preshared_key { "yes" } else { "no" }
        )?;
        Ok(())
    }
}

/// PKI names in a state directory, serialized as a JSON array.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PkiList {
    /// Sorted PKI names.
    pub names: Vec<String>,
}

impl TableDisplay for PkiList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for name in &self.names {
            writeln!(writer, "{name}")?;
        }
        Ok(())
    }
}
