//! PKI records.

use std::net::IpAddr;

use ipnet::IpNet;
use serde::Serialize;
use wgmgr_keys::{PresharedKey, PrivateKey, PublicKey};

use crate::error::{PkiError, Result};

/// Section name reserved for the server record.
pub const SERVER_SECTION: &str = "Server";

/// Device name used when `init` is not given one.
pub const DEFAULT_DEVICE_NAME: &str = "wg0";

/// The server identity of a PKI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    /// WireGuard device name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Network shared by the server and all clients.
    pub network: IpNet,
    /// The server's own address inside `network`.
    pub address: IpAddr,
    /// Externally reachable `host:port`.
    pub endpoint: String,
    /// Server public key.
    pub public_key: PublicKey,
    /// Server private key.
    pub private_key: PrivateKey,
    /// Preshared key shared with every client, if the PKI uses one.
    pub preshared_key: Option<PresharedKey>,
}

impl Server {
    /// Returns the port part of the endpoint.
    pub fn listen_port(&self) -> Result<u16> {
        endpoint_port(&self.endpoint)
    }
}

/// A client identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    /// Unique name, used as the section header.
    pub name: String,
    /// Client public key.
    pub public_key: PublicKey,
    /// Address issued to the client.
    pub address: IpAddr,
}

/// Parameters for initializing a PKI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitParams {
    /// WireGuard device name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Network shared by the server and all clients.
    pub network: IpNet,
    /// The server's own address.
    pub address: IpAddr,
    /// Externally reachable `host:port`.
    pub endpoint: String,
    /// Whether to generate a preshared key.
    pub generate_psk: bool,
}

impl InitParams {
    /// Creates parameters with the default device name, an empty description
    /// and no preshared key.
    #[must_use]
    pub fn new(network: IpNet, address: IpAddr, endpoint: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_DEVICE_NAME.to_string(),
            description: String::new(),
            network,
            address,
            endpoint: endpoint.into(),
            generate_psk: false,
        }
    }

    /// Sets the device name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Requests a preshared key.
    #[must_use]
    pub fn with_psk(mut self, generate_psk: bool) -> Self {
        self.generate_psk = generate_psk;
        self
    }

    /// Checks the free-text fields, the server address and the endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(invalid_field("name", &self.name));
        }
        check_single_line("name", &self.name)?;
        check_single_line("description", &self.description)?;
        if !self.network.contains(&self.address) {
            return Err(PkiError::InvalidNetwork(format!(
                "server address {} is outside network {}",
                self.address, self.network
            )));
        }
        endpoint_port(&self.endpoint).map(|_| ())
    }
}

/// Free-text values are stored one per line and trimmed on load.
fn check_single_line(field: &'static str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) || value.trim() != value {
        return Err(invalid_field(field, value));
    }
    Ok(())
}

fn invalid_field(field: &'static str, value: &str) -> PkiError {
    PkiError::InvalidServerField {
        field,
        value: value.to_string(),
    }
}

/// Extracts the port from a `host:port` endpoint.
///
/// IPv6 literal hosts must be bracketed (`[2001:db8::1]:51820`).
pub fn endpoint_port(endpoint: &str) -> Result<u16> {
    let invalid = || PkiError::InvalidEndpoint(endpoint.to_string());

    let (host, port) = endpoint.rsplit_once(':').ok_or_else(invalid)?;
    let bracketed = host.starts_with('[') && host.ends_with(']') && host.len() > 2;
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if host.contains(':') && !bracketed {
        return Err(invalid());
    }
    match port.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(invalid()),
    }
}

/// Checks that `name` can be used as a client name.
///
/// The reserved server section is rejected, as is anything that would not
/// survive as a section header.
pub fn validate_client_name(name: &str) -> Result<()> {
    let invalid = name == SERVER_SECTION
        || name.is_empty()
        || name.trim() != name
        || name.contains(['[', ']', '\n', '\r']);
    if invalid {
        return Err(PkiError::InvalidClientName(name.to_string()));
    }
    Ok(())
}

/// Returns `address` as a single-host CIDR string (`/32` or `/128`).
#[must_use]
pub fn host_cidr(address: IpAddr) -> String {
    let prefix = if address.is_ipv4() { 32 } else { 128 };
    format!("{address}/{prefix}")
}
