//! In-memory PKI state and its textual form.
//!
//! ```text
//! [Server]
//! Name = wg0
//! Description = home net
//! Network = 10.0.0.0/24
//! Address = 10.0.0.1
//! Endpoint = vpn.example.com:51820
//! PublicKey = ...
//! PrivateKey = ...
//! PresharedKey = ...
//!
//! [alice]
//! PublicKey = ...
//! Address = 10.0.0.2
//! ```

use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use tracing::warn;
use wgmgr_keys::{PresharedKey, PrivateKey, PublicKey};

use crate::error::{PkiError, Result};
use crate::ini::{Document, Section};
use crate::types::{validate_client_name, Client, Server, DEFAULT_DEVICE_NAME, SERVER_SECTION};

const SERVER_KEYS: [&str; 8] = [
    "Name",
    "Description",
    "Network",
    "Address",
    "Endpoint",
    "PublicKey",
    "PrivateKey",
    "PresharedKey",
];
const CLIENT_KEYS: [&str; 2] = ["PublicKey", "Address"];

/// One PKI: an optional server record and an ordered client roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PkiStore {
    server: Option<Server>,
    clients: Vec<Client>,
}

impl PkiStore {
    /// Creates an empty, uninitialized store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a server record exists.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.server.is_some()
    }

    /// Returns the server record, if any.
    #[must_use]
    pub const fn server(&self) -> Option<&Server> {
        self.server.as_ref()
    }

    /// Returns the server record or [`PkiError::NotInitialized`].
    pub fn require_server(&self) -> Result<&Server> {
        self.server.as_ref().ok_or(PkiError::NotInitialized)
    }

    /// Looks up a client by name.
    #[must_use]
    pub fn client(&self, name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.name == name)
    }

    /// Iterates over clients in insertion order.
    pub fn clients(&self) -> std::slice::Iter<'_, Client> {
        self.clients.iter()
    }

    /// Returns the number of clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if there are no clients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Returns every address issued in this PKI, the server's included.
    #[must_use]
    pub fn issued_addresses(&self) -> HashSet<IpAddr> {
        self.server
            .iter()
            .map(|s| s.address)
            .chain(self.clients.iter().map(|c| c.address))
            .collect()
    }

    /// Returns the name of the client holding `address`, if any.
    #[must_use]
    pub fn holder_of(&self, address: IpAddr) -> Option<&str> {
        self.clients
            .iter()
            .find(|c| c.address == address)
            .map(|c| c.name.as_str())
    }

    pub(crate) fn set_server(&mut self, server: Server) {
        self.server = Some(server);
    }

    pub(crate) fn push_client(&mut self, client: Client) -> &Client {
        let index = self.clients.len();
        self.clients.push(client);
        &self.clients[index]
    }

    pub(crate) fn client_mut(&mut self, name: &str) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.name == name)
    }

    pub(crate) fn remove_client(&mut self, name: &str) -> Option<Client> {
        let index = self.clients.iter().position(|c| c.name == name)?;
        Some(self.clients.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.server = None;
        self.clients.clear();
    }

    /// Builds the persisted document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let server = self.server.iter().map(|server| {
            Section::new(SERVER_SECTION)
                .with("Name", &server.name)
                .with("Description", &server.description)
                .with("Network", server.network.to_string())
                .with("Address", server.address.to_string())
                .with("Endpoint", &server.endpoint)
                .with("PublicKey", server.public_key.to_base64())
                .with("PrivateKey", server.private_key.to_base64())
                .with_opt(
                    "PresharedKey",
                    server.preshared_key.as_ref().map(PresharedKey::to_base64),
                )
        });
        let clients = self.clients.iter().map(|client| {
            Section::new(&client.name)
                .with("PublicKey", client.public_key.to_base64())
                .with("Address", client.address.to_string())
        });
        server.chain(clients).collect()
    }

    /// Parses the persisted form.
    pub fn parse(input: &str) -> Result<Self> {
        let document = Document::parse(input)?;
        let mut store = Self::new();

        for section in document.sections() {
            if section.name() == SERVER_SECTION {
                warn_unknown_keys(section, &SERVER_KEYS);
                store.server = Some(parse_server(section)?);
            } else {
                warn_unknown_keys(section, &CLIENT_KEYS);
                let client = parse_client(section)?;
                if let Some(holder) = store.holder_of(client.address) {
                    return Err(PkiError::parse(
                        section.line(),
                        format!(
                            "address {} of [{}] is already issued to [{holder}]",
                            client.address, client.name
                        ),
                    ));
                }
                store.clients.push(client);
            }
        }

        Ok(store)
    }
}

impl fmt::Display for PkiStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}

impl FromStr for PkiStore {
    type Err = PkiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn warn_unknown_keys(section: &Section, known: &[&str]) {
    for (key, _) in section.entries() {
        if !known.contains(&key) {
            warn!(section = section.name(), key, "ignoring unknown key");
        }
    }
}

fn parse_value<T: FromStr>(section: &Section, key: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    let value = section.require(key)?;
    value.parse().map_err(|e| {
        PkiError::parse(
            section.line(),
            format!("invalid {key} in [{}] section: {e}", section.name()),
        )
    })
}

fn parse_server(section: &Section) -> Result<Server> {
    let preshared_key = section
        .get("PresharedKey")
        .map(|psk| {
            PresharedKey::from_base64(psk).map_err(|e| {
                PkiError::parse(section.line(), format!("invalid PresharedKey: {e}"))
            })
        })
        .transpose()?;

    let private_key = PrivateKey::from_base64(section.require("PrivateKey")?)
        .map_err(|e| PkiError::parse(section.line(), format!("invalid PrivateKey: {e}")))?;

    Ok(Server {
        name: section.get("Name").unwrap_or(DEFAULT_DEVICE_NAME).to_string(),
        description: section.get("Description").unwrap_or_default().to_string(),
        network: parse_value(section, "Network")?,
        address: parse_value(section, "Address")?,
        endpoint: section.require("Endpoint")?.to_string(),
        public_key: parse_value::<PublicKey>(section, "PublicKey")?,
        private_key,
        preshared_key,
    })
}

fn parse_client(section: &Section) -> Result<Client> {
    validate_client_name(section.name())
        .map_err(|e| PkiError::parse(section.line(), e.to_string()))?;

    Ok(Client {
        name: section.name().to_string(),
        public_key: parse_value(section, "PublicKey")?,
        address: parse_value(section, "Address")?,
    })
}
