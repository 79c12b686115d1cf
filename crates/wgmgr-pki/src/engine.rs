//! PKI mutations.
//!
//! Every operation validates all of its inputs before touching the store, so
//! a failed call leaves the store exactly as it was.

use std::net::IpAddr;

use tracing::{debug, info};
use wgmgr_keys::{KeyService, OsKeyService, PublicKey};

use crate::allocation::AddressAllocator;
use crate::error::{PkiError, Result};
use crate::render;
use crate::store::PkiStore;
use crate::types::{validate_client_name, Client, InitParams, Server};

/// Applies operations to a [`PkiStore`].
#[derive(Debug)]
pub struct PkiEngine<K = OsKeyService> {
    store: PkiStore,
    keys: K,
}

impl PkiEngine<OsKeyService> {
    /// Creates an engine that draws keys from the OS CSPRNG.
    #[must_use]
    pub fn with_os_keys(store: PkiStore) -> Self {
        Self::new(store, OsKeyService)
    }
}

impl<K: KeyService> PkiEngine<K> {
    /// Creates an engine over `store` using `keys` for key generation.
    #[must_use]
    pub const fn new(store: PkiStore, keys: K) -> Self {
        Self { store, keys }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn store(&self) -> &PkiStore {
        &self.store
    }

    /// Consumes the engine and returns the state.
    #[must_use]
    pub fn into_store(self) -> PkiStore {
        self.store
    }

    /// Runs `f` on an engine over `store` and writes the resulting state back.
    ///
    /// Meant for [`crate::PkiFile::transact`] closures, which receive the
    /// loaded store by mutable reference.
    pub fn apply<T>(
        store: &mut PkiStore,
        keys: K,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let mut engine = Self::new(std::mem::take(store), keys);
        let result = f(&mut engine);
        *store = engine.into_store();
        result
    }

    /// Creates the server record.
    ///
    /// # Errors
    ///
    /// [`PkiError::AlreadyInitialized`] if a server record exists;
    /// [`PkiError::InvalidNetwork`] or [`PkiError::InvalidEndpoint`] for bad
    /// parameters.
    pub fn init(&mut self, params: InitParams) -> Result<&Server> {
        if self.store.is_initialized() {
            return Err(PkiError::AlreadyInitialized);
        }
        params.validate()?;

        let (public_key, private_key) = self.keys.generate_keypair().into_parts();
        let preshared_key = params.generate_psk.then(|| self.keys.generate_psk());

        info!(
            name = %params.name,
            network = %params.network,
            address = %params.address,
            endpoint = %params.endpoint,
            psk = params.generate_psk,
            "initialized PKI"
        );

        self.store.set_server(Server {
            name: params.name,
            description: params.description,
            network: params.network.trunc(),
            address: params.address,
            endpoint: params.endpoint,
            public_key,
            private_key,
            preshared_key,
        });
        self.store.require_server()
    }

    /// Drops the server record and all clients.
    pub fn reset(&mut self) {
        if self.store.is_initialized() || !self.store.is_empty() {
            info!(clients = self.store.len(), "discarding existing PKI");
        }
        self.store.clear();
    }

    /// Adds a client.
    ///
    /// The client is named after its public key unless `name` is given, and
    /// receives the lowest free address unless `address` is given.
    pub fn add_client(
        &mut self,
        pubkey: &str,
        address: Option<IpAddr>,
        name: Option<&str>,
    ) -> Result<&Client> {
        let name = name.unwrap_or(pubkey);
        validate_client_name(name)?;
        let network = self.store.require_server()?.network;
        let public_key = PublicKey::from_base64(pubkey)?;

        if self.store.client(name).is_some() {
            return Err(PkiError::DuplicateClient(name.to_string()));
        }

        let address = match address {
            Some(address) => {
                self.check_address(address, None)?;
                address
            }
            None => AddressAllocator::new(network).allocate(&self.store.issued_addresses())?,
        };

        info!(client = name, %address, "added client");
        Ok(self.store.push_client(Client {
            name: name.to_string(),
            public_key,
            address,
        }))
    }

    /// Updates the public key and/or address of a client.
    ///
    /// Fields passed as `None` keep their current value.
    pub fn modify_client(
        &mut self,
        name: &str,
        pubkey: Option<&str>,
        address: Option<IpAddr>,
    ) -> Result<&Client> {
        validate_client_name(name)?;
        self.store.require_server()?;
        if self.store.client(name).is_none() {
            return Err(PkiError::NoSuchClient(name.to_string()));
        }

        let public_key = pubkey.map(PublicKey::from_base64).transpose()?;
        if let Some(address) = address {
            self.check_address(address, Some(name))?;
        }

        let client = self
            .store
            .client_mut(name)
            .ok_or_else(|| PkiError::NoSuchClient(name.to_string()))?;
        if let Some(public_key) = public_key {
            client.public_key = public_key;
        }
        if let Some(address) = address {
            client.address = address;
        }

        info!(
            client = name,
            pubkey_changed = pubkey.is_some(),
            address = %client.address,
            "modified client"
        );
        Ok(&*client)
    }

    /// Removes a client and returns its record.
    pub fn remove_client(&mut self, name: &str) -> Result<Client> {
        validate_client_name(name)?;
        self.store.require_server()?;

        let client = self
            .store
            .remove_client(name)
            .ok_or_else(|| PkiError::NoSuchClient(name.to_string()))?;
        info!(client = name, address = %client.address, "removed client");
        Ok(client)
    }

    /// Lists clients in insertion order.
    pub fn list_clients(&self) -> Result<std::slice::Iter<'_, Client>> {
        self.store.require_server()?;
        Ok(self.store.clients())
    }

    /// Renders the WireGuard config for client `name`.
    pub fn render_client_config(&self, name: &str) -> Result<String> {
        render::client_config(&self.store, name)
    }

    /// Renders the systemd-networkd netdev config for the server.
    pub fn render_server_config(&self) -> Result<String> {
        render::server_config(&self.store)
    }

    /// Checks an explicitly requested address against the network and the
    /// addresses already issued to anyone other than `owner`.
    fn check_address(&self, address: IpAddr, owner: Option<&str>) -> Result<()> {
        let server = self.store.require_server()?;
        if !server.network.contains(&address) {
            return Err(PkiError::AddressOutsideNetwork {
                address,
                network: server.network,
            });
        }
        if address == server.address {
            debug!(%address, "address belongs to the server");
            return Err(PkiError::DuplicateIpAddress(address));
        }
        match self.store.holder_of(address) {
            Some(holder) if Some(holder) != owner => {
                debug!(%address, holder, "address already issued");
                Err(PkiError::DuplicateIpAddress(address))
            }
            _ => Ok(()),
        }
    }
}
