//! WireGuard client configs and systemd-networkd netdev configs.

use wgmgr_keys::PresharedKey;

use crate::error::{PkiError, Result};
use crate::ini::{Document, Section};
use crate::store::PkiStore;
use crate::types::{host_cidr, validate_client_name, Client};

/// Stands in for the client private key, which the PKI never sees.
pub const PRIVATE_KEY_PLACEHOLDER: &str = "<your private key>";

/// Renders the `wg-quick` style config for client `name`.
///
/// # Errors
///
/// [`PkiError::InvalidClientName`], [`PkiError::NotInitialized`] or
/// [`PkiError::NoSuchClient`].
pub fn client_config(store: &PkiStore, name: &str) -> Result<String> {
    validate_client_name(name)?;
    let server = store.require_server()?;
    let client = store
        .client(name)
        .ok_or_else(|| PkiError::NoSuchClient(name.to_string()))?;

    let document: Document = [
        Section::new("Interface")
            .with("PrivateKey", PRIVATE_KEY_PLACEHOLDER)
            .with("Address", host_cidr(client.address)),
        Section::new("Peer")
            .with("PublicKey", server.public_key.to_base64())
            .with_opt("PresharedKey", psk(server.preshared_key.as_ref()))
            .with("AllowedIPs", server.network.to_string())
            .with("Endpoint", &server.endpoint),
    ]
    .into_iter()
    .collect();

    Ok(document.to_string())
}

/// Renders the `.netdev` file for the server device, one peer per client.
///
/// # Errors
///
/// [`PkiError::NotInitialized`], or [`PkiError::InvalidEndpoint`] if the
/// stored endpoint has no usable port.
pub fn server_config(store: &PkiStore) -> Result<String> {
    let server = store.require_server()?;
    let description = if server.description.is_empty() {
        &server.name
    } else {
        &server.description
    };

    let header = [
        Section::new("NetDev")
            .with("Name", &server.name)
            .with("Kind", "wireguard")
            .with("Description", description),
        Section::new("WireGuard")
            .with("ListenPort", server.listen_port()?.to_string())
            .with("PrivateKey", server.private_key.to_base64()),
    ];
    let peers = store
        .clients()
        .map(|client| peer_section(client, server.preshared_key.as_ref()));

    let document: Document = header.into_iter().chain(peers).collect();
    Ok(document.to_string())
}

fn peer_section(client: &Client, preshared_key: Option<&PresharedKey>) -> Section {
    Section::new("WireGuardPeer")
        .with("PublicKey", client.public_key.to_base64())
        .with_opt("PresharedKey", psk(preshared_key))
        .with("AllowedIPs", host_cidr(client.address))
}

fn psk(preshared_key: Option<&PresharedKey>) -> Option<String> {
    preshared_key.map(PresharedKey::to_base64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PkiEngine;
    use crate::testing::{client_key, home_net, CountingKeyService};
    use crate::types::SERVER_SECTION;

    // CountingKeyService hands out [1; 32] as the server private key and
    // [2; 32] as the preshared key.
    const SERVER_PRIVATE: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";
    const PSK: &str = "AgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgI=";

    fn engine(psk: bool) -> PkiEngine<CountingKeyService> {
        let mut engine = PkiEngine::new(PkiStore::new(), CountingKeyService::default());
        engine.init(home_net(psk)).expect("init");
        engine
    }

    fn server_public(engine: &PkiEngine<CountingKeyService>) -> String {
        engine
            .store()
            .server()
            .expect("server")
            .public_key
            .to_base64()
    }

    #[test]
    fn client_config_with_psk() {
        let mut engine = engine(true);
        engine.add_client(&client_key(9), None, Some("alice")).expect("add");

        let text = engine.render_client_config("alice").expect("render");
        let expected = format!(
            "[Interface]\n\
             PrivateKey = <your private key>\n\
             Address = 10.0.0.2/32\n\
             \n\
             [Peer]\n\
             PublicKey = {}\n\
             PresharedKey = {PSK}\n\
             AllowedIPs = 10.0.0.0/24\n\
             Endpoint = vpn.example.com:51820\n",
            server_public(&engine)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn client_config_without_psk() {
        let mut engine = engine(false);
        engine.add_client(&client_key(9), None, Some("alice")).expect("add");

        let text = engine.render_client_config("alice").expect("render");
        assert!(!text.contains("PresharedKey"));
        assert!(text.ends_with("Endpoint = vpn.example.com:51820\n"));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn client_config_error_order() {
        let uninitialized = PkiStore::new();
        assert!(matches!(
            client_config(&uninitialized, SERVER_SECTION),
            Err(PkiError::InvalidClientName(_))
        ));
        assert!(matches!(
            client_config(&uninitialized, "alice"),
            Err(PkiError::NotInitialized)
        ));
        assert!(matches!(
            client_config(engine(false).store(), "alice"),
            Err(PkiError::NoSuchClient(_))
        ));
    }

    #[test]
    fn server_config_lists_every_client() {
        let mut engine = engine(true);
        engine.add_client(&client_key(9), None, Some("alice")).expect("add");
        engine.add_client(&client_key(10), None, Some("bob")).expect("add");

        let text = engine.render_server_config().expect("render");
        let expected = format!(
            "[NetDev]\n\
             Name = dev0\n\
             Kind = wireguard\n\
             Description = home net\n\
             \n\
             [WireGuard]\n\
             ListenPort = 51820\n\
             PrivateKey = {SERVER_PRIVATE}\n\
             \n\
             [WireGuardPeer]\n\
             PublicKey = {alice}\n\
             PresharedKey = {PSK}\n\
             AllowedIPs = 10.0.0.2/32\n\
             \n\
             [WireGuardPeer]\n\
             PublicKey = {bob}\n\
             PresharedKey = {PSK}\n\
             AllowedIPs = 10.0.0.3/32\n",
            alice = client_key(9),
            bob = client_key(10),
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn server_config_without_clients() {
        let engine = engine(false);
        let text = engine.render_server_config().expect("render");
        assert_eq!(text.matches("[WireGuardPeer]").count(), 0);
        assert!(text.ends_with(&format!("PrivateKey = {SERVER_PRIVATE}\n")));
    }

    #[test]
    fn server_description_falls_back_to_name() {
        let mut engine = PkiEngine::new(PkiStore::new(), CountingKeyService::default());
        engine
            .init(home_net(false).with_description(""))
            .expect("init");
        let text = engine.render_server_config().expect("render");
        assert!(text.contains("Description = dev0\n"));
    }

    #[test]
    fn server_config_requires_init() {
        assert!(matches!(
            server_config(&PkiStore::new()),
            Err(PkiError::NotInitialized)
        ));
    }

    #[test]
    fn removed_client_disappears_from_server_config() {
        let mut engine = engine(false);
        engine.add_client(&client_key(9), None, Some("alice")).expect("add");
        engine.add_client(&client_key(10), None, Some("bob")).expect("add");
        engine.remove_client("alice").expect("remove");

        let text = engine.render_server_config().expect("render");
        assert!(!text.contains(&client_key(9)));
        assert!(text.contains(&client_key(10)));
    }
}
