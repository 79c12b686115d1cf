//! Test fixtures shared across modules.

use std::cell::Cell;

use wgmgr_keys::{KeyPair, KeyService, PresharedKey, PrivateKey, PublicKey, KEY_SIZE};

use crate::types::InitParams;

/// Hands out keys derived from a counter so rendered output is reproducible.
#[derive(Debug, Default)]
pub(crate) struct CountingKeyService {
    next: Cell<u8>,
}

impl CountingKeyService {
    fn bump(&self) -> [u8; KEY_SIZE] {
        let value = self.next.get().wrapping_add(1);
        self.next.set(value);
        [value; KEY_SIZE]
    }
}

impl KeyService for CountingKeyService {
    fn generate_keypair(&self) -> KeyPair {
        KeyPair::from_private_key(PrivateKey::from_bytes_array(self.bump()))
    }

    fn generate_psk(&self) -> PresharedKey {
        PresharedKey::from_bytes_array(self.bump())
    }
}

/// A syntactically valid client key built from `byte`.
pub(crate) fn client_key(byte: u8) -> String {
    PublicKey::from_bytes_array([byte; KEY_SIZE]).to_base64()
}

/// The parameters used throughout the end-to-end examples.
pub(crate) fn home_net(psk: bool) -> InitParams {
    InitParams::new(
        "10.0.0.0/24".parse().expect("valid network"),
        "10.0.0.1".parse().expect("valid address"),
        "vpn.example.com:51820",
    )
    .with_name("dev0")
    .with_description("home net")
    .with_psk(psk)
}
