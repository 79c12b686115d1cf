//! Key generation boundary.

use crate::keys::{KeyPair, PresharedKey};

/// Source of fresh key material for a PKI.
///
/// The PKI engine only ever asks for a server key pair and an optional
/// preshared key, both at initialization time.
pub trait KeyService {
    /// Generates a new key pair.
    fn generate_keypair(&self) -> KeyPair;

    /// Generates a new preshared key.
    fn generate_psk(&self) -> PresharedKey;
}

/// [`KeyService`] backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeyService;

impl KeyService for OsKeyService {
    fn generate_keypair(&self) -> KeyPair {
        KeyPair::generate()
    }

    fn generate_psk(&self) -> PresharedKey {
        PresharedKey::generate()
    }
}

impl<K: KeyService + ?Sized> KeyService for &K {
    fn generate_keypair(&self) -> KeyPair {
        (**self).generate_keypair()
    }

    fn generate_psk(&self) -> PresharedKey {
        (**self).generate_psk()
    }
}
