//! `WireGuard` key types.
//!
//! `WireGuard` uses Curve25519 for key exchange. Keys are 32 bytes and travel
//! as 44-character standard base64 tokens, which is also how they are written
//! to PKI files and rendered configs.

use crate::error::KeyError;
use base64::Engine;
use rand_core::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

/// `WireGuard` key size in bytes (256-bit Curve25519 keys).
pub const KEY_SIZE: usize = 32;

/// Length of a base64-encoded key token.
pub const TOKEN_LEN: usize = 44;

/// Checks that `token` is a well-formed key token and returns its raw bytes.
///
/// A token is valid when it is exactly [`TOKEN_LEN`] characters long and
/// decodes as standard base64 to [`KEY_SIZE`] bytes.
///
/// # Errors
///
/// Returns an error describing the first rule the token violates.
pub fn validate_token(token: &str) -> Result<[u8; KEY_SIZE], KeyError> {
    if token.len() != TOKEN_LEN {
        return Err(KeyError::InvalidTokenLength(token.len()));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(token)
        .map_err(|e| KeyError::InvalidBase64(e.to_string()))?;
    if bytes.len() != KEY_SIZE {
        return Err(KeyError::InvalidKeyLength(bytes.len()));
    }
    let mut arr = [0u8; KEY_SIZE];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

fn encode(bytes: &[u8; KEY_SIZE]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// A `WireGuard` public key (Curve25519, 32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_SIZE]);

impl PublicKey {
    /// Creates a public key from raw bytes.
    #[must_use]
    pub const fn from_bytes_array(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the public key.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encodes the key as a base64 token.
    #[must_use]
    pub fn to_base64(&self) -> String {
        encode(&self.0)
    }

    /// Decodes a public key from a base64 token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token fails [`validate_token`].
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        validate_token(s).map(Self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b64 = self.to_base64();
        write!(f, "PublicKey({}...)", &b64[..8])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

impl From<X25519PublicKey> for PublicKey {
    fn from(key: X25519PublicKey) -> Self {
        Self::from_bytes_array(*key.as_bytes())
    }
}

/// A `WireGuard` private key (Curve25519, 32 bytes).
#[derive(Clone)]
pub struct PrivateKey([u8; KEY_SIZE]);

impl PrivateKey {
    /// Generates a new random private key.
    #[must_use]
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        Self(secret.to_bytes())
    }

    /// Creates a private key from a 32-byte array.
    #[must_use]
    pub const fn from_bytes_array(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the private key.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Derives the corresponding public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        let secret = StaticSecret::from(self.0);
        PublicKey::from(X25519PublicKey::from(&secret))
    }

    /// Encodes the key as a base64 token.
    #[must_use]
    pub fn to_base64(&self) -> String {
        encode(&self.0)
    }

    /// Decodes a private key from a base64 token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token fails [`validate_token`].
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        validate_token(s).map(Self)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for PrivateKey {}

/// A `WireGuard` preshared key (32 random bytes).
#[derive(Clone)]
pub struct PresharedKey([u8; KEY_SIZE]);

impl PresharedKey {
    /// Creates a preshared key from a 32-byte array.
    #[must_use]
    pub const fn from_bytes_array(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the preshared key.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Encodes the key as a base64 token.
    #[must_use]
    pub fn to_base64(&self) -> String {
        encode(&self.0)
    }

    /// Decodes a preshared key from a base64 token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token fails [`validate_token`].
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        validate_token(s).map(Self)
    }

    /// Generates a new random preshared key straight from the OS CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        use rand::rngs::OsRng;
        use rand::RngCore;
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }
}

impl fmt::Debug for PresharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresharedKey").field("key", &"[REDACTED]").finish()
    }
}

impl PartialEq for PresharedKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for PresharedKey {}

/// A `WireGuard` key pair (private + public).
#[derive(Clone)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generates a new random key pair.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::generate())
    }

    /// Creates a key pair from an existing private key.
    #[must_use]
    pub fn from_private_key(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    /// Returns a reference to the private key.
    #[must_use]
    pub const fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Returns a reference to the public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Splits the pair into its public and private halves.
    #[must_use]
    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.public, self.private)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private", &"[REDACTED]")
            .field("public", &self.public)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn private_key_to_public_key_is_deterministic() {
        let private = PrivateKey::generate();
        assert_eq!(private.public_key(), private.public_key());
    }

    #[test]
    fn different_private_keys_produce_different_public_keys() {
        let private1 = PrivateKey::generate();
        let private2 = PrivateKey::generate();
        assert_ne!(private1.public_key(), private2.public_key());
    }

    #[test]
    fn encoded_keys_are_44_character_tokens() {
        let pair = KeyPair::generate();
        assert_eq!(pair.public_key().to_base64().len(), TOKEN_LEN);
        assert_eq!(pair.private_key().to_base64().len(), TOKEN_LEN);
        assert_eq!(PresharedKey::generate().to_base64().len(), TOKEN_LEN);
    }

    #[test]
    fn public_key_base64_roundtrip() {
        let public = PrivateKey::generate().public_key();
        let decoded = PublicKey::from_base64(&public.to_base64()).expect("decode failed");
        assert_eq!(public, decoded);
    }

    #[test]
    fn private_key_base64_roundtrip() {
        let private = PrivateKey::generate();
        let decoded = PrivateKey::from_base64(&private.to_base64()).expect("decode failed");
        assert_eq!(private, decoded);
    }

    #[test]
    fn public_key_display_is_base64() {
        let public = PublicKey::from_bytes_array([0u8; KEY_SIZE]);
        assert_eq!(public.to_string(), "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=");
    }

    #[test]
    fn private_key_debug_redacts() {
        let private = PrivateKey::generate();
        assert!(format!("{private:?}").contains("REDACTED"));
        let psk = PresharedKey::generate();
        assert!(format!("{psk:?}").contains("REDACTED"));
    }

    #[test]
    fn public_key_serde_uses_token() {
        let public = PublicKey::from_bytes_array([7u8; KEY_SIZE]);
        let json = serde_json::to_string(&public).expect("serialize failed");
        assert_eq!(json, format!("\"{}\"", public.to_base64()));
        let back: PublicKey = serde_json::from_str(&json).expect("deserialize failed");
        assert_eq!(back, public);
    }

    #[test]
    fn keypair_from_private_key() {
        let private = PrivateKey::generate();
        let expected_public = private.public_key();
        let keypair = KeyPair::from_private_key(private);
        assert_eq!(keypair.public_key(), &expected_public);
    }

    #[test_case("" ; "empty")]
    #[test_case("AAAA" ; "too short")]
    #[test_case("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA==" ; "too long")]
    fn wrong_length_rejected(token: &str) {
        assert!(matches!(
            validate_token(token),
            Err(KeyError::InvalidTokenLength(_))
        ));
    }

    #[test_case("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA!=" ; "bad alphabet")]
    #[test_case("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=AAA" ; "misplaced padding")]
    fn malformed_base64_rejected(token: &str) {
        assert!(matches!(validate_token(token), Err(KeyError::InvalidBase64(_))));
    }

    #[test]
    fn double_padded_token_has_wrong_key_length() {
        let token = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA==";
        assert_eq!(validate_token(token), Err(KeyError::InvalidKeyLength(31)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_key_bytes_make_a_valid_token(bytes in prop::array::uniform32(any::<u8>())) {
                let token = PublicKey::from_bytes_array(bytes).to_base64();
                prop_assert_eq!(validate_token(&token), Ok(bytes));
            }

            #[test]
            fn keypair_derivation_consistent(seed: [u8; 32]) {
                let private = PrivateKey::from_bytes_array(seed);
                prop_assert_eq!(private.public_key(), private.public_key());
            }
        }
    }
}
