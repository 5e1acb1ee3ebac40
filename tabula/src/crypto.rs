//! Column family key wrapping.
//!
//! Operators hand a passphrase in `ENCRYPTION_KEY`; the compiler derives a
//! 128-bit data key from it and stores that key wrapped under the cluster
//! master key, never in the clear.
//!
//! # Wire format
//!
//! ```text
//! [Magic: 1 byte (0xC1)] [Version: 1 byte] [Nonce: 12 bytes] [Ciphertext + Tag: N bytes]
//! ```

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

const WRAP_MAGIC: u8 = 0xC1;
const WRAP_VERSION: u8 = 0x01;
const HEADER_SIZE: usize = 14;
const NONCE_SIZE: usize = 12;

/// Master key size for AES-256
const MASTER_KEY_SIZE: usize = 32;

/// Derived data key size (AES-128)
pub const DATA_KEY_SIZE: usize = 16;

const DERIVE_SALT: &[u8] = b"tabula-column-family-key";
const DERIVE_ROUNDS: usize = 10_000;

/// The only cipher that can wrap column family keys.
pub const SUPPORTED_CIPHER: &str = "AES";

/// Derive a data key from an operator-supplied passphrase.
///
/// Deterministic: the same passphrase always yields the same key.
pub fn derive_key(passphrase: &str) -> [u8; DATA_KEY_SIZE] {
    let mut digest = Sha256::new()
        .chain_update(DERIVE_SALT)
        .chain_update(passphrase.as_bytes())
        .finalize();
    for _ in 1..DERIVE_ROUNDS {
        digest = Sha256::new()
            .chain_update(DERIVE_SALT)
            .chain_update(digest)
            .finalize();
    }
    let mut key = [0u8; DATA_KEY_SIZE];
    key.copy_from_slice(&digest[..DATA_KEY_SIZE]);
    key
}

/// Wraps data keys under a 256-bit master key.
#[derive(Clone)]
pub struct KeyWrapper {
    cipher: Aes256Gcm,
    /// Master key alias, recorded for logging only
    alias: String,
    fingerprint: String,
}

impl std::fmt::Debug for KeyWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyWrapper")
            .field("alias", &self.alias)
            .field("fingerprint", &self.fingerprint)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl KeyWrapper {
    pub fn from_key(key: [u8; MASTER_KEY_SIZE], alias: impl Into<String>) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| Error::Crypto(format!("Failed to initialize cipher: {}", e)))?;
        let fingerprint = hex::encode(&Sha256::digest(key)[..4]);
        Ok(Self {
            cipher,
            alias: alias.into(),
            fingerprint,
        })
    }

    /// Build from a 64-character hex master key.
    pub fn from_hex(hex_key: &str, alias: impl Into<String>) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| Error::Crypto(format!("Invalid hex master key: {}", e)))?;

        if bytes.len() != MASTER_KEY_SIZE {
            return Err(Error::Crypto(format!(
                "Master key must be {} bytes, got {}",
                MASTER_KEY_SIZE,
                bytes.len()
            )));
        }

        let mut key = [0u8; MASTER_KEY_SIZE];
        key.copy_from_slice(&bytes);
        Self::from_key(key, alias)
    }

    /// Read a hex master key from an environment variable.
    pub fn from_env(env_var: &str, alias: impl Into<String>) -> Result<Self> {
        let hex_key = std::env::var(env_var).map_err(|_| {
            Error::Crypto(format!("Environment variable '{}' not set", env_var))
        })?;
        Self::from_hex(&hex_key, alias)
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Wrap a data key with a fresh random nonce.
    pub fn wrap(&self, data_key: &[u8]) -> Result<Vec<u8>> {
        use aes_gcm::aead::rand_core::RngCore;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, data_key)
            .map_err(|e| Error::Crypto(format!("Key wrap failed: {}", e)))?;

        let mut output = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        output.push(WRAP_MAGIC);
        output.push(WRAP_VERSION);
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    pub fn unwrap_key(&self, wrapped: &[u8]) -> Result<Vec<u8>> {
        if wrapped.len() < HEADER_SIZE {
            return Err(Error::Crypto("Wrapped key too short".to_string()));
        }
        if wrapped[0] != WRAP_MAGIC {
            return Err(Error::Crypto("Invalid wrapped key header".to_string()));
        }
        if wrapped[1] != WRAP_VERSION {
            return Err(Error::Crypto(format!(
                "Unsupported key wrap version: {}",
                wrapped[1]
            )));
        }

        let nonce = Nonce::from_slice(&wrapped[2..HEADER_SIZE]);
        self.cipher
            .decrypt(nonce, &wrapped[HEADER_SIZE..])
            .map_err(|e| Error::Crypto(format!("Key unwrap failed (wrong master key?): {}", e)))
    }

    /// Derive and wrap the data key for a family using `cipher`.
    pub fn wrap_passphrase(&self, cipher: &str, passphrase: &str) -> Result<Vec<u8>> {
        if !cipher.eq_ignore_ascii_case(SUPPORTED_CIPHER) {
            return Err(Error::Crypto(format!(
                "Cipher {} cannot wrap column family keys, only {} is supported",
                cipher, SUPPORTED_CIPHER
            )));
        }
        self.wrap(&derive_key(passphrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_derive_key_is_deterministic() {
        assert_eq!(derive_key("secret"), derive_key("secret"));
        assert_ne!(derive_key("secret"), derive_key("Secret"));
    }

    #[test]
    fn test_wrap_unwrap() {
        let wrapper = KeyWrapper::from_hex(MASTER, "test").unwrap();
        let key = derive_key("pass");
        let wrapped = wrapper.wrap(&key).unwrap();
        assert_eq!(wrapped[0], WRAP_MAGIC);
        assert_ne!(&wrapped[HEADER_SIZE..HEADER_SIZE + DATA_KEY_SIZE], &key[..]);
        assert_eq!(wrapper.unwrap_key(&wrapped).unwrap(), key.to_vec());
    }

    #[test]
    fn test_unwrap_with_wrong_master_fails() {
        let a = KeyWrapper::from_hex(MASTER, "a").unwrap();
        let b = KeyWrapper::from_hex(&"ab".repeat(32), "b").unwrap();
        let wrapped = a.wrap(&derive_key("pass")).unwrap();
        assert!(matches!(b.unwrap_key(&wrapped), Err(Error::Crypto(_))));
    }

    #[test]
    fn test_only_aes_wraps() {
        let wrapper = KeyWrapper::from_hex(MASTER, "test").unwrap();
        assert!(wrapper.wrap_passphrase("aes", "pw").is_ok());
        assert!(matches!(
            wrapper.wrap_passphrase("DES", "pw"),
            Err(Error::Crypto(_))
        ));
    }

    #[test]
    fn test_bad_master_key_length() {
        assert!(KeyWrapper::from_hex("0123", "short").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let wrapper = KeyWrapper::from_hex(MASTER, "test").unwrap();
        let debug = format!("{:?}", wrapper);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(MASTER));
    }
}
