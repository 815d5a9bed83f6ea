//! # Key Derivation with Argon2id
//!
//! Share passphrases are low-entropy and typed by hand, so the key is derived
//! with Argon2id (v1.3) and a per-payload random salt.

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use anyhow::{Result, anyhow, ensure};
use argon2::Algorithm::Argon2id;
use argon2::Version::V0x13;
use argon2::{Argon2, Params};

use crate::config::{ARGON_MEMORY, ARGON_THREADS, ARGON_TIME, KEY_SIZE};

/// Wrapper for Argon2id key derivation from a passphrase.
pub struct Derive {
    key: Vec<u8>,
}

impl Derive {
    /// # Errors
    ///
    /// Returns an error if the passphrase is empty.
    pub fn new(key: &[u8]) -> Result<Self> {
        ensure!(!key.is_empty(), "key cannot be empty");
        Ok(Self { key: key.to_vec() })
    }

    /// Derives a [`KEY_SIZE`] key with the configured share-link cost.
    pub fn derive_key(&self, salt: &[u8]) -> Result<[u8; KEY_SIZE]> {
        self.derive_key_with(salt, ARGON_MEMORY, ARGON_TIME, ARGON_THREADS)
    }

    /// Derives a key with explicit Argon2 cost parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or hashing fails.
    pub fn derive_key_with(&self, salt: &[u8], memory: u32, time: u32, parallelism: u32) -> Result<[u8; KEY_SIZE]> {
        let params = Params::new(memory, time, parallelism, Some(KEY_SIZE)).map_err(|e| anyhow!("invalid argon2 parameter: {e}"))?;
        let argon2 = Argon2::new(Argon2id, V0x13, params);

        let mut key = [0u8; KEY_SIZE];
        argon2.hash_password_into(&self.key, salt, &mut key).map_err(|e| anyhow!("key derivation failed: {e}"))?;

        Ok(key)
    }

    /// Generates a random salt from the operating system RNG.
    pub fn generate_salt<const N: usize>() -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| anyhow!("rng failed: {e}"))?;

        Ok(bytes)
    }
}

impl Drop for Derive {
    fn drop(&mut self) {
        self.key.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ARGON_SALT_LEN;

    #[test]
    fn test_empty_key_rejected() {
        assert!(Derive::new(b"").is_err());
    }

    #[test]
    fn test_derivation_is_deterministic_per_salt() {
        let derive = Derive::new(b"sesame").unwrap();
        let salt = [7u8; ARGON_SALT_LEN];

        let first = derive.derive_key_with(&salt, 1024, 1, 1).unwrap();
        let second = derive.derive_key_with(&salt, 1024, 1, 1).unwrap();
        let other = derive.derive_key_with(&[8u8; ARGON_SALT_LEN], 1024, 1, 1).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_generate_salt_is_random() {
        let a = Derive::generate_salt::<ARGON_SALT_LEN>().unwrap();
        let b = Derive::generate_salt::<ARGON_SALT_LEN>().unwrap();
        assert_ne!(a, b);
    }
}
