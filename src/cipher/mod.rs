//! # Passphrase Encryption for Share Payloads
//!
//! The core treats decryption as an opaque primitive behind [`Decryptor`]:
//! given the `share` parameter and a passphrase it yields either a record or
//! nothing. [`PassphraseCipher`] is the implementation shipped with the CLI.
//!
//! ## Payload Format
//!
//! `base64url_nopad( salt[16] || nonce[12] || AES-256-GCM(json) || tag[16] )`
//!
//! The key is derived from the passphrase with Argon2id over the salt, and the
//! plaintext is the JSON object `{"cid", "filename", "size"}`.

use anyhow::{Context, Result, ensure};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tracing::debug;

mod aes_gcm;
mod derive;

pub use aes_gcm::AesGcm;
pub use derive::Derive;

use crate::config::{AES_NONCE_SIZE, AES_TAG_SIZE, ARGON_SALT_LEN};
use crate::types::FileIdentity;

/// Opaque decryption primitive consumed by the decryption gate.
///
/// Implementations return `None` for a wrong passphrase and for a corrupt
/// payload alike; callers cannot and must not tell them apart.
pub trait Decryptor {
    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Option<Value>;
}

/// Argon2id + AES-256-GCM share payload cipher.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassphraseCipher;

impl PassphraseCipher {
    pub const fn new() -> Self {
        Self
    }

    /// Encrypts an identity into a `share` payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the passphrase is empty or the RNG fails.
    pub fn encrypt(&self, identity: &FileIdentity, passphrase: &str) -> Result<String> {
        let plaintext = serde_json::to_vec(&json!({
            "cid": identity.cid(),
            "filename": identity.filename(),
            "size": identity.size(),
        }))?;

        let salt = Derive::generate_salt::<ARGON_SALT_LEN>()?;
        let key = Derive::new(passphrase.as_bytes())?.derive_key(&salt)?;
        let sealed = AesGcm::new(&key)?.encrypt(&plaintext)?;

        let mut payload = Vec::with_capacity(salt.len() + sealed.len());
        payload.extend_from_slice(&salt);
        payload.extend_from_slice(&sealed);

        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Opens a `share` payload and parses the plaintext as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed, authentication fails or
    /// the plaintext is not JSON.
    pub fn open(&self, ciphertext: &str, passphrase: &str) -> Result<Value> {
        let payload = URL_SAFE_NO_PAD.decode(ciphertext.trim_end_matches('=')).context("payload is not base64url")?;
        ensure!(payload.len() >= ARGON_SALT_LEN + AES_NONCE_SIZE + AES_TAG_SIZE, "payload too short");

        let (salt, sealed) = payload.split_at(ARGON_SALT_LEN);
        let key = Derive::new(passphrase.as_bytes())?.derive_key(salt)?;
        let plaintext = AesGcm::new(&key)?.decrypt(sealed)?;

        serde_json::from_slice(&plaintext).context("plaintext is not json")
    }
}

impl Decryptor for PassphraseCipher {
    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Option<Value> {
        self.open(ciphertext, passphrase).inspect_err(|e| debug!("share payload did not open: {e:#}")).ok()
    }
}
