//! Passphrase gate for encrypted share links.

use serde_json::Value;
use tracing::{debug, warn};

use crate::cipher::Decryptor;
use crate::error::ShareError;
use crate::secret::Secret;
use crate::types::{FileIdentity, size_from_value};

/// Tries to open an encrypted payload with a passphrase.
///
/// An empty passphrase is rejected before the decryptor runs. A missing
/// record and a record without a usable `cid` or `filename` both read as
/// [`ShareError::DecryptionFailed`].
pub fn attempt<D: Decryptor + ?Sized>(decryptor: &D, ciphertext: &str, passphrase: &str) -> Result<FileIdentity, ShareError> {
    if passphrase.is_empty() {
        return Err(ShareError::EmptyPassphrase);
    }

    let record = decryptor.decrypt(ciphertext, passphrase).ok_or(ShareError::DecryptionFailed)?;
    identity_from_record(&record).ok_or(ShareError::DecryptionFailed)
}

fn identity_from_record(record: &Value) -> Option<FileIdentity> {
    let cid = record.get("cid")?.as_str()?;
    let filename = record.get("filename")?.as_str()?;

    FileIdentity::new(cid, filename, size_from_value(record.get("size"))).ok()
}

/// The passphrase field of an encrypted link and its inline error.
///
/// The typed passphrase never survives a failed attempt.
#[derive(Debug, Default)]
pub struct PassphrasePrompt {
    input: Secret,
    error: Option<ShareError>,
    attempts: u32,
}

impl PassphrasePrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, passphrase: Secret) {
        self.input = passphrase;
    }

    pub fn input_is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Error from the last failed attempt, kept until the next one.
    pub fn error(&self) -> Option<&ShareError> {
        self.error.as_ref()
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Submits the current input against `ciphertext`.
    pub fn submit<D: Decryptor + ?Sized>(&mut self, decryptor: &D, ciphertext: &str) -> Result<FileIdentity, ShareError> {
        self.error = None;
        self.attempts += 1;

        match attempt(decryptor, ciphertext, self.input.expose_secret()) {
            Ok(identity) => {
                debug!(attempt = self.attempts, "share payload unlocked");
                Ok(identity)
            }
            Err(err) => {
                warn!(attempt = self.attempts, "unlock failed: {err}");
                self.input.clear();
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;

    /// Decryptor that opens exactly one ciphertext with one passphrase.
    pub(crate) struct FixedDecryptor {
        pub ciphertext: &'static str,
        pub passphrase: &'static str,
        pub record: Value,
        pub calls: Cell<u32>,
    }

    impl FixedDecryptor {
        pub(crate) fn notes() -> Self {
            Self { ciphertext: "opaque", passphrase: "sesame", record: json!({"cid": "bafyxyz", "filename": "notes.txt"}), calls: Cell::new(0) }
        }
    }

    impl Decryptor for FixedDecryptor {
        fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Option<Value> {
            self.calls.set(self.calls.get() + 1);
            (ciphertext == self.ciphertext && passphrase == self.passphrase).then(|| self.record.clone())
        }
    }

    #[test]
    fn test_correct_passphrase() {
        let identity = attempt(&FixedDecryptor::notes(), "opaque", "sesame").unwrap();
        assert_eq!(identity.cid(), "bafyxyz");
        assert_eq!(identity.filename(), "notes.txt");
        assert_eq!(identity.size(), 0);
    }

    #[test]
    fn test_empty_passphrase_skips_decryptor() {
        let decryptor = FixedDecryptor::notes();
        assert_eq!(attempt(&decryptor, "opaque", ""), Err(ShareError::EmptyPassphrase));
        assert_eq!(decryptor.calls.get(), 0);
    }

    #[test]
    fn test_wrong_passphrase() {
        assert_eq!(attempt(&FixedDecryptor::notes(), "opaque", "open"), Err(ShareError::DecryptionFailed));
    }

    #[test]
    fn test_nonconforming_record_reads_as_wrong_passphrase() {
        for record in [json!({"cid": "bafy"}), json!({"filename": "a.txt"}), json!({"cid": "", "filename": "a.txt"}), json!({"cid": 5, "filename": "a.txt"}), json!("text"), json!(null)] {
            let decryptor = FixedDecryptor { record, ..FixedDecryptor::notes() };
            assert_eq!(attempt(&decryptor, "opaque", "sesame"), Err(ShareError::DecryptionFailed));
        }
    }

    #[test]
    fn test_record_size_is_optional() {
        let decryptor = FixedDecryptor { record: json!({"cid": "bafy", "filename": "a.txt", "size": "77"}), ..FixedDecryptor::notes() };
        assert_eq!(attempt(&decryptor, "opaque", "sesame").unwrap().size(), 77);
    }

    #[test]
    fn test_prompt_clears_input_after_failure() {
        let decryptor = FixedDecryptor::notes();
        let mut prompt = PassphrasePrompt::new();

        prompt.set_input(Secret::new("wrong"));
        assert_eq!(prompt.submit(&decryptor, "opaque"), Err(ShareError::DecryptionFailed));
        assert!(prompt.input_is_empty());
        assert_eq!(prompt.error(), Some(&ShareError::DecryptionFailed));

        prompt.set_input(Secret::new("sesame"));
        assert!(prompt.submit(&decryptor, "opaque").is_ok());
        assert_eq!(prompt.error(), None);
        assert_eq!(prompt.attempts(), 2);
    }
}
