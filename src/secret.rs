use secrecy::{ExposeSecret, SecretString};

/// A passphrase held in memory that is wiped on drop and never printed.
pub struct Secret {
    inner: SecretString,
}

impl Secret {
    pub fn new(passphrase: &str) -> Self {
        Self { inner: SecretString::from(passphrase.to_owned()) }
    }

    pub fn from_string(passphrase: String) -> Self {
        Self { inner: SecretString::from(passphrase) }
    }

    pub fn expose_secret(&self) -> &str {
        self.inner.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }

    /// Replaces the held value with an empty one; the old value is zeroized.
    pub fn clear(&mut self) {
        self.inner = SecretString::from(String::new());
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<SecretString> for Secret {
    fn from(secret: SecretString) -> Self {
        Self { inner: secret }
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_redacted_debug() {
        let mut secret = Secret::new("sesame");
        assert_eq!(secret.expose_secret(), "sesame");
        assert!(!format!("{secret:?}").contains("sesame"));

        secret.clear();
        assert!(secret.is_empty());
    }
}
