//! Translation lookup for user-visible text.
//!
//! All text shown to the user goes through [`Translate`]. Messages use
//! `{name}` placeholders filled from the parameter list.

use hashbrown::HashMap;

/// Source of localized strings.
pub trait Translate {
    /// Returns the message for `key` with placeholders replaced. Unknown keys
    /// come back unchanged.
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Message catalog for a single language.
#[derive(Debug, Clone)]
pub struct Catalog {
    messages: HashMap<&'static str, &'static str>,
}

const ENGLISH: &[(&str, &str)] = &[
    ("accessing-file", "Accessing file..."),
    ("passphrase-prompt", "This file is protected. Enter the passphrase to unlock it."),
    ("passphrase-placeholder", "Please enter the passphrase"),
    ("passphrase-submit", "Unlock"),
    ("passphrase-incorrect", "Incorrect passphrase, please try again"),
    ("decryption-failed", "Unable to open this share link"),
    ("selected-files-invalid", "The link is invalid or incomplete"),
    ("file-size", "Size: {size}"),
    ("gateway-selector", "Gateway"),
    ("copy-share-link", "File link"),
    ("download-button", "Download"),
    ("download-progress", "Downloading..."),
    ("download-error", "Download failed, please try another gateway"),
    ("download-complete", "Saved to {path}"),
    ("menu-prompt", "What next?"),
    ("menu-change-gateway", "Change gateway"),
    ("menu-show-link", "Show file link"),
    ("menu-quit", "Quit"),
];

impl Catalog {
    pub fn english() -> Self {
        Self { messages: ENGLISH.iter().copied().collect() }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::english()
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(template) = self.messages.get(key) else {
            return key.to_owned();
        };

        params.iter().fold((*template).to_owned(), |text, (name, value)| text.replace(&format!("{{{name}}}"), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_with_params() {
        let catalog = Catalog::english();
        assert_eq!(catalog.translate("file-size", &[("size", "420 B")]), "Size: 420 B");
        assert_eq!(catalog.translate("download-button", &[]), "Download");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        assert_eq!(Catalog::english().translate("no-such-key", &[]), "no-such-key");
    }
}
