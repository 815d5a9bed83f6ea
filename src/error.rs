//! Error taxonomy for share link resolution.
//!
//! Every failure the core can produce is one of these variants. None of them
//! is fatal: each one degrades to a visible, localized message chosen by the
//! page controller.

use thiserror::Error;

/// Failures produced while resolving, unlocking or downloading a share link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// The compact `d` token is malformed or lacks a required field.
    #[error("malformed share token: {0}")]
    Decode(String),

    /// No recognized parameter combination was present.
    #[error("no recognized share link parameters")]
    MissingParameter,

    /// The user submitted an empty passphrase.
    #[error("passphrase is required")]
    EmptyPassphrase,

    /// Wrong passphrase or corrupt payload; the two cannot be told apart.
    #[error("incorrect passphrase or corrupt payload")]
    DecryptionFailed,

    /// The gateway fetch failed or answered with a non-success status.
    #[error("download failed: {0}")]
    Network(String),

    /// The downloaded bytes could not be written to disk.
    #[error("could not save file: {0}")]
    Io(String),
}

impl ShareError {
    /// Whether the error collapses into the generic "invalid share link" view.
    pub const fn is_invalid_link(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::MissingParameter)
    }
}

impl From<std::io::Error> for ShareError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ShareError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
