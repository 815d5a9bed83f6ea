//! Common type definitions for cidshare.
//!
//! # Overview
//!
//! - [`FileIdentity`]: The resolved `{cid, filename, size}` triple
//! - [`ShareLinkVariant`]: Classification of an incoming link
//! - [`ResolutionOutcome`]: Result of turning a link into an identity

use serde_json::Value;

use crate::error::ShareError;

/// A file addressed by content, as described by a share link.
///
/// Only constructible with a non-empty CID and filename, so holding one means
/// resolution succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    cid: String,
    filename: String,
    size: u64,
}

impl FileIdentity {
    /// Creates an identity, rejecting an empty CID or filename.
    pub fn new(cid: impl Into<String>, filename: impl Into<String>, size: u64) -> Result<Self, ShareError> {
        let cid = cid.into();
        let filename = filename.into();

        if cid.is_empty() || filename.is_empty() {
            return Err(ShareError::MissingParameter);
        }

        Ok(Self { cid, filename, size })
    }

    pub fn cid(&self) -> &str {
        &self.cid
    }

    /// The raw filename, including a trailing `/` for directories.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size in bytes; 0 means unknown.
    pub const fn size(&self) -> u64 {
        self.size
    }

    pub fn is_directory(&self) -> bool {
        self.filename.ends_with('/')
    }

    /// The filename with a directory's trailing `/` stripped.
    pub fn display_name(&self) -> &str {
        self.filename.strip_suffix('/').unwrap_or(&self.filename)
    }
}

/// How an incoming link encodes its file, in order of precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLinkVariant {
    /// Passphrase-protected payload, still opaque.
    Encrypted { ciphertext: String },

    /// Compact `d` token, already decoded.
    Compressed(FileIdentity),

    /// Plain `cid` + `filename` parameters.
    Legacy(FileIdentity),

    /// Nothing usable; the reason is kept for logs only.
    Invalid(ShareError),
}

impl ShareLinkVariant {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Encrypted { .. } => "encrypted",
            Self::Compressed(_) => "compressed",
            Self::Legacy(_) => "legacy",
            Self::Invalid(_) => "invalid",
        }
    }
}

/// Outcome of resolving a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(FileIdentity),
    Failed(ShareError),
}

/// Normalizes a loosely typed size field to bytes.
///
/// Links produced by older tooling carry the size as an integer, a float or a
/// numeric string. Anything that is not a non-negative number reads as 0.
pub fn size_from_value(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(float_to_bytes)).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok().or_else(|| s.trim().parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(float_to_bytes)).unwrap_or(0),
        _ => 0,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_bytes(value: f64) -> u64 {
    value.trunc() as u64
}
