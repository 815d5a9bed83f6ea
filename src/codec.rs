//! Compact share token codec.
//!
//! A token is the base64url form (no padding) of a minimal JSON record
//! `{"c": cid, "f": filename, "s": size}`. Decoding restores the padding,
//! maps the URL-safe symbols back to the standard alphabet and decodes with
//! the standard engine, so tokens that already use `+`, `/` or `=` are
//! accepted as well.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ShareError;
use crate::types::{FileIdentity, size_from_value};

/// Standard alphabet that, like browsers' `atob`, ignores stray trailing bits.
const LENIENT_STANDARD: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true).with_decode_padding_mode(DecodePaddingMode::RequireCanonical));

#[derive(Deserialize)]
struct DecodedRecord {
    #[serde(default)]
    c: Option<String>,
    #[serde(default)]
    f: Option<String>,
    #[serde(default)]
    s: Option<Value>,
}

/// Encodes an identity into a URL-safe token.
///
/// An unknown size (0) is left out of the record.
pub fn encode(identity: &FileIdentity) -> String {
    let mut record = json!({ "c": identity.cid(), "f": identity.filename() });
    if identity.size() > 0 {
        record["s"] = json!(identity.size());
    }

    URL_SAFE_NO_PAD.encode(record.to_string())
}

/// Decodes a token back into an identity.
///
/// # Errors
///
/// Returns [`ShareError::Decode`] if the token is not valid base64 after
/// padding is restored, is not UTF-8, is not a JSON object, or lacks a
/// non-empty `c` or `f`.
pub fn decode(token: &str) -> Result<FileIdentity, ShareError> {
    let pad = (4 - token.len() % 4) % 4;
    let mut standard: String = token.chars().map(|ch| match ch {
        '-' => '+',
        '_' => '/',
        other => other,
    }).collect();
    standard.extend(std::iter::repeat_n('=', pad));

    let bytes = LENIENT_STANDARD.decode(standard.as_bytes()).map_err(|e| ShareError::Decode(format!("invalid base64: {e}")))?;
    let text = String::from_utf8(bytes).map_err(|e| ShareError::Decode(format!("invalid utf-8: {e}")))?;
    let record: DecodedRecord = serde_json::from_str(&text).map_err(|e| ShareError::Decode(format!("invalid record: {e}")))?;

    let cid = record.c.filter(|c| !c.is_empty()).ok_or_else(|| ShareError::Decode("missing field `c`".into()))?;
    let filename = record.f.filter(|f| !f.is_empty()).ok_or_else(|| ShareError::Decode("missing field `f`".into()))?;

    FileIdentity::new(cid, filename, size_from_value(record.s.as_ref()))
}
