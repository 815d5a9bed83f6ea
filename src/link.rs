//! Share link parsing and construction.
//!
//! [`parse`] classifies the query parameters of an incoming link. The
//! precedence is fixed: an encrypted payload wins over everything else, then a
//! compact token, then the legacy `cid` + `filename` pair. Links may carry
//! legacy parameters next to an encrypted payload, so the order matters.

use tracing::{debug, warn};
use url::form_urlencoded;

use crate::codec;
use crate::config::{PARAM_CID, PARAM_COMPRESSED, PARAM_ENCRYPTED, PARAM_FILENAME, PARAM_SIZE, SHARE_PAGE};
use crate::error::ShareError;
use crate::types::{FileIdentity, ShareLinkVariant};

/// Decoded query parameters of a share link, in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses a full URL, a `?query` or a bare `query` string.
    ///
    /// Everything after `#` is ignored. Keys and values are decoded with
    /// form-urlencoded rules (`+` is a space).
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let input = input.split_once('#').map_or(input, |(before, _)| before);
        let query = input.split_once('?').map_or(input, |(_, query)| query);

        let pairs = form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned())).collect();

        Self { pairs }
    }

    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }
}

/// Classifies a link. First match wins; a bad compact token never falls
/// through to the legacy form.
pub fn parse(params: &QueryParams) -> ShareLinkVariant {
    let variant = if let Some(ciphertext) = params.get(PARAM_ENCRYPTED) {
        ShareLinkVariant::Encrypted { ciphertext: ciphertext.to_owned() }
    } else if let Some(token) = params.get(PARAM_COMPRESSED) {
        match codec::decode(token) {
            Ok(identity) => ShareLinkVariant::Compressed(identity),
            Err(err) => {
                warn!("failed to decode compressed share link: {err}");
                ShareLinkVariant::Invalid(err)
            }
        }
    } else if let (Some(cid), Some(filename)) = (params.get(PARAM_CID), params.get(PARAM_FILENAME)) {
        match parse_legacy(cid, filename, params.get(PARAM_SIZE)) {
            Ok(identity) => ShareLinkVariant::Legacy(identity),
            Err(err) => {
                warn!("rejected legacy share link: {err}");
                ShareLinkVariant::Invalid(err)
            }
        }
    } else {
        warn!("share link carries no recognized parameters");
        ShareLinkVariant::Invalid(ShareError::MissingParameter)
    };

    debug!(variant = variant.label(), "classified share link");
    variant
}

fn parse_legacy(cid: &str, filename: &str, size: Option<&str>) -> Result<FileIdentity, ShareError> {
    // Legacy links percent-encode the filename on top of the query encoding.
    if let Some(position) = malformed_escape(filename) {
        return Err(ShareError::Decode(format!("filename has a malformed escape at byte {position}")));
    }
    let filename = urlencoding::decode(filename).map_err(|e| ShareError::Decode(format!("filename is not valid percent-encoding: {e}")))?;
    let size = size.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0);

    FileIdentity::new(cid, filename.into_owned(), size)
}

/// Byte offset of the first `%` not followed by two hex digits.
fn malformed_escape(value: &str) -> Option<usize> {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().filter(|(_, b)| **b == b'%').map(|(i, _)| i).find(|&i| !matches!(bytes.get(i + 1..i + 3), Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()))
}

/// Builder for outgoing share links.
#[derive(Debug, Clone)]
pub struct ShareLink {
    base: String,
}

impl Default for ShareLink {
    fn default() -> Self {
        Self::new(SHARE_PAGE)
    }
}

impl ShareLink {
    /// `base` is the share page URL, without a query.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// `?d=<token>` link for an identity.
    pub fn compressed(&self, identity: &FileIdentity) -> String {
        self.with_query(&[(PARAM_COMPRESSED, &codec::encode(identity))])
    }

    /// `?share=<payload>` link for an already encrypted payload.
    pub fn encrypted(&self, payload: &str) -> String {
        self.with_query(&[(PARAM_ENCRYPTED, payload)])
    }

    /// `?cid=..&filename=..&size=..` link in the legacy layout.
    pub fn legacy(&self, identity: &FileIdentity) -> String {
        let filename = urlencoding::encode(identity.filename());
        let size = identity.size().to_string();
        let mut pairs = vec![(PARAM_CID, identity.cid()), (PARAM_FILENAME, &*filename)];
        if identity.size() > 0 {
            pairs.push((PARAM_SIZE, size.as_str()));
        }

        self.with_query(&pairs)
    }

    fn with_query(&self, pairs: &[(&str, &str)]) -> String {
        let query = form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish();
        format!("{}?{query}", self.base)
    }
}
