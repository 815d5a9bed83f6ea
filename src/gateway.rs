//! Gateway list and access URL construction.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use url::Url;

use crate::config::{DEFAULT_GATEWAYS, DEFAULT_GATEWAY_INDEX};
use crate::types::FileIdentity;

/// One selectable gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOption {
    /// Base URL, e.g. `https://ipfs.io`.
    pub value: String,

    /// Human-readable name.
    #[serde(alias = "text")]
    pub label: String,
}

impl GatewayOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }

    /// Builds an option from a bare URL, labelled by its host.
    pub fn from_url(value: &str) -> Option<Self> {
        let url = Url::parse(value).ok().filter(|u| matches!(u.scheme(), "http" | "https"))?;
        let label = url.host_str()?.to_owned();
        Some(Self::new(value.trim_end_matches('/'), label))
    }
}

/// Ordered, read-only gateway list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateways {
    options: Vec<GatewayOption>,
    preferred: Option<usize>,
}

impl Default for Gateways {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Gateways {
    pub fn new(options: Vec<GatewayOption>) -> Self {
        Self { options, preferred: None }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_GATEWAYS.iter().map(|(value, label)| GatewayOption::new(*value, *label)).collect())
    }

    /// Loads a JSON array of `{value, label}` (or `{value, text}`) objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or is
    /// an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("failed to read gateway list: {}", path.display()))?;
        let options: Vec<GatewayOption> = serde_json::from_str(&raw).with_context(|| format!("invalid gateway list: {}", path.display()))?;
        ensure!(!options.is_empty(), "gateway list is empty: {}", path.display());

        Ok(Self::new(options))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GatewayOption> {
        self.options.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GatewayOption> {
        self.options.iter()
    }

    /// Initial selection: an explicit preference, else the second entry, or
    /// the only one.
    pub fn default_index(&self) -> Option<usize> {
        if self.preferred.is_some() {
            return self.preferred;
        }

        match self.options.len() {
            0 => None,
            n if n > DEFAULT_GATEWAY_INDEX => Some(DEFAULT_GATEWAY_INDEX),
            _ => Some(0),
        }
    }

    /// Resolves a user selector to an index.
    ///
    /// The selector may be a position, a base URL or a label. A URL that is not
    /// in the list is appended as a custom gateway.
    pub fn select(&mut self, selector: &str) -> Option<usize> {
        let selector = selector.trim();

        if let Ok(index) = selector.parse::<usize>() {
            return (index < self.options.len()).then_some(index);
        }

        let bare = selector.trim_end_matches('/');
        if let Some(index) = self.options.iter().position(|o| o.value.trim_end_matches('/') == bare || o.label.eq_ignore_ascii_case(selector)) {
            return Some(index);
        }

        let custom = GatewayOption::from_url(selector)?;
        self.options.push(custom);
        Some(self.options.len() - 1)
    }

    /// Like [`select`](Self::select), and makes the result the initial selection.
    pub fn prefer(&mut self, selector: &str) -> Option<usize> {
        let index = self.select(selector)?;
        self.preferred = Some(index);
        Some(index)
    }
}

/// `{gateway}/ipfs/{cid}?filename={encoded filename}`.
///
/// The filename keeps a directory's trailing `/`, percent-encoded.
pub fn build_url(identity: &FileIdentity, gateway_base: &str) -> String {
    let base = gateway_base.strip_suffix('/').unwrap_or(gateway_base);
    format!("{base}/ipfs/{}?filename={}", identity.cid(), urlencoding::encode(identity.filename()))
}
