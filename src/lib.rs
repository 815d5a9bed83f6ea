//! cidshare - Content-addressed share links from the terminal.
//!
//! Resolves share links that point at files on IPFS gateways. A link carries
//! its file in one of three forms:
//! - a passphrase-protected payload (Argon2id + AES-256-GCM)
//! - a compact base64url JSON token
//! - plain `cid` and `filename` query parameters
//!
//! Resolved files can be opened through any configured gateway and
//! downloaded without overwriting existing files.

pub mod app;
pub mod cipher;
pub mod codec;
pub mod config;
pub mod download;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod i18n;
pub mod link;
pub mod page;
pub mod resolution;
pub mod secret;
pub mod types;
pub mod ui;
pub mod view;
