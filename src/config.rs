//! Global Configuration Constants
//!
//! This module contains the fixed parameters used throughout cidshare: the
//! query parameter names that make up a share link, the built-in gateway
//! list, and the key derivation settings for passphrase-protected links.

use std::time::Duration;

/// Application name used in user interfaces and log output
pub const APP_NAME: &str = "cidshare";

// === Share Link Query Parameters ===
// A share link carries its payload in one of three parameter layouts. The
// names are part of the link format and must never change.

/// Passphrase-protected payload (`?share=...`)
pub const PARAM_ENCRYPTED: &str = "share";

/// Compact base64url record (`?d=...`)
pub const PARAM_COMPRESSED: &str = "d";

/// Legacy content identifier (`?cid=...&filename=...`)
pub const PARAM_CID: &str = "cid";

/// Legacy file name, percent-encoded
pub const PARAM_FILENAME: &str = "filename";

/// Legacy optional size in bytes
pub const PARAM_SIZE: &str = "size";

/// Page that share links point at when no base URL is given
pub const SHARE_PAGE: &str = "share.html";

// === Gateways ===

/// Built-in gateway list as `(base URL, label)` pairs
///
/// Order matters: the entry at [`DEFAULT_GATEWAY_INDEX`] is preselected,
/// which is why the CDN gateway sits second rather than first.
pub const DEFAULT_GATEWAYS: &[(&str, &str)] = &[
    ("https://ipfs.io", "ipfs.io"),
    ("https://cdn.ipfsscan.io", "cdn.ipfsscan.io"),
    ("https://dweb.link", "dweb.link"),
    ("https://gateway.pinata.cloud", "Pinata"),
    ("https://w3s.link", "w3s.link"),
];

/// Position of the preferred gateway in any gateway list
pub const DEFAULT_GATEWAY_INDEX: usize = 1;

// === Argon2 Key Derivation Parameters ===
// Share links are unlocked interactively, often on modest hardware, so the
// cost sits at the lower interactive profile rather than file-encryption
// strength.

/// Argon2 time cost parameter (number of iterations)
pub const ARGON_TIME: u32 = 2;

/// Argon2 memory cost parameter in kilobytes
pub const ARGON_MEMORY: u32 = 19 * 1024;

/// Argon2 parallelism parameter (number of lanes)
pub const ARGON_THREADS: u32 = 1;

/// Length of Argon2 salt in bytes
pub const ARGON_SALT_LEN: usize = 16;

/// Size of the AES-256 key derived from the passphrase
pub const KEY_SIZE: usize = 32;

/// Size of AES-GCM nonce in bytes
pub const AES_NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const AES_TAG_SIZE: usize = 16;

// === Terminal ===

/// Spinner refresh interval while a download is in flight
pub const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Directory downloads land in when `--output` is not given
pub const DEFAULT_OUTPUT_DIR: &str = ".";
