//! Fetch-and-save download controller.
//!
//! The controller is a two-state machine, `Idle → Busy → Idle`. A start
//! request while busy is dropped. The return to idle is tied to a guard, so it
//! happens on every exit path, and partially written files live in a scoped
//! temporary handle that is deleted unless the save completes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::Builder;
use tracing::{debug, info, warn};

use crate::config::APP_NAME;
use crate::error::ShareError;
use crate::i18n::Translate;
use crate::view::{PresentationSink, ToastKind};

/// Source of file bytes for a download URL.
///
/// Futures are polled on the caller's task and need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Fetches the body of `url`. A non-success status is an error.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ShareError>;
}

/// HTTP(S) fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, ShareError> {
        let client = reqwest::Client::builder().user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))).build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ShareError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShareError::Network(format!("gateway answered {status}")));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Result of a download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    Failed(ShareError),
    /// Another download was still in flight.
    Ignored,
}

pub struct DownloadController<F> {
    fetcher: F,
    output_dir: PathBuf,
    busy: AtomicBool,
}

impl<F: Fetcher> DownloadController<F> {
    pub fn new(fetcher: F, output_dir: impl Into<PathBuf>) -> Self {
        Self { fetcher, output_dir: output_dir.into(), busy: AtomicBool::new(false) }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads `url` and saves it as `filename` in the output directory.
    pub async fn start(&self, url: &str, filename: &str, sink: &dyn PresentationSink, i18n: &dyn Translate) -> DownloadOutcome {
        let Some(_guard) = BusyGuard::enter(&self.busy, sink, i18n) else {
            debug!(url, "download already in progress, ignoring request");
            return DownloadOutcome::Ignored;
        };

        info!(url, "download started");

        match self.fetcher.fetch(url).await.and_then(|bytes| save(&self.output_dir, filename, &bytes)) {
            Ok(path) => {
                info!(path = %path.display(), "download saved");
                DownloadOutcome::Saved(path)
            }
            Err(err) => {
                warn!(url, "download failed: {err}");
                sink.toast(ToastKind::Error, &i18n.translate("download-error", &[]));
                DownloadOutcome::Failed(err)
            }
        }
    }
}

/// Marks the controller busy for its lifetime and restores idle on drop.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
    sink: &'a dyn PresentationSink,
    i18n: &'a dyn Translate,
}

impl<'a> BusyGuard<'a> {
    fn enter(busy: &'a AtomicBool, sink: &'a dyn PresentationSink, i18n: &'a dyn Translate) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok()?;
        sink.set_busy(true, &i18n.translate("download-progress", &[]));
        Some(Self { busy, sink, i18n })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        self.sink.set_busy(false, &self.i18n.translate("download-button", &[]));
    }
}

/// Writes `bytes` through a temporary handle, then persists it under a free
/// name derived from `filename`.
fn save(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ShareError> {
    let mut handle = Builder::new().prefix(&format!(".{APP_NAME}-")).suffix(".part").tempfile_in(dir)?;
    handle.write_all(bytes)?;
    handle.as_file().sync_all()?;

    let target = available_path(dir, &save_name(filename));
    handle.persist_noclobber(&target).map_err(|e| ShareError::Io(e.error.to_string()))?;

    Ok(target)
}

/// File name to save under: the display name with path separators replaced.
pub fn save_name(filename: &str) -> String {
    let name = filename.strip_suffix('/').unwrap_or(filename);
    let name: String = name.chars().map(|ch| if matches!(ch, '/' | '\\' | '\0') { '_' } else { ch }).collect();

    match name.trim() {
        "" | "." | ".." => "download".to_owned(),
        trimmed => trimmed.to_owned(),
    }
}

/// First of `name`, `stem (1).ext`, `stem (2).ext`, ... that does not exist.
fn available_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (name, String::new()),
    };

    (1u32..)
        .map(|n| dir.join(format!("{stem} ({n}){extension}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
