//! The share page controller.
//!
//! [`SharePage`] owns everything one page load produces: the classified link,
//! the passphrase prompt, the resolved identity, the gateway selection and the
//! download controller. Front-ends drive it with [`PageEvent`]s.

use tracing::debug;

use crate::cipher::Decryptor;
use crate::download::{DownloadController, DownloadOutcome, Fetcher};
use crate::error::ShareError;
use crate::gate::PassphrasePrompt;
use crate::gateway::{GatewayOption, Gateways, build_url};
use crate::i18n::Translate;
use crate::link::{self, QueryParams};
use crate::resolution::FileResolutionState;
use crate::secret::Secret;
use crate::types::{FileIdentity, ResolutionOutcome, ShareLinkVariant};
use crate::view::{PresentationSink, View};

/// Named events a front-end can raise.
#[derive(Debug)]
pub enum PageEvent {
    /// The user picked the gateway at this index.
    GatewayChanged(usize),
    /// The user submitted a passphrase.
    UnlockRequested(Secret),
    /// The user asked to download the file.
    DownloadRequested,
}

/// What handling an event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUpdate {
    /// Nothing applicable; the event was dropped.
    Unchanged,
    AccessUrl(String),
    Unlocked(FileIdentity),
    UnlockFailed(ShareError),
    Download(DownloadOutcome),
}

pub struct SharePage<'a, D, F> {
    ciphertext: Option<String>,
    prompt: Option<PassphrasePrompt>,
    state: FileResolutionState,
    gateways: Gateways,
    selected: Option<usize>,
    access_url: Option<String>,
    decryptor: D,
    downloads: DownloadController<F>,
    sink: &'a dyn PresentationSink,
    i18n: &'a dyn Translate,
}

impl<'a, D: Decryptor, F: Fetcher> SharePage<'a, D, F> {
    /// Parses `query` once and moves the page to its first settled view.
    pub fn load(query: &QueryParams, gateways: Gateways, decryptor: D, downloads: DownloadController<F>, sink: &'a dyn PresentationSink, i18n: &'a dyn Translate) -> Self {
        sink.show(&View::Loading(i18n.translate("accessing-file", &[])));

        let mut page = Self { ciphertext: None, prompt: None, state: FileResolutionState::new(), gateways, selected: None, access_url: None, decryptor, downloads, sink, i18n };

        match link::parse(query) {
            ShareLinkVariant::Encrypted { ciphertext } => {
                page.ciphertext = Some(ciphertext);
                page.prompt = Some(PassphrasePrompt::new());
                sink.show(&View::PassphrasePrompt);
            }
            ShareLinkVariant::Compressed(identity) | ShareLinkVariant::Legacy(identity) => page.settle(ResolutionOutcome::Resolved(identity)),
            ShareLinkVariant::Invalid(reason) => page.settle(ResolutionOutcome::Failed(reason)),
        }

        page
    }

    pub fn identity(&self) -> Option<&FileIdentity> {
        self.state.identity()
    }

    pub fn is_failed(&self) -> bool {
        self.state.is_failed()
    }

    /// Whether an encrypted link is still waiting for the right passphrase.
    pub fn awaiting_passphrase(&self) -> bool {
        self.prompt.is_some() && self.state.identity().is_none()
    }

    pub fn access_url(&self) -> Option<&str> {
        self.access_url.as_deref()
    }

    pub fn gateways(&self) -> &Gateways {
        &self.gateways
    }

    pub fn selected_gateway(&self) -> Option<(usize, &GatewayOption)> {
        let index = self.selected?;
        Some((index, self.gateways.get(index)?))
    }

    pub fn downloads(&self) -> &DownloadController<F> {
        &self.downloads
    }

    pub async fn handle(&mut self, event: PageEvent) -> PageUpdate {
        match event {
            PageEvent::GatewayChanged(index) => self.change_gateway(index),
            PageEvent::UnlockRequested(passphrase) => self.unlock(passphrase),
            PageEvent::DownloadRequested => self.download().await,
        }
    }

    fn change_gateway(&mut self, index: usize) -> PageUpdate {
        if self.state.identity().is_none() || self.gateways.get(index).is_none() {
            debug!(index, "gateway change ignored");
            return PageUpdate::Unchanged;
        }

        self.selected = Some(index);
        self.refresh_access_url().map_or(PageUpdate::Unchanged, PageUpdate::AccessUrl)
    }

    fn unlock(&mut self, passphrase: Secret) -> PageUpdate {
        let (Some(prompt), Some(ciphertext)) = (self.prompt.as_mut(), self.ciphertext.as_deref()) else {
            return PageUpdate::Unchanged;
        };
        if self.state.identity().is_some() {
            return PageUpdate::Unchanged;
        }

        self.sink.set_passphrase_error(None);
        prompt.set_input(passphrase);

        match prompt.submit(&self.decryptor, ciphertext) {
            Ok(identity) => {
                self.settle(ResolutionOutcome::Resolved(identity.clone()));
                PageUpdate::Unlocked(identity)
            }
            Err(err) => {
                let key = match err {
                    ShareError::EmptyPassphrase => "passphrase-placeholder",
                    _ => "passphrase-incorrect",
                };
                self.sink.set_passphrase_error(Some(&self.i18n.translate(key, &[])));
                PageUpdate::UnlockFailed(err)
            }
        }
    }

    async fn download(&self) -> PageUpdate {
        let (Some(identity), Some(url)) = (self.state.identity(), self.access_url.as_deref()) else {
            debug!("download requested before the link resolved");
            return PageUpdate::Download(DownloadOutcome::Ignored);
        };

        PageUpdate::Download(self.downloads.start(url, identity.filename(), self.sink, self.i18n).await)
    }

    fn settle(&mut self, outcome: ResolutionOutcome) {
        if self.state.resolve(outcome, self.sink, self.i18n).is_some() {
            if self.selected.is_none() {
                self.selected = self.gateways.default_index();
            }
            if self.refresh_access_url().is_none() {
                debug!("no gateway available for the access url");
            }
        }
    }

    fn refresh_access_url(&mut self) -> Option<String> {
        let identity = self.state.identity()?;
        let gateway = self.gateways.get(self.selected?)?;

        let url = build_url(identity, &gateway.value);
        self.sink.set_access_url(&url);
        self.access_url = Some(url.clone());
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::codec;
    use crate::download::tests::StubFetcher;
    use crate::gate::tests::FixedDecryptor;
    use crate::i18n::Catalog;
    use crate::view::testing::RecordingSink;

    type TestPage<'a> = SharePage<'a, FixedDecryptor, StubFetcher>;

    fn load<'a>(query: &str, dir: &TempDir, sink: &'a RecordingSink, i18n: &'a Catalog) -> TestPage<'a> {
        let downloads = DownloadController::new(StubFetcher::ok(b"bytes"), dir.path());
        SharePage::load(&QueryParams::parse(query), Gateways::builtin(), FixedDecryptor::notes(), downloads, sink, i18n)
    }

    #[test]
    fn test_compressed_link_resolves_with_second_gateway() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let page = load("?d=eyJjIjoiYmFmeXJlaWFiYyIsImYiOiJoZWxsby50eHQiLCJzIjo0MjB9", &dir, &sink, &i18n);

        assert_eq!(page.identity().map(FileIdentity::filename), Some("hello.txt"));
        assert_eq!(page.access_url(), Some("https://cdn.ipfsscan.io/ipfs/bafyreiabc?filename=hello.txt"));
        assert_eq!(sink.last_url().as_deref(), page.access_url());
        assert!(matches!(sink.views.borrow()[0], View::Loading(_)));
        assert!(matches!(sink.last_view(), Some(View::Detail(ref d)) if d.size == "Size: 420 B"));
    }

    #[test]
    fn test_legacy_link_resolves() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let page = load("?cid=bafyabc&filename=report%2Epdf&size=1024", &dir, &sink, &i18n);

        let identity = page.identity().unwrap();
        assert_eq!(identity.filename(), "report.pdf");
        assert_eq!(identity.size(), 1024);
    }

    #[tokio::test]
    async fn test_malformed_token_shows_error_and_blocks_download() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let mut page = load("?d=not-valid-base64!!", &dir, &sink, &i18n);

        assert!(page.is_failed());
        assert!(matches!(sink.last_view(), Some(View::Error(_))));
        assert!(page.access_url().is_none());
        assert_eq!(page.handle(PageEvent::DownloadRequested).await, PageUpdate::Download(DownloadOutcome::Ignored));
        assert_eq!(page.handle(PageEvent::GatewayChanged(0)).await, PageUpdate::Unchanged);
        assert!(sink.busy.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_correct_passphrase_goes_straight_to_detail() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let mut page = load("?share=opaque&cid=ignored&filename=ignored.txt", &dir, &sink, &i18n);

        assert!(page.awaiting_passphrase());
        assert_eq!(sink.last_view(), Some(View::PassphrasePrompt));

        let update = page.handle(PageEvent::UnlockRequested(Secret::new("sesame"))).await;

        assert!(matches!(update, PageUpdate::Unlocked(ref id) if id.cid() == "bafyxyz"));
        assert!(!page.awaiting_passphrase());
        assert!(matches!(sink.last_view(), Some(View::Detail(ref d)) if d.name == "notes.txt"));
        assert_eq!(*sink.passphrase_errors.borrow(), vec![None]);
        assert_eq!(page.access_url(), Some("https://cdn.ipfsscan.io/ipfs/bafyxyz?filename=notes.txt"));
    }

    #[tokio::test]
    async fn test_wrong_passphrase_shows_message_and_clears_input() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let mut page = load("?share=opaque", &dir, &sink, &i18n);

        let update = page.handle(PageEvent::UnlockRequested(Secret::new("nope"))).await;

        assert_eq!(update, PageUpdate::UnlockFailed(ShareError::DecryptionFailed));
        assert_eq!(sink.passphrase_errors.borrow().last().cloned().flatten(), Some(i18n.translate("passphrase-incorrect", &[])));
        assert!(page.prompt.as_ref().unwrap().input_is_empty());
        assert!(page.awaiting_passphrase());
        assert_eq!(sink.last_view(), Some(View::PassphrasePrompt));

        let update = page.handle(PageEvent::UnlockRequested(Secret::new(""))).await;
        assert_eq!(update, PageUpdate::UnlockFailed(ShareError::EmptyPassphrase));
        assert_eq!(sink.passphrase_errors.borrow().last().cloned().flatten(), Some(i18n.translate("passphrase-placeholder", &[])));

        let update = page.handle(PageEvent::UnlockRequested(Secret::new("sesame"))).await;
        assert!(matches!(update, PageUpdate::Unlocked(_)));
    }

    #[tokio::test]
    async fn test_gateway_change_rebuilds_url_idempotently() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let mut page = load("?cid=bafyabc&filename=a%20b.txt", &dir, &sink, &i18n);

        let first = page.handle(PageEvent::GatewayChanged(0)).await;
        let second = page.handle(PageEvent::GatewayChanged(0)).await;

        assert_eq!(first, PageUpdate::AccessUrl("https://ipfs.io/ipfs/bafyabc?filename=a%20b.txt".into()));
        assert_eq!(first, second);
        assert_eq!(page.selected_gateway().map(|(i, _)| i), Some(0));
        assert_eq!(page.handle(PageEvent::GatewayChanged(42)).await, PageUpdate::Unchanged);
    }

    #[tokio::test]
    async fn test_download_uses_current_url_and_filename() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let mut page = load("?cid=bafyabc&filename=report.pdf", &dir, &sink, &i18n);

        let update = page.handle(PageEvent::DownloadRequested).await;

        assert_eq!(update, PageUpdate::Download(DownloadOutcome::Saved(dir.path().join("report.pdf"))));
        assert!(!page.downloads().is_busy());
    }

    #[test]
    fn test_single_gateway_list_falls_back_to_first() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let identity = FileIdentity::new("bafy", "a.txt", 0).unwrap();
        let query = QueryParams::parse(&format!("?d={}", codec::encode(&identity)));
        let gateways = Gateways::new(vec![GatewayOption::new("https://only.example", "only")]);

        let page = SharePage::load(&query, gateways, FixedDecryptor::notes(), DownloadController::new(StubFetcher::ok(b""), dir.path()), &sink, &i18n);

        assert_eq!(page.access_url(), Some("https://only.example/ipfs/bafy?filename=a.txt"));
    }

    #[test]
    fn test_empty_gateway_list_leaves_url_unavailable() {
        let (sink, i18n, dir) = (RecordingSink::default(), Catalog::english(), tempdir().unwrap());
        let page = SharePage::load(
            &QueryParams::parse("?cid=bafy&filename=a.txt"),
            Gateways::new(Vec::new()),
            FixedDecryptor::notes(),
            DownloadController::new(StubFetcher::ok(b""), dir.path()),
            &sink,
            &i18n,
        );

        assert!(page.identity().is_some());
        assert!(page.access_url().is_none());
    }
}
