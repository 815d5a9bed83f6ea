//! Page-level resolution state.
//!
//! Holds the one identity a page ever resolves and turns outcomes into the
//! detail or error view. The identity is set once and never replaced.

use std::cell::OnceCell;

use bytesize::ByteSize;
use tracing::{info, warn};

use crate::i18n::Translate;
use crate::types::{FileIdentity, ResolutionOutcome};
use crate::view::{DetailView, ErrorView, FileIcon, PresentationSink, View};

#[derive(Debug, Default)]
pub struct FileResolutionState {
    current: OnceCell<FileIdentity>,
    failed: bool,
}

impl FileResolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved identity, if resolution succeeded.
    pub fn identity(&self) -> Option<&FileIdentity> {
        self.current.get()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Applies an outcome and requests the matching view.
    ///
    /// Once an identity is stored, later outcomes are ignored.
    pub fn resolve(&mut self, outcome: ResolutionOutcome, sink: &dyn PresentationSink, i18n: &dyn Translate) -> Option<&FileIdentity> {
        if let Some(existing) = self.current.get() {
            warn!(cid = existing.cid(), "ignoring outcome for an already resolved link");
            return Some(existing);
        }

        match outcome {
            ResolutionOutcome::Resolved(identity) => {
                info!(cid = identity.cid(), filename = identity.filename(), size = identity.size(), "share link resolved");
                sink.show(&View::Detail(detail_view(&identity, i18n)));
                self.failed = false;
                Some(self.current.get_or_init(|| identity))
            }
            ResolutionOutcome::Failed(reason) => {
                warn!(invalid_link = reason.is_invalid_link(), "share link could not be resolved: {reason}");
                sink.show(&View::Error(error_view(i18n)));
                self.failed = true;
                None
            }
        }
    }
}

/// Detail view for a resolved identity.
pub fn detail_view(identity: &FileIdentity, i18n: &dyn Translate) -> DetailView {
    let size = if identity.size() > 0 { i18n.translate("file-size", &[("size", &format_bytes(identity.size()))]) } else { String::new() };

    DetailView { name: identity.display_name().to_owned(), size, icon: FileIcon::for_filename(identity.filename()) }
}

/// The single generic error view shown for every resolution failure.
pub fn error_view(i18n: &dyn Translate) -> ErrorView {
    ErrorView { title: i18n.translate("decryption-failed", &[]), message: i18n.translate("selected-files-invalid", &[]) }
}

/// Formats bytes into a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShareError;
    use crate::i18n::Catalog;
    use crate::view::testing::RecordingSink;

    #[test]
    fn test_resolved_shows_detail() {
        let (sink, i18n) = (RecordingSink::default(), Catalog::english());
        let mut state = FileResolutionState::new();
        let identity = FileIdentity::new("bafy", "hello.txt", 420).unwrap();

        let stored = state.resolve(ResolutionOutcome::Resolved(identity.clone()), &sink, &i18n);
        assert_eq!(stored, Some(&identity));

        let Some(View::Detail(detail)) = sink.last_view() else { panic!("expected detail view") };
        assert_eq!(detail.name, "hello.txt");
        assert_eq!(detail.size, "Size: 420 B");
        assert_eq!(detail.icon, FileIcon::Text);
    }

    #[test]
    fn test_unknown_size_renders_no_text() {
        let identity = FileIdentity::new("bafy", "photos/", 0).unwrap();
        let detail = detail_view(&identity, &Catalog::english());
        assert_eq!(detail.name, "photos");
        assert_eq!(detail.size, "");
        assert_eq!(detail.icon, FileIcon::Folder);
    }

    #[test]
    fn test_every_failure_shows_same_error() {
        let i18n = Catalog::english();
        let mut views = Vec::new();

        for reason in [ShareError::Decode("bad".into()), ShareError::MissingParameter, ShareError::DecryptionFailed] {
            let sink = RecordingSink::default();
            let mut state = FileResolutionState::new();
            assert!(state.resolve(ResolutionOutcome::Failed(reason), &sink, &i18n).is_none());
            assert!(state.is_failed());
            assert!(state.identity().is_none());
            views.push(sink.last_view());
        }

        assert!(views.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(views[0], Some(View::Error(error_view(&i18n))));
    }

    #[test]
    fn test_identity_is_immutable_once_resolved() {
        let (sink, i18n) = (RecordingSink::default(), Catalog::english());
        let mut state = FileResolutionState::new();
        let first = FileIdentity::new("bafy1", "a.txt", 1).unwrap();
        let second = FileIdentity::new("bafy2", "b.txt", 2).unwrap();

        state.resolve(ResolutionOutcome::Resolved(first.clone()), &sink, &i18n);
        state.resolve(ResolutionOutcome::Resolved(second), &sink, &i18n);
        state.resolve(ResolutionOutcome::Failed(ShareError::MissingParameter), &sink, &i18n);

        assert_eq!(state.identity(), Some(&first));
        assert!(!state.is_failed());
        assert_eq!(sink.views.borrow().len(), 1);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(420), "420 B");
        assert!(format_bytes(1536).starts_with("1.5"));
    }
}
