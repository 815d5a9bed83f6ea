//! View models and the presentation seam.
//!
//! The core never renders anything itself. It hands [`View`]s and status
//! updates to a [`PresentationSink`], which the terminal UI implements.

use strum::{AsRefStr, Display, EnumIter};

/// Icon category for a file, chosen from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum FileIcon {
    Folder,
    Image,
    Video,
    Audio,
    Archive,
    Pdf,
    Document,
    Spreadsheet,
    Presentation,
    Code,
    Text,
    File,
}

impl FileIcon {
    /// Classifies a raw filename. A trailing `/` always means a folder.
    pub fn for_filename(filename: &str) -> Self {
        if filename.ends_with('/') {
            return Self::Folder;
        }

        let Some((_, extension)) = filename.rsplit_once('.') else {
            return Self::File;
        };

        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "svg" | "ico" | "avif" | "heic" => Self::Image,
            "mp4" | "mkv" | "avi" | "mov" | "webm" | "flv" | "wmv" | "m4v" => Self::Video,
            "mp3" | "wav" | "flac" | "aac" | "ogg" | "m4a" | "opus" => Self::Audio,
            "zip" | "rar" | "7z" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "zst" => Self::Archive,
            "pdf" => Self::Pdf,
            "doc" | "docx" | "odt" | "rtf" | "pages" => Self::Document,
            "xls" | "xlsx" | "ods" | "csv" | "numbers" => Self::Spreadsheet,
            "ppt" | "pptx" | "odp" | "key" => Self::Presentation,
            "rs" | "js" | "ts" | "py" | "go" | "java" | "c" | "cpp" | "h" | "html" | "css" | "json" | "xml" | "yaml" | "yml" | "toml" | "sh" => Self::Code,
            "txt" | "md" | "log" | "ini" => Self::Text,
            _ => Self::File,
        }
    }
}

/// Everything the detail view shows about a resolved file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub name: String,
    /// Localized size line; empty when the size is unknown.
    pub size: String,
    pub icon: FileIcon,
}

/// The generic failure view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub title: String,
    pub message: String,
}

/// Mutually exclusive page states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading(String),
    PassphrasePrompt,
    Error(ErrorView),
    Detail(DetailView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// Receiver of view and status updates.
pub trait PresentationSink {
    fn show(&self, view: &View);

    fn set_access_url(&self, url: &str);

    /// Inline message beside the passphrase field; `None` clears it.
    fn set_passphrase_error(&self, message: Option<&str>);

    /// Busy indicator and download button label.
    fn set_busy(&self, busy: bool, label: &str);

    fn toast(&self, kind: ToastKind, message: &str);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_for_filename() {
        assert_eq!(FileIcon::for_filename("photos/"), FileIcon::Folder);
        assert_eq!(FileIcon::for_filename("archive.zip/"), FileIcon::Folder);
        assert_eq!(FileIcon::for_filename("IMG_0001.JPG"), FileIcon::Image);
        assert_eq!(FileIcon::for_filename("report.pdf"), FileIcon::Pdf);
        assert_eq!(FileIcon::for_filename("notes.txt"), FileIcon::Text);
        assert_eq!(FileIcon::for_filename("backup.tar.gz"), FileIcon::Archive);
        assert_eq!(FileIcon::for_filename("Makefile"), FileIcon::File);
        assert_eq!(FileIcon::for_filename("weird.xyz"), FileIcon::File);
    }

    #[test]
    fn test_icon_display_is_lowercase() {
        assert_eq!(FileIcon::Spreadsheet.to_string(), "spreadsheet");
        assert_eq!(FileIcon::Folder.as_ref(), "folder");
    }
}
