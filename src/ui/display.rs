//! Terminal rendering of page views.

use std::cell::RefCell;

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Table};
use console::style;

use crate::gateway::Gateways;
use crate::i18n::Translate;
use crate::ui::progress::Spinner;
use crate::view::{FileIcon, PresentationSink, ToastKind, View};

/// Glyph shown next to a file name.
pub fn icon_glyph(icon: FileIcon) -> &'static str {
    match icon {
        FileIcon::Folder => "📁",
        FileIcon::Image => "🖼",
        FileIcon::Video => "🎬",
        FileIcon::Audio => "🎵",
        FileIcon::Archive => "📦",
        FileIcon::Pdf => "📕",
        FileIcon::Document => "📄",
        FileIcon::Spreadsheet => "📊",
        FileIcon::Presentation => "📽",
        FileIcon::Code => "🧾",
        FileIcon::Text => "📝",
        FileIcon::File => "📎",
    }
}

/// [`PresentationSink`] that draws on the terminal.
///
/// Views go to stdout; spinners, prompt errors and toasts go to stderr. A quiet
/// sink leaves stdout alone and draws no spinner.
pub struct TerminalSink<'a> {
    i18n: &'a dyn Translate,
    spinner: RefCell<Option<Spinner>>,
    quiet: bool,
}

impl<'a> TerminalSink<'a> {
    pub fn new(i18n: &'a dyn Translate) -> Self {
        Self { i18n, spinner: RefCell::new(None), quiet: false }
    }

    pub fn quiet(i18n: &'a dyn Translate) -> Self {
        Self { quiet: true, ..Self::new(i18n) }
    }

    fn start_spinner(&self, message: &str) {
        if self.quiet {
            return;
        }

        self.spinner.borrow_mut().get_or_insert_with(|| Spinner::new(message)).set_message(message);
    }

    fn stop_spinner(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish();
        }
    }
}

impl PresentationSink for TerminalSink<'_> {
    fn show(&self, view: &View) {
        if let View::Loading(message) = view {
            self.start_spinner(message);
            return;
        }

        self.stop_spinner();
        if self.quiet {
            return;
        }

        match view {
            View::Loading(_) => {}
            View::PassphrasePrompt => {
                println!();
                println!("{} {}", style("🔒").yellow(), style(self.i18n.translate("passphrase-prompt", &[])).bold());
            }
            View::Error(error) => {
                println!();
                println!("{} {}", style("✗").red(), style(&error.title).red().bold());
                println!("  {}", error.message);
            }
            View::Detail(detail) => {
                println!();
                println!("{} {}", icon_glyph(detail.icon), style(&detail.name).green().bold());
                if !detail.size.is_empty() {
                    println!("  {}", style(&detail.size).dim());
                }
            }
        }
    }

    fn set_access_url(&self, url: &str) {
        if !self.quiet {
            println!("  {}: {}", style(self.i18n.translate("copy-share-link", &[])).bold(), style(url).cyan().underlined());
        }
    }

    fn set_passphrase_error(&self, message: Option<&str>) {
        if let Some(message) = message {
            eprintln!("{} {}", style("!").yellow(), style(message).yellow());
        }
    }

    fn set_busy(&self, busy: bool, label: &str) {
        if busy { self.start_spinner(label) } else { self.stop_spinner() }
    }

    fn toast(&self, kind: ToastKind, message: &str) {
        match kind {
            ToastKind::Success => eprintln!("{} {}", style("✓").green(), style(message).bold()),
            ToastKind::Error => eprintln!("{} {}", style("✗").red(), style(message).red()),
        }
    }
}

/// Builds the gateway table; `selected` is marked in the first column.
pub fn gateway_table(gateways: &Gateways, selected: Option<usize>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec!["", "#", "Name", "URL"]);

    for (index, gateway) in gateways.iter().enumerate() {
        let marker = if Some(index) == selected { "*" } else { "" };
        table.add_row(vec![Cell::new(marker), Cell::new(index), Cell::new(&gateway.label), Cell::new(&gateway.value)]);
    }

    table
}

pub fn show_gateways(gateways: &Gateways, selected: Option<usize>) {
    println!("{}", gateway_table(gateways, selected));
}

pub fn show_link(link: &str) {
    println!("{link}");
}
