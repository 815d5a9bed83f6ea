//! Interactive prompts for the `open` command.

use anyhow::{Result, anyhow, ensure};
use inquire::{Password, PasswordDisplayMode, Select};
use strum::{EnumIter, IntoEnumIterator};

use crate::gateway::Gateways;
use crate::i18n::Translate;
use crate::secret::Secret;

/// Entries of the detail-view menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MenuAction {
    Download,
    ChangeGateway,
    ShowLink,
    Quit,
}

impl MenuAction {
    /// Message key of the menu label.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Download => "download-button",
            Self::ChangeGateway => "menu-change-gateway",
            Self::ShowLink => "menu-show-link",
            Self::Quit => "menu-quit",
        }
    }
}

pub struct Prompt<'a> {
    i18n: &'a dyn Translate,
}

impl<'a> Prompt<'a> {
    pub fn new(i18n: &'a dyn Translate) -> Self {
        Self { i18n }
    }

    /// Reads a masked passphrase. Empty input is returned as is.
    pub fn passphrase(&self) -> Result<Secret> {
        Password::new(&self.i18n.translate("passphrase-submit", &[]))
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .map(Secret::from_string)
            .map_err(|e| anyhow!("passphrase input failed: {e}"))
    }

    /// Lets the user pick a gateway, starting on `current`.
    pub fn select_gateway(&self, gateways: &Gateways, current: Option<usize>) -> Result<usize> {
        ensure!(!gateways.is_empty(), "no gateways configured");

        let options: Vec<String> = gateways.iter().map(|g| format!("{} ({})", g.label, g.value)).collect();

        Select::new(&self.i18n.translate("gateway-selector", &[]), options)
            .with_starting_cursor(current.unwrap_or(0))
            .raw_prompt()
            .map(|choice| choice.index)
            .map_err(|e| anyhow!("gateway selection failed: {e}"))
    }

    pub fn select_action(&self) -> Result<MenuAction> {
        let actions: Vec<MenuAction> = MenuAction::iter().collect();
        let labels: Vec<String> = actions.iter().map(|a| self.i18n.translate(a.key(), &[])).collect();

        let choice = Select::new(&self.i18n.translate("menu-prompt", &[]), labels).raw_prompt().map_err(|e| anyhow!("menu selection failed: {e}"))?;

        actions.get(choice.index).copied().ok_or_else(|| anyhow!("menu selection out of range"))
    }
}
