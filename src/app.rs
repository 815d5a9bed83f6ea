use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::json;
use tracing::{Level, debug};

use crate::cipher::{Decryptor, PassphraseCipher};
use crate::config::{DEFAULT_OUTPUT_DIR, SHARE_PAGE};
use crate::download::{DownloadController, DownloadOutcome, Fetcher, HttpFetcher};
use crate::gateway::Gateways;
use crate::i18n::{Catalog, Translate};
use crate::link::{QueryParams, ShareLink};
use crate::page::{PageEvent, PageUpdate, SharePage};
use crate::secret::Secret;
use crate::types::FileIdentity;
use crate::ui::display::{self, TerminalSink};
use crate::ui::prompt::{MenuAction, Prompt};
use crate::view::{PresentationSink, ToastKind};

#[derive(Args, Debug, Clone, Default)]
pub struct GatewayArgs {
    /// Gateway to use, by index, base URL or name
    #[arg(short, long, value_name = "SEL")]
    gateway: Option<String>,

    /// JSON file with the gateway list
    #[arg(long, value_name = "FILE")]
    gateways: Option<PathBuf>,
}

impl GatewayArgs {
    fn load(&self) -> Result<Gateways> {
        let mut gateways = match &self.gateways {
            Some(path) => Gateways::load(path)?,
            None => Gateways::builtin(),
        };

        if let Some(selector) = &self.gateway {
            gateways.prefer(selector).with_context(|| format!("unknown gateway: {selector}"))?;
        }

        Ok(gateways)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a share link interactively
    Open {
        link: String,

        #[command(flatten)]
        gateway: GatewayArgs,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Print the file details and access URL of a share link
    Resolve {
        link: String,

        #[arg(short, long)]
        passphrase: Option<String>,

        #[command(flatten)]
        gateway: GatewayArgs,

        #[arg(long)]
        json: bool,
    },

    /// Download the file behind a share link
    Download {
        link: String,

        #[arg(short, long)]
        passphrase: Option<String>,

        #[command(flatten)]
        gateway: GatewayArgs,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Create a share link for a CID
    Create {
        #[arg(long)]
        cid: String,

        #[arg(long)]
        filename: String,

        #[arg(long, default_value_t = 0)]
        size: u64,

        /// Protect the link with a passphrase
        #[arg(long, conflicts_with = "legacy")]
        encrypt: bool,

        #[arg(short, long, requires = "encrypt")]
        passphrase: Option<String>,

        /// Use the plain cid/filename layout
        #[arg(long)]
        legacy: bool,

        /// Share page the link points at
        #[arg(long, default_value = SHARE_PAGE)]
        base: String,
    },

    /// List the available gateways
    Gateways {
        #[command(flatten)]
        gateway: GatewayArgs,
    },
}

#[derive(Parser)]
#[command(name = "cidshare", version = "26.1.0", about = "Resolve, unlock and download content-addressed share links.")]
pub struct App {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();

        let level = match app.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        };

        let subscriber = tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        Ok(app)
    }

    pub async fn execute(self) -> Result<()> {
        let i18n = Catalog::english();

        match self.command {
            Commands::Open { link, gateway, output } => Self::run_open(&link, &gateway, &output, &i18n).await,
            Commands::Resolve { link, passphrase, gateway, json } => Self::run_resolve(&link, passphrase, &gateway, json, &i18n).await,
            Commands::Download { link, passphrase, gateway, output } => Self::run_download(&link, passphrase, &gateway, &output, &i18n).await,
            Commands::Create { cid, filename, size, encrypt, passphrase, legacy, base } => Self::run_create(cid, filename, size, encrypt.then_some(passphrase), legacy, &base, &i18n),
            Commands::Gateways { gateway } => {
                let gateways = gateway.load()?;
                display::show_gateways(&gateways, gateways.default_index());
                Ok(())
            }
        }
    }

    async fn run_open(link: &str, gateway: &GatewayArgs, output: &Path, i18n: &dyn Translate) -> Result<()> {
        let sink = TerminalSink::new(i18n);
        let prompt = Prompt::new(i18n);
        let mut page = Self::open_page(link, gateway, output, &sink, i18n)?;

        Self::unlock(&mut page, None, &prompt).await?;
        Self::ensure_resolved(&page)?;

        loop {
            match prompt.select_action()? {
                MenuAction::Download => {
                    Self::download_step(&mut page, &sink, i18n).await;
                }
                MenuAction::ChangeGateway => {
                    let current = page.selected_gateway().map(|(index, _)| index);
                    let index = prompt.select_gateway(page.gateways(), current)?;
                    page.handle(PageEvent::GatewayChanged(index)).await;
                }
                MenuAction::ShowLink => {
                    if let Some(url) = page.access_url() {
                        sink.set_access_url(url);
                    }
                }
                MenuAction::Quit => break,
            }
        }

        Ok(())
    }

    async fn run_resolve(link: &str, passphrase: Option<String>, gateway: &GatewayArgs, json: bool, i18n: &dyn Translate) -> Result<()> {
        let sink = if json { TerminalSink::quiet(i18n) } else { TerminalSink::new(i18n) };
        let mut page = Self::open_page(link, gateway, Path::new(DEFAULT_OUTPUT_DIR), &sink, i18n)?;

        Self::unlock(&mut page, passphrase, &Prompt::new(i18n)).await?;
        let identity = Self::ensure_resolved(&page)?;

        if json {
            let report = json!({
                "cid": identity.cid(),
                "filename": identity.filename(),
                "size": identity.size(),
                "gateway": page.selected_gateway().map(|(_, g)| g.value.as_str()),
                "url": page.access_url(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Ok(())
    }

    async fn run_download(link: &str, passphrase: Option<String>, gateway: &GatewayArgs, output: &Path, i18n: &dyn Translate) -> Result<()> {
        let sink = TerminalSink::new(i18n);
        let mut page = Self::open_page(link, gateway, output, &sink, i18n)?;

        Self::unlock(&mut page, passphrase, &Prompt::new(i18n)).await?;
        Self::ensure_resolved(&page)?;

        Self::finish_download(Self::download_step(&mut page, &sink, i18n).await).map(|_| ())
    }

    fn run_create(cid: String, filename: String, size: u64, encrypt: Option<Option<String>>, legacy: bool, base: &str, i18n: &dyn Translate) -> Result<()> {
        let identity = FileIdentity::new(cid, filename, size).context("a share link needs both a CID and a filename")?;
        let share = ShareLink::new(base);

        let link = match encrypt {
            Some(passphrase) => {
                let passphrase = match passphrase {
                    Some(passphrase) => Secret::from_string(passphrase),
                    None => Prompt::new(i18n).passphrase()?,
                };
                ensure!(!passphrase.is_empty(), "passphrase cannot be empty");

                share.encrypted(&PassphraseCipher::new().encrypt(&identity, passphrase.expose_secret())?)
            }
            None if legacy => share.legacy(&identity),
            None => share.compressed(&identity),
        };

        display::show_link(&link);
        Ok(())
    }

    fn open_page<'a>(link: &str, gateway: &GatewayArgs, output: &Path, sink: &'a dyn PresentationSink, i18n: &'a dyn Translate) -> Result<SharePage<'a, PassphraseCipher, HttpFetcher>> {
        let gateways = gateway.load()?;
        let downloads = DownloadController::new(HttpFetcher::new().context("failed to set up the HTTP client")?, output);

        Ok(SharePage::load(&QueryParams::parse(link), gateways, PassphraseCipher::new(), downloads, sink, i18n))
    }

    /// Unlocks an encrypted link. A given passphrase gets one attempt; without
    /// one the user is asked until the link opens.
    async fn unlock<D: Decryptor, F: Fetcher>(page: &mut SharePage<'_, D, F>, passphrase: Option<String>, prompt: &Prompt<'_>) -> Result<()> {
        if !page.awaiting_passphrase() {
            return Ok(());
        }

        if let Some(passphrase) = passphrase {
            if let PageUpdate::UnlockFailed(err) = page.handle(PageEvent::UnlockRequested(Secret::from_string(passphrase))).await {
                bail!("failed to unlock share link: {err}");
            }
            return Ok(());
        }

        while page.awaiting_passphrase() {
            let passphrase = prompt.passphrase()?;
            page.handle(PageEvent::UnlockRequested(passphrase)).await;
        }

        Ok(())
    }

    fn ensure_resolved<'p, D: Decryptor, F: Fetcher>(page: &'p SharePage<'_, D, F>) -> Result<&'p FileIdentity> {
        page.identity().context("share link could not be resolved")
    }

    /// Runs one download and reports a saved file. A failure has already been
    /// toasted by the controller and leaves the page usable.
    async fn download_step<D: Decryptor, F: Fetcher>(page: &mut SharePage<'_, D, F>, sink: &dyn PresentationSink, i18n: &dyn Translate) -> DownloadOutcome {
        let PageUpdate::Download(outcome) = page.handle(PageEvent::DownloadRequested).await else {
            return DownloadOutcome::Ignored;
        };

        match &outcome {
            DownloadOutcome::Saved(path) => sink.toast(ToastKind::Success, &i18n.translate("download-complete", &[("path", &path.display().to_string())])),
            DownloadOutcome::Failed(err) => debug!("download can be retried on another gateway: {err}"),
            DownloadOutcome::Ignored => {}
        }

        outcome
    }

    /// Exit status of the one-shot `download` command.
    fn finish_download(outcome: DownloadOutcome) -> Result<PathBuf> {
        match outcome {
            DownloadOutcome::Saved(path) => Ok(path),
            DownloadOutcome::Failed(err) => Err(err.into()),
            DownloadOutcome::Ignored => bail!("no download was started"),
        }
    }
}
