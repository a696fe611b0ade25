//! CLI for tapedeck: a command-line stand-in for the browsing context.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tapedeck_core::config;
use tapedeck_core::prefs::QualityPreset;

use commands::{run_cookies, run_info, run_prefs, run_request, run_resolve, run_scan, run_watch};

/// Top-level CLI for tapedeck.
#[derive(Debug, Parser)]
#[command(name = "tapedeck")]
#[command(about = "tapedeck: download controls and downloader URIs for SoundCloud and Bandcamp pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// A saved page and the browsing context it was saved from.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Saved HTML snapshot of the page.
    pub page: PathBuf,

    /// Location the page was loaded from.
    #[arg(long)]
    pub url: String,

    /// Raw `name=value; name=value` cookie string of the page.
    #[arg(long, default_value = "")]
    pub cookie: String,
}

/// Dialog answers. Unset flags keep the remembered preference.
#[derive(Debug, Clone, Default, Args)]
pub struct OptionArgs {
    /// Save directory.
    #[arg(long)]
    pub path: Option<String>,

    /// Quality preset: best, m4a or mp3.
    #[arg(long, value_parser = parse_quality)]
    pub quality: Option<QualityPreset>,

    /// Extra downloader parameters.
    #[arg(long, allow_hyphen_values = true)]
    pub custom: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub uploader_folder: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub album_folder: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub track_index: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub embed_thumbnail: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub add_metadata: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub no_overwrites: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub use_cookies: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Insert download controls into a saved page and list them.
    Scan {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Resolve the resource an element belongs to.
    Resolve {
        #[command(flatten)]
        page: PageArgs,

        /// Selector of the element to resolve (first match).
        #[arg(long)]
        element: String,
    },

    /// Show the metadata extracted from a saved page.
    Info {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Print the Netscape cookie container for a page location.
    Cookies {
        /// Page location.
        #[arg(long)]
        url: String,

        /// Raw cookie string.
        #[arg(long, default_value = "")]
        cookie: String,
    },

    /// Build the downloader URI for a page or one of its elements.
    Request {
        #[command(flatten)]
        page: PageArgs,

        /// Selector of the activated element; defaults to the page itself.
        #[arg(long)]
        element: Option<String>,

        #[command(flatten)]
        options: OptionArgs,

        /// Hand the URI to xdg-open instead of printing it.
        #[arg(long)]
        open: bool,
    },

    /// Observe a saved page while fragments are appended to it.
    Watch {
        #[command(flatten)]
        page: PageArgs,

        /// HTML fragment to append; repeat for several.
        #[arg(long = "fragment", value_name = "FILE")]
        fragments: Vec<PathBuf>,

        /// Selector of the element fragments are appended to.
        #[arg(long, default_value = "body")]
        into: String,

        /// Delay between fragments, in milliseconds.
        #[arg(long, default_value = "50", value_name = "MS")]
        interval_ms: u64,
    },

    /// Show remembered preferences for a site (soundcloud or bandcamp).
    Prefs {
        site: String,
    },
}

fn parse_quality(s: &str) -> Result<QualityPreset, String> {
    QualityPreset::from_label(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown quality '{s}' (expected best, m4a or mp3)"))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Scan { page } => run_scan(&cfg, &page)?,
            CliCommand::Resolve { page, element } => run_resolve(&cfg, &page, &element)?,
            CliCommand::Info { page } => run_info(&page)?,
            CliCommand::Cookies { url, cookie } => run_cookies(&url, &cookie)?,
            CliCommand::Request {
                page,
                element,
                options,
                open,
            } => run_request(&cfg, &page, element.as_deref(), &options, open)?,
            CliCommand::Watch {
                page,
                fragments,
                into,
                interval_ms,
            } => run_watch(&cfg, &page, &fragments, &into, interval_ms).await?,
            CliCommand::Prefs { site } => run_prefs(&cfg, &site)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
