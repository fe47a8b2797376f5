//! # Khwater CLI (`khwater`)
//!
//! ## Usage
//!
//! ```bash
//! khwater --config ./config/khwater.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `khwater chapters` | List chapters in numeric order |
//! | `khwater chapter <id>` | Print every item of a chapter in reading order |
//! | `khwater search "<query>"` | Search the corpus, grouped by chapter |
//! | `khwater check` | Corpus stats and ordering diagnostics |
//! | `khwater serve` | Start the JSON HTTP API |
//!
//! Without a config file, `--data <path>` is enough to point at a corpus.
//!
//! Logs go to stderr and are filtered through `RUST_LOG`
//! (default `khwater=info`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use khwater::config::{self, Config};
use khwater::{chapters, check, search, server};

/// Khwater: ordered reading content with weighted search.
#[derive(Parser)]
#[command(name = "khwater", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/khwater.toml")]
    config: PathBuf,

    /// Corpus file or directory. Overrides `[data].path`; when given and the
    /// config file does not exist, defaults are used for everything else.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List chapters with their titles and item counts.
    Chapters,

    /// Print one chapter, every item resolved into reading order.
    Chapter {
        /// Chapter identifier (e.g. `12`).
        id: String,
    },

    /// Search the corpus.
    ///
    /// Terms are matched case-insensitively as substrings. Matches in titles
    /// and ayahs rank higher than matches in body text.
    Search {
        /// The search query string.
        query: String,

        /// Wrap matched terms in `<mark>` tags.
        #[arg(long)]
        highlight: bool,

        /// Print the JSON response body instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Report corpus stats and ordering issues.
    Check {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,

        /// Exit non-zero when any ordering issue is found.
        #[arg(long)]
        strict: bool,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("khwater=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    match &cli.data {
        Some(data) if !cli.config.exists() => Ok(Config::minimal(data)),
        Some(data) => {
            let mut cfg = config::load_config(&cli.config)?;
            cfg.data.path = data.clone();
            Ok(cfg)
        }
        None => config::load_config(&cli.config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;

    match cli.command {
        Commands::Chapters => {
            chapters::run_chapters(&cfg).await?;
        }
        Commands::Chapter { id } => {
            chapters::run_chapter(&cfg, &id).await?;
        }
        Commands::Search {
            query,
            highlight,
            json,
        } => {
            search::run_search(&cfg, &query, highlight, json).await?;
        }
        Commands::Check { json, strict } => {
            check::run_check(&cfg, json, strict).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
