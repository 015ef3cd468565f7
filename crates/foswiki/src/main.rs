//! Foswiki command-line client.
//!
//! Main entry point for the `foswiki` CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

mod commands;

use commands::{config, id, post, pref, ready, url};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Foswiki - command-line client for a Foswiki wiki
#[derive(Parser)]
#[command(name = "foswiki")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: from config, else http://localhost:8080)
    #[arg(long, global = true, env = "FOSWIKI_SERVER_URL")]
    pub server: Option<String>,

    /// Page to bind the session to (e.g. /bin/view/Main/WebHome)
    #[arg(long, global = true, env = "FOSWIKI_PAGE")]
    pub page: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a preference
    Pref(pref::PrefArgs),

    /// Build a script URL
    Url(url::UrlArgs),

    /// Post a form with the page's validation token
    Post(post::PostArgs),

    /// Run the page's ready behaviors and report the result
    Ready(ready::ReadyArgs),

    /// Print a fresh unique id
    Id,

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = foswiki_config::load_config(None)?;
    let logging = loaded.config.logging();

    // Console layer on stderr plus a rolling JSON file
    let console_filter = if cli.verbose {
        "foswiki=debug,foswiki_client=debug,foswiki_config=debug,info".to_string()
    } else {
        logging.level.clone()
    };

    let (file_layer, _guard) = if logging.file {
        let log_dir = logging
            .dir
            .clone()
            .or_else(|| foswiki_config::user_config_dir().map(|d| d.join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "foswiki.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(tracing_subscriber::EnvFilter::new(
                "foswiki=trace,foswiki_client=trace,foswiki_config=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(console_filter)),
        )
        .with(file_layer)
        .init();

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let server_url = cli
        .server
        .unwrap_or_else(|| loaded.config.server().base_url);
    let page = cli.page.or_else(|| loaded.config.page().map(str::to_string));

    // Create context for commands
    let ctx = commands::Context {
        server_url,
        page,
        json_output: cli.json,
        verbose: cli.verbose,
        config: loaded.config,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Pref(args) => pref::run(args, &ctx).await,
        Commands::Url(args) => url::run(args, &ctx).await,
        Commands::Post(args) => post::run(args, &ctx).await,
        Commands::Ready(args) => ready::run(args, &ctx).await,
        Commands::Id => id::run(&ctx),
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
