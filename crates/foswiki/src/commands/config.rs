//! Config command - configuration management.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use foswiki_config::{ConfigPaths, FoswikiConfig, Layer};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show resolved configuration and where it came from
    Show,

    /// Show configuration file path
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./foswiki.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
        ConfigCommand::Init { local } => cmd_init(local),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = foswiki_config::load_config(None)?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
        return Ok(());
    }

    let heading = Style::new().bold();
    let dim = Style::new().dim();

    println!("{}\n", heading.apply_to("# Foswiki Configuration"));

    println!("Config files (later overrides earlier):");
    for source in &loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} {:<8} {}", status, source.layer, source.path.display());
    }
    println!();

    let server = ctx.config.server();
    println!("Server:");
    println!("  base_url: {}", ctx.server_url);
    println!("  timeout:  {}s", server.timeout_secs);
    if let Some(agent) = &server.user_agent {
        println!("  user_agent: {}", agent);
    }
    println!();

    println!("Session:");
    match &ctx.page {
        Some(page) => println!("  page: {}", page),
        None => println!("  page: {}", dim.apply_to("(none)")),
    }
    println!();

    if ctx.config.preferences.is_empty() {
        println!("No preferences preloaded\n");
    } else {
        println!("Preferences:");
        for (key, value) in &ctx.config.preferences {
            println!("  {:<16} {}", key, value);
        }
        println!();
    }

    let logging = ctx.config.logging();
    println!("Logging:");
    println!("  level: {}", logging.level);
    println!("  file:  {}", logging.file);
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config:\n");
        println!("{}", ctx.config.to_toml()?);
    }

    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = foswiki_config::user_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "path": path, "exists": path.exists() })
        );
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_init(local: bool) -> Result<()> {
    let layer = if local { Layer::Project } else { Layer::User };
    let path = ConfigPaths::discover(None, None)
        .path(layer)
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    foswiki_config::save_config(&FoswikiConfig::starter(), &path)?;

    let green = Style::new().green();
    println!("{} Created {} config {}", green.apply_to("✓"), layer, path.display());
    Ok(())
}
