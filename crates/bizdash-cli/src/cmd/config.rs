use crate::context::Context;
use crate::output::print_json;
use anyhow::Context as _;
use bizdash_core::config::{BackendConfig, Config, WarnLevel};
use bizdash_core::paths;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective config (secrets masked)
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write a default config file
    Init {
        /// Write ~/.bizdash/config.yaml instead of ./bizdash.yaml
        #[arg(long)]
        home: bool,
    },
}

pub fn run(ctx: &Context, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx, json),
        ConfigSubcommand::Validate => validate(ctx, json),
        ConfigSubcommand::Init { home } => init(ctx.config_path.as_deref(), home, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let config = ctx.config.redacted();
    let source = ctx
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());

    if json {
        return print_json(&serde_json::json!({
            "source": source,
            "config": config,
        }));
    }

    println!("source:  {source}");
    match &config.backend {
        BackendConfig::Rest {
            url,
            api_key,
            timeout_secs,
        } => {
            println!("backend: rest {url}");
            let key = if api_key.is_empty() { "(none)" } else { api_key.as_str() };
            println!("  api key: {key}");
            println!("  timeout: {timeout_secs}s");
        }
        BackendConfig::File { dir } => println!("backend: file {}", dir.display()),
        BackendConfig::Memory => println!("backend: memory"),
    }
    println!(
        "server:  port {}, open browser: {}",
        config.server.port, config.server.open_browser
    );
    println!(
        "dashboard: renewal window {} days, {} upcoming events",
        config.dashboard.renewal_window_days, config.dashboard.upcoming_events
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let warnings = ctx.config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

pub fn init(explicit: Option<&Path>, home: bool, json: bool) -> anyhow::Result<()> {
    let path = match (explicit, home) {
        (Some(p), _) => p.to_path_buf(),
        (None, true) => paths::home_config_path()?,
        (None, false) => {
            let cwd = std::env::current_dir().context("cannot read current directory")?;
            paths::local_config_path(&cwd)
        }
    };
    let config = Config::init(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "path": path,
            "config": config,
        }));
    }
    println!("Wrote {}", path.display());
    Ok(())
}
