use std::path::PathBuf;

use anyhow::{Context, Result};
use checklists_config::parse_config;
use checklists_render::{render, RenderOptions};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging();

    let config = parse_config(&cli.config)?;
    let options = RenderOptions::default();
    let compiled = render(&config, &options).with_context(|| {
        format!(
            "failed to render '{}' from {}",
            config.document.name,
            cli.config.display()
        )
    })?;

    info!(pdf = %compiled.pdf_path.display(), tex = %compiled.tex_path.display(), "done");
    Ok(0)
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "checklists",
    version,
    about = "Generate typeset PDF checklists from a TOML, YAML or JSON config"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
}
