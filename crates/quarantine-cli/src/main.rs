//! quarantinecli - quarantine, de-quarantine and inspect files on macOS
//!
//! # Examples
//!
//! ```bash
//! # Quarantine a file as if Safari had downloaded it
//! quarantinecli quarantine ~/Downloads/tool.zip --agent-name Safari \
//!     --bundle-id com.apple.Safari --origin-url https://example.com/
//!
//! # Show every quarantine property, or just one
//! quarantinecli status ~/Downloads/tool.zip
//! quarantinecli status ~/Downloads/tool.zip originURL
//!
//! # Remove the quarantine
//! quarantinecli dequarantine ~/Downloads/tool.zip
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use quarantine_cli::cli::Cli;
use quarantine_cli::{commands, init_logging, load_config, platform_manager};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    info!("quarantinecli v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli.global).context("Failed to load configuration")?;
    let manager = platform_manager(config);

    let mut stdout = std::io::stdout().lock();
    commands::execute(&manager, &cli.command, &mut stdout)?;
    Ok(())
}
