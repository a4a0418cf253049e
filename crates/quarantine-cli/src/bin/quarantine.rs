//! quarantine - quarantine, de-quarantine and show the status of paths on macOS
//!
//! Each of `-q`, `-d` and `-s` runs its operation independently, in that order:
//!
//! ```bash
//! quarantine -q ~/Downloads/a.dmg -s ~/Downloads/a.dmg
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use quarantine_cli::cli::FlatCli;
use quarantine_cli::{commands, init_logging, load_config, platform_manager};
use tracing::info;

fn main() -> Result<()> {
    let cli = FlatCli::parse();
    init_logging(cli.global.verbose);

    info!("quarantine v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli.global).context("Failed to load configuration")?;
    let manager = platform_manager(config);

    let mut stdout = std::io::stdout().lock();
    commands::execute_flat(&manager, &cli, &mut stdout)?;
    Ok(())
}
