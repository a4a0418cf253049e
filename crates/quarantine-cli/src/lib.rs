//! quarantine-cli
//!
//! Front ends over quarantine-core: `quarantinecli` with one subcommand per
//! operation, and the flat `quarantine` command taking `-q`, `-d` and `-s`.

pub mod cli;
pub mod commands;

use cli::GlobalArgs;
use quarantine_core::{Config, QuarantineManager, XattrStore};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber. Logs go to stderr so stdout only carries
/// command output.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("quarantine_core=debug,quarantine_cli=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the configuration and apply command line overrides
pub fn load_config(global: &GlobalArgs) -> quarantine_core::Result<Config> {
    let mut config = Config::load(global.config.as_deref())?;

    if let Some(events_db) = &global.events_db {
        config.events_db = Some(events_db.clone());
        config.record_events = true;
    }
    if global.no_events {
        config.record_events = false;
    }

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Manager over the platform store, configured from `config`
pub fn platform_manager(config: Config) -> QuarantineManager<XattrStore> {
    let store = XattrStore::new()
        .with_attribute_name(config.attribute_name.clone())
        .with_events_db(config.resolved_events_db());
    QuarantineManager::new(store, config)
}
