//! Command execution and output formatting

use crate::cli::{Commands, FlatCli, QuarantineArgs};
use quarantine_core::{QuarantineManager, QuarantineStore, QueryOutcome, Result, SetOptions};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Run one subcommand of `quarantinecli`
pub fn execute<S: QuarantineStore>(
    manager: &QuarantineManager<S>,
    command: &Commands,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Quarantine(args) => quarantine(manager, args, out),
        Commands::Dequarantine(args) => dequarantine(manager, &args.path, out),
        Commands::Status(args) => status(manager, &args.path, args.info_key.as_deref(), out),
    }
}

/// Run every operation requested on the flat `quarantine` command line, in
/// the order quarantine, dequarantine, status. The first failure stops the rest.
pub fn execute_flat<S: QuarantineStore>(
    manager: &QuarantineManager<S>,
    cli: &FlatCli,
    out: &mut impl Write,
) -> Result<()> {
    if cli.is_empty() {
        warn!("Nothing to do: pass --quarantine, --dequarantine or --status");
        return Ok(());
    }

    if let Some(path) = &cli.quarantine {
        manager.set(path, SetOptions::new())?;
        writeln!(out, "Quarantined {}", path.display())?;
    }

    if let Some(path) = &cli.dequarantine {
        dequarantine(manager, path, out)?;
    }

    if let Some(path) = &cli.status {
        status(manager, path, None, out)?;
    }

    Ok(())
}

fn quarantine<S: QuarantineStore>(
    manager: &QuarantineManager<S>,
    args: &QuarantineArgs,
    out: &mut impl Write,
) -> Result<()> {
    manager.set(&args.path, args.to_options())?;
    writeln!(out, "Quarantined {}", args.path.display())?;
    Ok(())
}

fn dequarantine<S: QuarantineStore>(
    manager: &QuarantineManager<S>,
    path: &Path,
    out: &mut impl Write,
) -> Result<()> {
    manager.clear(path)?;
    writeln!(out, "De-quarantined {}", path.display())?;
    Ok(())
}

fn status<S: QuarantineStore>(
    manager: &QuarantineManager<S>,
    path: &Path,
    info_key: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let path_display = path.display();

    match manager.query(path, info_key)? {
        QueryOutcome::NotQuarantined => {
            writeln!(out, "Path {} is not quarantined.", path_display)?;
        }
        QueryOutcome::Quarantined(record) => {
            writeln!(out, "Path {} is quarantined.", path_display)?;
            writeln!(out, "Quarantine Properties of path {}:", path_display)?;
            for (key, value) in record.entries() {
                writeln!(out, "{}: {}", key, value)?;
            }
        }
        QueryOutcome::Value { key, value } => {
            writeln!(out, "Path {} is quarantined.", path_display)?;
            writeln!(out, "{}: {}", key, value)?;
        }
    }

    Ok(())
}
