//! Command line definitions

use clap::{Args, Parser, Subcommand};
use quarantine_core::{QuarantineType, SetOptions};
use std::path::PathBuf;

/// Options shared by both front ends
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(long, global = true, env = "QUARANTINE_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Quarantine events database to record into and read from
    #[arg(long, global = true, env = "QUARANTINE_EVENTS_DB", value_name = "PATH")]
    pub events_db: Option<PathBuf>,

    /// Keep everything in the extended attribute, skip the events database
    #[arg(long, global = true, conflicts_with = "events_db")]
    pub no_events: bool,
}

/// A command line tool to quarantine, de-quarantine, and manage quarantined files on macOS
#[derive(Parser, Debug)]
#[command(name = "quarantinecli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quarantines a specified path
    #[command(visible_alias = "set")]
    Quarantine(QuarantineArgs),

    /// Dequarantines a specified path
    #[command(visible_alias = "clear")]
    Dequarantine(DequarantineArgs),

    /// Prints whether the path is quarantined and, if so, its quarantine properties
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct QuarantineArgs {
    /// The path to quarantine
    pub path: PathBuf,

    /// The agent name to record (defaults to "quarantineCLI")
    #[arg(long)]
    pub agent_name: Option<String>,

    /// The agent bundle identifier to record
    #[arg(long)]
    pub bundle_id: Option<String>,

    /// The URL of the resource originally hosting the file
    #[arg(long, alias = "originURL")]
    pub origin_url: Option<String>,

    /// The URL of the file itself (defaults to the file URL of the path)
    #[arg(long, alias = "itemURL")]
    pub item_url: Option<String>,

    /// How the file arrived, e.g. web-download or email-attachment
    #[arg(long = "type", value_name = "TYPE")]
    pub quarantine_type: Option<QuarantineType>,

    /// Do not fill in the item URL from the path
    #[arg(long, conflicts_with = "item_url")]
    pub no_item_url: bool,
}

impl QuarantineArgs {
    pub fn to_options(&self) -> SetOptions {
        let mut options = SetOptions {
            agent_name: self.agent_name.clone(),
            bundle_id: self.bundle_id.clone(),
            origin_url: self.origin_url.clone(),
            item_url: self.item_url.clone(),
            quarantine_type: self.quarantine_type,
            ..SetOptions::default()
        };
        if self.no_item_url {
            options = options.populate_data_url(false);
        }
        options
    }
}

#[derive(Args, Debug)]
pub struct DequarantineArgs {
    /// The path to dequarantine
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// The path to examine
    pub path: PathBuf,

    /// A single quarantine property to print, e.g. originURL or LSQuarantineAgentName
    pub info_key: Option<String>,
}

/// A command line tool to quarantine and de-quarantine files on macOS
#[derive(Parser, Debug)]
#[command(name = "quarantine")]
#[command(version, about, long_about = None)]
pub struct FlatCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Quarantine a specified path
    #[arg(short = 'q', long = "quarantine", value_name = "path")]
    pub quarantine: Option<PathBuf>,

    /// Dequarantine a specified path
    #[arg(short = 'd', long = "dequarantine", value_name = "path")]
    pub dequarantine: Option<PathBuf>,

    /// Show the quarantine status of a specified path and its properties if quarantined
    #[arg(short = 's', long = "status", value_name = "path")]
    pub status: Option<PathBuf>,
}

impl FlatCli {
    pub fn is_empty(&self) -> bool {
        self.quarantine.is_none() && self.dequarantine.is_none() && self.status.is_none()
    }
}
