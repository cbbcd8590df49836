use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use signaldrop_core::{Connectivity, ReportStatus, Resolution};

#[derive(Parser)]
#[command(name = "signaldrop")]
#[command(about = "Capture field reports offline and sync them when the network returns")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to a JSON settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Network status to assume for this invocation
    #[arg(long, global = true, value_enum, default_value_t = NetworkArg::Online)]
    pub network: NetworkArg,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new report
    #[command(alias = "new")]
    Add {
        /// Report title
        #[arg(required = true)]
        title: Vec<String>,
        /// Report body (read from piped stdin when omitted)
        #[arg(short, long)]
        content: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// Latitude in degrees
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude in degrees
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// List reports, most recently edited first
    List {
        /// Number of reports to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only show reports in this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one report in full
    Show {
        /// Report ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing report (opens $EDITOR on the body when no field is given)
    Edit {
        /// Report ID or unique ID prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New body
        #[arg(short, long)]
        content: Option<String>,
        /// New comma-separated tags (empty string clears them)
        #[arg(short, long)]
        tags: Option<String>,
        /// New latitude in degrees
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// New longitude in degrees
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Remove the stored location
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        clear_location: bool,
    },
    /// Delete a report
    Delete {
        /// Report ID or unique ID prefix
        id: String,
    },
    /// Push offline reports to the remote
    Sync {
        /// Make every exchange of this pass fail
        #[arg(long)]
        fail: bool,
    },
    /// Inject or resolve sync conflicts
    Conflict {
        #[command(subcommand)]
        command: ConflictCommands,
    },
    /// Show report counts per sync status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export reports
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Write the sample reports into the store
    Seed,
}

#[derive(Subcommand)]
pub enum ConflictCommands {
    /// Simulate a concurrent remote edit of a report
    Inject {
        /// Report ID or unique ID prefix
        id: String,
    },
    /// Settle a conflicted report
    Resolve {
        /// Report ID or unique ID prefix
        id: String,
        /// Which side wins
        #[arg(long, value_enum)]
        strategy: StrategyArg,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for signaldrop_core::export::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum NetworkArg {
    Online,
    Slow,
    Offline,
}

impl From<NetworkArg> for Connectivity {
    fn from(network: NetworkArg) -> Self {
        match network {
            NetworkArg::Online => Self::Online,
            NetworkArg::Slow => Self::Slow,
            NetworkArg::Offline => Self::Offline,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    Offline,
    Syncing,
    Synced,
    Conflict,
}

impl From<StatusArg> for ReportStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Offline => Self::Offline,
            StatusArg::Syncing => Self::Syncing,
            StatusArg::Synced => Self::Synced,
            StatusArg::Conflict => Self::Conflict,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    /// Keep the local copy
    Local,
    /// Take the remote copy
    Remote,
    /// Concatenate both bodies
    Merge,
}

impl From<StrategyArg> for Resolution {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Local => Self::Local,
            StrategyArg::Remote => Self::Remote,
            StrategyArg::Merge => Self::Merge,
        }
    }
}
