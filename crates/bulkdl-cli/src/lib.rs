//! bulkdl CLI Library
//!
//! Client for a genomics platform's bulk downloads: resolves the download
//! options for a selection of samples or workflow runs, validates the
//! selection and creates the download.
//!
//! # Overview
//!
//! - **Registry**: per-workflow validation strategies (`registry`)
//! - **Loading**: concurrent fetch of catalog, validation and account checks (`orchestrator`)
//! - **Options**: field selections, conditional fields and submit gating (`fields`, `options`)
//! - **Creation**: request assembly and dispatch per download type (`assembly`, `dispatcher`)
//! - **Session**: the dialog state machine tying it together (`dialog`)
//!
//! ```no_run
//! use bulkdl_cli::api::ApiClient;
//! use bulkdl_cli::dialog::{BulkDownloadDialog, DialogPhase};
//! use bulkdl_cli::selection::EntitySelection;
//! use bulkdl_common::{WorkflowEntity, WorkflowKind};
//!
//! # async fn demo() -> bulkdl_cli::Result<()> {
//! let client = ApiClient::new("https://platform.example.org")?;
//! let selection = EntitySelection::new(WorkflowKind::ShortReadMngs, WorkflowEntity::Samples)
//!     .with_ids(["101", "102"]);
//!
//! let mut dialog = BulkDownloadDialog::new(selection);
//! if let DialogPhase::Ready = dialog.load(&client).await {
//!     println!("{} valid samples", dialog.valid_ids().len());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod assembly;
pub mod commands;
pub mod config;
pub mod dialog;
pub mod dispatcher;
pub mod error;
pub mod fields;
pub mod heatmap;
pub mod options;
pub mod orchestrator;
pub mod registry;
pub mod selection;
pub mod sinks;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use dialog::BulkDownloadDialog;
pub use error::{CliError, Result};

use bulkdl_common::{WorkflowEntity, WorkflowKind};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// bulkdl - bulk download client
#[derive(Parser, Debug)]
#[command(name = "bulkdl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Platform URL (overrides the config file)
    #[arg(long, env = "BULKDL_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Config file (defaults to ./bulkdl.toml or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the CLI reference as markdown and exit
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Objects a command works on
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Workflow of the selected objects (e.g. short-read-mngs, consensus-genome)
    #[arg(short, long)]
    pub workflow: Option<WorkflowKind>,

    /// Whether the IDs are samples or workflow runs
    #[arg(short, long)]
    pub entity: Option<WorkflowEntity>,

    /// Comma-separated object IDs
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// JSON file describing the selection, including sample names and hosts
    #[arg(short, long, conflicts_with = "ids")]
    pub selection: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the download types offered for a selection
    Types {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Validate a selection and show which objects can be downloaded
    Validate {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a bulk download
    Download {
        /// Download type (e.g. sample_metadata, biom_format)
        download_type: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Field value as name=value or name=value|display name (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Directory for locally saved CSV files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Build the heatmap link for combined microbiome file options
    HeatmapLink {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Field value for biom_format as name=value (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Open the link in the browser instead of printing it
        #[arg(long)]
        open: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path in use
    Path,
}
