use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for branchmap
#[derive(Debug, Parser)]
#[command(
    name = "branchmap",
    version,
    about = "Inspect branch datasets and drive the region/branch selector from the terminal"
)]
pub struct CliArgs {
    /// Dataset file (.json, .json.gz or a compiled .bin). Defaults to the bundled data.
    #[arg(short = 'd', long = "dataset", global = true)]
    pub dataset: Option<PathBuf>,

    /// Selector config file (JSON). Missing keys keep their defaults.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the dataset
    Stats,

    /// List regions with their branch counts
    Regions {
        /// Only regions with at least one branch
        #[arg(long)]
        operational: bool,
    },

    /// List the branches of one region
    Branches {
        /// Region name (case- and accent-insensitive)
        region: String,

        /// Keep only branches whose name contains this text
        #[arg(short = 'f', long = "filter")]
        filter: Option<String>,
    },

    /// Search branches across all regions
    Search {
        /// Substring to search (case-insensitive)
        query: String,
    },

    /// Check a dataset file for integrity errors
    Validate {
        /// Dataset file to check
        path: PathBuf,
    },

    /// Compile a JSON dataset into a binary bundle
    Compile {
        /// Source dataset (.json or .json.gz)
        input: PathBuf,
        /// Output bundle path (.bin)
        output: PathBuf,
        /// Write the bundle without gzip compression
        #[arg(long)]
        no_gzip: bool,
    },

    /// Drive the selector: open a region, optionally filter and pick a branch
    Select {
        /// Region to open
        region: String,

        /// Branch to select inside the region
        branch: Option<String>,

        /// Filter text typed into the branch search box
        #[arg(short = 'f', long = "filter")]
        filter: Option<String>,

        /// Topology directory (or base URL with the `fetch` feature).
        /// Falls back to BRANCHMAP_GEOMETRY_BASE.
        #[arg(short = 't', long = "topology")]
        topology: Option<String>,

        /// Print selection, host events and the view tree as JSON
        #[arg(long, conflicts_with = "html")]
        json: bool,

        /// Print the rendered view as HTML
        #[arg(long)]
        html: bool,
    },
}
