//! branchmap: command-line front end for `branchmap-core`.
//!
//! Usage examples
//! --------------
//!
//! - Show dataset stats
//!   $ branchmap stats
//!
//! - List operational regions
//!   $ branchmap regions --operational
//!
//! - Filter a region's branches
//!   $ branchmap branches rajasthan --filter aw
//!
//! - Open a region, pick a branch and print the view tree
//!   $ branchmap select Rajasthan Jaipur --json
//!
//! Logging goes to stderr. `RUST_LOG` wins over `-v`.
use branchmap_cli::args::CliArgs;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    branchmap_cli::run(args, &mut stdout.lock())
}
