//! branchmap-cli
//! =============
//!
//! Command-line interface for the `branchmap-core` region/branch selector.
//!
//! The binary (`branchmap`) parses [`args::CliArgs`] and hands them to
//! [`run`], which writes everything user-facing to the given writer so the
//! commands can be exercised in tests.
//!
//! ```text
//! branchmap stats
//! branchmap branches "Tamil Nadu" --filter th
//! branchmap select Rajasthan Jaipur --topology ./public/js/topojsons --html
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod args;

use crate::args::{CliArgs, Commands};
use anyhow::{anyhow, bail, Context};
use branchmap_core::loader::{builder, CompressionMode};
use branchmap_core::selector::filter_branches;
use branchmap_core::{
    BranchSearch, Dataset, FileSource, GeometrySource, Outcome, RecordingHost, Selector,
    SelectorConfig,
};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming the topology directory / URL for `select`.
pub const GEOMETRY_BASE_ENV: &str = "BRANCHMAP_GEOMETRY_BASE";

/// Execute one CLI command.
pub fn run(args: CliArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let CliArgs {
        dataset,
        config,
        command,
        ..
    } = args;
    let dataset = dataset.as_deref();

    match command {
        Commands::Validate { path } => {
            let db = Dataset::load_from_path(&path)
                .with_context(|| format!("{} failed validation", path.display()))?;
            let stats = db.stats();
            writeln!(
                out,
                "OK: {} regions ({} operational), {} branches",
                stats.regions, stats.operational_regions, stats.branches
            )?;
        }

        Commands::Compile {
            input,
            output,
            no_gzip,
        } => {
            let mode = if no_gzip {
                CompressionMode::None
            } else {
                CompressionMode::default()
            };
            let db = builder::build_bundle(&input, &output, mode)
                .with_context(|| format!("compiling {}", input.display()))?;
            writeln!(
                out,
                "Wrote {} ({} regions, {} branches)",
                output.display(),
                db.regions().len(),
                db.stats().branches
            )?;
        }

        Commands::Stats => {
            let db = load_dataset(dataset)?;
            let stats = db.stats();
            writeln!(out, "Dataset statistics ({}):", db.country())?;
            writeln!(out, "  Regions: {}", stats.regions)?;
            writeln!(out, "  Operational regions: {}", stats.operational_regions)?;
            writeln!(out, "  Branches: {}", stats.branches)?;
        }

        Commands::Regions { operational } => {
            let db = load_dataset(dataset)?;
            for r in db.regions() {
                if operational && !r.is_operational() {
                    continue;
                }
                writeln!(out, "{} ({} branches) [{}]", r.name(), r.branch_count(), r.boundary_key())?;
            }
        }

        Commands::Branches { region, filter } => {
            let db = load_dataset(dataset)?;
            let r = db
                .region(&region)
                .ok_or_else(|| anyhow!("Region '{region}' not found"))?;
            let listing = filter_branches(db.branches_for_region(r), filter.as_deref().unwrap_or(""));
            writeln!(out, "{} — {}", r.name(), listing.summary())?;
            for b in &listing.visible {
                writeln!(out, "- {}: {}", b.name(), b.address())?;
            }
        }

        Commands::Search { query } => {
            let db = load_dataset(dataset)?;
            let hits = db.find_branches(&query);
            if hits.is_empty() {
                writeln!(out, "No branches found matching: {query}")?;
            }
            for (branch, region) in hits {
                writeln!(out, "{} — {}", branch.name(), region.name())?;
            }
        }

        Commands::Select {
            region,
            branch,
            filter,
            topology,
            json,
            html,
        } => {
            let db = load_dataset(dataset)?;
            let config = load_config(config.as_deref())?;
            let topology = topology.or_else(|| std::env::var(GEOMETRY_BASE_ENV).ok());
            let mut selector = Selector::new(db, config, RecordingHost::default());

            if let Some(base) = topology {
                let source = geometry_source(&base)?;
                if let Err(e) = selector.initialize(source.as_ref()) {
                    warn!(error = %e, "map unavailable; the view shows the retry control");
                }
            }

            if let Outcome::Declined(reason) = selector.select_region(&region) {
                bail!("cannot open region: {reason}");
            }
            if let Some(text) = filter.as_deref() {
                selector.filter_branches(text);
            }
            if let Some(name) = branch.as_deref() {
                if let Outcome::Declined(reason) = selector.select_branch(&region, name) {
                    bail!("cannot select branch: {reason}");
                }
            }

            if json {
                let report = serde_json::json!({
                    "selection": selector.selection(),
                    "events": selector.host().events,
                    "view": selector.render(),
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else if html {
                writeln!(out, "{}", selector.render().to_html())?;
            } else {
                write_selection_summary(&selector, out)?;
            }
        }
    }

    Ok(())
}

fn load_dataset(path: Option<&Path>) -> anyhow::Result<Dataset> {
    let db = match path {
        Some(p) => {
            Dataset::load_from_path(p).with_context(|| format!("loading dataset {}", p.display()))?
        }
        None => Dataset::load().context("loading bundled dataset")?,
    };
    info!(regions = db.regions().len(), "dataset ready");
    Ok(db)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SelectorConfig> {
    match path {
        Some(p) => SelectorConfig::from_path(p)
            .with_context(|| format!("reading config {}", p.display())),
        None => Ok(SelectorConfig::default()),
    }
}

fn geometry_source(base: &str) -> anyhow::Result<Box<dyn GeometrySource>> {
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Ok(Box::new(FileSource::new(base)));
    }
    #[cfg(feature = "fetch")]
    let source: anyhow::Result<Box<dyn GeometrySource>> =
        Ok(Box::new(branchmap_core::HttpSource::new(base)?));
    #[cfg(not(feature = "fetch"))]
    let source: anyhow::Result<Box<dyn GeometrySource>> = Err(anyhow!(
        "'{base}' is a URL; rebuild with the `fetch` feature to load remote topology"
    ));
    source
}

fn write_selection_summary(
    selector: &Selector<RecordingHost>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let selection = selector.selection();
    let Some(region) = selector.current_region() else {
        writeln!(out, "Overview")?;
        return Ok(());
    };
    writeln!(out, "{} ({} branches available)", region.name(), region.branch_count())?;
    if let Some(listing) = selector.visible_branches() {
        writeln!(out, "{}", listing.summary())?;
        for b in &listing.visible {
            let mark = if selection.branch.as_deref() == Some(b.name()) { "*" } else { " " };
            writeln!(out, " {mark} {}", b.name())?;
        }
    }
    if let Some(name) = selection.branch.as_deref() {
        let address = selector
            .dataset()
            .address_of(region.name(), name)
            .unwrap_or_default();
        writeln!(out, "Selected: {name} ({address})")?;
    }
    Ok(())
}
