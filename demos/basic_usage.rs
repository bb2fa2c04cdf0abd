//! Basic usage example for branchmap-rs
//!
//! This example demonstrates how to:
//! - Load the bundled branch dataset
//! - Walk regions and their branches
//! - Drive the selector with closure callbacks
//! - Read the selection back

use branchmap_rs::prelude::*;

fn main() -> Result<()> {
    println!("=== branchmap-rs Basic Usage Example ===\n");

    println!("Loading bundled dataset...");
    let db = Dataset::load()?;
    let stats = db.stats();
    println!(
        "✓ {} regions, {} operational, {} branches\n",
        stats.regions, stats.operational_regions, stats.branches
    );

    // Example 1: operational regions
    println!("--- Example 1: Regions with branches ---");
    for region in db.operational_regions() {
        println!("- {} ({} branches)", region.name(), region.branch_count());
    }
    println!();

    // Example 2: one region's branch list
    println!("--- Example 2: Branches in Telangana ---");
    if let Some(region) = db.region("Telangana") {
        for branch in db.branches_for_region(region) {
            println!("- {}: {}", branch.name(), branch.address());
        }
    }
    println!();

    // Example 3: the selector state machine
    println!("--- Example 3: Selecting a branch ---");
    let host = CallbackHost::new()
        .on_region(|region| println!("  → region selected: {region}"))
        .on_branch(|region, branch, address| {
            println!("  → branch selected: {branch} in {region} ({address})")
        })
        .on_reset(|| println!("  → back to overview"));
    let mut selector = Selector::new(db, SelectorConfig::default(), host);

    selector.select_region("Kerala"); // no branches: declined, no callback
    selector.select_region("Rajasthan");
    selector.select_branch("Rajasthan", "Udaipur");
    println!("Selection: {:?}", selector.selection());

    selector.reset_to_overview();
    println!("After reset: {:?}", selector.selection());

    println!("\n=== Example completed successfully ===");
    Ok(())
}
