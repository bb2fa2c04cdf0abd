//! Branch filtering example for branchmap-rs
//!
//! Shows the search box behaviour of the region detail view: folded
//! substring matching, the count line, the empty state and cross-region
//! search.

use branchmap_rs::prelude::*;

fn main() -> Result<()> {
    println!("=== branchmap-rs Branch Filtering Example ===\n");

    let mut selector = Selector::bundled()?;
    selector.select_region("Madhya Pradesh");

    for text in ["", "KH", "  pur ", "shamgarh", "xyz"] {
        selector.filter_branches(text);
        if let Some(listing) = selector.visible_branches() {
            println!("filter {text:?}: {}", listing.summary());
            for name in listing.visible_names() {
                println!("   {name}");
            }
        }
    }
    println!();

    // The rendered tree shows the same state.
    selector.filter_branches("");
    let tree = selector.render();
    println!(
        "Rendered {} branch cards, count line: {}",
        tree.find_by_class("branch-card").len(),
        tree.find_by_class("branch-count")
            .first()
            .map(|e| e.text_content())
            .unwrap_or_default()
    );
    println!();

    // Search every region at once.
    println!("--- Branches matching \"nagar\" anywhere ---");
    for (branch, region) in selector.dataset().find_branches("nagar") {
        println!("- {} ({})", branch.name(), region.name());
    }

    println!("\n=== Example completed successfully ===");
    Ok(())
}
