//! Error handling example for branchmap-rs
//!
//! Demonstrates:
//! - integrity errors when loading a bad dataset
//! - a failed map load, the retry affordance and recovery
//! - declined selections that never reach the host

use branchmap_rs::prelude::*;

const TOPOLOGY: &[u8] = include_bytes!("../crates/branchmap-core/tests/fixtures/india.json");

fn main() {
    println!("=== branchmap-rs Error Handling Example ===\n");

    // 1. Dataset integrity
    println!("--- Integrity errors ---");
    for json in [
        r#"{ "Rajasthan": { "Ajmer": null } }"#,
        r#"{ "regions": [], "branches": [ { "region": "Atlantis", "name": "X", "address": "Y" } ] }"#,
        r#"[ "not", "an", "object" ]"#,
    ] {
        match Dataset::from_json_str(json) {
            Ok(_) => println!("✓ loaded"),
            Err(e) => println!("✗ {e}"),
        }
    }
    println!();

    // 2. Geometry load failure and retry
    println!("--- Map load failure ---");
    let db = match Dataset::load() {
        Ok(db) => db,
        Err(e) => {
            eprintln!("bundled dataset unavailable: {e}");
            return;
        }
    };
    let mut selector = Selector::new(db, SelectorConfig::default(), RecordingHost::default());

    let offline = StaticSource::new();
    match selector.initialize(&offline) {
        Ok(()) => println!("✓ map loaded"),
        Err(e) => println!("✗ {e} (retryable: {})", e.is_retryable()),
    }
    let tree = selector.render();
    println!("Retry buttons rendered: {}", tree.find_by_class("retry").len());

    let online = StaticSource::new().with(selector.geometry_request(), TOPOLOGY);
    match selector.retry(&online) {
        LoadOutcome::Applied => println!("✓ map loaded on retry"),
        other => println!("✗ retry: {other:?}"),
    }
    println!();

    // 3. Declined selections
    println!("--- Declined selections ---");
    for region in ["Goa", "Atlantis"] {
        if let Outcome::Declined(reason) = selector.select_region(region) {
            println!("✗ {region}: {reason}");
        }
    }
    if let Outcome::Declined(reason) = selector.select_branch("Rajasthan", "Jaipur") {
        println!("✗ branch before region: {reason}");
    }
    println!("Host callbacks fired: {}", selector.host().events.len());

    println!("\n=== Example completed ===");
}
