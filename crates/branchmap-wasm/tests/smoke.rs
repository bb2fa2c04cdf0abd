use wasm_bindgen_test::*;

use branchmap_wasm::{get_operational_region_count, get_region_count, region_tooltip};

#[wasm_bindgen_test]
fn bundled_dataset_is_available() {
    #[cfg(target_arch = "wasm32")]
    branchmap_wasm::start();

    assert_eq!(get_region_count().unwrap(), 36);
    assert_eq!(get_operational_region_count().unwrap(), 6);
}

#[wasm_bindgen_test]
fn tooltips_follow_branch_counts() {
    assert_eq!(
        region_tooltip("Telangana").as_deref(),
        Some("7 branches available\nClick to view branches")
    );
    assert_eq!(region_tooltip("Goa").as_deref(), Some("No branches available"));
    assert_eq!(region_tooltip("Atlantis"), None);
}
