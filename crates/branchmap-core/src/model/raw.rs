// crates/branchmap-core/src/model/raw.rs
use serde::Deserialize;

/// Raw branch entry as it comes from JSON.
///
/// `address` stays optional here so the converter can report a missing
/// address as an integrity error instead of a generic parse failure.
#[derive(Debug, Deserialize)]
pub struct BranchRaw {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Raw branch entry of the flat `branches` list, which names its region.
#[derive(Debug, Deserialize)]
pub struct FlatBranchRaw {
    pub region: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Raw region structure from JSON.
#[derive(Debug, Deserialize)]
pub struct RegionRaw {
    pub name: String,
    #[serde(default)]
    pub boundary_key: Option<String>,
    #[serde(default)]
    pub branches: Vec<BranchRaw>,
}

/// The full document form:
/// `{ "country": "...", "regions": [...], "branches": [...] }`.
#[derive(Debug, Deserialize)]
pub struct DocumentRaw {
    #[serde(default)]
    pub country: Option<String>,
    pub regions: Vec<RegionRaw>,
    #[serde(default)]
    pub branches: Vec<FlatBranchRaw>,
}
