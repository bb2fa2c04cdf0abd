// crates/branchmap-core/src/loader/mod.rs

//! # Data Loader
//!
//! Handles the Physical Layer (I/O, Decompression) and delegates to the
//! JSON converter or the compiled-bundle reader.

use crate::error::{Result, SelectorError};
use crate::model::Dataset;
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing::{debug, info};

pub mod builder;
pub mod common_io;
pub mod source;

pub use builder::CompressionMode;
pub use source::{FileSource, GeometrySource, StaticSource};

#[cfg(feature = "fetch")]
pub use source::HttpSource;

// Single in-process cache so the bundled dataset is parsed once per process.
static DATASET_CACHE: OnceCell<Dataset> = OnceCell::new();

/// The dataset shipped with the crate (Indian states and the branch network).
static BUNDLED_JSON: &str = include_str!("../../data/branches.json");

impl Dataset {
    /// Load the bundled dataset. Parsed once, cloned on each call.
    pub fn load() -> Result<Self> {
        Self::bundled().cloned()
    }

    /// Borrow the bundled dataset from the process-wide cache.
    pub fn bundled() -> Result<&'static Dataset> {
        DATASET_CACHE.get_or_try_init(|| {
            let db = Dataset::from_json_str(BUNDLED_JSON)?;
            debug!(regions = db.regions.len(), "parsed bundled dataset");
            Ok(db)
        })
    }

    /// **Standard Loader:** picks the reader by file name.
    ///
    /// - `*.bin` files are compiled bundles (see [`builder`]).
    /// - anything else is parsed as JSON, gzip-compressed or not.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_bundle = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"));

        let db = if is_bundle {
            Self::load_binary_file(path)?
        } else {
            Self::load_json_file(path)?
        };

        let stats = db.stats();
        info!(
            path = %path.display(),
            regions = stats.regions,
            operational = stats.operational_regions,
            branches = stats.branches,
            "dataset loaded"
        );
        Ok(db)
    }

    /// Parse a JSON (or `.json.gz`) dataset file.
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = common_io::open_stream(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_reader(reader).map_err(|e| {
            SelectorError::InvalidData(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_json_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dataset_is_consistent() {
        let db = Dataset::bundled().unwrap();
        let stats = db.stats();
        assert_eq!(stats.regions, 36);
        assert_eq!(stats.operational_regions, 6);
        assert!(db.region("Rajasthan").unwrap().is_operational());
        assert!(!db.region("Kerala").unwrap().is_operational());
        assert_eq!(
            db.region("Jammu and Kashmir").unwrap().boundary_key(),
            "jammukashmir"
        );
        assert!(db.branches.iter().all(|b| !b.address.is_empty()));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Dataset::load_from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SelectorError::NotFound(_)));
    }
}
