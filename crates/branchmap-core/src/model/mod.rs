// crates/branchmap-core/src/model/mod.rs
pub mod convert;
pub mod dataset;
pub mod raw;

pub use dataset::{Branch, Dataset, DatasetStats, Region};

#[cfg(not(feature = "compact"))]
pub const CACHE_SUFFIX: &str = "bin";
#[cfg(feature = "compact")]
pub const CACHE_SUFFIX: &str = "comp.bin";
