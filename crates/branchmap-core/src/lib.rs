// crates/branchmap-core/src/lib.rs

pub mod config;
pub mod error;
pub mod geometry;
pub mod loader; // Dataset files, bundles and geometry sources
pub mod model;
pub mod render;
pub mod search; // BranchSearch impl for Dataset
pub mod selector;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::config::{LabelOffset, NonOperationalPolicy, SelectorConfig};
pub use crate::error::{Result, SelectorError};
pub use crate::geometry::{GeometryRequest, MapLayer, RegionShape};
pub use crate::loader::{FileSource, GeometrySource, StaticSource};
#[cfg(feature = "fetch")]
pub use crate::loader::HttpSource;
pub use crate::model::{Branch, Dataset, DatasetStats, Region};
pub use crate::render::{Action, Element, Node, ViewTree};
pub use crate::selector::{
    CallbackHost, Decline, FetchTicket, GeometryState, HostEvent, LoadOutcome, NoopHost, Outcome,
    RecordingHost, Selection, SelectionState, Selector, SelectorHost, View,
};
pub use crate::text::{equals_folded, fold_key};
pub use crate::traits::{BranchSearch, NameMatch};
