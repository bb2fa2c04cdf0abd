//! branchmap-rs
//!
//! Umbrella crate over [`branchmap_core`]. Most users want the prelude:
//!
//! ```no_run
//! use branchmap_rs::prelude::*;
//!
//! let mut selector = Selector::bundled()?;
//! selector.select_region("Rajasthan");
//! println!("{:?}", selector.selection());
//! # Ok::<(), SelectorError>(())
//! ```

pub use branchmap_core::*;

pub mod prelude {
    pub use branchmap_core::render::{Action, Element, Node, ViewTree};
    pub use branchmap_core::{
        BranchSearch, CallbackHost, Dataset, FileSource, GeometryRequest, GeometrySource,
        GeometryState, LoadOutcome, NameMatch, NonOperationalPolicy, Outcome, RecordingHost,
        Result, Selection, Selector, SelectorConfig, SelectorError, SelectorHost, StaticSource,
        View,
    };
}
