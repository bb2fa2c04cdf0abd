// crates/branchmap-core/src/geometry/mod.rs

//! Boundary geometry: TopoJSON decoding, Mercator fitting and the drawable
//! [`MapLayer`] the renderer consumes.

pub mod projection;
pub mod topology;

pub use projection::Projection;
pub use topology::{Feature, Topology, DISTRICT_NAME_KEYS, REGION_NAME_KEYS, UNKNOWN_NAME};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Which boundary dataset to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum GeometryRequest {
    /// Country-level topology, e.g. `india.json`.
    Country(String),
    /// Per-region topology, e.g. `states/rajasthan.json`.
    Region(String),
}

impl GeometryRequest {
    /// Path relative to the geometry base directory / URL.
    pub fn relative_path(&self) -> String {
        match self {
            GeometryRequest::Country(key) => format!("{key}.json"),
            GeometryRequest::Region(key) => format!("states/{key}.json"),
        }
    }

    /// Full path under `base` (no double slashes).
    pub fn path_under(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        if base.is_empty() {
            self.relative_path()
        } else {
            format!("{base}/{}", self.relative_path())
        }
    }
}

/// One drawable region outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    pub name: String,
    /// SVG path data in viewport coordinates.
    pub path: String,
    /// Label anchor in viewport coordinates.
    pub centroid: Option<[f64; 2]>,
}

/// Projected outlines ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<RegionShape>,
}

impl MapLayer {
    /// Fit `features` into the viewport and project them.
    pub fn from_features(features: &[Feature], width: f64, height: f64) -> Self {
        let projection = Projection::fit_size(width, height, features);
        let shapes = features
            .iter()
            .map(|f| RegionShape {
                name: f.name.clone(),
                path: projection.path_data(&f.geometry),
                centroid: projection.centroid(&f.geometry),
            })
            .collect();
        Self {
            width,
            height,
            shapes,
        }
    }

    /// Decode a topology document and build its layer in one step.
    pub fn from_topology_bytes(
        bytes: &[u8],
        object: Option<&str>,
        name_keys: &[&str],
        width: f64,
        height: f64,
    ) -> Result<Self> {
        let topo = Topology::from_slice(bytes)?;
        let features = topo.features(object, name_keys)?;
        Ok(Self::from_features(&features, width, height))
    }

    pub fn shape(&self, name: &str) -> Option<&RegionShape> {
        self.shapes.iter().find(|s| s.name == name)
    }
}
