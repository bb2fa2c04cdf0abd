// crates/branchmap-core/src/config.rs
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_WIDTH: f64 = 600.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const DEFAULT_COUNTRY_KEY: &str = "india";
pub const DEFAULT_TOPOLOGY_OBJECT: &str = "India-States";
pub const DEFAULT_GEOMETRY_BASE: &str = "/js/topojsons";

/// What happens when the user picks a region without branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonOperationalPolicy {
    /// Decline and show an inline "no branches available" hint.
    #[default]
    Notice,
    /// Decline without any visible feedback.
    Silent,
}

/// Pixel nudge applied to a region label after centroid placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelOffset {
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
}

/// Presentation and geometry settings for one selector instance.
///
/// Host callbacks are not part of this struct; they are passed to the
/// selector separately (see [`crate::selector::SelectorHost`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub width: f64,
    pub height: f64,
    /// Country-level topology file stem (`india` -> `india.json`).
    pub country_key: String,
    /// Object inside the country topology that holds the regions.
    pub topology_object: String,
    /// Directory or URL prefix the topology files live under.
    pub geometry_base: String,
    pub non_operational: NonOperationalPolicy,
    pub label_offsets: HashMap<String, LabelOffset>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        let label_offsets = [
            ("Maharashtra", 20.0),
            ("Tamil Nadu", 10.0),
            ("Karnataka", 15.0),
        ]
        .into_iter()
        .map(|(name, dy)| (name.to_owned(), LabelOffset { dx: 0.0, dy }))
        .collect();

        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            country_key: DEFAULT_COUNTRY_KEY.to_owned(),
            topology_object: DEFAULT_TOPOLOGY_OBJECT.to_owned(),
            geometry_base: DEFAULT_GEOMETRY_BASE.to_owned(),
            non_operational: NonOperationalPolicy::default(),
            label_offsets,
        }
    }
}

impl SelectorConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: SelectorConfig = serde_json::from_str(s)?;
        Ok(cfg.sanitized())
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self.sanitized()
    }

    pub fn with_policy(mut self, policy: NonOperationalPolicy) -> Self {
        self.non_operational = policy;
        self
    }

    pub fn with_geometry_base(mut self, base: impl Into<String>) -> Self {
        self.geometry_base = base.into();
        self
    }

    pub fn with_label_offset(mut self, region: impl Into<String>, dx: f64, dy: f64) -> Self {
        self.label_offsets.insert(region.into(), LabelOffset { dx, dy });
        self
    }

    /// Offset for `region`, zero when none is configured.
    pub fn label_offset(&self, region: &str) -> LabelOffset {
        self.label_offsets.get(region).copied().unwrap_or_default()
    }

    /// Non-positive or non-finite sizes fall back to the defaults.
    fn sanitized(mut self) -> Self {
        if !(self.width.is_finite() && self.width > 0.0) {
            self.width = DEFAULT_WIDTH;
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            self.height = DEFAULT_HEIGHT;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SelectorConfig::from_json_str(
            r#"{ "width": 800, "non_operational": "silent", "label_offsets": { "Goa": { "dy": 4 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.width, 800.0);
        assert_eq!(cfg.height, DEFAULT_HEIGHT);
        assert_eq!(cfg.non_operational, NonOperationalPolicy::Silent);
        assert_eq!(cfg.label_offset("Goa"), LabelOffset { dx: 0.0, dy: 4.0 });
        assert_eq!(cfg.label_offset("Kerala"), LabelOffset::default());
    }

    #[test]
    fn bad_sizes_fall_back() {
        let cfg = SelectorConfig::default().with_size(-1.0, f64::NAN);
        assert_eq!((cfg.width, cfg.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    }
}
