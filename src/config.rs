//! Configuration for the measurement system.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::measure::{MarkerStyle, SegmentStyle};
use crate::session::ReferenceSpaceKind;
use crate::tracking::HitSelection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Space the hit-test source is scoped to.
    pub hit_test_space: ReferenceSpaceKind,
    /// How one hit is chosen out of a cycle's results.
    pub hit_selection: HitSelection,
    pub marker: MarkerStyle,
    pub segment: SegmentStyle,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            hit_test_space: ReferenceSpaceKind::Viewer,
            hit_selection: HitSelection::First,
            marker: MarkerStyle::default(),
            segment: SegmentStyle::default(),
        }
    }
}

impl MeasureConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
