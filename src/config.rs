/// Runtime configuration, loaded from an optional TOML file.
///
/// The core never reads global state; a `Config` value is passed explicitly
/// into the scene builder, the drawer and the interaction handlers.
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fraction of the canvas height at which the point/period divider sits.
    pub divider_fraction: f64,
    /// Events narrower than this many pixels draw as point events.
    pub point_event_threshold: f64,
    /// Pixel tolerance within which a dragged edge locks to a strip boundary.
    pub snap_distance: f64,
    /// Dragging within this many pixels of the canvas edge auto-scrolls.
    pub autoscroll_margin: f64,
    /// Milliseconds between auto-scroll steps while dragging at an edge.
    pub autoscroll_interval_ms: u64,
    /// Milliseconds of hover before an event balloon appears.
    pub balloon_show_delay_ms: u64,
    /// Milliseconds after leaving an event before its balloon hides.
    pub balloon_hide_delay_ms: u64,
    /// Height of an event box in pixels.
    pub event_height: f64,
    /// Expand container boxes vertically to enclose their sub-events.
    pub extended_container_height: bool,
    /// Display years at or below zero as "N BC" in axis labels.
    pub use_bc_notation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            divider_fraction: 0.5,
            point_event_threshold: 20.0,
            snap_distance: 10.0,
            autoscroll_margin: 20.0,
            autoscroll_interval_ms: 300,
            balloon_show_delay_ms: 500,
            balloon_hide_delay_ms: 100,
            event_height: 1.0,
            extended_container_height: true,
            use_bc_notation: true,
        }
    }
}

impl Config {
    /// Load from a TOML file; unknown keys are ignored, missing keys default.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("cannot parse config file {}", path.display()))
    }
}
