//! Engine configuration
//!
//! One immutable [`EngineConfig`] is constructed at process start (directly
//! or from a TOML file) and shared read-only with every component for the
//! lifetime of the run.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// Per-run engine configuration. Immutable after startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logical screen (projected window) size in pixels.
    pub screen_size: (u32, u32),
    /// Color identifiers to track, e.g. "red", "green", "blue".
    pub colors: Vec<String>,
    /// Maximum points emitted per color per tick. Colors absent from this
    /// map are fully suppressed (cap 0).
    pub max_points: HashMap<String, usize>,
    /// Capture device index.
    pub cam_index: u32,
    /// Resolution requested from the camera. Advisory: the device may
    /// silently deliver something else, and all geometry follows the frame
    /// actually returned.
    pub cam_size: (u32, u32),
    /// Frame rate requested from the camera.
    pub cam_fps: u32,
    /// Target tick rate of the frame pipeline.
    pub tick_rate: u32,
    /// Name of the persisted calibration profile.
    pub profile: String,
    /// Overlay detection markers on the presented image.
    pub show_preview: bool,
    /// Mirror presentation (and point x-coordinates) about the vertical
    /// midline, for rear-projection setups.
    pub mirror: bool,
    /// Enable the mouse-driven debug point injector.
    pub debug: bool,
    /// Minimum blob area in pixels for a detection to count.
    pub min_blob_area: u32,
    /// Interactive calibration settings.
    pub calibration: CalibrationSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut max_points = HashMap::new();
        max_points.insert("red".to_string(), 2);
        Self {
            screen_size: (1280, 720),
            colors: vec!["red".to_string()],
            max_points,
            cam_index: 0,
            cam_size: (1280, 720),
            cam_fps: 60,
            tick_rate: 60,
            profile: "default".to_string(),
            show_preview: false,
            mirror: false,
            debug: false,
            min_blob_area: 8,
            calibration: CalibrationSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Cap for a color; unconfigured colors are suppressed entirely.
    pub fn cap_for(&self, color: &str) -> usize {
        self.max_points.get(color).copied().unwrap_or(0)
    }
}

/// Settings for the interactive corner-calibration procedure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Color identifier the calibration dot is detected as.
    pub color: String,
    /// Consecutive frames a detection must hold still before a corner is
    /// captured.
    pub stable_frames: u32,
    /// Maximum camera-pixel drift between consecutive frames still counted
    /// as "holding still".
    pub stable_px: f64,
    /// Per-corner timeout in milliseconds; expiry aborts the whole run.
    pub corner_timeout_ms: u64,
    /// Inset of the on-screen corner targets from the screen edges.
    pub margin: u32,
    /// RANSAC inlier threshold for the homography fit, in screen pixels.
    pub fit_threshold: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            stable_frames: 6,
            stable_px: 4.0,
            corner_timeout_ms: 6000,
            margin: 20,
            fit_threshold: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_track_red() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.colors, vec!["red"]);
        assert_eq!(cfg.cap_for("red"), 2);
        assert_eq!(cfg.cap_for("green"), 0);
    }

    #[test]
    fn parses_toml() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            screen_size = [1920, 1080]
            colors = ["red", "green"]
            mirror = true
            profile = "stage-left"

            [max_points]
            red = 1
            green = 3

            [calibration]
            stable_frames = 10
            "#,
        )
        .unwrap();

        assert_eq!(cfg.screen_size, (1920, 1080));
        assert!(cfg.mirror);
        assert_eq!(cfg.profile, "stage-left");
        assert_eq!(cfg.cap_for("green"), 3);
        assert_eq!(cfg.calibration.stable_frames, 10);
        // untouched fields keep their defaults
        assert_eq!(cfg.calibration.stable_px, 4.0);
        assert_eq!(cfg.min_blob_area, 8);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(EngineConfig::from_toml_str("screen_size = \"wide\"").is_err());
    }
}
