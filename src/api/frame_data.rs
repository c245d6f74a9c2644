//! Per-tick input record handed to game modules

use std::collections::HashMap;
use std::time::SystemTime;

/// A screen-space touch point, already transformed and bounds-filtered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Ranking proxy; currently blob pixel area. Larger means stronger.
    pub intensity: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, intensity: f64) -> Self {
        Self { x, y, intensity }
    }
}

/// All selected points for one tick, grouped by color identifier.
///
/// Each sequence is sorted descending by intensity and capped at the
/// configured per-color maximum. Produced fresh every tick; consumed by the
/// game module and discarded.
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Capture timestamp of the tick this record belongs to.
    pub timestamp: SystemTime,
    pub points_by_color: HashMap<String, Vec<Point>>,
}

impl FrameData {
    pub fn new(timestamp: SystemTime) -> Self {
        Self {
            timestamp,
            points_by_color: HashMap::new(),
        }
    }

    /// Points for a color, empty if the color produced nothing this tick.
    pub fn points(&self, color: &str) -> &[Point] {
        self.points_by_color
            .get(color)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Strongest point for a color, if any.
    pub fn strongest(&self, color: &str) -> Option<&Point> {
        self.points(color).first()
    }
}
