//! Camera-to-screen point mapping and selection
//!
//! Applies the active calibration transform to each raw detection, drops
//! points that land outside the screen rectangle, optionally mirrors the
//! x-coordinate, and keeps the strongest N per color. With no calibration
//! stored, a scale-fit of the actual frame size onto the screen is used
//! instead of raw passthrough, since camera and screen resolutions rarely
//! match.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::api::{FrameData, Point};
use crate::calib::CalibrationTransform;
use crate::config::EngineConfig;
use crate::detect::DetectionMap;

/// Shared holder of the active transform snapshot.
///
/// Exactly one writer (the pipeline, after a successful calibration) and
/// one reader (the mapper). Updates replace the inner `Arc` wholesale, so a
/// tick in progress always sees either the fully-old or fully-new
/// transform, never a half-written matrix.
pub type TransformCell = Arc<Mutex<Option<Arc<CalibrationTransform>>>>;

/// Create a transform cell holding an optional initial snapshot.
pub fn new_transform_cell(initial: Option<CalibrationTransform>) -> TransformCell {
    Arc::new(Mutex::new(initial.map(Arc::new)))
}

/// Publish a new snapshot into the cell, replacing any previous one.
pub fn publish_transform(cell: &TransformCell, transform: CalibrationTransform) {
    *cell.lock() = Some(Arc::new(transform));
}

/// Reflect an x-coordinate about the vertical screen midline.
pub fn mirror_x(x: f64, screen_w: u32) -> f64 {
    (screen_w as f64 - 1.0) - x
}

/// Per-tick point mapper/selector.
pub struct PointMapper {
    cell: TransformCell,
    screen_size: (u32, u32),
    mirror: bool,
    caps: HashMap<String, usize>,
    warned_uncalibrated: bool,
}

impl PointMapper {
    pub fn new(config: &EngineConfig, cell: TransformCell) -> Self {
        Self {
            cell,
            screen_size: config.screen_size,
            mirror: config.mirror,
            caps: config.max_points.clone(),
            warned_uncalibrated: false,
        }
    }

    /// Build this tick's [`FrameData`] from the raw detection map.
    ///
    /// `frame_size` is the dimensions of the frame the detections came
    /// from; it drives the scale-fit fallback when no calibration is
    /// active.
    pub fn map_and_select(
        &mut self,
        detections: &DetectionMap,
        frame_size: (u32, u32),
        timestamp: SystemTime,
    ) -> FrameData {
        let snapshot = self.cell.lock().clone();
        let transform = match snapshot {
            Some(t) => t,
            None => {
                if !self.warned_uncalibrated {
                    log::warn!(
                        "no calibration active, scale-fitting {}x{} camera onto {}x{} screen",
                        frame_size.0,
                        frame_size.1,
                        self.screen_size.0,
                        self.screen_size.1
                    );
                    self.warned_uncalibrated = true;
                }
                Arc::new(CalibrationTransform::scale_fit(frame_size, self.screen_size))
            }
        };

        let (w, h) = (self.screen_size.0 as f64, self.screen_size.1 as f64);
        let mut out = FrameData::new(timestamp);

        for (color, raw) in detections {
            let cap = self.caps.get(color).copied().unwrap_or(0);
            let mut mapped: Vec<Point> = Vec::new();

            if cap > 0 {
                // Evaluate a few extra candidates: some may be dropped by
                // the bounds check and would otherwise under-fill the cap.
                for det in raw.iter().take(cap * 3) {
                    let Some((x, y)) = transform.project(det.x, det.y) else {
                        continue;
                    };
                    if x < 0.0 || x >= w || y < 0.0 || y >= h {
                        continue;
                    }
                    let x = if self.mirror {
                        mirror_x(x, self.screen_size.0)
                    } else {
                        x
                    };
                    mapped.push(Point::new(x, y, det.intensity));
                }
                mapped.sort_by(|a, b| {
                    b.intensity
                        .partial_cmp(&a.intensity)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                mapped.truncate(cap);
            }

            out.points_by_color.insert(color.clone(), mapped);
        }

        out
    }
}
