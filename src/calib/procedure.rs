//! Interactive corner-calibration state machine
//!
//! Shows one corner target at a time; the presenter aims the laser at it
//! and holds still. A corner is captured after a configured number of
//! consecutive frames in which the strongest detection stays within a small
//! pixel tolerance of its previous position. The machine is stepped by the
//! outer frame loop, one tick per call, and never blocks: timeouts are
//! wall-clock polled and cancellation is the caller dropping the run.

use std::time::Instant;

use super::homography::{fit_homography_robust, CalibrationTransform, RansacOptions};
use crate::config::CalibrationSettings;
use crate::detect::DetectionMap;
use crate::render::{Canvas, Color};

/// Screen corners, in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Corner::TopLeft => "TL",
            Corner::TopRight => "TR",
            Corner::BottomRight => "BR",
            Corner::BottomLeft => "BL",
        }
    }

    /// Where the aim target is drawn, inset from the screen edge.
    pub fn target(&self, screen: (u32, u32), margin: u32) -> (f64, f64) {
        let (w, h) = (screen.0 as f64, screen.1 as f64);
        let m = margin as f64;
        match self {
            Corner::TopLeft => (m, m),
            Corner::TopRight => (w - m, m),
            Corner::BottomRight => (w - m, h - m),
            Corner::BottomLeft => (m, h - m),
        }
    }

    /// The canonical screen-space corner the fit maps onto.
    pub fn canonical(&self, screen: (u32, u32)) -> (f64, f64) {
        let (w, h) = (screen.0 as f64, screen.1 as f64);
        match self {
            Corner::TopLeft => (0.0, 0.0),
            Corner::TopRight => (w - 1.0, 0.0),
            Corner::BottomRight => (w - 1.0, h - 1.0),
            Corner::BottomLeft => (0.0, h - 1.0),
        }
    }
}

/// Why a calibration run ended without a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// User cancelled (abort key).
    Cancelled,
    /// No stable detection arrived in time for this corner.
    Timeout(Corner),
    /// The four captures were collinear or otherwise unusable.
    DegenerateFit,
}

/// Outcome of one state-machine step.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationStatus {
    InProgress,
    Complete(CalibrationTransform),
    Aborted(AbortReason),
}

/// One in-flight calibration attempt.
///
/// On any outcome other than `Complete` the previously active transform is
/// untouched; publishing the result is the caller's job.
pub struct CalibrationRun {
    settings: CalibrationSettings,
    screen_size: (u32, u32),
    corner_idx: usize,
    stable: u32,
    last: Option<(f64, f64)>,
    corner_started: Instant,
    captured: Vec<(f64, f64)>,
}

impl CalibrationRun {
    pub fn new(settings: CalibrationSettings, screen_size: (u32, u32)) -> Self {
        log::info!("calibration started, aiming color '{}'", settings.color);
        Self {
            settings,
            screen_size,
            corner_idx: 0,
            stable: 0,
            last: None,
            corner_started: Instant::now(),
            captured: Vec::with_capacity(4),
        }
    }

    /// Color the aim dot is detected as.
    pub fn color(&self) -> &str {
        &self.settings.color
    }

    pub fn current_corner(&self) -> Corner {
        Corner::ALL[self.corner_idx.min(3)]
    }

    /// Advance one tick with this tick's detections.
    pub fn step(&mut self, detections: &DetectionMap) -> CalibrationStatus {
        let corner = self.current_corner();

        if self.corner_started.elapsed().as_millis() as u64 >= self.settings.corner_timeout_ms {
            log::warn!("calibration timed out waiting for corner {}", corner.label());
            return CalibrationStatus::Aborted(AbortReason::Timeout(corner));
        }

        // Strongest detection of the calibration color; nothing seen this
        // tick leaves the stability streak as it was.
        let Some(det) = detections
            .get(self.settings.color.as_str())
            .and_then(|v| v.first())
        else {
            return CalibrationStatus::InProgress;
        };
        let pos = (det.x, det.y);

        self.stable = match self.last {
            None => 1,
            Some((lx, ly)) => {
                let dist = ((pos.0 - lx).powi(2) + (pos.1 - ly).powi(2)).sqrt();
                if dist <= self.settings.stable_px {
                    self.stable + 1
                } else {
                    1
                }
            }
        };
        self.last = Some(pos);

        if self.stable < self.settings.stable_frames {
            return CalibrationStatus::InProgress;
        }

        log::info!(
            "corner {} captured at camera ({:.1}, {:.1})",
            corner.label(),
            pos.0,
            pos.1
        );
        self.captured.push(pos);
        self.corner_idx += 1;
        self.stable = 0;
        self.last = None;
        self.corner_started = Instant::now();

        if self.captured.len() < 4 {
            return CalibrationStatus::InProgress;
        }
        self.fit()
    }

    fn fit(&self) -> CalibrationStatus {
        let dst: Vec<(f64, f64)> = Corner::ALL
            .iter()
            .map(|c| c.canonical(self.screen_size))
            .collect();
        let opts = RansacOptions {
            thresh: self.settings.fit_threshold,
            ..RansacOptions::default()
        };

        match fit_homography_robust(&self.captured, &dst, &opts) {
            Some(matrix) => {
                let corners = [
                    [self.captured[0].0, self.captured[0].1],
                    [self.captured[1].0, self.captured[1].1],
                    [self.captured[2].0, self.captured[2].1],
                    [self.captured[3].0, self.captured[3].1],
                ];
                log::info!("calibration fit succeeded");
                CalibrationStatus::Complete(CalibrationTransform::with_corners(matrix, corners))
            }
            None => {
                log::warn!("calibration fit failed on degenerate corner captures");
                CalibrationStatus::Aborted(AbortReason::DegenerateFit)
            }
        }
    }

    /// Record this tick's calibration screen: all four targets, with the
    /// active corner highlighted, and a one-line prompt.
    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.clear(Color::BLACK);
        let active = self.current_corner();
        canvas.text(
            (16.0, 16.0),
            28,
            Color::rgb(240, 240, 240),
            format!(
                "Calibrating {} ({}/4): hold laser steady, Esc cancels",
                active.label(),
                self.corner_idx + 1
            ),
        );
        for corner in Corner::ALL {
            let color = if corner == active {
                Color::RED
            } else {
                Color::rgb(90, 0, 0)
            };
            canvas.circle(
                corner.target(self.screen_size, self.settings.margin),
                10.0,
                color,
                true,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Detection;

    fn fast_settings() -> CalibrationSettings {
        CalibrationSettings {
            stable_frames: 3,
            stable_px: 4.0,
            corner_timeout_ms: 60_000,
            ..CalibrationSettings::default()
        }
    }

    fn red_at(x: f64, y: f64) -> DetectionMap {
        let mut m = DetectionMap::new();
        m.insert(
            "red".to_string(),
            vec![Detection {
                x,
                y,
                intensity: 150.0,
            }],
        );
        m
    }

    #[test]
    fn stable_detections_capture_a_corner() {
        let mut run = CalibrationRun::new(fast_settings(), (1280, 720));
        assert_eq!(run.current_corner(), Corner::TopLeft);
        for _ in 0..2 {
            assert_eq!(run.step(&red_at(10.0, 10.0)), CalibrationStatus::InProgress);
        }
        // Third stable frame captures and advances.
        assert_eq!(run.step(&red_at(10.0, 10.0)), CalibrationStatus::InProgress);
        assert_eq!(run.current_corner(), Corner::TopRight);
    }

    #[test]
    fn jitter_resets_the_stability_streak() {
        let mut run = CalibrationRun::new(fast_settings(), (1280, 720));
        run.step(&red_at(10.0, 10.0));
        run.step(&red_at(10.0, 10.0));
        // Big jump: streak restarts, so two more stable frames are not enough.
        run.step(&red_at(100.0, 100.0));
        run.step(&red_at(100.0, 100.0));
        assert_eq!(run.current_corner(), Corner::TopLeft);
        // One more stable frame completes the restarted streak.
        run.step(&red_at(100.0, 100.0));
        assert_eq!(run.current_corner(), Corner::TopRight);
    }

    #[test]
    fn missing_detection_keeps_waiting() {
        let mut run = CalibrationRun::new(fast_settings(), (1280, 720));
        let empty = DetectionMap::new();
        for _ in 0..10 {
            assert_eq!(run.step(&empty), CalibrationStatus::InProgress);
        }
        assert_eq!(run.current_corner(), Corner::TopLeft);
    }

    #[test]
    fn corner_timeout_aborts_the_whole_run() {
        let settings = CalibrationSettings {
            corner_timeout_ms: 0,
            ..fast_settings()
        };
        let mut run = CalibrationRun::new(settings, (1280, 720));
        assert_eq!(
            run.step(&red_at(10.0, 10.0)),
            CalibrationStatus::Aborted(AbortReason::Timeout(Corner::TopLeft))
        );
    }

    #[test]
    fn four_corners_produce_a_transform() {
        let mut run = CalibrationRun::new(fast_settings(), (1280, 720));
        let corners = [
            (10.0, 10.0),
            (1270.0, 10.0),
            (1270.0, 710.0),
            (10.0, 710.0),
        ];
        let mut last = CalibrationStatus::InProgress;
        for &(x, y) in &corners {
            for _ in 0..3 {
                last = run.step(&red_at(x, y));
            }
        }
        let CalibrationStatus::Complete(t) = last else {
            panic!("expected completion, got {:?}", last);
        };
        assert_eq!(t.corners_cam, Some([[10.0, 10.0], [1270.0, 10.0], [1270.0, 710.0], [10.0, 710.0]]));
        let (x, y) = t.project(10.0, 10.0).unwrap();
        assert!(x.abs() < 1.0 && y.abs() < 1.0);
    }

    #[test]
    fn collinear_captures_abort_with_degenerate_fit() {
        let mut run = CalibrationRun::new(fast_settings(), (1280, 720));
        let collinear = [
            (100.0, 100.0),
            (200.0, 200.0),
            (300.0, 300.0),
            (400.0, 400.0),
        ];
        let mut last = CalibrationStatus::InProgress;
        for &(x, y) in &collinear {
            for _ in 0..3 {
                last = run.step(&red_at(x, y));
            }
        }
        assert_eq!(last, CalibrationStatus::Aborted(AbortReason::DegenerateFit));
    }

    #[test]
    fn draw_highlights_the_active_corner() {
        let run = CalibrationRun::new(fast_settings(), (1280, 720));
        let mut canvas = Canvas::new();
        run.draw(&mut canvas);
        // Clear, prompt text, and four corner targets.
        assert_eq!(canvas.commands().len(), 6);
    }
}
