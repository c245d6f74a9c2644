//! Per-color blob detection
//!
//! Turns one camera frame into a ranked list of laser-dot candidates per
//! tracked color: HSV thresholding (bands ORed per color), blur plus
//! morphological opening to kill isolated noise pixels, connected-component
//! extraction, then a centroid via zeroth/first image moments. Blob pixel
//! area stands in for intensity and drives the "largest first" ordering the
//! rest of the pipeline relies on.

pub mod hsv;

pub use hsv::{default_bands, rgb_to_hsv, HsvRange};

use std::cmp::Ordering;
use std::collections::HashMap;

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::open;
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::camera::Frame;

/// One blob candidate in camera pixel coordinates.
///
/// Recomputed every tick, never persisted. `intensity` is the blob's pixel
/// area and is used only for ranking, never for geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
}

/// Per-color ranked detections for one tick, in camera space.
pub type DetectionMap = HashMap<String, Vec<Detection>>;

/// Segments laser dots of a configured color set out of camera frames.
pub struct BlobDetector {
    colors: Vec<String>,
    bands: HashMap<String, Vec<HsvRange>>,
    min_area: u32,
}

impl BlobDetector {
    /// Detector for `colors` using the built-in threshold bands.
    pub fn new(colors: &[String], min_area: u32) -> Self {
        Self {
            colors: colors.to_vec(),
            bands: default_bands(),
            min_area,
        }
    }

    /// Override the threshold bands for one color.
    pub fn with_bands(mut self, color: impl Into<String>, bands: Vec<HsvRange>) -> Self {
        self.bands.insert(color.into(), bands);
        self
    }

    /// Run detection over one frame for every configured color.
    ///
    /// Colors with no blob this tick map to an empty vector; that is the
    /// expected majority state during play, not a failure.
    pub fn detect(&self, frame: &Frame) -> DetectionMap {
        let hsv = hsv_planes(frame);
        let mut out = DetectionMap::new();

        for color in &self.colors {
            let detections = match self.bands.get(color) {
                Some(bands) if !bands.is_empty() => {
                    let mask = build_mask(&hsv, frame.width(), frame.height(), bands);
                    let mask = clean_mask(&mask);
                    extract_blobs(&mask, self.min_area)
                }
                _ => {
                    log::debug!("no threshold bands configured for color '{}'", color);
                    Vec::new()
                }
            };
            out.insert(color.clone(), detections);
        }

        out
    }
}

/// Whole-frame HSV conversion, done once per tick and shared by all colors.
fn hsv_planes(frame: &Frame) -> Vec<(u8, u8, u8)> {
    frame
        .image
        .pixels()
        .map(|p| rgb_to_hsv(p.0[0], p.0[1], p.0[2]))
        .collect()
}

/// Threshold each band and OR the results into one binary mask.
fn build_mask(hsv: &[(u8, u8, u8)], width: u32, height: u32, bands: &[HsvRange]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let (h, s, v) = hsv[(y * width + x) as usize];
        if bands.iter().any(|band| band.contains(h, s, v)) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Smoothing blur followed by a 3x3 morphological opening.
fn clean_mask(mask: &GrayImage) -> GrayImage {
    let blurred = gaussian_blur_f32(mask, 1.0);
    let mut binary = GrayImage::from_fn(blurred.width(), blurred.height(), |x, y| {
        if blurred.get_pixel(x, y).0[0] >= 128 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    binary = open(&binary, Norm::LInf, 1);
    binary
}

/// Connected components, area filter, and moment centroids.
fn extract_blobs(mask: &GrayImage, min_area: u32) -> Vec<Detection> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    // Zeroth and first moments per label: (m00, m10, m01).
    let mut moments: HashMap<u32, (u64, u64, u64)> = HashMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let id = label.0[0];
        if id == 0 {
            continue;
        }
        let entry = moments.entry(id).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 += x as u64;
        entry.2 += y as u64;
    }

    let mut detections: Vec<Detection> = moments
        .into_values()
        .filter(|&(m00, _, _)| m00 >= min_area as u64 && m00 > 0)
        .map(|(m00, m10, m01)| Detection {
            x: m10 as f64 / m00 as f64,
            y: m01 as f64 / m00 as f64,
            intensity: m00 as f64,
        })
        .collect();

    // Largest first; downstream truncation depends on this ordering.
    detections.sort_by(|a, b| {
        b.intensity
            .partial_cmp(&a.intensity)
            .unwrap_or(Ordering::Equal)
    });
    detections
}
