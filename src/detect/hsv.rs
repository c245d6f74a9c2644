//! HSV color space and per-color threshold bands
//!
//! Hue is on the half-degree scale (0..180), saturation and value on
//! 0..255, so published threshold numbers for cheap laser pointers carry
//! over unchanged. Red wraps around the hue wheel and therefore needs two
//! bands ORed together.

use std::collections::HashMap;

use serde::Deserialize;

/// One inclusive HSV threshold band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HsvRange {
    pub lo: (u8, u8, u8),
    pub hi: (u8, u8, u8),
}

impl HsvRange {
    pub const fn new(lo: (u8, u8, u8), hi: (u8, u8, u8)) -> Self {
        Self { lo, hi }
    }

    /// Inclusive containment on all three channels.
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        h >= self.lo.0
            && h <= self.hi.0
            && s >= self.lo.1
            && s <= self.hi.1
            && v >= self.lo.2
            && v <= self.hi.2
    }
}

/// Built-in threshold bands, tuned for common laser pointer colors.
pub fn default_bands() -> HashMap<String, Vec<HsvRange>> {
    let mut bands = HashMap::new();
    // Red wraps at hue 0/180: low band plus high band.
    bands.insert(
        "red".to_string(),
        vec![
            HsvRange::new((0, 120, 180), (8, 255, 255)),
            HsvRange::new((170, 120, 180), (180, 255, 255)),
        ],
    );
    bands.insert(
        "green".to_string(),
        vec![HsvRange::new((35, 80, 120), (85, 255, 255))],
    );
    bands.insert(
        "blue".to_string(),
        vec![HsvRange::new((95, 80, 120), (130, 255, 255))],
    );
    bands
}

/// Convert one RGB pixel to half-degree HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let rf = r as f32;
    let gf = g as f32;
    let bf = b as f32;
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = v - min;

    let s = if v > 0.0 { 255.0 * delta / v } else { 0.0 };

    let h_deg = if delta <= 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / delta
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let mut h = h_deg / 2.0;
    if h < 0.0 {
        h += 180.0;
    }

    (h.round() as u8, s.round() as u8, v.round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colors_land_on_expected_hues() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), (120, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 0), (0, 0, 0));
        assert_eq!(rgb_to_hsv(255, 255, 255), (0, 0, 255));
    }

    #[test]
    fn red_wraps_into_the_high_band() {
        // A red with a hint of blue sits just below hue 180.
        let (h, s, v) = rgb_to_hsv(255, 0, 30);
        assert!(h >= 170, "hue {} should wrap high", h);
        let bands = default_bands();
        let red = &bands["red"];
        assert!(red.iter().any(|band| band.contains(h, s, v)));
    }

    #[test]
    fn range_containment_is_inclusive() {
        let band = HsvRange::new((35, 80, 120), (85, 255, 255));
        assert!(band.contains(35, 80, 120));
        assert!(band.contains(85, 255, 255));
        assert!(!band.contains(86, 255, 255));
        assert!(!band.contains(35, 79, 120));
    }
}
