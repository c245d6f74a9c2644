//! Homography estimation
//!
//! Normalized Direct Linear Transform (DLT) with Hartley point
//! normalization, wrapped in a small RANSAC loop so hand-aimed laser
//! positions with an occasional bad capture still produce a usable fit.
//! The resulting `H` maps camera pixel coordinates to screen pixels:
//! `x_screen ~ H x_cam`.

use nalgebra::{DMatrix, Matrix3};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// 3x3 projective matrix.
pub type Mat3 = Matrix3<f64>;

/// Camera-to-screen projective transform, optionally carrying the four
/// camera-space corner points it was derived from.
///
/// Treated as an immutable snapshot: recalibration publishes a whole new
/// value, entries are never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTransform {
    pub matrix: Mat3,
    pub corners_cam: Option<[[f64; 2]; 4]>,
}

impl CalibrationTransform {
    pub fn new(matrix: Mat3) -> Self {
        Self {
            matrix,
            corners_cam: None,
        }
    }

    pub fn with_corners(matrix: Mat3, corners_cam: [[f64; 2]; 4]) -> Self {
        Self {
            matrix,
            corners_cam: Some(corners_cam),
        }
    }

    /// Axis-aligned scale from a camera frame onto the screen rectangle.
    /// Default mapping used while no calibration has been run.
    pub fn scale_fit(frame_size: (u32, u32), screen_size: (u32, u32)) -> Self {
        let sx = screen_size.0 as f64 / frame_size.0.max(1) as f64;
        let sy = screen_size.1 as f64 / frame_size.1.max(1) as f64;
        Self::new(Mat3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0))
    }

    /// Apply the projective transform to one point. `None` when the point
    /// maps to infinity (homogeneous w collapses).
    pub fn project(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let v = self.matrix * nalgebra::Vector3::new(x, y, 1.0);
        if v.z.abs() <= f64::EPSILON {
            return None;
        }
        Some((v.x / v.z, v.y / v.z))
    }

    /// Inverse transform (screen -> camera), if the matrix is invertible.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::new)
    }
}

/// Tuning knobs for the robust fit.
#[derive(Debug, Clone)]
pub struct RansacOptions {
    pub max_iters: usize,
    /// Inlier reprojection threshold in screen pixels.
    pub thresh: f64,
    pub min_inliers: usize,
    pub seed: u64,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            max_iters: 200,
            thresh: 3.0,
            min_inliers: 4,
            seed: 7,
        }
    }
}

/// Hartley normalization: zero mean, average distance sqrt(2).
/// Returns the normalized points and the similarity transform applied.
fn normalize_points(points: &[(f64, f64)]) -> Option<(Vec<(f64, f64)>, Mat3)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (mut cx, mut cy) = (0.0, 0.0);
    for &(x, y) in points {
        cx += x;
        cy += y;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0;
    for &(x, y) in points {
        let dx = x - cx;
        let dy = y - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;
    if mean_dist <= f64::EPSILON {
        return None;
    }

    let scale = 2.0_f64.sqrt() / mean_dist;
    let t = Mat3::new(scale, 0.0, -scale * cx, 0.0, scale, -scale * cy, 0.0, 0.0, 1.0);
    let normalized = points
        .iter()
        .map(|&(x, y)| (scale * (x - cx), scale * (y - cy)))
        .collect();
    Some((normalized, t))
}

/// Estimate `H` with `dst ~ H src` via normalized DLT.
///
/// `None` on degenerate configurations (fewer than four correspondences,
/// collapsed normalization, or a rank-deficient solution).
pub fn fit_homography(src: &[(f64, f64)], dst: &[(f64, f64)]) -> Option<Mat3> {
    let n = src.len();
    if n < 4 || dst.len() != n {
        return None;
    }

    let (src_n, t_s) = normalize_points(src)?;
    let (dst_n, t_d) = normalize_points(dst)?;

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for (i, (&(x, y), &(u, v))) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    // Solve A h = 0: singular vector of the smallest singular value. Pad to
    // square when under-determined so the SVD exposes the null space.
    let mut a_work = a;
    if a_work.nrows() < a_work.ncols() {
        let (rows, cols) = (a_work.nrows(), a_work.ncols());
        let mut padded = DMatrix::<f64>::zeros(cols, cols);
        padded.view_mut((0, 0), (rows, cols)).copy_from(&a_work);
        a_work = padded;
    }

    let svd = a_work.svd(true, true);
    let v_t = svd.v_t?;
    let h_vec = v_t.row(v_t.nrows() - 1);

    let mut h = Mat3::zeros();
    for r in 0..3 {
        for c in 0..3 {
            h[(r, c)] = h_vec[3 * r + c];
        }
    }

    let t_d_inv = t_d.try_inverse()?;
    h = t_d_inv * h * t_s;

    if h.determinant().abs() < 1e-10 {
        return None;
    }

    let scale = h[(2, 2)];
    if scale.abs() > f64::EPSILON {
        h /= scale;
    }
    Some(h)
}

fn residual(h: &Mat3, src: (f64, f64), dst: (f64, f64)) -> f64 {
    let v = h * nalgebra::Vector3::new(src.0, src.1, 1.0);
    if v.z.abs() <= f64::EPSILON {
        return f64::INFINITY;
    }
    let du = v.x / v.z - dst.0;
    let dv = v.y / v.z - dst.1;
    (du * du + dv * dv).sqrt()
}

/// Any of the four point triples collinear makes the sample unusable.
fn is_degenerate(points: &[(f64, f64)]) -> bool {
    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (x0, y0) = points[i];
                let (x1, y1) = points[j];
                let (x2, y2) = points[k];
                let area = (x1 - x0) * (y2 - y0) - (y1 - y0) * (x2 - x0);
                if area.abs() < 1e-9 {
                    return true;
                }
            }
        }
    }
    false
}

/// Robust camera-to-screen fit: DLT inside a RANSAC loop.
///
/// With exactly four correspondences this degenerates to a single guarded
/// fit; with more, outlier captures are voted out. `None` when no model
/// reaches `min_inliers`.
pub fn fit_homography_robust(
    src: &[(f64, f64)],
    dst: &[(f64, f64)],
    opts: &RansacOptions,
) -> Option<Mat3> {
    let n = src.len();
    if n < 4 || dst.len() != n {
        return None;
    }

    let all_indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(opts.seed);

    let mut best: Option<Mat3> = None;
    let mut best_inliers = 0usize;
    let mut best_rms = f64::INFINITY;

    for _ in 0..opts.max_iters {
        let sample: Vec<usize> = all_indices.choose_multiple(&mut rng, 4).copied().collect();
        let sample_src: Vec<_> = sample.iter().map(|&i| src[i]).collect();
        let sample_dst: Vec<_> = sample.iter().map(|&i| dst[i]).collect();

        if is_degenerate(&sample_src) {
            continue;
        }
        let Some(model) = fit_homography(&sample_src, &sample_dst) else {
            continue;
        };

        let mut inliers = Vec::with_capacity(n);
        let mut ss = 0.0;
        for i in 0..n {
            let r = residual(&model, src[i], dst[i]);
            if r <= opts.thresh {
                inliers.push(i);
                ss += r * r;
            }
        }
        if inliers.len() < opts.min_inliers {
            continue;
        }

        // Refit on the full inlier set before scoring.
        let in_src: Vec<_> = inliers.iter().map(|&i| src[i]).collect();
        let in_dst: Vec<_> = inliers.iter().map(|&i| dst[i]).collect();
        let model = fit_homography(&in_src, &in_dst).unwrap_or(model);

        let rms = (ss / inliers.len() as f64).sqrt();
        if inliers.len() > best_inliers || (inliers.len() == best_inliers && rms < best_rms) {
            best = Some(model);
            best_inliers = inliers.len();
            best_rms = rms;
        }

        // Every correspondence already agrees; no better consensus exists.
        if best_inliers == n {
            break;
        }
    }

    if best.is_none() {
        log::warn!("homography fit failed: no consensus among {} correspondences", n);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
    }

    #[test]
    fn recovers_a_pure_scale() {
        let src = unit_square();
        let dst: Vec<_> = src.iter().map(|&(x, y)| (2.0 * x, 2.0 * y)).collect();
        let h = fit_homography(&src, &dst).unwrap();
        assert_relative_eq!(h[(0, 0)], 2.0, epsilon = 1e-6);
        assert_relative_eq!(h[(1, 1)], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn collinear_points_fail_the_fit() {
        let src = vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        let dst = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(fit_homography_robust(&src, &dst, &RansacOptions::default()).is_none());
    }

    #[test]
    fn near_identity_margin_compensation() {
        // Laser hits 10 px inside each corner of a 1280x720 camera view.
        let cam = vec![
            (10.0, 10.0),
            (1270.0, 10.0),
            (1270.0, 710.0),
            (10.0, 710.0),
        ];
        let screen = vec![(0.0, 0.0), (1279.0, 0.0), (1279.0, 719.0), (0.0, 719.0)];
        let h = fit_homography_robust(&cam, &screen, &RansacOptions::default()).unwrap();

        let t = CalibrationTransform::new(h);
        let (mx, my) = t.project(640.0, 360.0).unwrap();
        // Slight outward stretch compensating the captured margin.
        assert!((mx - 645.0).abs() < 10.0, "mapped x {}", mx);
        assert!((my - 363.0).abs() < 10.0, "mapped y {}", my);
        assert!(mx > 630.0 && mx < 660.0);
    }

    #[test]
    fn project_then_inverse_round_trips() {
        let cam = vec![(80.0, 40.0), (1200.0, 60.0), (1180.0, 680.0), (60.0, 700.0)];
        let screen = vec![(0.0, 0.0), (1279.0, 0.0), (1279.0, 719.0), (0.0, 719.0)];
        let h = fit_homography(&cam, &screen).unwrap();
        let t = CalibrationTransform::new(h);
        let inv = t.inverse().unwrap();

        for &(x, y) in &[(320.0, 200.0), (640.0, 360.0), (1000.0, 650.0)] {
            let (u, v) = t.project(x, y).unwrap();
            let (bx, by) = inv.project(u, v).unwrap();
            assert_relative_eq!(bx, x, epsilon = 1e-6);
            assert_relative_eq!(by, y, epsilon = 1e-6);
        }
    }

    #[test]
    fn ransac_votes_out_an_outlier() {
        let mut cam = vec![
            (10.0, 10.0),
            (1270.0, 10.0),
            (1270.0, 710.0),
            (10.0, 710.0),
            (640.0, 360.0),
        ];
        let mut screen = vec![
            (0.0, 0.0),
            (1279.0, 0.0),
            (1279.0, 719.0),
            (0.0, 719.0),
            (639.5, 359.5),
        ];
        // One wild correspondence.
        cam.push((100.0, 100.0));
        screen.push((1200.0, 50.0));

        let h = fit_homography_robust(&cam, &screen, &RansacOptions::default()).unwrap();
        let t = CalibrationTransform::new(h);
        let (mx, _) = t.project(10.0, 10.0).unwrap();
        assert!((mx - 0.0).abs() < 3.0);
    }

    #[test]
    fn scale_fit_maps_frame_onto_screen() {
        let t = CalibrationTransform::scale_fit((640, 360), (1280, 720));
        let (x, y) = t.project(320.0, 180.0).unwrap();
        assert_relative_eq!(x, 640.0, epsilon = 1e-9);
        assert_relative_eq!(y, 360.0, epsilon = 1e-9);
    }
}
