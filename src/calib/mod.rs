//! Geometric calibration
//!
//! Interactive corner capture ([`procedure`]), robust homography fitting
//! ([`homography`]), and durable per-profile persistence ([`store`]). A
//! successful run publishes a whole new [`CalibrationTransform`] snapshot;
//! aborts and failures leave whatever was active untouched.

pub mod homography;
pub mod procedure;
pub mod store;

pub use homography::{
    fit_homography, fit_homography_robust, CalibrationTransform, Mat3, RansacOptions,
};
pub use procedure::{AbortReason, CalibrationRun, CalibrationStatus, Corner};
pub use store::{default_store_dir, ProfileStore};
