//! Calibration profile persistence
//!
//! One JSON record per profile name: the 3x3 matrix and, when the run
//! captured them, the four camera-space corner points. Matrix and corners
//! are written together in a single atomic operation (temp file + rename),
//! so a reader sees either a complete record or none at all. A missing
//! profile loads as `None`: running uncalibrated is a valid steady state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::homography::{CalibrationTransform, Mat3};
use crate::{EngineError, Result};

/// On-disk record format.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    matrix: [[f64; 3]; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    corners_cam: Option<[[f64; 2]; 4]>,
}

impl StoredProfile {
    fn from_transform(t: &CalibrationTransform) -> Self {
        let m = &t.matrix;
        let mut matrix = [[0.0; 3]; 3];
        for (r, row) in matrix.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = m[(r, c)];
            }
        }
        Self {
            matrix,
            corners_cam: t.corners_cam,
        }
    }

    fn into_transform(self) -> CalibrationTransform {
        let m = self.matrix;
        let matrix = Mat3::new(
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        );
        CalibrationTransform {
            matrix,
            corners_cam: self.corners_cam,
        }
    }
}

/// Durable store of calibration transforms, keyed by profile name.
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Store rooted at `dir`; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, profile: &str) -> PathBuf {
        self.dir.join(format!("{}.json", profile))
    }

    /// Load a profile. A profile that was never saved yields `Ok(None)`.
    pub fn load(&self, profile: &str) -> Result<Option<CalibrationTransform>> {
        let path = self.path_for(profile);
        if !path.exists() {
            log::info!("calibration profile '{}' not found, starting uncalibrated", profile);
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let stored: StoredProfile =
            serde_json::from_str(&text).map_err(|source| EngineError::InvalidProfile {
                profile: profile.to_string(),
                source,
            })?;
        log::info!("calibration profile '{}' loaded from {}", profile, path.display());
        Ok(Some(stored.into_transform()))
    }

    /// Persist a transform atomically under `profile`.
    pub fn save(&self, profile: &str, transform: &CalibrationTransform) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(profile);
        let tmp = path.with_extension("json.tmp");

        let stored = StoredProfile::from_transform(transform);
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|source| EngineError::InvalidProfile {
                profile: profile.to_string(),
                source,
            })?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::info!("calibration profile '{}' saved to {}", profile, path.display());
        Ok(())
    }
}

/// Default store location under the platform config directory, falling back
/// to the working directory when no home is available.
pub fn default_store_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| {
            Path::new(&home)
                .join(".config")
                .join("lasercade")
                .join("profiles")
        })
        .unwrap_or_else(|| PathBuf::from("profiles"))
}
