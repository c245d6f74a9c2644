//! Lasercade
//!
//! A laser-pointer input engine for projected minigames. A webcam watches a
//! projected image; colored laser dots are segmented per frame, mapped into
//! screen coordinates through a persisted homography, and handed to a
//! pluggable game module as a small set of ranked touch points.
//!
//! The crate covers the input pipeline only: camera acquisition, per-color
//! blob detection, interactive corner calibration, point mapping/selection,
//! and the fixed-rate frame loop. Window creation, text/shape rasterization
//! and argument parsing live with the embedding application, which plugs in
//! through the [`platform::Presenter`] and [`platform::EventPump`] traits.
//!
//! # Example
//!
//! ```ignore
//! use lasercade::{EngineConfig, Pipeline};
//! use lasercade::games::GameRegistry;
//!
//! let config = EngineConfig::default();
//! let mut registry = GameRegistry::new();
//! registry.register_builtin();
//!
//! let mut pipeline = Pipeline::new(config, registry, camera, events, presenter);
//! pipeline.run("target-practice", manifest)?;
//! ```

pub mod api;
pub mod calib;
pub mod camera;
pub mod config;
pub mod detect;
pub mod games;
pub mod input;
pub mod pipeline;
pub mod platform;
pub mod render;

// Re-export commonly used types
pub use api::{BoxedGame, FrameData, Game, GameContext, InputEvent, Key, Manifest, MouseButton, Point};
pub use calib::{CalibrationTransform, ProfileStore};
pub use camera::{CameraSource, Frame};
pub use config::EngineConfig;
pub use detect::{BlobDetector, Detection, DetectionMap};
pub use input::PointMapper;
pub use pipeline::Pipeline;
pub use render::{Canvas, Color, DrawCmd};

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error type for the engine.
///
/// Only genuinely exceptional states live here. "No blob this frame" and
/// "no calibration stored" are valid steady states and are modelled as
/// empty collections / `None`, never as errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The capture device could not be opened. Fatal to the run.
    #[error("failed to open camera {index}: {reason}")]
    CameraOpen { index: u32, reason: String },

    /// A camera operation was attempted before `open()`.
    #[error("camera is not open")]
    CameraNotOpen,

    /// Requested game id is not in the registry.
    #[error("unknown game: {0}")]
    UnknownGame(String),

    /// Calibration profile exists on disk but could not be decoded.
    #[error("invalid calibration profile '{profile}': {source}")]
    InvalidProfile {
        profile: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// Presenting the rendered canvas failed.
    #[error("presentation failed: {0}")]
    Present(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
