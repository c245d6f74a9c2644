//! Input-point production
//!
//! [`mapper`] turns camera-space detections into capped, ranked screen
//! points; [`debug`] injects synthetic points from held mouse buttons so
//! games can be exercised without a laser.

pub mod debug;
pub mod mapper;

pub use debug::DebugPointInjector;
pub use mapper::{new_transform_cell, publish_transform, PointMapper, TransformCell};
