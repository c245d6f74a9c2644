//! Camera frame acquisition
//!
//! The capture device is owned exclusively by a [`CameraSource`]; nothing
//! else touches the underlying handle. Sources hand out one [`Frame`] per
//! tick and may transiently have nothing ready, which the pipeline treats
//! as "skip this tick", not as a failure.

pub mod sequence;

#[cfg(feature = "camera")]
pub mod device;

pub use sequence::{FrameSequenceCapture, StaticCapture};

#[cfg(feature = "camera")]
pub use device::DeviceCamera;

use std::time::SystemTime;

use image::RgbImage;

use crate::Result;

/// One captured color frame.
///
/// The nominal capture size lives in the image itself; downstream geometry
/// always follows these dimensions, never the size that was requested from
/// the device.
pub struct Frame {
    pub image: RgbImage,
    pub timestamp: SystemTime,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            timestamp: SystemTime::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Contract every frame source satisfies.
pub trait CameraSource {
    /// Acquire the device. Failure here is fatal to the run.
    fn open(&mut self) -> Result<()>;

    /// Pull the next frame. `Ok(None)` means no new frame was ready this
    /// tick; the caller skips the tick and retains its prior state.
    fn read(&mut self) -> Result<Option<Frame>>;

    /// Release the device. Idempotent.
    fn close(&mut self);
}
