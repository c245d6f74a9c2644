//! Webcam capture via nokhwa
//!
//! Only compiled with the `camera` feature. The preferred resolution and
//! frame rate are a request; whatever the device actually delivers is what
//! downstream geometry works with.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

use super::{CameraSource, Frame};
use crate::{EngineError, Result};

/// A physical capture device, exclusively owned.
pub struct DeviceCamera {
    index: u32,
    target_size: (u32, u32),
    fps: u32,
    camera: Option<Camera>,
}

impl DeviceCamera {
    pub fn new(index: u32, target_size: (u32, u32), fps: u32) -> Self {
        Self {
            index,
            target_size,
            fps,
            camera: None,
        }
    }
}

impl CameraSource for DeviceCamera {
    fn open(&mut self) -> Result<()> {
        let (w, h) = self.target_size;
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(Resolution::new(w, h), FrameFormat::MJPEG, self.fps),
        ));
        let mut camera =
            Camera::new(CameraIndex::Index(self.index), format).map_err(|e| {
                EngineError::CameraOpen {
                    index: self.index,
                    reason: e.to_string(),
                }
            })?;
        camera.open_stream().map_err(|e| EngineError::CameraOpen {
            index: self.index,
            reason: e.to_string(),
        })?;

        let actual = camera.resolution();
        log::info!(
            "camera {} open: requested {}x{}, got {}x{}",
            self.index,
            w,
            h,
            actual.width(),
            actual.height()
        );
        self.camera = Some(camera);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        let camera = self.camera.as_mut().ok_or(EngineError::CameraNotOpen)?;
        match camera.frame() {
            Ok(raw) => match raw.decode_image::<RgbFormat>() {
                Ok(img) => Ok(Some(Frame::new(img))),
                Err(e) => {
                    log::debug!("frame decode failed, skipping tick: {}", e);
                    Ok(None)
                }
            },
            Err(e) => {
                // No new frame ready; non-fatal.
                log::debug!("camera read failed, skipping tick: {}", e);
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("failed to stop camera stream: {}", e);
            }
        }
    }
}

impl Drop for DeviceCamera {
    fn drop(&mut self) {
        self.close();
    }
}
