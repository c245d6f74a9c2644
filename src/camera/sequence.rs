//! Offline frame sources
//!
//! Deterministic captures used by the test suite and by offline runs
//! against recorded footage: a directory of image files played in order,
//! or a pre-built in-memory sequence.

use std::collections::VecDeque;
use std::path::Path;

use image::RgbImage;

use super::{CameraSource, Frame};
use crate::Result;

/// Plays a directory of image files in lexicographic order.
pub struct FrameSequenceCapture {
    frames: VecDeque<RgbImage>,
    loop_playback: bool,
    played: Vec<RgbImage>,
    open: bool,
}

impl FrameSequenceCapture {
    /// Load every decodable image in `dir`, sorted by file name.
    pub fn from_directory(dir: impl AsRef<Path>, loop_playback: bool) -> Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut frames = VecDeque::new();
        for path in paths {
            match image::open(&path) {
                Ok(img) => frames.push_back(img.to_rgb8()),
                Err(err) => log::debug!("skipping {}: {}", path.display(), err),
            }
        }
        log::info!("frame sequence loaded: {} frames", frames.len());

        Ok(Self {
            frames,
            loop_playback,
            played: Vec::new(),
            open: false,
        })
    }

    /// Build a sequence from in-memory images.
    pub fn from_frames(frames: impl IntoIterator<Item = RgbImage>, loop_playback: bool) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            loop_playback,
            played: Vec::new(),
            open: false,
        }
    }
}

impl CameraSource for FrameSequenceCapture {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        if !self.open {
            return Err(crate::EngineError::CameraNotOpen);
        }
        match self.frames.pop_front() {
            Some(img) => {
                if self.loop_playback {
                    self.played.push(img.clone());
                }
                Ok(Some(Frame::new(img)))
            }
            None => {
                if self.loop_playback && !self.played.is_empty() {
                    self.frames.extend(self.played.drain(..));
                    return self.read();
                }
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Returns one fixed image forever. Handy for detector tests.
pub struct StaticCapture {
    image: RgbImage,
    open: bool,
}

impl StaticCapture {
    pub fn new(image: RgbImage) -> Self {
        Self { image, open: false }
    }
}

impl CameraSource for StaticCapture {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>> {
        if !self.open {
            return Err(crate::EngineError::CameraNotOpen);
        }
        Ok(Some(Frame::new(self.image.clone())))
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(w: u32, h: u32) -> RgbImage {
        RgbImage::new(w, h)
    }

    #[test]
    fn sequence_plays_in_order_then_runs_dry() {
        let mut cap = FrameSequenceCapture::from_frames([blank(4, 4), blank(8, 8)], false);
        cap.open().unwrap();
        assert_eq!(cap.read().unwrap().unwrap().width(), 4);
        assert_eq!(cap.read().unwrap().unwrap().width(), 8);
        assert!(cap.read().unwrap().is_none());
    }

    #[test]
    fn looped_sequence_wraps_around() {
        let mut cap = FrameSequenceCapture::from_frames([blank(4, 4), blank(8, 8)], true);
        cap.open().unwrap();
        for _ in 0..5 {
            assert!(cap.read().unwrap().is_some());
        }
    }

    #[test]
    fn read_before_open_is_an_error() {
        let mut cap = StaticCapture::new(blank(2, 2));
        assert!(cap.read().is_err());
    }
}
