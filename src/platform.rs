//! Host platform seams
//!
//! The pipeline is windowing-library agnostic: the embedding application
//! supplies an [`EventPump`] that translates its native events into
//! [`InputEvent`]s and a [`Presenter`] that rasterizes the recorded canvas.

use crate::api::InputEvent;
use crate::render::Canvas;
use crate::Result;

/// Source of platform input events, polled once per tick.
pub trait EventPump {
    /// Drain all events that arrived since the previous poll.
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Sink for the per-tick draw-command canvas.
pub trait Presenter {
    /// Rasterize and display the canvas. When `mirror` is set the whole
    /// presented image must be flipped about the vertical midline; game
    /// logic has already seen mirrored point coordinates, so the flip here
    /// makes the picture agree with them.
    fn present(&mut self, canvas: &Canvas, mirror: bool) -> Result<()>;
}
