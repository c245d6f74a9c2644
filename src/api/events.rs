//! Platform-agnostic input events
//!
//! The embedding application translates its windowing library's events into
//! these before handing them to the pipeline each tick.

/// Keys the engine itself reacts to, plus a passthrough for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Terminates the run (or cancels a calibration in progress).
    Escape,
    /// Starts the interactive calibration procedure.
    Calibrate,
    /// Any other key, identified by the platform's scancode.
    Other(u32),
}

/// Mouse buttons recognized by the debug point injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// One input event pumped from the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Window close request.
    Quit,
    KeyDown(Key),
    KeyUp(Key),
    /// Button press at window coordinates.
    MouseDown { button: MouseButton, x: i32, y: i32 },
    MouseUp { button: MouseButton },
    MouseMove { x: i32, y: i32 },
    /// The window lost input focus.
    FocusLost,
}
