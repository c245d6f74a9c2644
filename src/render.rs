//! Draw-command canvas
//!
//! The engine and its games do not rasterize anything themselves; they
//! record draw commands on a [`Canvas`] and the embedding application's
//! [`crate::platform::Presenter`] turns the recorded list into pixels.

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One recorded draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Color,
        filled: bool,
    },
    Rect {
        pos: (f64, f64),
        size: (f64, f64),
        color: Color,
        filled: bool,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
    },
    Text {
        pos: (f64, f64),
        size: u32,
        color: Color,
        text: String,
    },
}

/// An ordered buffer of draw commands for one tick.
#[derive(Debug, Default)]
pub struct Canvas {
    cmds: Vec<DrawCmd>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all recorded commands and start the tick with a solid fill.
    pub fn clear(&mut self, color: Color) {
        self.cmds.clear();
        self.cmds.push(DrawCmd::Clear(color));
    }

    pub fn circle(&mut self, center: (f64, f64), radius: f64, color: Color, filled: bool) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
            filled,
        });
    }

    pub fn rect(&mut self, pos: (f64, f64), size: (f64, f64), color: Color, filled: bool) {
        self.cmds.push(DrawCmd::Rect {
            pos,
            size,
            color,
            filled,
        });
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color) {
        self.cmds.push(DrawCmd::Line { from, to, color });
    }

    pub fn text(&mut self, pos: (f64, f64), size: u32, color: Color, text: impl Into<String>) {
        self.cmds.push(DrawCmd::Text {
            pos,
            size,
            color,
            text: text.into(),
        });
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_earlier_commands() {
        let mut canvas = Canvas::new();
        canvas.circle((10.0, 10.0), 4.0, Color::RED, true);
        canvas.clear(Color::BLACK);
        assert_eq!(canvas.commands(), &[DrawCmd::Clear(Color::BLACK)]);
    }
}
