//! Mouse-driven debug point injector
//!
//! Hold-only: while a mapped mouse button is held, a synthetic point of the
//! bound color is emitted every tick at the cursor position, tracking mouse
//! motion. Window coordinates are converted to logical coordinates so a
//! mirrored presentation behaves the same as real laser input. Held state
//! is cleared when the window loses focus.

use std::collections::HashMap;

use crate::api::{FrameData, InputEvent, MouseButton, Point};
use crate::config::EngineConfig;
use crate::input::mapper::mirror_x;

/// Synthetic intensity well above anything a real blob produces, so debug
/// points always win the per-color ranking.
const DEBUG_INTENSITY: f64 = 9999.0;

/// Injects synthetic per-tick points from held mouse buttons.
pub struct DebugPointInjector {
    enabled: bool,
    mirror: bool,
    screen_size: (u32, u32),
    bindings: HashMap<MouseButton, String>,
    held: HashMap<MouseButton, (f64, f64)>,
}

impl DebugPointInjector {
    pub fn new(config: &EngineConfig) -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(MouseButton::Left, "red".to_string());
        Self {
            enabled: config.debug,
            mirror: config.mirror,
            screen_size: config.screen_size,
            bindings,
            held: HashMap::new(),
        }
    }

    /// Replace the button-to-color bindings.
    pub fn with_bindings(mut self, bindings: HashMap<MouseButton, String>) -> Self {
        self.bindings = bindings;
        self
    }

    fn to_logical(&self, x: i32, y: i32) -> (f64, f64) {
        let x = if self.mirror {
            mirror_x(x as f64, self.screen_size.0)
        } else {
            x as f64
        };
        (x, y as f64)
    }

    /// Track one input event.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if !self.enabled {
            return;
        }
        match *event {
            InputEvent::MouseDown { button, x, y } => {
                if self.bindings.contains_key(&button) {
                    self.held.insert(button, self.to_logical(x, y));
                }
            }
            InputEvent::MouseUp { button } => {
                self.held.remove(&button);
            }
            InputEvent::MouseMove { x, y } => {
                if !self.held.is_empty() {
                    let pos = self.to_logical(x, y);
                    for held_pos in self.held.values_mut() {
                        *held_pos = pos;
                    }
                }
            }
            InputEvent::FocusLost => self.held.clear(),
            _ => {}
        }
    }

    /// Merge the currently held synthetic points into this tick's frame
    /// data. Real detections for the same color stay, debug points are
    /// appended in front by intensity on the consumer side.
    pub fn emit_into(&self, frame: &mut FrameData) {
        if !self.enabled || self.held.is_empty() {
            return;
        }
        for (button, &(x, y)) in &self.held {
            let Some(color) = self.bindings.get(button) else {
                continue;
            };
            frame
                .points_by_color
                .entry(color.clone())
                .or_default()
                .insert(0, Point::new(x, y, DEBUG_INTENSITY));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn debug_config() -> EngineConfig {
        EngineConfig {
            debug: true,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn held_button_emits_every_tick() {
        let mut inj = DebugPointInjector::new(&debug_config());
        inj.handle_event(&InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 100,
            y: 200,
        });

        for _ in 0..3 {
            let mut fd = FrameData::new(SystemTime::now());
            inj.emit_into(&mut fd);
            let red = fd.points("red");
            assert_eq!(red.len(), 1);
            assert_eq!((red[0].x, red[0].y), (100.0, 200.0));
        }
    }

    #[test]
    fn release_stops_emission() {
        let mut inj = DebugPointInjector::new(&debug_config());
        inj.handle_event(&InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 100,
            y: 200,
        });
        inj.handle_event(&InputEvent::MouseUp {
            button: MouseButton::Left,
        });

        let mut fd = FrameData::new(SystemTime::now());
        inj.emit_into(&mut fd);
        assert!(fd.points("red").is_empty());
    }

    #[test]
    fn motion_updates_held_position() {
        let mut inj = DebugPointInjector::new(&debug_config());
        inj.handle_event(&InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 100,
            y: 200,
        });
        inj.handle_event(&InputEvent::MouseMove { x: 300, y: 400 });

        let mut fd = FrameData::new(SystemTime::now());
        inj.emit_into(&mut fd);
        assert_eq!((fd.points("red")[0].x, fd.points("red")[0].y), (300.0, 400.0));
    }

    #[test]
    fn focus_loss_clears_held_buttons() {
        let mut inj = DebugPointInjector::new(&debug_config());
        inj.handle_event(&InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 100,
            y: 200,
        });
        inj.handle_event(&InputEvent::FocusLost);

        let mut fd = FrameData::new(SystemTime::now());
        inj.emit_into(&mut fd);
        assert!(fd.points("red").is_empty());
    }

    #[test]
    fn mirror_converts_window_to_logical_coordinates() {
        let mut cfg = debug_config();
        cfg.mirror = true;
        let mut inj = DebugPointInjector::new(&cfg);
        inj.handle_event(&InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 100,
            y: 200,
        });

        let mut fd = FrameData::new(SystemTime::now());
        inj.emit_into(&mut fd);
        assert_eq!(fd.points("red")[0].x, 1179.0);
    }

    #[test]
    fn disabled_injector_is_inert() {
        let mut inj = DebugPointInjector::new(&EngineConfig::default());
        inj.handle_event(&InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 100,
            y: 200,
        });

        let mut fd = FrameData::new(SystemTime::now());
        inj.emit_into(&mut fd);
        assert!(fd.points("red").is_empty());
    }
}
