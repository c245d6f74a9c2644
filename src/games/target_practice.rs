//! Built-in template game
//!
//! Draws every incoming point as a colored ring. Useful for checking a
//! calibration end to end, and as the smallest complete example of the
//! [`Game`] lifecycle for game authors to copy.

use std::collections::HashMap;

use crate::api::{BoxedGame, FrameData, Game, GameContext, Manifest, Point};
use crate::games::GameFactory;
use crate::render::{Canvas, Color};

fn marker_color(color_id: &str) -> Color {
    match color_id {
        "red" => Color::rgb(255, 80, 80),
        "green" => Color::rgb(80, 255, 80),
        "blue" => Color::rgb(80, 120, 255),
        _ => Color::WHITE,
    }
}

/// Shows live points and a running hit counter.
pub struct TargetPractice {
    points: HashMap<String, Vec<Point>>,
    ticks_with_input: u64,
    title: String,
}

impl TargetPractice {
    pub fn new() -> Self {
        Self {
            points: HashMap::new(),
            ticks_with_input: 0,
            title: "Target practice: aim the laser!".to_string(),
        }
    }
}

impl Default for TargetPractice {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for TargetPractice {
    fn on_load(&mut self, _ctx: &GameContext, manifest: &Manifest) {
        if let Some(title) = manifest.get("title").and_then(|v| v.as_str()) {
            self.title = title.to_string();
        }
    }

    fn on_update(&mut self, _dt_ms: f64, frame: &FrameData) {
        self.points = frame.points_by_color.clone();
        if self.points.values().any(|v| !v.is_empty()) {
            self.ticks_with_input += 1;
        }
    }

    fn on_draw(&mut self, canvas: &mut Canvas) {
        canvas.text((20.0, 20.0), 28, Color::WHITE, self.title.clone());
        canvas.text(
            (20.0, 52.0),
            20,
            Color::rgb(160, 160, 160),
            format!("ticks with input: {}", self.ticks_with_input),
        );
        for (color_id, points) in &self.points {
            let color = marker_color(color_id);
            for p in points {
                canvas.circle((p.x, p.y), 12.0, color, false);
                canvas.circle((p.x, p.y), 3.0, color, true);
            }
        }
    }
}

/// Factory registered with the built-in games.
pub struct TargetPracticeFactory;

impl GameFactory for TargetPracticeFactory {
    fn game_id(&self) -> &'static str {
        "target-practice"
    }

    fn display_name(&self) -> &'static str {
        "Target Practice"
    }

    fn create(&self) -> BoxedGame {
        Box::new(TargetPractice::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::SystemTime;

    use crate::config::EngineConfig;

    #[test]
    fn manifest_title_overrides_default() {
        let mut game = TargetPractice::new();
        let ctx = GameContext {
            screen_size: (1280, 720),
            config: Arc::new(EngineConfig::default()),
        };
        let manifest: Manifest = toml::from_str(r#"title = "Warmup Round""#).unwrap();
        game.on_load(&ctx, &manifest);
        assert_eq!(game.title, "Warmup Round");
    }

    #[test]
    fn draws_markers_for_incoming_points() {
        let mut game = TargetPractice::new();
        let mut frame = FrameData::new(SystemTime::now());
        frame
            .points_by_color
            .insert("red".to_string(), vec![Point::new(100.0, 100.0, 50.0)]);
        game.on_update(16.0, &frame);

        let mut canvas = Canvas::new();
        game.on_draw(&mut canvas);
        // Two text lines plus ring and dot for the single point.
        assert_eq!(canvas.commands().len(), 4);
        assert_eq!(game.ticks_with_input, 1);
    }
}
