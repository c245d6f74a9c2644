//! Game lifecycle contract

use std::sync::Arc;

use crate::api::events::InputEvent;
use crate::api::frame_data::FrameData;
use crate::config::EngineConfig;
use crate::render::Canvas;

/// Declarative per-game options, loaded by the embedding application and
/// passed through opaquely. Games interpret it themselves.
pub type Manifest = toml::Value;

/// Read-only engine state exposed to games.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub screen_size: (u32, u32),
    pub config: Arc<EngineConfig>,
}

/// Trait every pluggable minigame implements.
///
/// The pipeline drives the lifecycle: `on_load` once at activation, then
/// `on_update` followed by `on_draw` every tick, `on_event` for raw input
/// passthrough, and `on_unload` once at deactivation.
pub trait Game: Send {
    /// Called once after the game is created, before the first tick.
    fn on_load(&mut self, ctx: &GameContext, manifest: &Manifest);

    /// Called every tick with the elapsed milliseconds since the previous
    /// tick and the freshly built frame data.
    fn on_update(&mut self, dt_ms: f64, frame: &FrameData);

    /// Called every tick after `on_update`. Draw commands recorded on the
    /// canvas are presented by the embedding application.
    fn on_draw(&mut self, canvas: &mut Canvas);

    /// Optional raw input passthrough.
    fn on_event(&mut self, _event: &InputEvent) {}

    /// Optional cleanup when the game exits.
    fn on_unload(&mut self) {}
}

/// Boxed game instance as produced by the registry.
pub type BoxedGame = Box<dyn Game>;
