//! Game registry for discovering and creating game modules

use std::collections::HashMap;

use crate::api::BoxedGame;

/// Factory for creating game instances
pub trait GameFactory: Send + Sync {
    /// Unique identifier for this game
    fn game_id(&self) -> &'static str;

    /// Human-readable name for menus and logs
    fn display_name(&self) -> &'static str;

    /// Create a new instance of this game
    fn create(&self) -> BoxedGame;
}

/// Registry for discovering and creating games
pub struct GameRegistry {
    factories: HashMap<String, Box<dyn GameFactory>>,
}

impl GameRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a game factory
    pub fn register(&mut self, factory: Box<dyn GameFactory>) {
        self.factories.insert(factory.game_id().to_string(), factory);
    }

    /// Register all built-in games
    pub fn register_builtin(&mut self) {
        use super::TargetPracticeFactory;

        log::info!("registering built-in games");
        self.register(Box::new(TargetPracticeFactory));
        log::info!("registered {} built-in games", self.factories.len());
    }

    /// Check if a game is registered
    pub fn has_game(&self, game_id: &str) -> bool {
        self.factories.contains_key(game_id)
    }

    /// Create a game instance by ID
    pub fn create_game(&self, game_id: &str) -> Option<BoxedGame> {
        self.factories.get(game_id).map(|f| f.create())
    }

    /// Get all registered game IDs
    pub fn game_ids(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FrameData, Game, GameContext, Manifest};
    use crate::render::Canvas;

    struct TestGame;

    impl Game for TestGame {
        fn on_load(&mut self, _ctx: &GameContext, _manifest: &Manifest) {}
        fn on_update(&mut self, _dt_ms: f64, _frame: &FrameData) {}
        fn on_draw(&mut self, _canvas: &mut Canvas) {}
    }

    struct TestGameFactory;

    impl GameFactory for TestGameFactory {
        fn game_id(&self) -> &'static str {
            "test-game"
        }
        fn display_name(&self) -> &'static str {
            "Test Game"
        }
        fn create(&self) -> BoxedGame {
            Box::new(TestGame)
        }
    }

    #[test]
    fn registration_and_lookup() {
        let mut registry = GameRegistry::new();
        registry.register(Box::new(TestGameFactory));

        assert!(registry.has_game("test-game"));
        assert!(!registry.has_game("unknown-game"));
        assert!(registry.create_game("test-game").is_some());
        assert!(registry.create_game("unknown-game").is_none());
    }

    #[test]
    fn builtins_include_target_practice() {
        let mut registry = GameRegistry::new();
        registry.register_builtin();
        assert!(registry.has_game("target-practice"));
    }
}
