//! Game modules and the dispatch registry
//!
//! Minigames implement [`crate::api::Game`] and are created through a
//! [`GameRegistry`] keyed by game id. Dispatch is static: factories are
//! registered at startup, no dynamic code loading.

mod registry;
pub mod target_practice;

pub use registry::{GameFactory, GameRegistry};
pub use target_practice::TargetPracticeFactory;
