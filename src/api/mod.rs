//! Game-facing API
//!
//! Everything a pluggable game module sees: the per-tick [`FrameData`]
//! record, the [`Game`] lifecycle trait with its [`GameContext`], and the
//! platform-agnostic [`InputEvent`] enum.

pub mod events;
pub mod frame_data;
pub mod game;

pub use events::{InputEvent, Key, MouseButton};
pub use frame_data::{FrameData, Point};
pub use game::{BoxedGame, Game, GameContext, Manifest};
