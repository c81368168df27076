//! Game constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! These are the defaults behind `GameConfig`; anything a designer may want to
//! tune at runtime is mirrored there.

mod dungeon;
mod gameplay;
mod lighting;
mod pathfinding;
mod shift;
mod time;

pub use dungeon::*;
pub use gameplay::*;
pub use lighting::*;
pub use pathfinding::*;
pub use shift::*;
pub use time::*;
