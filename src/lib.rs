//! Core of a top-down dungeon crawler: BSP dungeon generation, A* guide paths
//! and a retro per-cell lighting engine, tied together by a fixed-timestep engine.

pub mod components;
pub mod config;
pub mod constants;
pub mod dungeon_gen;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod lighting;
pub mod pathfinding;
pub mod spawning;
pub mod tile;

pub use config::GameConfig;
pub use engine::GameEngine;
pub use error::{ConfigError, EngineError, GenerationError, LightingError, PathError};
