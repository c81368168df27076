//! Error types shared across the core.
//!
//! Generation and pathfinding failures are reported to the engine as values so
//! the caller decides whether to retry, fall back or degrade.

use thiserror::Error;

/// Errors raised before or during dungeon generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("map {width}x{height} is too small, need at least {min_width}x{min_height}")]
    MapTooSmall {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },
    #[error("invalid dungeon configuration: {0}")]
    InvalidConfig(String),
}

/// Why a path request produced no path.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    #[error("tile ({0}, {1}) is outside the map")]
    OutOfBounds(i32, i32),
    #[error("start tile ({0}, {1}) is not walkable")]
    StartBlocked(i32, i32),
    #[error("goal tile ({0}, {1}) is not walkable")]
    GoalBlocked(i32, i32),
    #[error("no route between ({0}, {1}) and ({2}, {3})")]
    Unreachable(i32, i32, i32, i32),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LightingError {
    #[error("no light source with index {0}")]
    NoSuchSource(usize),
    #[error("unknown lighting mode '{0}'")]
    UnknownMode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error of the game engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
