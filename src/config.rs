//! Runtime configuration.
//!
//! Every field has a default from `constants`, so a config file only needs the
//! values it wants to change.

use crate::constants::*;
use crate::error::ConfigError;
use crate::lighting::LightMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,
    pub map: MapConfig,
    pub dungeon: DungeonConfig,
    pub lighting: LightingConfig,
    pub pathfinding: PathfindingConfig,
    pub shift: ShiftConfig,
    pub simulation: SimulationConfig,
    /// Serve puffin scopes over HTTP from the headless driver
    pub profiling: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            map: MapConfig::default(),
            dungeon: DungeonConfig::default(),
            lighting: LightingConfig::default(),
            pathfinding: PathfindingConfig::default(),
            shift: ShiftConfig::default(),
            simulation: SimulationConfig::default(),
            profiling: false,
        }
    }
}

impl GameConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.map.width == 0 || self.map.height == 0 {
            return invalid("map dimensions must be positive");
        }
        if self.map.tile_size <= 0.0 {
            return invalid("map.tile_size must be positive");
        }
        if self.lighting.pixel_size == 0 {
            return invalid("lighting.pixel_size must be positive");
        }
        if self.lighting.light_radius < 0.0 || self.lighting.decay_factor < 0.0 {
            return invalid("lighting radius and decay must not be negative");
        }
        if self.shift.delay_min <= 0.0 || self.shift.delay_min > self.shift.delay_max {
            return invalid("shift delays must satisfy 0 < delay_min <= delay_max");
        }
        if self.shift.fade_speed <= 0.0 || self.shift.text_duration < 0.0 {
            return invalid("shift.fade_speed must be positive and text_duration not negative");
        }
        if self.simulation.fixed_timestep <= 0.0 || self.simulation.max_steps_per_frame == 0 {
            return invalid("simulation timestep and step budget must be positive");
        }
        if self.pathfinding.repath_interval == 0 {
            return invalid("pathfinding.repath_interval must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Width in tiles
    pub width: usize,
    /// Height in tiles
    pub height: usize,
    /// World pixels per tile
    pub tile_size: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: DUNGEON_DEFAULT_WIDTH,
            height: DUNGEON_DEFAULT_HEIGHT,
            tile_size: TILE_SIZE,
        }
    }
}

/// Tuning of the BSP generator and corridor carving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub max_depth: u32,
    pub min_room_size: i32,
    pub split_ratio_min: f32,
    pub split_ratio_max: f32,
    pub leaf_margin: i32,
    pub max_placement_attempts: u32,
    pub min_rooms: usize,
    pub max_generation_attempts: u32,
    /// Chance of keeping an edge the spanning tree rejected
    pub extra_corridor_chance: f64,
    pub wide_corridor_chance: f32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            max_depth: DUNGEON_MAX_DEPTH,
            min_room_size: DUNGEON_MIN_ROOM_SIZE,
            split_ratio_min: DUNGEON_SPLIT_RATIO_MIN,
            split_ratio_max: DUNGEON_SPLIT_RATIO_MAX,
            leaf_margin: DUNGEON_LEAF_MARGIN,
            max_placement_attempts: DUNGEON_MAX_PLACEMENT_ATTEMPTS,
            min_rooms: DUNGEON_MIN_ROOMS,
            max_generation_attempts: DUNGEON_MAX_GENERATION_ATTEMPTS,
            extra_corridor_chance: DUNGEON_EXTRA_CORRIDOR_CHANCE,
            wide_corridor_chance: DUNGEON_WIDE_CORRIDOR_CHANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub decay_factor: f32,
    /// Radius of the player's light in world pixels
    pub light_radius: f32,
    /// World pixels per mask cell
    pub pixel_size: u32,
    pub center_boost: f32,
    pub noise_frequency: f64,
    /// Mode the player's light returns to after a shift
    pub player_mode: LightMode,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            decay_factor: LIGHT_DECAY_FACTOR,
            light_radius: LIGHT_RADIUS,
            pixel_size: LIGHT_PIXEL_SIZE,
            center_boost: LIGHT_CENTER_BOOST,
            noise_frequency: LIGHT_NOISE_FREQUENCY,
            player_mode: LightMode::Static,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Keep a guide path to the exit room
    pub guide_enabled: bool,
    /// Fixed steps between guide path refreshes
    pub repath_interval: u32,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            guide_enabled: true,
            repath_interval: GUIDE_REPATH_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    pub enabled: bool,
    pub delay_min: f32,
    pub delay_max: f32,
    pub heartbeat_lead: f32,
    pub fade_speed: f32,
    pub text_duration: f32,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_min: SHIFT_DELAY_MIN,
            delay_max: SHIFT_DELAY_MAX,
            heartbeat_lead: SHIFT_HEARTBEAT_LEAD,
            fade_speed: SHIFT_FADE_SPEED,
            text_duration: SHIFT_TEXT_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Walk the player along the guide path
    pub auto_walk: bool,
    pub walk_speed: f32,
    pub fixed_timestep: f32,
    pub max_steps_per_frame: u32,
    /// Frames run by the headless driver
    pub frames: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            auto_walk: true,
            walk_speed: PLAYER_WALK_SPEED,
            fixed_timestep: FIXED_TIMESTEP,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
            frames: DEFAULT_FRAME_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides_fields() {
        let json = r#"{
            "seed": 42,
            "map": { "width": 60 },
            "lighting": { "player_mode": "heartbeat", "decay_factor": 3.0 },
            "shift": { "enabled": false }
        }"#;
        let config: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.map.width, 60);
        assert_eq!(config.map.height, DUNGEON_DEFAULT_HEIGHT);
        assert_eq!(config.lighting.player_mode, LightMode::Heartbeat);
        assert_eq!(config.lighting.decay_factor, 3.0);
        assert_eq!(config.lighting.light_radius, LIGHT_RADIUS);
        assert!(!config.shift.enabled);
    }

    #[test]
    fn test_round_trip() {
        let mut config = GameConfig::default();
        config.seed = Some(7);
        config.dungeon.extra_corridor_chance = 0.5;
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = GameConfig::default();
        config.shift.delay_min = 90.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.lighting.pixel_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let path = std::env::temp_dir().join("cryptic_descent_bad_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = GameConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let _ = std::fs::remove_file(&path);
    }
}
