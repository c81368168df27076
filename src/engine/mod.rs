//! Game engine - owns the current level, the ECS world and the frame loop.
//!
//! The engine handles:
//! - Level generation and the timed dungeon shift
//! - The guide path from the player to the exit room
//! - Fixed-timestep simulation (auto-walk, lighting)
//!
//! The shell (main.rs) only feeds it frame times, drains its events and
//! presents what it draws.

mod level;
mod props;
mod shift;

pub use level::Level;
pub use props::{place_props, Prop, PropKind};
pub use shift::{DungeonShift, ShiftPhase, ShiftSignal};

use crate::components::{Player, Position, Speed};
use crate::config::GameConfig;
use crate::constants::*;
use crate::error::{EngineError, GenerationError};
use crate::events::{EventQueue, GameEvent};
use crate::lighting::LightMode;
use crate::pathfinding::GuideMarker;
use crate::spawning;
use crate::tile::TilePos;

use glam::Vec2;
use hecs::{Entity, World};
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// The game engine - owns all game state and simulation logic.
pub struct GameEngine {
    config: GameConfig,
    world: World,
    player: Entity,
    level: Level,
    /// Index of the player's light in the current level's lighting
    player_light: usize,
    shift: DungeonShift,
    events: EventQueue,
    rng: StdRng,

    /// Unsimulated time carried over between frames
    accumulator: f32,
    step_count: u64,

    /// Smoothed guide points the player still has to walk through
    route: VecDeque<Vec2>,
    marker: Option<GuideMarker>,
    spawn_room: usize,
    current_room: Option<usize>,
    /// Last walkable tile the player stood on, used as the path start
    last_tile: Option<TilePos>,
    path_failed: bool,
    exit_reached: bool,
    levels_generated: u32,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut level = Level::generate(&config, &mut rng)?;
        let (spawn_room, spawn) = level.player_spawn(&mut rng);

        let mut world = World::new();
        let player = world.spawn((Position(spawn), Player, Speed(config.simulation.walk_speed)));
        spawning::spawn_level(&mut world, &level.grid, Some(spawn_room), &mut rng);

        let player_light =
            level
                .lighting
                .add_following(player, config.lighting.light_radius, config.lighting.player_mode);
        let shift = DungeonShift::new(config.shift.clone(), &mut rng);

        let mut events = EventQueue::new();
        events.push(GameEvent::LevelGenerated {
            rooms: level.grid.rooms().len(),
            props: level.props.len(),
        });
        log::info!(
            "level ready: {} rooms, {} props, player in room {}",
            level.grid.rooms().len(),
            level.props.len(),
            spawn_room
        );

        Ok(Self {
            config,
            world,
            player,
            level,
            player_light,
            shift,
            events,
            rng,
            accumulator: 0.0,
            step_count: 0,
            route: VecDeque::new(),
            marker: None,
            spawn_room,
            current_room: Some(spawn_room),
            last_tile: None,
            path_failed: false,
            exit_reached: false,
            levels_generated: 1,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn shift(&self) -> &DungeonShift {
        &self.shift
    }

    /// Where the guide star should be drawn this frame
    pub fn marker(&self) -> Option<GuideMarker> {
        self.marker
    }

    pub fn route(&self) -> impl Iterator<Item = &Vec2> {
        self.route.iter()
    }

    pub fn spawn_room(&self) -> usize {
        self.spawn_room
    }

    pub fn current_room(&self) -> Option<usize> {
        self.current_room
    }

    pub fn exit_reached(&self) -> bool {
        self.exit_reached
    }

    /// Levels built so far, the first one included
    pub fn levels_generated(&self) -> u32 {
        self.levels_generated
    }

    /// Fixed steps simulated so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Get the player's world position
    pub fn player_position(&self) -> Vec2 {
        self.world
            .get::<&Position>(self.player)
            .map(|p| p.0)
            .unwrap_or(Vec2::ZERO)
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain()
    }

    /// Advance the simulation by one frame of `dt` seconds.
    /// Returns the number of fixed steps that ran.
    pub fn tick(&mut self, dt: f32) -> u32 {
        puffin::profile_function!();
        let step = self.config.simulation.fixed_timestep;
        let max_steps = self.config.simulation.max_steps_per_frame;

        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= step && steps < max_steps {
            self.step(step);
            self.accumulator -= step;
            steps += 1;
        }

        // Too far behind: drop the backlog instead of spiralling
        if self.accumulator >= step {
            log::debug!("dropping {:.3}s of simulation time", self.accumulator);
            self.accumulator = 0.0;
        }
        steps
    }

    fn step(&mut self, dt: f32) {
        self.step_count += 1;
        let player_pos = self.player_position();
        let tile = self.level.grid.world_to_tile(player_pos);
        if self.level.grid.is_walkable(tile.0, tile.1) {
            self.last_tile = Some(tile);
        }
        self.current_room = self.level.grid.room_containing_world(player_pos);
        self.check_exit();

        if self.config.pathfinding.guide_enabled && !self.exit_reached {
            let interval = self.config.pathfinding.repath_interval.max(1) as u64;
            let due = self.step_count % interval == 0;
            if due || (self.route.is_empty() && !self.path_failed) {
                self.refresh_guide(player_pos);
            }
        }

        if self.config.simulation.auto_walk {
            self.walk_player(dt);
        }

        self.marker = self.level.pathfinder.render(self.current_room);
        self.level.lighting.update(dt, &self.world);
        self.advance_shift(dt);
    }

    fn check_exit(&mut self) {
        let exit = self.level.exit_room();
        if self.exit_reached || exit == self.spawn_room || self.current_room != Some(exit) {
            return;
        }
        self.exit_reached = true;
        self.route.clear();
        self.events.push(GameEvent::ExitReached { room: exit });
        log::info!("player reached the exit room {}", exit);
    }

    /// Recompute the path to the exit room and its smoothed walking route.
    fn refresh_guide(&mut self, player_pos: Vec2) {
        puffin::profile_function!();
        let Some(goal) = self.level.exit_tile() else {
            return;
        };
        let start = self
            .last_tile
            .unwrap_or_else(|| self.level.grid.world_to_tile(player_pos));

        match self.level.pathfinder.update(start, goal) {
            Ok(steps) => {
                self.path_failed = false;
                let tile_size = self.level.grid.tile_size;
                self.route = self
                    .level
                    .pathfinder
                    .smooth_path(&mut self.rng)
                    .into_iter()
                    .skip_while(|p| p.distance(player_pos) < tile_size)
                    .collect();
                log::trace!("guide path: {} steps, {} route points", steps, self.route.len());
            }
            Err(err) => {
                log::warn!("guide path lost: {}", err);
                self.path_failed = true;
                self.route.clear();
                self.events.push(GameEvent::PathLost(err));
            }
        }
    }

    /// Move the player along the route at its walking speed
    fn walk_player(&mut self, dt: f32) {
        let speed = self
            .world
            .get::<&Speed>(self.player)
            .map(|s| s.0)
            .unwrap_or(self.config.simulation.walk_speed);
        let Ok(mut position) = self.world.get::<&mut Position>(self.player) else {
            return;
        };

        let mut budget = speed * dt;
        while budget > 0.0 {
            let Some(&target) = self.route.front() else {
                break;
            };
            let to_target = target - position.0;
            let distance = to_target.length();
            if distance <= budget.max(PLAYER_WAYPOINT_RADIUS) {
                position.0 = target;
                budget -= distance;
                self.route.pop_front();
            } else {
                position.0 += to_target / distance * budget;
                budget = 0.0;
            }
        }
    }

    fn advance_shift(&mut self, dt: f32) {
        match self.shift.update(dt, &mut self.rng) {
            Some(ShiftSignal::Heartbeat) => {
                log::info!("the dungeon is about to shift");
                self.set_player_light_mode(LightMode::Heartbeat);
                self.events.push(GameEvent::ShiftWarning);
            }
            Some(ShiftSignal::FadeOutStarted) => self.events.push(GameEvent::ShiftStarted),
            Some(ShiftSignal::Regenerate) => {
                if let Err(err) = self.regenerate() {
                    log::error!("dungeon shift failed, keeping the current level: {}", err);
                    self.set_player_light_mode(self.config.lighting.player_mode);
                }
            }
            Some(ShiftSignal::Finished) => {
                log::info!("dungeon shift complete");
                self.events.push(GameEvent::ShiftFinished);
            }
            None => {}
        }
    }

    /// Build a whole new level and swap it in, moving the player to the new start.
    /// On failure the current level stays untouched.
    pub fn regenerate(&mut self) -> Result<(), GenerationError> {
        puffin::profile_function!();
        let mut level = Level::generate(&self.config, &mut self.rng)?;
        let (spawn_room, spawn) = level.player_spawn(&mut self.rng);

        let stale: Vec<Entity> = self
            .world
            .iter()
            .map(|e| e.entity())
            .filter(|&e| e != self.player)
            .collect();
        for entity in stale {
            let _ = self.world.despawn(entity);
        }
        if let Ok(mut position) = self.world.get::<&mut Position>(self.player) {
            position.0 = spawn;
        }
        spawning::spawn_level(&mut self.world, &level.grid, Some(spawn_room), &mut self.rng);

        let lighting = &self.config.lighting;
        self.player_light = level
            .lighting
            .add_following(self.player, lighting.light_radius, lighting.player_mode);
        self.level = level;

        self.route.clear();
        self.marker = None;
        self.spawn_room = spawn_room;
        self.current_room = Some(spawn_room);
        self.last_tile = None;
        self.path_failed = false;
        self.exit_reached = false;
        self.levels_generated += 1;

        self.events.push(GameEvent::LevelGenerated {
            rooms: self.level.grid.rooms().len(),
            props: self.level.props.len(),
        });
        log::info!(
            "dungeon regenerated: {} rooms, player moved to room {}",
            self.level.grid.rooms().len(),
            spawn_room
        );
        Ok(())
    }

    /// Start the shift sequence right away
    pub fn trigger_shift(&mut self) {
        self.shift.trigger();
    }

    fn set_player_light_mode(&mut self, mode: LightMode) {
        if let Err(err) = self.level.lighting.set_source_mode(self.player_light, mode) {
            log::warn!("cannot change the player light: {}", err);
        }
    }

    /// Debug binding: cycle the player's light through every mode
    pub fn cycle_player_light_mode(&mut self) -> Option<LightMode> {
        self.level.lighting.next_mode(self.player_light).ok()
    }

    /// Debug binding: raise (positive) or lower (negative) the light falloff
    pub fn adjust_decay(&mut self, direction: f32) {
        let decay = (self.config.lighting.decay_factor + direction.signum() * LIGHT_DECAY_STEP).max(0.0);
        self.config.lighting.decay_factor = decay;
        self.level.lighting.set_decay_factor(decay);
        log::info!("light decay factor: {:.2}", decay);
    }

    /// Debug binding: grow (positive) or shrink (negative) the player's light
    pub fn adjust_light_radius(&mut self, direction: f32) {
        let radius = (self.config.lighting.light_radius + direction.signum() * LIGHT_RADIUS_STEP).max(0.0);
        self.config.lighting.light_radius = radius;
        self.level.lighting.set_light_radius(radius);
        log::info!("light radius: {:.1}", radius);
    }

    /// The level lit by the current mask, darkened by the shift fade
    pub fn lit_scene(&self) -> RgbaImage {
        puffin::profile_function!();
        let mut scene = self.level.scene();
        self.level.lighting.render(&mut scene);

        let visible = 1.0 - self.shift.fade_alpha();
        if visible < 1.0 {
            for pixel in scene.pixels_mut() {
                for channel in pixel.0.iter_mut().take(3) {
                    *channel = (*channel as f32 * visible).round() as u8;
                }
            }
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Enemy, SpawnRoom};
    use crate::config::{DungeonConfig, ShiftConfig};
    use crate::dungeon_gen::DungeonGenerator;
    use crate::lighting::LightAnchor;
    use crate::pathfinding::Pathfinder;
    use crate::tile::manhattan;
    use std::sync::Arc;

    fn test_config(seed: u64) -> GameConfig {
        let mut config = GameConfig::default();
        config.seed = Some(seed);
        config.map.width = 60;
        config.map.height = 60;
        config.shift.enabled = false;
        config
    }

    #[test]
    fn test_generate_and_route_between_first_and_last_room() {
        let mut rng = StdRng::seed_from_u64(60);
        let grid = DungeonGenerator::new(DungeonConfig::default(), TILE_SIZE)
            .generate(60, 60, &mut rng)
            .unwrap();
        assert!(grid.rooms().len() >= 3);

        let start = grid.rooms()[0].center();
        let goal = grid.rooms()[grid.rooms().len() - 1].center();
        let grid = Arc::new(grid);
        let mut pathfinder = Pathfinder::new(Arc::clone(&grid));
        pathfinder.update(start, goal).unwrap();

        let path = pathfinder.path();
        assert!(!path.is_empty());
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
        assert!(path.iter().all(|&(x, y)| grid.is_walkable(x, y)));
        assert!(path.windows(2).all(|w| manhattan(w[0], w[1]) == 1));
    }

    #[test]
    fn test_new_engine_setup() {
        let engine = GameEngine::new(test_config(1)).unwrap();
        let level = engine.level();

        assert_ne!(engine.spawn_room(), level.exit_room());
        assert_eq!(
            level.grid.room_containing_world(engine.player_position()),
            Some(engine.spawn_room())
        );

        let followers: Vec<_> = level
            .lighting
            .sources()
            .iter()
            .filter(|s| s.anchor == LightAnchor::Following(engine.player()))
            .collect();
        assert_eq!(followers.len(), 1);

        for (_, (_, room)) in engine.world().query::<(&Enemy, &SpawnRoom)>().iter() {
            assert_ne!(room.0, engine.spawn_room());
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = test_config(2);
        config.map.width = 0;
        assert!(matches!(GameEngine::new(config), Err(EngineError::Config(_))));

        let mut config = test_config(2);
        config.map.width = 12;
        assert!(matches!(GameEngine::new(config), Err(EngineError::Generation(_))));
    }

    #[test]
    fn test_fixed_timestep_accumulates() {
        let mut engine = GameEngine::new(test_config(3)).unwrap();
        assert_eq!(engine.tick(0.04), 2);
        // A huge frame runs at most the step budget and drops the rest
        assert_eq!(engine.tick(1.0), MAX_STEPS_PER_FRAME);
        assert_eq!(engine.tick(0.0), 0);
        assert_eq!(engine.step_count(), 2 + MAX_STEPS_PER_FRAME as u64);
    }

    #[test]
    fn test_auto_walk_heads_for_the_exit() {
        let mut engine = GameEngine::new(test_config(4)).unwrap();
        engine.tick(FIXED_TIMESTEP);
        let start = engine.player_position();
        let initial_steps = engine.level().pathfinder.path().len();
        assert!(initial_steps > 0);
        assert!(engine.marker().is_some());

        for _ in 0..300 {
            engine.tick(FIXED_TIMESTEP);
        }

        assert_ne!(engine.player_position(), start);
        let remaining = engine.level().pathfinder.path().len();
        assert!(engine.exit_reached() || remaining < initial_steps);
    }

    #[test]
    fn test_regenerate_swaps_everything() {
        let mut engine = GameEngine::new(test_config(5)).unwrap();
        let old_grid = Arc::clone(&engine.level().grid);
        engine.tick(FIXED_TIMESTEP);
        engine.drain_events().count();

        engine.regenerate().unwrap();
        assert!(!Arc::ptr_eq(&old_grid, &engine.level().grid));
        assert_eq!(engine.levels_generated(), 2);
        assert_eq!(engine.world().query::<&Player>().iter().count(), 1);
        assert_eq!(
            engine.level().grid.room_containing_world(engine.player_position()),
            Some(engine.spawn_room())
        );
        assert!(engine.route().next().is_none());

        let events: Vec<GameEvent> = engine.drain_events().collect();
        assert!(matches!(events.as_slice(), [GameEvent::LevelGenerated { .. }]));
    }

    #[test]
    fn test_shift_cycle_regenerates_and_resets_light() {
        let mut config = test_config(6);
        config.shift = ShiftConfig {
            enabled: true,
            delay_min: 0.5,
            delay_max: 0.5,
            heartbeat_lead: 0.25,
            fade_speed: 10.0,
            text_duration: 0.1,
        };
        let mut engine = GameEngine::new(config).unwrap();
        engine.drain_events().count();

        let mut seen = Vec::new();
        let mut heartbeat_seen = false;
        for _ in 0..300 {
            engine.tick(FIXED_TIMESTEP);
            let player_light = engine.level().lighting.sources()[engine.player_light];
            heartbeat_seen |= player_light.mode == LightMode::Heartbeat;
            seen.extend(engine.drain_events().filter(|e| {
                !matches!(e, GameEvent::PathLost(_) | GameEvent::ExitReached { .. })
            }));
            if seen.contains(&GameEvent::ShiftFinished) {
                break;
            }
        }

        assert!(heartbeat_seen);
        assert_eq!(seen[0], GameEvent::ShiftWarning);
        assert_eq!(seen[1], GameEvent::ShiftStarted);
        assert!(matches!(seen[2], GameEvent::LevelGenerated { .. }));
        assert_eq!(*seen.last().unwrap(), GameEvent::ShiftFinished);
        assert_eq!(engine.levels_generated(), 2);
        assert_eq!(engine.shift().phase(), ShiftPhase::Waiting);

        let player_light = engine.level().lighting.sources()[engine.player_light];
        assert_eq!(player_light.mode, LightMode::Static);
    }

    #[test]
    fn test_trigger_shift_with_timer_disabled() {
        let mut engine = GameEngine::new(test_config(8)).unwrap();
        engine.drain_events().count();
        engine.trigger_shift();

        let mut seen = Vec::new();
        for _ in 0..600 {
            engine.tick(FIXED_TIMESTEP);
            seen.extend(engine.drain_events().filter(|e| {
                !matches!(e, GameEvent::PathLost(_) | GameEvent::ExitReached { .. })
            }));
            if seen.contains(&GameEvent::ShiftFinished) {
                break;
            }
        }

        assert_eq!(seen[0], GameEvent::ShiftWarning);
        assert_eq!(seen[1], GameEvent::ShiftStarted);
        assert_eq!(seen.last(), Some(&GameEvent::ShiftFinished));
        assert_eq!(engine.levels_generated(), 2);
    }

    #[test]
    fn test_debug_light_bindings() {
        let mut engine = GameEngine::new(test_config(7)).unwrap();
        engine.adjust_decay(1.0);
        assert_eq!(engine.config().lighting.decay_factor, LIGHT_DECAY_FACTOR + LIGHT_DECAY_STEP);
        assert_eq!(engine.level().lighting.config().decay_factor, LIGHT_DECAY_FACTOR + LIGHT_DECAY_STEP);

        engine.adjust_light_radius(-1.0);
        let player_light = engine.level().lighting.sources()[engine.player_light];
        assert_eq!(player_light.radius, LIGHT_RADIUS - LIGHT_RADIUS_STEP);

        assert_eq!(engine.cycle_player_light_mode(), Some(LightMode::Shimmer));
    }

    #[test]
    fn test_lit_scene_is_dark_away_from_lights() {
        let mut engine = GameEngine::new(test_config(8)).unwrap();
        engine.tick(FIXED_TIMESTEP);
        let scene = engine.lit_scene();
        assert_eq!(scene.dimensions(), engine.level().grid.world_size());
        // The map corner is a wall far from any light
        assert_eq!(scene.get_pixel(0, 0).0[..3], [0, 0, 0]);

        let pos = engine.player_position();
        assert_ne!(scene.get_pixel(pos.x as u32, pos.y as u32).0[..3], [0, 0, 0]);
    }
}
