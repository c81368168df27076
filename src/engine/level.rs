//! One dungeon level: grid, pathfinder, props and lighting built together.
//!
//! A level is only ever replaced as a whole, so nothing outside can observe a
//! half-generated grid.

use super::props::{place_props, Prop};
use crate::config::GameConfig;
use crate::dungeon_gen::DungeonGenerator;
use crate::error::GenerationError;
use crate::grid::TileGrid;
use crate::lighting::{LightMode, LightingEngine};
use crate::pathfinding::Pathfinder;
use crate::tile::TilePos;
use glam::Vec2;
use image::{Rgba, RgbaImage};
use rand::Rng;
use std::sync::Arc;

const FLOOR_COLOR: Rgba<u8> = Rgba([150, 140, 125, 255]);
const WALL_COLOR: Rgba<u8> = Rgba([40, 36, 44, 255]);

pub struct Level {
    pub grid: Arc<TileGrid>,
    pub pathfinder: Pathfinder,
    pub props: Vec<Prop>,
    pub lighting: LightingEngine,
}

impl Level {
    pub fn generate(config: &GameConfig, rng: &mut impl Rng) -> Result<Self, GenerationError> {
        puffin::profile_function!();
        let generator = DungeonGenerator::new(config.dungeon.clone(), config.map.tile_size);
        let grid = Arc::new(generator.generate(config.map.width, config.map.height, rng)?);

        let props = place_props(&grid, rng);
        let (world_width, world_height) = grid.world_size();
        let mut lighting = LightingEngine::new(config.lighting.clone(), world_width, world_height, rng);
        for prop in &props {
            lighting.add_static(prop.position, prop.light_radius, LightMode::Static);
        }

        let pathfinder = Pathfinder::new(Arc::clone(&grid));
        Ok(Self {
            grid,
            pathfinder,
            props,
            lighting,
        })
    }

    /// Pick the player's start: any room except the last one, which is the exit.
    /// Returns the room index and its world-space center.
    pub fn player_spawn(&self, rng: &mut impl Rng) -> (usize, Vec2) {
        let rooms = self.grid.rooms();
        let room = if rooms.len() > 1 {
            rng.gen_range(0..rooms.len() - 1)
        } else {
            0
        };
        let center = rooms
            .get(room)
            .map(|r| self.grid.tile_center(r.center()))
            .unwrap_or(Vec2::ZERO);
        (room, center)
    }

    pub fn exit_room(&self) -> usize {
        self.grid.rooms().len().saturating_sub(1)
    }

    /// Center tile of the exit room
    pub fn exit_tile(&self) -> Option<TilePos> {
        self.grid.rooms().last().map(|r| r.center())
    }

    /// Flat-shaded world image of the level, one colour per tile
    pub fn scene(&self) -> RgbaImage {
        let (width, height) = self.grid.world_size();
        RgbaImage::from_fn(width, height, |x, y| {
            let pos = self.grid.world_to_tile(Vec2::new(x as f32, y as f32) + Vec2::splat(0.5));
            if self.grid.is_walkable(pos.0, pos.1) {
                FLOOR_COLOR
            } else {
                WALL_COLOR
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::LightAnchor;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.map.width = 60;
        config.map.height = 60;
        config
    }

    #[test]
    fn test_level_lights_every_prop() {
        let mut rng = StdRng::seed_from_u64(21);
        let level = Level::generate(&small_config(), &mut rng).unwrap();
        assert_eq!(level.lighting.sources().len(), level.props.len());
        assert!(level
            .lighting
            .sources()
            .iter()
            .all(|s| matches!(s.anchor, LightAnchor::Static(_))));
        assert!(Arc::ptr_eq(&level.grid, level.pathfinder.grid()));
    }

    #[test]
    fn test_player_never_spawns_in_exit_room() {
        let mut rng = StdRng::seed_from_u64(22);
        let level = Level::generate(&small_config(), &mut rng).unwrap();
        for _ in 0..50 {
            let (room, center) = level.player_spawn(&mut rng);
            assert_ne!(room, level.exit_room());
            assert_eq!(level.grid.room_containing_world(center), Some(room));
        }
    }

    #[test]
    fn test_scene_matches_grid() {
        let mut rng = StdRng::seed_from_u64(23);
        let level = Level::generate(&small_config(), &mut rng).unwrap();
        let scene = level.scene();
        assert_eq!(scene.dimensions(), level.grid.world_size());
        assert_eq!(*scene.get_pixel(0, 0), WALL_COLOR);

        let center = level.grid.tile_center(level.grid.rooms()[0].center());
        assert_eq!(*scene.get_pixel(center.x as u32, center.y as u32), FLOOR_COLOR);
    }

    #[test]
    fn test_too_small_map_fails_as_a_unit() {
        let mut config = small_config();
        config.map.width = 10;
        let mut rng = StdRng::seed_from_u64(24);
        assert!(matches!(
            Level::generate(&config, &mut rng),
            Err(GenerationError::MapTooSmall { .. })
        ));
    }
}
