//! Data-driven entity spawning.
//!
//! How much ends up in a room depends only on its size class; the tables live
//! here so that tuning never touches placement code.

use crate::components::{Collectible, Enemy, EnemyKind, ItemKind, Position, SpawnRoom, Speed};
use crate::dungeon_gen::{Room, RoomSize};
use crate::grid::TileGrid;
use crate::tile::TilePos;
use glam::Vec2;
use hecs::World;
use rand::Rng;

/// What a room of one size class receives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomDensity {
    /// Inclusive enemy count range
    pub enemies: (usize, usize),
    /// Inclusive item count range
    pub items: (usize, usize),
    /// Radius of the room's fire lights in world pixels
    pub light_radius: f32,
    /// Scale of the room's fire props
    pub prop_scale: f32,
}

impl RoomDensity {
    pub fn for_size(size: RoomSize) -> Self {
        match size {
            RoomSize::Small => Self {
                enemies: (1, 2),
                items: (1, 2),
                light_radius: 40.0,
                prop_scale: 0.6,
            },
            RoomSize::Medium => Self {
                enemies: (2, 4),
                items: (1, 2),
                light_radius: 50.0,
                prop_scale: 0.8,
            },
            RoomSize::Large => Self {
                enemies: (4, 7),
                items: (2, 3),
                light_radius: 60.0,
                prop_scale: 1.0,
            },
        }
    }
}

/// Where a room's lights go: the center for small rooms, four quarter offsets otherwise
pub fn light_positions(room: &Room, tile_size: f32) -> Vec<Vec2> {
    let rect = room.rect;
    let center = Vec2::new(
        (rect.x as f32 + rect.width as f32 / 2.0) * tile_size,
        (rect.y as f32 + rect.height as f32 / 2.0) * tile_size,
    );
    match room.size {
        RoomSize::Small => vec![center],
        RoomSize::Medium | RoomSize::Large => {
            let dx = rect.width as f32 * tile_size / 4.0;
            let dy = rect.height as f32 * tile_size / 4.0;
            vec![
                center + Vec2::new(-dx, -dy),
                center + Vec2::new(dx, -dy),
                center + Vec2::new(-dx, dy),
                center + Vec2::new(dx, dy),
            ]
        }
    }
}

/// Definition of an enemy type - all the data needed to spawn one
#[derive(Debug, Clone, Copy)]
pub struct EnemyDef {
    /// Display name (for logs)
    pub name: &'static str,
    pub kind: EnemyKind,
    /// Walking speed in world pixels per second
    pub speed: f32,
}

impl EnemyDef {
    pub fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Spider => enemies::SPIDER,
            EnemyKind::Skeleton => enemies::SKELETON,
            EnemyKind::Goblin => enemies::GOBLIN,
        }
    }

    /// Spawn this enemy type at the given world position
    pub fn spawn(&self, world: &mut World, position: Vec2, room: usize) -> hecs::Entity {
        log::trace!("{} in room {} at ({:.0}, {:.0})", self.name, room, position.x, position.y);
        world.spawn((
            Position(position),
            Enemy { kind: self.kind },
            Speed(self.speed),
            SpawnRoom(room),
        ))
    }
}

/// Predefined enemy types
pub mod enemies {
    use super::*;

    pub const SPIDER: EnemyDef = EnemyDef {
        name: "Spider",
        kind: EnemyKind::Spider,
        speed: 45.0,
    };

    pub const SKELETON: EnemyDef = EnemyDef {
        name: "Skeleton",
        kind: EnemyKind::Skeleton,
        speed: 30.0,
    };

    pub const GOBLIN: EnemyDef = EnemyDef {
        name: "Goblin",
        kind: EnemyKind::Goblin,
        speed: 40.0,
    };
}

/// Counts of what one spawn pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnSummary {
    pub enemies: usize,
    pub items: usize,
}

/// Fill every room except `skip_room` (the player's start) with enemies and items.
pub fn spawn_level(
    world: &mut World,
    grid: &TileGrid,
    skip_room: Option<usize>,
    rng: &mut impl Rng,
) -> SpawnSummary {
    let mut summary = SpawnSummary::default();

    for (index, room) in grid.rooms().iter().enumerate() {
        if Some(index) == skip_room {
            continue;
        }
        let density = RoomDensity::for_size(room.size);
        let mut free = interior_tiles(grid, room);

        let enemy_count = rng.gen_range(density.enemies.0..=density.enemies.1);
        for _ in 0..enemy_count {
            let Some(tile) = take_random(&mut free, rng) else {
                break;
            };
            let kind = EnemyKind::ALL[rng.gen_range(0..EnemyKind::ALL.len())];
            EnemyDef::for_kind(kind).spawn(world, grid.tile_center(tile), index);
            summary.enemies += 1;
        }

        let item_count = rng.gen_range(density.items.0..=density.items.1);
        for _ in 0..item_count {
            let Some(tile) = take_random(&mut free, rng) else {
                break;
            };
            let kind = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
            world.spawn((Position(grid.tile_center(tile)), Collectible { kind }, SpawnRoom(index)));
            summary.items += 1;
        }
    }

    log::debug!("spawned {} enemies and {} items", summary.enemies, summary.items);
    summary
}

/// Walkable tiles of a room away from its walls
fn interior_tiles(grid: &TileGrid, room: &Room) -> Vec<TilePos> {
    let rect = room.rect;
    (rect.y + 1..rect.y + rect.height - 1)
        .flat_map(|y| (rect.x + 1..rect.x + rect.width - 1).map(move |x| (x, y)))
        .filter(|&(x, y)| grid.is_walkable(x, y))
        .collect()
}

fn take_random(tiles: &mut Vec<TilePos>, rng: &mut impl Rng) -> Option<TilePos> {
    if tiles.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..tiles.len());
    Some(tiles.swap_remove(idx))
}
