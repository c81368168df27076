use crate::dungeon_gen::{Rect, Room};
use crate::tile::{TilePos, TileType};
use glam::Vec2;

/// Walkability grid of one dungeon level plus the rooms carved into it.
///
/// Built once by the generator and never mutated afterwards; the pathfinder and
/// the level share it behind an `Arc`. Border tiles are always walls.
#[derive(Debug, Clone)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    /// Size of one tile in world pixels
    pub tile_size: f32,
    tiles: Vec<TileType>,
    rooms: Vec<Room>,
}

impl TileGrid {
    /// A grid made entirely of walls.
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![TileType::Wall; width * height],
            rooms: Vec::new(),
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// True for the outermost ring of tiles
    pub fn is_border(&self, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == self.width as i32 - 1 || y == self.height as i32 - 1
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileType> {
        self.index(x, y).map(|idx| self.tiles[idx])
    }

    /// Out-of-bounds tiles are never walkable.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map(|t| t.is_walkable()).unwrap_or(false)
    }

    /// Set a tile. Border tiles stay walls no matter what is asked.
    pub(crate) fn set(&mut self, x: i32, y: i32, tile_type: TileType) {
        if self.is_border(x, y) {
            return;
        }
        if let Some(idx) = self.index(x, y) {
            self.tiles[idx] = tile_type;
        }
    }

    pub(crate) fn carve_rect(&mut self, rect: &Rect) {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                self.set(x, y, TileType::Floor);
            }
        }
    }

    pub(crate) fn push_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Index of the room whose rectangle contains the tile
    pub fn room_containing(&self, tile: TilePos) -> Option<usize> {
        self.rooms.iter().position(|room| room.rect.contains(tile.0, tile.1))
    }

    /// Same as `room_containing` for a world-space point
    pub fn room_containing_world(&self, point: Vec2) -> Option<usize> {
        self.room_containing(self.world_to_tile(point))
    }

    /// Walkable tiles not covered by any room rectangle
    pub fn corridor_tiles(&self) -> Vec<TilePos> {
        self.walkable_tiles()
            .into_iter()
            .filter(|&tile| self.room_containing(tile).is_none())
            .collect()
    }

    pub fn walkable_tiles(&self) -> Vec<TilePos> {
        (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_walkable(x, y))
            .collect()
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_walkable()).count()
    }

    /// World-space center of a tile
    pub fn tile_center(&self, tile: TilePos) -> Vec2 {
        Vec2::new(
            (tile.0 as f32 + 0.5) * self.tile_size,
            (tile.1 as f32 + 0.5) * self.tile_size,
        )
    }

    pub fn world_to_tile(&self, point: Vec2) -> TilePos {
        (
            (point.x / self.tile_size).floor() as i32,
            (point.y / self.tile_size).floor() as i32,
        )
    }

    /// Size of the whole map in world pixels
    pub fn world_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.tile_size) as u32,
            (self.height as f32 * self.tile_size) as u32,
        )
    }
}
