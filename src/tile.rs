/// Tile position in grid coordinates (x, y)
pub type TilePos = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileType {
    #[default]
    Wall,
    Floor,
}

impl TileType {
    pub fn is_walkable(&self) -> bool {
        matches!(self, TileType::Floor)
    }
}

/// Manhattan distance between two tiles
pub fn manhattan(a: TilePos, b: TilePos) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}
