use crate::config::DungeonConfig;
use crate::constants::*;
use crate::error::GenerationError;
use crate::grid::TileGrid;
use crate::tile::{TilePos, TileType};
use rand::Rng;

/// A rectangle representing a room or region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Size class of a room. Drives room dimensions and how much gets spawned in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomSize {
    Small,
    Medium,
    Large,
}

impl RoomSize {
    /// Inclusive side length range in tiles, padding included
    pub fn side_range(&self) -> (i32, i32) {
        let (min, max) = match self {
            RoomSize::Small => SMALL_ROOM_SIDE,
            RoomSize::Medium => MEDIUM_ROOM_SIDE,
            RoomSize::Large => LARGE_ROOM_SIDE,
        };
        (min + ROOM_SIZE_PADDING, max + ROOM_SIZE_PADDING)
    }

    fn roll_dimensions(&self, rng: &mut impl Rng) -> (i32, i32) {
        let (min, max) = self.side_range();
        (rng.gen_range(min..=max), rng.gen_range(min..=max))
    }

    /// Pick a size class for a leaf at the given BSP depth.
    /// Deeper leaves lean towards large rooms.
    fn roll(depth: u32, rng: &mut impl Rng) -> Self {
        let large_chance =
            (LARGE_ROOM_BASE_CHANCE + LARGE_ROOM_CHANCE_PER_DEPTH * depth as f32).min(1.0);
        if rng.gen::<f32>() < large_chance {
            RoomSize::Large
        } else if rng.gen::<f32>() < SMALL_ROOM_SHARE {
            RoomSize::Small
        } else {
            RoomSize::Medium
        }
    }
}

/// A placed room. Immutable once the generator hands the grid over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    pub rect: Rect,
    pub size: RoomSize,
}

impl Room {
    pub fn new(rect: Rect, size: RoomSize) -> Self {
        Self { rect, size }
    }

    pub fn center(&self) -> TilePos {
        self.rect.center()
    }

    /// Euclidean distance between the exact centers of two rooms
    fn distance_to(&self, other: &Room) -> f32 {
        let (ax, ay) = (
            self.rect.x as f32 + self.rect.width as f32 / 2.0,
            self.rect.y as f32 + self.rect.height as f32 / 2.0,
        );
        let (bx, by) = (
            other.rect.x as f32 + other.rect.width as f32 / 2.0,
            other.rect.y as f32 + other.rect.height as f32 / 2.0,
        );
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// A node in the BSP tree. Either a leaf (gets a room) or an internal node (has two children).
struct BspNode {
    /// The region this node covers
    region: Rect,
    depth: u32,
    /// Left/top child after split
    left: Option<Box<BspNode>>,
    /// Right/bottom child after split
    right: Option<Box<BspNode>>,
}

impl BspNode {
    fn new(region: Rect, depth: u32) -> Self {
        Self {
            region,
            depth,
            left: None,
            right: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Recursively split this node until `max_depth` is reached.
    fn split(&mut self, config: &DungeonConfig, rng: &mut impl Rng) {
        if self.depth >= config.max_depth {
            return;
        }

        let min_side = config.min_room_size * 2;
        let can_split_x = self.region.width > min_side;
        let can_split_y = self.region.height > min_side;

        // Prefer cutting across the longer side; a region too thin both ways stays a leaf
        let split_vertically = match (can_split_x, can_split_y) {
            (false, false) => return,
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                if self.region.width > self.region.height {
                    true
                } else if self.region.height > self.region.width {
                    false
                } else {
                    rng.gen_bool(0.5)
                }
            }
        };

        let ratio = rng.gen_range(config.split_ratio_min..=config.split_ratio_max);
        let r = self.region;

        let (first, second) = if split_vertically {
            let split = ((r.width as f32 * ratio) as i32).clamp(1, r.width - 1);
            (
                Rect::new(r.x, r.y, split, r.height),
                Rect::new(r.x + split, r.y, r.width - split, r.height),
            )
        } else {
            let split = ((r.height as f32 * ratio) as i32).clamp(1, r.height - 1);
            (
                Rect::new(r.x, r.y, r.width, split),
                Rect::new(r.x, r.y + split, r.width, r.height - split),
            )
        };

        let mut left = Box::new(BspNode::new(first, self.depth + 1));
        let mut right = Box::new(BspNode::new(second, self.depth + 1));
        left.split(config, rng);
        right.split(config, rng);
        self.left = Some(left);
        self.right = Some(right);
    }

    /// Try to place one room in each leaf, left subtree first.
    fn create_rooms(&self, config: &DungeonConfig, rooms: &mut Vec<Room>, rng: &mut impl Rng) {
        if !self.is_leaf() {
            if let Some(ref left) = self.left {
                left.create_rooms(config, rooms, rng);
            }
            if let Some(ref right) = self.right {
                right.create_rooms(config, rooms, rng);
            }
            return;
        }

        let size = RoomSize::roll(self.depth, rng);
        let (width, height) = size.roll_dimensions(rng);

        let slack_x = self.region.width - width;
        let slack_y = self.region.height - height;
        if slack_x < config.leaf_margin || slack_y < config.leaf_margin {
            return; // Region too small for this room
        }

        for _ in 0..config.max_placement_attempts {
            // Keep at least one free tile on each side of the room inside its leaf
            let x = self.region.x + 1 + rng.gen_range(0..=slack_x - 2);
            let y = self.region.y + 1 + rng.gen_range(0..=slack_y - 2);
            let rect = Rect::new(x, y, width, height);

            if rooms.iter().all(|room| !room.rect.intersects(&rect)) {
                rooms.push(Room::new(rect, size));
                return;
            }
        }
    }
}

/// Disjoint-set forest over room indices, used to build the spanning tree
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge two sets. Returns false if they were already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

/// Counts reported after corridors are carved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorridorStats {
    pub tree_edges: usize,
    pub extra_edges: usize,
}

/// Builds dungeon levels: BSP room placement, spanning-tree corridors, organic carving.
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    config: DungeonConfig,
    tile_size: f32,
}

impl DungeonGenerator {
    pub fn new(config: DungeonConfig, tile_size: f32) -> Self {
        Self { config, tile_size }
    }

    /// Smallest map the generator accepts: the fallback layout must fit.
    pub fn min_dimensions(&self) -> (usize, usize) {
        let rooms = self.config.min_rooms.max(1) as i32;
        let width = 2 + FALLBACK_ROOM_GAP + rooms * (FALLBACK_ROOM_SIZE + FALLBACK_ROOM_GAP);
        let height = 2 + FALLBACK_ROOM_SIZE + 2 * FALLBACK_ROOM_GAP;
        (width as usize, height as usize)
    }

    /// Reject configurations that could never produce a valid level.
    pub fn validate(&self, width: usize, height: usize) -> Result<(), GenerationError> {
        let c = &self.config;
        if !(c.split_ratio_min > 0.0 && c.split_ratio_max < 1.0 && c.split_ratio_min <= c.split_ratio_max) {
            return Err(GenerationError::InvalidConfig(format!(
                "split ratio range {}..{} must lie inside (0, 1)",
                c.split_ratio_min, c.split_ratio_max
            )));
        }
        if !(0.0..=1.0).contains(&c.extra_corridor_chance) || !(0.0..=1.0).contains(&c.wide_corridor_chance) {
            return Err(GenerationError::InvalidConfig(
                "corridor chances must be probabilities".to_string(),
            ));
        }
        if c.min_rooms == 0 || c.max_generation_attempts == 0 {
            return Err(GenerationError::InvalidConfig(
                "min_rooms and max_generation_attempts must be positive".to_string(),
            ));
        }
        if c.min_room_size < 1 || c.leaf_margin < 2 {
            return Err(GenerationError::InvalidConfig(
                "min_room_size must be positive and leaf_margin at least 2".to_string(),
            ));
        }

        let (min_width, min_height) = self.min_dimensions();
        if width < min_width || height < min_height {
            return Err(GenerationError::MapTooSmall {
                width,
                height,
                min_width,
                min_height,
            });
        }
        Ok(())
    }

    /// Generate a fresh level of the given size in tiles.
    pub fn generate(
        &self,
        width: usize,
        height: usize,
        rng: &mut impl Rng,
    ) -> Result<TileGrid, GenerationError> {
        puffin::profile_function!();
        self.validate(width, height)?;

        let interior = Rect::new(1, 1, width as i32 - 2, height as i32 - 2);
        let mut rooms = Vec::new();
        let mut attempts = 0;

        while rooms.len() < self.config.min_rooms {
            if attempts >= self.config.max_generation_attempts {
                log::warn!(
                    "BSP produced fewer than {} rooms after {} passes, using fallback layout",
                    self.config.min_rooms,
                    attempts
                );
                rooms = self.fallback_layout(height);
                break;
            }
            attempts += 1;
            rooms = self.place_rooms(interior, rng);
        }

        let mut grid = TileGrid::new(width, height, self.tile_size);
        for room in rooms {
            grid.carve_rect(&room.rect);
            grid.push_room(room);
        }

        let stats = self.connect_rooms(&mut grid, rng);
        smooth_corridors(&mut grid);

        log::debug!(
            "generated {}x{} level: {} rooms in {} passes, {} tree corridors, {} loops, {} floor tiles",
            width,
            height,
            grid.rooms().len(),
            attempts,
            stats.tree_edges,
            stats.extra_edges,
            grid.floor_count()
        );

        Ok(grid)
    }

    /// One full split-and-fill pass
    fn place_rooms(&self, interior: Rect, rng: &mut impl Rng) -> Vec<Room> {
        puffin::profile_scope!("bsp_place_rooms");
        let mut root = BspNode::new(interior, 0);
        root.split(&self.config, rng);

        let mut rooms = Vec::new();
        root.create_rooms(&self.config, &mut rooms, rng);
        rooms
    }

    /// Fixed rooms in a horizontal line through the middle of the map.
    fn fallback_layout(&self, height: usize) -> Vec<Room> {
        let y = (height as i32 - FALLBACK_ROOM_SIZE) / 2;
        (0..self.config.min_rooms as i32)
            .map(|i| {
                let x = 1 + FALLBACK_ROOM_GAP + i * (FALLBACK_ROOM_SIZE + FALLBACK_ROOM_GAP);
                Room::new(
                    Rect::new(x, y, FALLBACK_ROOM_SIZE, FALLBACK_ROOM_SIZE),
                    RoomSize::Small,
                )
            })
            .collect()
    }

    /// Connect rooms with a minimum spanning tree over center distances (Kruskal),
    /// then add a few of the rejected edges back to create loops.
    fn connect_rooms(&self, grid: &mut TileGrid, rng: &mut impl Rng) -> CorridorStats {
        puffin::profile_scope!("connect_rooms");
        let rooms = grid.rooms().to_vec();
        let mut stats = CorridorStats::default();
        if rooms.len() < 2 {
            return stats;
        }

        let mut edges: Vec<(usize, usize, f32)> = Vec::new();
        for i in 0..rooms.len() {
            for j in i + 1..rooms.len() {
                edges.push((i, j, rooms[i].distance_to(&rooms[j])));
            }
        }
        edges.sort_by(|a, b| a.2.total_cmp(&b.2));

        let mut sets = UnionFind::new(rooms.len());
        let mut rejected = Vec::new();
        for &(a, b, _) in &edges {
            if sets.union(a, b) {
                self.carve_corridor(grid, rooms[a].center(), rooms[b].center(), rng);
                stats.tree_edges += 1;
            } else {
                rejected.push((a, b));
            }
        }

        for (a, b) in rejected {
            if rng.gen_bool(self.config.extra_corridor_chance) {
                self.carve_corridor(grid, rooms[a].center(), rooms[b].center(), rng);
                stats.extra_edges += 1;
            }
        }

        stats
    }

    /// Carve an organic corridor through 2-3 control points between two room centers.
    fn carve_corridor(&self, grid: &mut TileGrid, start: TilePos, end: TilePos, rng: &mut impl Rng) {
        let mut points = vec![start];
        if rng.gen_range(2..=3) == 3 {
            let jitter = CORRIDOR_CONTROL_JITTER;
            let mid_x = (start.0 + end.0) / 2 + rng.gen_range(-jitter..=jitter);
            let mid_y = (start.1 + end.1) / 2 + rng.gen_range(-jitter..=jitter);
            points.push((
                mid_x.clamp(1, grid.width as i32 - 2),
                mid_y.clamp(1, grid.height as i32 - 2),
            ));
        }
        points.push(end);

        for segment in points.windows(2) {
            self.carve_segment(grid, segment[0], segment[1], rng);
        }
    }

    /// Walk a discretized line between two points, carving a disk at every step.
    fn carve_segment(&self, grid: &mut TileGrid, start: TilePos, end: TilePos, rng: &mut impl Rng) {
        carve_disk(grid, start, CORRIDOR_WIDE_RADIUS);

        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let steps = dx.abs().max(dy.abs());
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let point = (
                start.0 + (dx as f32 * t).round() as i32,
                start.1 + (dy as f32 * t).round() as i32,
            );
            carve_disk(grid, point, CORRIDOR_RADIUS);
            if rng.gen::<f32>() < self.config.wide_corridor_chance {
                carve_disk(grid, point, CORRIDOR_WIDE_RADIUS);
            }
        }

        carve_disk(grid, end, CORRIDOR_WIDE_RADIUS);
    }
}

fn carve_disk(grid: &mut TileGrid, center: TilePos, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                grid.set(center.0 + dx, center.1 + dy, TileType::Floor);
            }
        }
    }
}

/// Fill wall tiles mostly surrounded by floor so diagonal gaps never block movement.
fn smooth_corridors(grid: &mut TileGrid) {
    let mut to_fill = Vec::new();
    for y in 1..grid.height as i32 - 1 {
        for x in 1..grid.width as i32 - 1 {
            if grid.is_walkable(x, y) {
                continue;
            }
            let floor_neighbours = (-1..=1)
                .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                .filter(|&(dx, dy)| (dx, dy) != (0, 0) && grid.is_walkable(x + dx, y + dy))
                .count();
            if floor_neighbours >= CORRIDOR_SMOOTHING_NEIGHBOURS {
                to_fill.push((x, y));
            }
        }
    }
    for (x, y) in to_fill {
        grid.set(x, y, TileType::Floor);
    }
}
