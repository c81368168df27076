//! Dungeon generation constants.

/// Size of one tile in world pixels
pub const TILE_SIZE: f32 = 16.0;
/// Default dungeon width in tiles
pub const DUNGEON_DEFAULT_WIDTH: usize = 100;
/// Default dungeon height in tiles
pub const DUNGEON_DEFAULT_HEIGHT: usize = 100;

/// Number of BSP divisions before rooms are placed
pub const DUNGEON_MAX_DEPTH: u32 = 5;
/// A side must be at least twice this long to be split
pub const DUNGEON_MIN_ROOM_SIZE: i32 = 5;
/// Lower bound of the random split ratio
pub const DUNGEON_SPLIT_RATIO_MIN: f32 = 0.4;
/// Upper bound of the random split ratio
pub const DUNGEON_SPLIT_RATIO_MAX: f32 = 0.6;
/// Free tiles a leaf must have around its room (split between both sides)
pub const DUNGEON_LEAF_MARGIN: i32 = 3;
/// Random placements tried per leaf before giving up on it
pub const DUNGEON_MAX_PLACEMENT_ATTEMPTS: u32 = 100;
/// Fewest rooms an accepted layout may have
pub const DUNGEON_MIN_ROOMS: usize = 3;
/// Full split-and-fill passes before falling back to the fixed layout
pub const DUNGEON_MAX_GENERATION_ATTEMPTS: u32 = 64;

/// Chance of carving a corridor for an edge the spanning tree rejected
pub const DUNGEON_EXTRA_CORRIDOR_CHANCE: f64 = 0.2;
/// Chance of widening a corridor step to the wide radius
pub const DUNGEON_WIDE_CORRIDOR_CHANCE: f32 = 0.3;
/// Disk radius carved at every corridor step
pub const CORRIDOR_RADIUS: i32 = 2;
/// Disk radius for wide steps and segment endpoints
pub const CORRIDOR_WIDE_RADIUS: i32 = 3;
/// Max offset (tiles) of a corridor's intermediate control point
pub const CORRIDOR_CONTROL_JITTER: i32 = 2;
/// Floor neighbours (out of 8) that turn a wall tile into floor when smoothing
pub const CORRIDOR_SMOOTHING_NEIGHBOURS: usize = 5;

/// Side length of the rooms used by the fallback layout
pub const FALLBACK_ROOM_SIZE: i32 = 6;
/// Gap in tiles between fallback rooms
pub const FALLBACK_ROOM_GAP: i32 = 3;

/// Padding added on top of every size class range
pub const ROOM_SIZE_PADDING: i32 = 3;
/// Small room side range before padding (inclusive)
pub const SMALL_ROOM_SIDE: (i32, i32) = (3, 6);
/// Medium room side range before padding (inclusive)
pub const MEDIUM_ROOM_SIDE: (i32, i32) = (6, 9);
/// Large room side range before padding (inclusive)
pub const LARGE_ROOM_SIDE: (i32, i32) = (9, 15);

/// Chance of a Large room at the shallowest leaf
pub const LARGE_ROOM_BASE_CHANCE: f32 = 0.05;
/// Extra Large-room chance per BSP level of depth
pub const LARGE_ROOM_CHANCE_PER_DEPTH: f32 = 0.05;
/// Share of the non-Large rolls that become Small rooms
pub const SMALL_ROOM_SHARE: f32 = 0.6;
