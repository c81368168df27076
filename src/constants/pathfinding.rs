//! Pathfinding and guide marker constants.

/// Jitter applied to each path node, as a fraction of a tile
pub const PATH_NODE_JITTER: f32 = 0.5;
/// Jitter applied to interpolated points, as a fraction of a tile
pub const PATH_INTERMEDIATE_JITTER: f32 = 0.3;
/// Segments longer than this many tiles get intermediate points
pub const PATH_DENSIFY_THRESHOLD: f32 = 1.5;
/// Manhattan distance of a "significant" waypoint
pub const PATH_WAYPOINT_DISTANCE: i32 = 3;

/// How many nodes ahead the guide marker looks
pub const GUIDE_LOOKAHEAD_NODES: usize = 5;
/// How far ahead of the walker the marker sits, in tiles
pub const GUIDE_LEAD_TILES: f32 = 2.5;
/// Per-frame lerp factor of the marker (lower = smoother)
pub const GUIDE_SMOOTHING: f32 = 0.1;
/// Marker pulse frequency (radians per second)
pub const GUIDE_PULSE_SPEED: f32 = 3.0;
/// Star points of the marker outline
pub const GUIDE_STAR_POINTS: usize = 4;
