//! Entity constants (player movement, spawn offsets).

/// Player walking speed in world pixels per second
pub const PLAYER_WALK_SPEED: f32 = 60.0;
/// Distance at which a steering waypoint counts as reached (world pixels)
pub const PLAYER_WAYPOINT_RADIUS: f32 = 2.0;
/// Recompute the guide path every this many fixed steps
pub const GUIDE_REPATH_INTERVAL: u32 = 15;
