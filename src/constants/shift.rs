//! Dungeon shift timing.

/// Shortest delay before the dungeon shifts (seconds)
pub const SHIFT_DELAY_MIN: f32 = 40.0;
/// Longest delay before the dungeon shifts (seconds)
pub const SHIFT_DELAY_MAX: f32 = 80.0;
/// How long before the shift the heartbeat cue starts (seconds)
pub const SHIFT_HEARTBEAT_LEAD: f32 = 5.0;
/// Fade speed (alpha per second)
pub const SHIFT_FADE_SPEED: f32 = 1.0;
/// How long the shift text stays on a black screen (seconds)
pub const SHIFT_TEXT_DURATION: f32 = 2.0;
/// Message shown while the dungeon shifts
pub const SHIFT_TEXT: &str = "The dungeon shifts beneath your feet...";
