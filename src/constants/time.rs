//! Frame loop timing.

/// Length of one fixed simulation step (seconds)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
/// Most fixed steps run for a single frame before dropping time
pub const MAX_STEPS_PER_FRAME: u32 = 5;
/// Frames the headless driver runs by default
pub const DEFAULT_FRAME_COUNT: u32 = 600;
