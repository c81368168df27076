//! Lighting engine constants.

/// Exponential falloff steepness of every light
pub const LIGHT_DECAY_FACTOR: f32 = 5.5;
/// Radius of the player's light in world pixels
pub const LIGHT_RADIUS: f32 = 98.0;
/// Stride (world pixels) of one light mask cell
pub const LIGHT_PIXEL_SIZE: u32 = 2;
/// Boost applied to the falloff so the center stays fully lit
pub const LIGHT_CENTER_BOOST: f32 = 1.5;
/// Step applied by the decay debug binding
pub const LIGHT_DECAY_STEP: f32 = 0.25;
/// Step applied by the radius debug binding
pub const LIGHT_RADIUS_STEP: f32 = 0.5;
/// Frequency used to sample the Perlin noise field
pub const LIGHT_NOISE_FREQUENCY: f64 = 0.37;

/// Radius of the light cast by a corridor fire
pub const CORRIDOR_LIGHT_RADIUS: f32 = 20.0;
/// Scale of corridor fire props
pub const CORRIDOR_PROP_SCALE: f32 = 0.5;
/// Chance that a corridor tile tries to host a fire
pub const CORRIDOR_PROP_CHANCE: f32 = 0.4;
/// Minimum distance in world pixels between two props
pub const PROP_MIN_DISTANCE: f32 = 100.0;
