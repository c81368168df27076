//! Retro per-cell lighting.
//!
//! Every frame the mask is cleared to black and each source paints its disk
//! onto it through its mode. The scene is then multiplied by the mask.

mod mask;
mod modes;
mod source;

pub use mask::LightMask;
pub use modes::{hsv_to_rgb, CellSample, LightMode, ModeFrame, Shade};
pub use source::{LightAnchor, LightSource, PositionLookup};

use crate::config::LightingConfig;
use crate::error::LightingError;
use glam::Vec2;
use hecs::Entity;
use image::RgbaImage;
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::f32::consts::TAU;

pub struct LightingEngine {
    config: LightingConfig,
    sources: Vec<LightSource>,
    mask: LightMask,
    /// One value in [0, 1] per mask cell
    noise: Vec<f32>,
    time: f32,
    rng: StdRng,
    /// Followed entities already reported as gone
    lost: HashSet<Entity>,
}

impl LightingEngine {
    pub fn new(config: LightingConfig, world_width: u32, world_height: u32, rng: &mut impl Rng) -> Self {
        let mask = LightMask::new(world_width, world_height, config.pixel_size);
        let perlin = Perlin::new(rng.gen());
        let frequency = config.noise_frequency;
        let noise = (0..mask.height())
            .flat_map(|y| (0..mask.width()).map(move |x| (x, y)))
            .map(|(x, y)| {
                let n = perlin.get([x as f64 * frequency, y as f64 * frequency]);
                ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32
            })
            .collect();

        Self {
            config,
            sources: Vec::new(),
            mask,
            noise,
            time: 0.0,
            rng: StdRng::seed_from_u64(rng.gen()),
            lost: HashSet::new(),
        }
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    pub fn sources(&self) -> &[LightSource] {
        &self.sources
    }

    pub fn mask(&self) -> &LightMask {
        &self.mask
    }

    /// Seconds of light animation so far
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Add a light and return its index
    pub fn add_source(&mut self, position: Vec2, following: Option<Entity>, radius: f32, mode: LightMode) -> usize {
        let anchor = match following {
            Some(entity) => LightAnchor::Following(entity),
            None => LightAnchor::Static(position),
        };
        self.sources.push(LightSource { anchor, radius, mode });
        self.sources.len() - 1
    }

    pub fn add_static(&mut self, position: Vec2, radius: f32, mode: LightMode) -> usize {
        self.add_source(position, None, radius, mode)
    }

    pub fn add_following(&mut self, entity: Entity, radius: f32, mode: LightMode) -> usize {
        self.add_source(Vec2::ZERO, Some(entity), radius, mode)
    }

    pub fn set_source_mode(&mut self, index: usize, mode: LightMode) -> Result<(), LightingError> {
        let source = self
            .sources
            .get_mut(index)
            .ok_or(LightingError::NoSuchSource(index))?;
        source.mode = mode;
        Ok(())
    }

    pub fn set_all_modes(&mut self, mode: LightMode) {
        for source in &mut self.sources {
            source.mode = mode;
        }
    }

    /// Cycle a source to the next mode and return it
    pub fn next_mode(&mut self, index: usize) -> Result<LightMode, LightingError> {
        let source = self
            .sources
            .get_mut(index)
            .ok_or(LightingError::NoSuchSource(index))?;
        source.mode = source.mode.next();
        log::info!("light {} mode -> {}", index, source.mode);
        Ok(source.mode)
    }

    /// Drop every static light, keeping the ones that follow entities
    pub fn clear_static_sources(&mut self) {
        self.sources.retain(|s| s.is_following());
    }

    pub fn set_decay_factor(&mut self, decay: f32) {
        self.config.decay_factor = decay.max(0.0);
    }

    /// Set the global light radius; following lights pick it up immediately
    pub fn set_light_radius(&mut self, radius: f32) {
        self.config.light_radius = radius.max(0.0);
        for source in self.sources.iter_mut().filter(|s| s.is_following()) {
            source.radius = self.config.light_radius;
        }
    }

    /// Whether a followed entity was missing on the last update
    pub fn is_lost(&self, entity: Entity) -> bool {
        self.lost.contains(&entity)
    }

    /// Advance time and redraw the mask from scratch.
    pub fn update(&mut self, dt: f32, positions: &impl PositionLookup) {
        puffin::profile_function!();
        self.time += dt;
        self.mask.clear();

        for index in 0..self.sources.len() {
            let source = self.sources[index];
            match source.center(positions) {
                Some(center) => {
                    if let LightAnchor::Following(entity) = source.anchor {
                        self.lost.remove(&entity);
                    }
                    self.draw_source(center, source.radius, source.mode)
                }
                None => {
                    if let LightAnchor::Following(entity) = source.anchor {
                        if self.lost.insert(entity) {
                            log::warn!("light {} follows a missing entity {:?}, skipping it", index, entity);
                        }
                    }
                }
            }
        }
    }

    fn draw_source(&mut self, center: Vec2, radius: f32, mode: LightMode) {
        let frame = mode.prepare(self.time, &mut self.rng);
        let radius = radius * frame.radius_scale;
        if radius <= 0.0 {
            return;
        }

        let pixel = self.mask.pixel_size() as f32;
        let max_x = self.mask.width() as i64 - 1;
        let max_y = self.mask.height() as i64 - 1;
        let min_cx = (((center.x - radius) / pixel).floor() as i64).clamp(0, max_x);
        let max_cx = (((center.x + radius) / pixel).ceil() as i64).clamp(0, max_x);
        let min_cy = (((center.y - radius) / pixel).floor() as i64).clamp(0, max_y);
        let max_cy = (((center.y + radius) / pixel).ceil() as i64).clamp(0, max_y);

        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                // Cells are sampled at their top-left world pixel
                let offset = Vec2::new(cx as f32 * pixel, cy as f32 * pixel) - center;
                let distance = offset.length();
                if distance >= radius {
                    continue;
                }

                let intensity =
                    ((-self.config.decay_factor * distance / radius).exp() * self.config.center_boost).min(1.0);
                let ring = center + Vec2::new((intensity * TAU).cos(), (intensity * TAU).sin()) * radius;
                let cell = CellSample {
                    intensity,
                    radius,
                    angle: offset.y.atan2(offset.x),
                    noise: self.noise_at(ring),
                };
                let shade = mode.shade(&frame, &cell, self.time, &mut self.rng);
                self.mask.blend(cx as u32, cy as u32, shade.color, shade.alpha);
            }
        }
    }

    /// Noise value of the cell under a world point, wrapping at the edges
    fn noise_at(&self, point: Vec2) -> f32 {
        let pixel = self.mask.pixel_size() as f32;
        let width = self.mask.width() as i64;
        let height = self.mask.height() as i64;
        let x = ((point.x / pixel) as i64).rem_euclid(width);
        let y = ((point.y / pixel) as i64).rem_euclid(height);
        self.noise[(y * width + x) as usize]
    }

    /// Multiply a world-sized scene by the light mask.
    pub fn render(&self, scene: &mut RgbaImage) {
        puffin::profile_function!();
        for (x, y, pixel) in scene.enumerate_pixels_mut() {
            let light = self.mask.at_world(x, y).map(|p| p.0).unwrap_or([0, 0, 0, 255]);
            for channel in 0..3 {
                pixel.0[channel] = ((pixel.0[channel] as u16 * light[channel] as u16) / 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use hecs::World;
    use image::Rgba;

    fn engine(seed: u64) -> LightingEngine {
        let mut rng = StdRng::seed_from_u64(seed);
        LightingEngine::new(LightingConfig::default(), 200, 200, &mut rng)
    }

    fn brightness(mask: &LightMask, world_x: u32, world_y: u32) -> u8 {
        mask.at_world(world_x, world_y).map(|p| p.0[0]).unwrap_or(0)
    }

    #[test]
    fn test_no_sources_gives_black_mask() {
        let mut lighting = engine(1);
        lighting.update(0.016, &World::new());
        assert!(lighting.mask().is_dark());
    }

    #[test]
    fn test_static_light_is_idempotent() {
        let mut lighting = engine(2);
        lighting.add_static(Vec2::new(100.0, 100.0), 60.0, LightMode::Static);
        let world = World::new();

        lighting.update(0.0, &world);
        let first = lighting.mask().image().clone();
        lighting.update(0.0, &world);
        assert_eq!(&first, lighting.mask().image());
    }

    #[test]
    fn test_light_only_inside_radius() {
        let world = World::new();
        for mode in LightMode::ALL {
            let mut lighting = engine(3);
            lighting.add_static(Vec2::new(100.0, 100.0), 40.0, mode);
            lighting.update(0.3, &world);

            // Heartbeat and pulse stretch the radius by at most 1.6x
            for (x, y) in [(10, 10), (190, 100), (100, 170), (30, 30)] {
                assert_eq!(brightness(lighting.mask(), x, y), 0, "{mode} lit ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_static_center_is_fully_lit() {
        let mut lighting = engine(4);
        lighting.add_static(Vec2::new(100.0, 100.0), 40.0, LightMode::Static);
        lighting.update(0.0, &World::new());
        assert_eq!(brightness(lighting.mask(), 100, 100), 255);
        assert!(brightness(lighting.mask(), 130, 100) < 255);
    }

    #[test]
    fn test_following_light_tracks_entity() {
        let mut world = World::new();
        let player = world.spawn((Position(Vec2::new(40.0, 40.0)),));
        let mut lighting = engine(5);
        lighting.add_following(player, 30.0, LightMode::Static);

        lighting.update(0.016, &world);
        assert_eq!(brightness(lighting.mask(), 40, 40), 255);
        assert_eq!(brightness(lighting.mask(), 160, 160), 0);

        world.get::<&mut Position>(player).unwrap().0 = Vec2::new(160.0, 160.0);
        lighting.update(0.016, &world);
        assert_eq!(brightness(lighting.mask(), 40, 40), 0);
        assert_eq!(brightness(lighting.mask(), 160, 160), 255);
    }

    #[test]
    fn test_missing_follower_is_skipped() {
        let mut world = World::new();
        let ghost = world.spawn((Position(Vec2::ZERO),));
        world.despawn(ghost).unwrap();

        let mut lighting = engine(6);
        lighting.add_following(ghost, 30.0, LightMode::Static);
        lighting.add_static(Vec2::new(100.0, 100.0), 30.0, LightMode::Static);
        lighting.update(0.016, &world);
        assert_eq!(brightness(lighting.mask(), 100, 100), 255);
        assert!(lighting.is_lost(ghost));
    }

    #[test]
    fn test_lost_follower_is_reported_once_and_recovers() {
        let mut world = World::new();
        let player = world.spawn((Position(Vec2::new(50.0, 50.0)),));
        let mut lighting = engine(7);
        lighting.add_following(player, 30.0, LightMode::Static);

        world.remove_one::<Position>(player).unwrap();
        for _ in 0..3 {
            lighting.update(0.016, &world);
        }
        assert!(lighting.is_lost(player));
        assert_eq!(lighting.lost.len(), 1);
        assert_eq!(brightness(lighting.mask(), 50, 50), 0);

        world.insert_one(player, Position(Vec2::new(50.0, 50.0))).unwrap();
        lighting.update(0.016, &world);
        assert!(!lighting.is_lost(player));
        assert_eq!(brightness(lighting.mask(), 50, 50), 255);
    }

    #[test]
    fn test_source_mode_management() {
        let mut lighting = engine(7);
        let a = lighting.add_static(Vec2::ZERO, 10.0, LightMode::Static);
        let b = lighting.add_static(Vec2::ONE, 10.0, LightMode::Static);

        assert_eq!(lighting.next_mode(a), Ok(LightMode::Shimmer));
        lighting.set_source_mode(b, LightMode::Halo).unwrap();
        assert_eq!(lighting.sources()[b].mode, LightMode::Halo);
        assert_eq!(lighting.set_source_mode(9, LightMode::Halo), Err(LightingError::NoSuchSource(9)));

        lighting.set_all_modes(LightMode::Glitch);
        assert!(lighting.sources().iter().all(|s| s.mode == LightMode::Glitch));
    }

    #[test]
    fn test_clear_static_keeps_followers() {
        let mut world = World::new();
        let player = world.spawn((Position(Vec2::ZERO),));
        let mut lighting = engine(8);
        lighting.add_following(player, 98.0, LightMode::Static);
        lighting.add_static(Vec2::ONE, 20.0, LightMode::Static);
        lighting.clear_static_sources();
        assert_eq!(lighting.sources().len(), 1);
        assert!(lighting.sources()[0].is_following());
    }

    #[test]
    fn test_light_radius_updates_followers_only() {
        let mut world = World::new();
        let player = world.spawn((Position(Vec2::ZERO),));
        let mut lighting = engine(9);
        lighting.add_following(player, 98.0, LightMode::Static);
        lighting.add_static(Vec2::ONE, 20.0, LightMode::Static);

        lighting.set_light_radius(120.0);
        assert_eq!(lighting.sources()[0].radius, 120.0);
        assert_eq!(lighting.sources()[1].radius, 20.0);
        assert_eq!(lighting.config().light_radius, 120.0);
    }

    #[test]
    fn test_render_multiplies_scene() {
        let mut lighting = engine(10);
        lighting.add_static(Vec2::new(50.0, 50.0), 20.0, LightMode::Static);
        lighting.update(0.0, &World::new());

        let mut scene = RgbaImage::from_pixel(200, 200, Rgba([200, 100, 50, 255]));
        lighting.render(&mut scene);
        assert_eq!(*scene.get_pixel(50, 50), Rgba([200, 100, 50, 255]));
        assert_eq!(*scene.get_pixel(150, 150), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_noise_field_in_unit_range() {
        let lighting = engine(11);
        assert_eq!(lighting.noise.len(), (lighting.mask().width() * lighting.mask().height()) as usize);
        assert!(lighting.noise.iter().all(|n| (0.0..=1.0).contains(n)));
    }
}
