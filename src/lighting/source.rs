use super::LightMode;
use crate::components::Position;
use glam::Vec2;
use hecs::{Entity, World};

/// Where a light sits: a fixed point, or wherever an entity currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightAnchor {
    Static(Vec2),
    Following(Entity),
}

/// Resolves the world position of followed entities at sample time.
pub trait PositionLookup {
    fn position_of(&self, entity: Entity) -> Option<Vec2>;
}

impl PositionLookup for World {
    fn position_of(&self, entity: Entity) -> Option<Vec2> {
        self.get::<&Position>(entity).ok().map(|pos| pos.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub anchor: LightAnchor,
    /// Radius in world pixels
    pub radius: f32,
    pub mode: LightMode,
}

impl LightSource {
    pub fn is_following(&self) -> bool {
        matches!(self.anchor, LightAnchor::Following(_))
    }

    /// Current center, or None if the followed entity is gone
    pub fn center(&self, positions: &impl PositionLookup) -> Option<Vec2> {
        match self.anchor {
            LightAnchor::Static(pos) => Some(pos),
            LightAnchor::Following(entity) => positions.position_of(entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_following_reads_world_position() {
        let mut world = World::new();
        let entity = world.spawn((Position(Vec2::new(10.0, 20.0)),));
        let light = LightSource {
            anchor: LightAnchor::Following(entity),
            radius: 50.0,
            mode: LightMode::Static,
        };
        assert_eq!(light.center(&world), Some(Vec2::new(10.0, 20.0)));

        world.despawn(entity).unwrap();
        assert_eq!(light.center(&world), None);
    }

    #[test]
    fn test_static_ignores_world() {
        let world = World::new();
        let light = LightSource {
            anchor: LightAnchor::Static(Vec2::new(3.0, 4.0)),
            radius: 20.0,
            mode: LightMode::Pulse,
        };
        assert!(!light.is_following());
        assert_eq!(light.center(&world), Some(Vec2::new(3.0, 4.0)));
    }
}
