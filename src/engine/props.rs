//! Fire props placed once per level. Every prop also carries a static light.

use crate::constants::*;
use crate::grid::TileGrid;
use crate::spawning::{light_positions, RoomDensity};
use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Fire,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    pub kind: PropKind,
    /// World position of the prop (and its light)
    pub position: Vec2,
    pub scale: f32,
    pub light_radius: f32,
}

/// Room fires at each room's light spots, then a sprinkling of corridor fires.
/// No two props end up closer than `PROP_MIN_DISTANCE`.
pub fn place_props(grid: &TileGrid, rng: &mut impl Rng) -> Vec<Prop> {
    puffin::profile_function!();
    let mut props: Vec<Prop> = Vec::new();

    for room in grid.rooms() {
        let density = RoomDensity::for_size(room.size);
        for position in light_positions(room, grid.tile_size) {
            if is_far_enough(&props, position) {
                props.push(Prop {
                    kind: PropKind::Fire,
                    position,
                    scale: density.prop_scale,
                    light_radius: density.light_radius,
                });
            }
        }
    }
    let room_props = props.len();

    let mut corridor = grid.corridor_tiles();
    corridor.shuffle(rng);
    for tile in corridor {
        if rng.gen::<f32>() >= CORRIDOR_PROP_CHANCE {
            continue;
        }
        let position = grid.tile_center(tile);
        if is_far_enough(&props, position) {
            props.push(Prop {
                kind: PropKind::Fire,
                position,
                scale: CORRIDOR_PROP_SCALE,
                light_radius: CORRIDOR_LIGHT_RADIUS,
            });
        }
    }

    log::debug!(
        "placed {} room fires and {} corridor fires",
        room_props,
        props.len() - room_props
    );
    props
}

fn is_far_enough(props: &[Prop], position: Vec2) -> bool {
    props
        .iter()
        .all(|p| p.position.distance(position) >= PROP_MIN_DISTANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfig;
    use crate::dungeon_gen::DungeonGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_props_keep_their_distance() {
        let mut rng = StdRng::seed_from_u64(12);
        let grid = DungeonGenerator::new(DungeonConfig::default(), TILE_SIZE)
            .generate(100, 100, &mut rng)
            .unwrap();
        let props = place_props(&grid, &mut rng);

        assert!(!props.is_empty());
        for (i, a) in props.iter().enumerate() {
            for b in &props[i + 1..] {
                assert!(a.position.distance(b.position) >= PROP_MIN_DISTANCE);
            }
        }
    }

    #[test]
    fn test_first_room_lit_and_corridor_fires_outside_rooms() {
        let mut rng = StdRng::seed_from_u64(4);
        let grid = DungeonGenerator::new(DungeonConfig::default(), TILE_SIZE)
            .generate(100, 100, &mut rng)
            .unwrap();
        let props = place_props(&grid, &mut rng);

        // The first room is placed before anything can crowd it out
        let first = grid.rooms()[0];
        let first_lights = light_positions(&first, TILE_SIZE);
        assert!(props.iter().any(|p| p.position == first_lights[0]));

        let corridor_fires = props.iter().filter(|p| p.light_radius == CORRIDOR_LIGHT_RADIUS);
        for fire in corridor_fires {
            assert_eq!(fire.scale, CORRIDOR_PROP_SCALE);
            assert_eq!(grid.room_containing_world(fire.position), None);
        }
    }
}
