use crate::constants::*;
use crate::error::PathError;
use crate::grid::TileGrid;
use crate::tile::{manhattan, TilePos};
use glam::Vec2;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq)]
struct ScoredNode {
    pos: TilePos,
    f_score: i32, // g_score + heuristic
    /// Push order, so equal scores pop first-in first-out
    seq: u64,
}

// BinaryHeap is a max-heap, so we reverse the ordering for min-heap behavior
impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Guide marker drawn ahead of the walker along the current path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuideMarker {
    pub position: Vec2,
}

impl GuideMarker {
    /// Outline of the pulsing 4-point star as line segments.
    pub fn star_segments(&self, time: f32, tile_size: f32) -> Vec<(Vec2, Vec2)> {
        let pulse = ((time * GUIDE_PULSE_SPEED).sin() + 1.0) / 2.0;
        let size = tile_size * 0.3;
        let inner = size * 0.4;
        let outer = size * (0.8 + pulse * 0.2);

        let vertex_count = GUIDE_STAR_POINTS * 2;
        let vertices: Vec<Vec2> = (0..vertex_count)
            .map(|i| {
                let angle = i as f32 * PI / GUIDE_STAR_POINTS as f32 - FRAC_PI_2;
                let radius = if i % 2 == 0 { outer } else { inner };
                self.position + Vec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect();

        (0..vertex_count)
            .map(|i| (vertices[i], vertices[(i + 1) % vertex_count]))
            .collect()
    }
}

/// A* pathfinder over a shared, immutable grid snapshot.
///
/// Keeps the last successful path; any failed request clears it so callers
/// never follow a route computed for an older request.
pub struct Pathfinder {
    grid: Arc<TileGrid>,
    path: Vec<TilePos>,
    marker: Option<Vec2>,
}

impl Pathfinder {
    pub fn new(grid: Arc<TileGrid>) -> Self {
        Self {
            grid,
            path: Vec::new(),
            marker: None,
        }
    }

    pub fn grid(&self) -> &Arc<TileGrid> {
        &self.grid
    }

    /// Get the current path, start and goal included
    pub fn path(&self) -> &[TilePos] {
        &self.path
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.marker = None;
    }

    /// Find a path from start to goal, replacing the stored one.
    /// Returns the number of steps on success.
    pub fn update(&mut self, start: TilePos, goal: TilePos) -> Result<usize, PathError> {
        puffin::profile_function!();
        match find_path(&self.grid, start, goal) {
            Ok(path) => {
                self.path = path;
                Ok(self.path.len() - 1)
            }
            Err(err) => {
                self.clear();
                Err(err)
            }
        }
    }

    /// World-space points along the path with a hand-drawn wobble.
    /// Long hops get interpolated points so the line bends smoothly.
    pub fn smooth_path(&self, rng: &mut impl Rng) -> Vec<Vec2> {
        let tile = self.grid.tile_size;
        let jittered: Vec<Vec2> = self
            .path
            .iter()
            .map(|&pos| self.grid.tile_center(pos) + jitter(rng, tile * PATH_NODE_JITTER))
            .collect();

        let mut smoothed = Vec::with_capacity(jittered.len() * 2);
        for (i, &point) in jittered.iter().enumerate() {
            smoothed.push(point);
            let Some(&next) = jittered.get(i + 1) else {
                break;
            };
            let distance = point.distance(next);
            if distance > tile * PATH_DENSIFY_THRESHOLD {
                let segments = (distance / tile) as usize;
                for j in 1..segments {
                    let t = j as f32 / segments as f32;
                    smoothed.push(point.lerp(next, t) + jitter(rng, tile * PATH_INTERMEDIATE_JITTER));
                }
            }
        }
        smoothed
    }

    /// First node far enough from the start to be worth walking to, or the goal.
    pub fn next_waypoint(&self) -> Option<Vec2> {
        let start = *self.path.first()?;
        let waypoint = self
            .path
            .iter()
            .find(|&&pos| manhattan(pos, start) >= PATH_WAYPOINT_DISTANCE)
            .or(self.path.last())?;
        Some(self.grid.tile_center(*waypoint))
    }

    /// Advance the guide marker one frame and return where to draw it.
    /// Hidden once the walker stands in the goal's room.
    pub fn render(&mut self, current_room: Option<usize>) -> Option<GuideMarker> {
        if self.path.len() < 2 {
            return None;
        }
        let goal = *self.path.last()?;
        if current_room.is_some() && current_room == self.grid.room_containing(goal) {
            return None;
        }

        let start = self.grid.tile_center(self.path[0]);
        let lookahead = self.path[GUIDE_LOOKAHEAD_NODES.min(self.path.len() - 1)];
        let direction = (self.grid.tile_center(lookahead) - start).normalize_or_zero();
        let target = start + direction * self.grid.tile_size * GUIDE_LEAD_TILES;

        let position = self.marker.unwrap_or(start).lerp(target, GUIDE_SMOOTHING);
        self.marker = Some(position);
        Some(GuideMarker { position })
    }
}

/// Uniform offset on each axis within half of `span`
fn jitter(rng: &mut impl Rng, span: f32) -> Vec2 {
    Vec2::new(
        (rng.gen::<f32>() - 0.5) * span,
        (rng.gen::<f32>() - 0.5) * span,
    )
}

/// Find a path from start to goal using A* algorithm.
/// Returns the path as a vector of (x, y) positions, start and goal included.
pub fn find_path(grid: &TileGrid, start: TilePos, goal: TilePos) -> Result<Vec<TilePos>, PathError> {
    for pos in [start, goal] {
        if !grid.in_bounds(pos.0, pos.1) {
            return Err(PathError::OutOfBounds(pos.0, pos.1));
        }
    }
    if !grid.is_walkable(start.0, start.1) {
        return Err(PathError::StartBlocked(start.0, start.1));
    }
    if !grid.is_walkable(goal.0, goal.1) {
        return Err(PathError::GoalBlocked(goal.0, goal.1));
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
    let mut g_score: HashMap<TilePos, i32> = HashMap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0);
    open_set.push(ScoredNode {
        pos: start,
        f_score: manhattan(start, goal),
        seq,
    });

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            return Ok(reconstruct_path(&came_from, goal));
        }

        let current_g = *g_score.get(&current.pos).unwrap_or(&i32::MAX);
        // Stale heap entry superseded by a cheaper one
        if current.f_score > current_g.saturating_add(manhattan(current.pos, goal)) {
            continue;
        }

        for (dx, dy) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            let neighbor = (current.pos.0 + dx, current.pos.1 + dy);
            if !grid.is_walkable(neighbor.0, neighbor.1) {
                continue;
            }

            let tentative_g = current_g + 1;
            if tentative_g < *g_score.get(&neighbor).unwrap_or(&i32::MAX) {
                came_from.insert(neighbor, current.pos);
                g_score.insert(neighbor, tentative_g);
                seq += 1;
                open_set.push(ScoredNode {
                    pos: neighbor,
                    f_score: tentative_g + manhattan(neighbor, goal),
                    seq,
                });
            }
        }
    }

    Err(PathError::Unreachable(start.0, start.1, goal.0, goal.1))
}

fn reconstruct_path(came_from: &HashMap<TilePos, TilePos>, mut current: TilePos) -> Vec<TilePos> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
