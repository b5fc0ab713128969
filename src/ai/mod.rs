//! Ghost targeting. Each targeting variant lives in its own module and maps a
//! [`WorldSnapshot`] to a target tile; the helpers here turn a target tile
//! into a direction.

pub mod direct;
pub mod distance_gated;
pub mod frightened;
pub mod graph_search;
pub mod predictive;
pub mod search;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Direction, Personality};
use crate::grid::{BlockedGrid, GridPosition};
use crate::resources::GhostTuning;
use search::SearchPolicy;

/// Read-only view of the world a ghost targets from.
#[derive(Debug, Clone, Copy)]
pub struct WorldSnapshot {
    pub ghost: GridPosition,
    /// Direction the ghost is currently moving, if any.
    pub heading: Option<Direction>,
    pub rival: GridPosition,
    pub rival_facing: Direction,
}

/// Level corner a ghost retreats to while scattering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub fn tile(&self, grid: &BlockedGrid) -> GridPosition {
        let right = (grid.cols - 1).max(0);
        let bottom = (grid.rows - 1).max(0);
        match self {
            Corner::TopLeft => GridPosition::new(0, 0),
            Corner::TopRight => GridPosition::new(right, 0),
            Corner::BottomLeft => GridPosition::new(0, bottom),
            Corner::BottomRight => GridPosition::new(right, bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Targeting {
    /// Aim at the rival's tile.
    Direct,
    /// Aim `lookahead_tiles` ahead of the rival along its facing.
    Predictive { lookahead_tiles: i32 },
    /// Aim at the rival while at least `threshold_tiles` away, otherwise
    /// fall back to the scatter corner.
    DistanceGated { threshold_tiles: f32 },
    /// Search the grid and aim at the next tile on the path to the rival.
    GraphSearch { policy: SearchPolicy },
}

/// Per-ghost targeting: chase rule plus a fixed scatter corner.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostStrategy {
    pub targeting: Targeting,
    pub corner: Corner,
}

impl GhostStrategy {
    /// Strategy for a personality: the tuning override if one is set,
    /// otherwise the built-in default.
    pub fn for_personality(personality: Personality, tuning: &GhostTuning) -> Self {
        if let Some(strategy) = tuning.strategies.get(&personality) {
            return *strategy;
        }
        match personality {
            Personality::Blinky => GhostStrategy {
                targeting: Targeting::GraphSearch {
                    policy: SearchPolicy::Bfs,
                },
                corner: Corner::TopRight,
            },
            Personality::Pinky => GhostStrategy {
                targeting: Targeting::Predictive {
                    lookahead_tiles: tuning.lookahead_tiles,
                },
                corner: Corner::TopLeft,
            },
            Personality::Inky => GhostStrategy {
                targeting: Targeting::GraphSearch {
                    policy: SearchPolicy::Hybrid {
                        threshold_tiles: tuning.search_switch_tiles,
                    },
                },
                corner: Corner::BottomRight,
            },
            Personality::Clyde => GhostStrategy {
                targeting: Targeting::DistanceGated {
                    threshold_tiles: tuning.distance_gate_tiles,
                },
                corner: Corner::BottomLeft,
            },
        }
    }

    pub fn chase_target(&self, world: &WorldSnapshot, grid: &BlockedGrid) -> GridPosition {
        match self.targeting {
            Targeting::Direct => direct::chase_target(world),
            Targeting::Predictive { lookahead_tiles } => {
                predictive::chase_target(world, lookahead_tiles, grid)
            }
            Targeting::DistanceGated { threshold_tiles } => {
                distance_gated::chase_target(world, threshold_tiles, self.scatter_target(grid))
            }
            Targeting::GraphSearch { policy } => graph_search::chase_target(world, policy, grid),
        }
    }

    pub fn scatter_target(&self, grid: &BlockedGrid) -> GridPosition {
        self.corner.tile(grid)
    }
}

/// Taxicab distance in tiles. Admissible for A* on a 4-connected grid.
pub fn manhattan(a: &GridPosition, b: &GridPosition) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Straight-line distance in tiles.
pub fn euclidean(a: &GridPosition, b: &GridPosition) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// The single step that takes `from` onto `to`, if they are neighbours.
pub fn direction_between(from: GridPosition, to: GridPosition) -> Option<Direction> {
    let step = (to.x - from.x, to.y - from.y);
    Direction::PRIORITY.into_iter().find(|d| d.delta() == step)
}

/// Open directions from `pos`, minus the reverse of `heading` unless
/// reversing is the only way out.
pub fn candidate_directions(
    pos: GridPosition,
    heading: Option<Direction>,
    grid: &BlockedGrid,
    door_open: bool,
) -> Vec<Direction> {
    let open: Vec<Direction> = Direction::PRIORITY
        .into_iter()
        .filter(|d| {
            let (dx, dy) = d.delta();
            grid.is_open(pos.offset(dx, dy), door_open)
        })
        .collect();
    let reverse = heading.map(|h| h.opposite());
    let forward: Vec<Direction> = open
        .iter()
        .copied()
        .filter(|d| Some(*d) != reverse)
        .collect();
    if forward.is_empty() { open } else { forward }
}

/// Classic arcade steering: of the candidate directions, take the one whose
/// next tile is closest to `target`. Ties go to the earlier entry of
/// [`Direction::PRIORITY`].
pub fn greedy_direction(
    pos: GridPosition,
    heading: Option<Direction>,
    target: GridPosition,
    grid: &BlockedGrid,
    door_open: bool,
) -> Option<Direction> {
    let mut best: Option<(Direction, f32)> = None;
    for dir in candidate_directions(pos, heading, grid, door_open) {
        let (dx, dy) = dir.delta();
        let dist = euclidean(&pos.offset(dx, dy), &target);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((dir, dist));
        }
    }
    best.map(|(dir, _)| dir)
}

/// Step straight onto `target` when it is an open neighbour, otherwise steer
/// greedily toward it.
pub fn step_toward(
    pos: GridPosition,
    heading: Option<Direction>,
    target: GridPosition,
    grid: &BlockedGrid,
    door_open: bool,
) -> Option<Direction> {
    if grid.is_open(target, door_open) {
        if let Some(dir) = direction_between(pos, target) {
            return Some(dir);
        }
    }
    greedy_direction(pos, heading, target, grid, door_open)
}
