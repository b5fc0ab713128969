//! Frightened movement: ghosts stop hunting and either run from the rival or
//! wander at random. Reversing is allowed only at dead ends, same as normal
//! steering.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{candidate_directions, euclidean};
use crate::components::Direction;
use crate::grid::{BlockedGrid, GridPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrightenedPolicy {
    /// Take the exit that ends up farthest from the rival.
    #[default]
    Flee,
    /// Take a random exit.
    Wander,
}

pub fn choose_direction(
    policy: FrightenedPolicy,
    pos: GridPosition,
    heading: Option<Direction>,
    rival: GridPosition,
    grid: &BlockedGrid,
    rng: &mut impl Rng,
) -> Option<Direction> {
    let candidates = candidate_directions(pos, heading, grid, false);
    match policy {
        FrightenedPolicy::Flee => flee_direction(pos, rival, &candidates),
        FrightenedPolicy::Wander => {
            if candidates.is_empty() {
                return None;
            }
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }
}

fn flee_direction(
    pos: GridPosition,
    rival: GridPosition,
    candidates: &[Direction],
) -> Option<Direction> {
    let mut best: Option<(Direction, f32)> = None;
    for dir in candidates {
        let (dx, dy) = dir.delta();
        let dist = euclidean(&pos.offset(dx, dy), &rival);
        if best.is_none_or(|(_, d)| dist > d) {
            best = Some((*dir, dist));
        }
    }
    best.map(|(dir, _)| dir)
}
