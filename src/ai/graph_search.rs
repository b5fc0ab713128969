//! Graph-search pursuer: the chase target is the next tile on a shortest path
//! to the rival. When no path exists the ghost aims at the rival's tile
//! instead of stalling.

use micromegas_tracing::prelude::*;

use super::search::{find_next_step, SearchPolicy};
use super::WorldSnapshot;
use crate::grid::{BlockedGrid, GridPosition};

#[span_fn]
pub fn chase_target(
    world: &WorldSnapshot,
    policy: SearchPolicy,
    grid: &BlockedGrid,
) -> GridPosition {
    let start = grid.clamp(world.ghost);
    let goal = grid.clamp(world.rival);
    if start == goal {
        return goal;
    }
    let algorithm = policy.algorithm_for(start, goal);
    find_next_step(algorithm, start, goal, grid, false).unwrap_or(goal)
}
