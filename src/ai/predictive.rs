//! Predictive pursuer: targets a fixed number of tiles ahead of the rival's
//! facing direction. The ahead tile may be a wall; greedy steering copes with
//! that. It is clamped so it never leaves the grid.

use super::WorldSnapshot;
use crate::grid::{BlockedGrid, GridPosition};

pub fn chase_target(
    world: &WorldSnapshot,
    lookahead_tiles: i32,
    grid: &BlockedGrid,
) -> GridPosition {
    let (dx, dy) = world.rival_facing.delta();
    grid.clamp(world.rival.offset(dx * lookahead_tiles, dy * lookahead_tiles))
}
