//! Distance-gated pursuer: chases the rival from afar, retreats to its own
//! corner once it gets within `threshold_tiles`.

use super::WorldSnapshot;
use crate::grid::GridPosition;

pub fn chase_target(
    world: &WorldSnapshot,
    threshold_tiles: f32,
    scatter_corner: GridPosition,
) -> GridPosition {
    if super::euclidean(&world.ghost, &world.rival) >= threshold_tiles {
        world.rival
    } else {
        scatter_corner
    }
}
