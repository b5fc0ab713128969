//! Direct pursuer: the chase target is simply the rival's tile.

use super::WorldSnapshot;
use crate::grid::GridPosition;

pub fn chase_target(world: &WorldSnapshot) -> GridPosition {
    world.rival
}
