pub mod ghosts;
pub mod maze;
pub mod movement;
pub mod telemetry;

use bevy::prelude::*;

/// Order of the work done in each fixed tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Timers and house triggers.
    Modes,
    /// Direction choice for ghosts on tile boundaries.
    Steering,
    /// Pixel movement for every agent.
    Motion,
    /// Ghost/rival overlap.
    Contact,
}
