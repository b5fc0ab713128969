//! Events crossing the ghost AI boundary: power pellets come in, contact
//! outcomes and mode changes go out.

use bevy::prelude::*;

use crate::ghost_mode::GhostMode;

/// Broadcast to every ghost when the rival eats a power pellet.
#[derive(Event, Debug, Clone, Copy)]
pub struct PowerPelletEaten;

/// The rival touched a frightened ghost.
#[derive(Event, Debug, Clone, Copy)]
pub struct GhostEaten {
    pub ghost: Entity,
}

/// A ghost touched the rival while hunting.
#[derive(Event, Debug, Clone, Copy)]
pub struct RivalCaught {
    pub ghost: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct GhostModeChanged {
    pub ghost: Entity,
    pub from: GhostMode,
    pub to: GhostMode,
}
