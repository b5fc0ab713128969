use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub use crate::grid::{GridPosition, PixelPosition};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Cardinal direction for movement. Screen coordinates: +y is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Tie-break order for greedy steering.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Grid offset for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Pixels per tick along exactly one axis, or at rest.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Velocity {
    pub vx: i32,
    pub vy: i32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { vx: 0, vy: 0 };

    pub fn new(dir: Direction, speed: i32) -> Self {
        let (dx, dy) = dir.delta();
        Velocity {
            vx: dx * speed,
            vy: dy * speed,
        }
    }

    /// Direction of travel, `None` when at rest.
    pub fn direction(&self) -> Option<Direction> {
        if self.vx > 0 {
            Some(Direction::Right)
        } else if self.vx < 0 {
            Some(Direction::Left)
        } else if self.vy < 0 {
            Some(Direction::Up)
        } else if self.vy > 0 {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

/// Pixels per tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveSpeed(pub i32);

/// Last direction the agent moved in. Kept while standing still.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facing(pub Direction);

/// Looping animation counter, advanced only while moving.
#[derive(Component, Debug, Clone, Copy)]
pub struct AnimationFrame {
    pub frame: f32,
    pub speed: f32,
    pub frames: u32,
}

impl AnimationFrame {
    pub fn new(frames: u32, speed: f32) -> Self {
        Self {
            frame: 0.0,
            speed,
            frames,
        }
    }

    pub fn index(&self) -> u32 {
        self.frame as u32
    }
}

// ---------------------------------------------------------------------------
// Entity markers
// ---------------------------------------------------------------------------

/// The player-controlled agent the ghosts pursue.
#[derive(Component, Debug)]
pub struct Rival;

#[derive(Component, Debug)]
pub struct Ghost;

/// The ghost's personality, choosing its default targeting and scatter corner.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Blinky,
        Personality::Pinky,
        Personality::Inky,
        Personality::Clyde,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'b' => Some(Personality::Blinky),
            'p' => Some(Personality::Pinky),
            'i' => Some(Personality::Inky),
            'c' => Some(Personality::Clyde),
            _ => None,
        }
    }
}

/// Spawn position for respawning after a round reset.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpawnPosition(pub GridPosition);
