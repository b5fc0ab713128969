//! Level parsing and the wall grid.
//!
//! Parses ASCII level text into wall geometry, spawn points and the ghost
//! house, then installs the resulting [`BlockedGrid`] and [`GhostHouse`]
//! resources and spawns the agents.

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_scope, warn};

use crate::app_state::RoundState;
use crate::components::Personality;
use crate::ghost_mode::GhostHouse;
use crate::grid::{build_blocked_grid, BlockedGrid, GridPosition, PixelPosition};
use crate::resources::{GhostTuning, LevelSource};

pub struct MazePlugin;

impl Plugin for MazePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(RoundState::AwaitingInput), load_level);
    }
}

// ---------------------------------------------------------------------------
// Tile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileType {
    Wall,
    Floor,
    Door,
    RivalSpawn,
    GhostSpawn(Personality),
}

impl TileType {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(TileType::Wall),
            ' ' | '.' | 'o' => Some(TileType::Floor),
            '-' => Some(TileType::Door),
            'P' => Some(TileType::RivalSpawn),
            _ => Personality::from_char(c).map(TileType::GhostSpawn),
        }
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Parsed level: wall geometry plus spawn points, in tiles.
#[derive(Resource, Debug, Clone)]
pub struct Level {
    pub cols: i32,
    pub rows: i32,
    pub walls: Vec<GridPosition>,
    pub doors: Vec<GridPosition>,
    pub rival_spawn: GridPosition,
    pub ghost_spawns: Vec<(Personality, GridPosition)>,
}

impl Level {
    /// Parse an ASCII level string.
    pub fn parse(text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err("Empty level".to_string());
        }

        let rows = lines.len() as i32;
        let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
        if cols == 0 {
            return Err("Level has zero width".to_string());
        }

        let mut walls = Vec::new();
        let mut doors = Vec::new();
        let mut rival_spawn = None;
        let mut ghost_spawns = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let tile = TileType::from_char(ch).ok_or_else(|| {
                    format!("Unknown tile character '{}' at ({}, {})", ch, x, y)
                })?;
                let pos = GridPosition::new(x as i32, y as i32);

                match tile {
                    TileType::Wall => walls.push(pos),
                    TileType::Door => doors.push(pos),
                    TileType::RivalSpawn => {
                        if rival_spawn.is_some() {
                            return Err(format!("Multiple rival spawns at ({}, {})", x, y));
                        }
                        rival_spawn = Some(pos);
                    }
                    TileType::GhostSpawn(personality) => ghost_spawns.push((personality, pos)),
                    TileType::Floor => {}
                }
            }
        }

        let rival_spawn = rival_spawn.ok_or("No rival spawn ('P') found in level")?;
        if !ghost_spawns.is_empty() && doors.is_empty() {
            return Err("Level has ghosts but no ghost-house door ('-')".to_string());
        }

        Ok(Level {
            cols,
            rows,
            walls,
            doors,
            rival_spawn,
            ghost_spawns,
        })
    }

    /// Wall positions in pixels, as the grid builder expects them.
    pub fn wall_pixels(&self, tile_size: i32) -> Vec<PixelPosition> {
        self.walls
            .iter()
            .map(|w| PixelPosition {
                x: w.x * tile_size,
                y: w.y * tile_size,
            })
            .collect()
    }

    pub fn blocked_grid(&self, tile_size: i32) -> BlockedGrid {
        build_blocked_grid(&self.wall_pixels(tile_size), self.cols, self.rows, tile_size)
            .with_doors(&self.doors)
    }

    /// Exit and re-entry tiles around the first door tile.
    pub fn house(&self) -> Option<GhostHouse> {
        let door = *self.doors.first()?;
        Some(GhostHouse {
            exit: door.offset(0, -1),
            inside: door.offset(0, 1),
        })
    }
}

// ---------------------------------------------------------------------------
// Installation
// ---------------------------------------------------------------------------

/// Insert the grid and house resources for `level` and spawn its agents.
pub fn install_level(world: &mut World, level: &Level) {
    span_scope!("install_level");
    let tuning = world.get_resource_or_init::<GhostTuning>().clone();
    let grid = level.blocked_grid(tuning.tile_size);
    if let Some(house) = level.house() {
        world.insert_resource(house);
    }
    world.insert_resource(grid);
    world.insert_resource(level.clone());
    crate::plugins::ghosts::spawn_agents(world, level, &tuning);
    info!(
        "level installed ({}x{}, {} walls, {} ghosts)",
        level.cols,
        level.rows,
        level.walls.len(),
        level.ghost_spawns.len()
    );
}

/// Parse `LevelSource` and install it, once.
fn load_level(world: &mut World) {
    if world.contains_resource::<Level>() {
        return;
    }
    let Some(source) = world.get_resource::<LevelSource>().cloned() else {
        return;
    };
    match Level::parse(&source.0) {
        Ok(level) => install_level(world, &level),
        Err(e) => warn!("level rejected: {}", e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
