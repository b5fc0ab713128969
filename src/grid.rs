//! Tile grid derived from wall geometry.
//!
//! Walls are static for the whole level, so the grid is built once and
//! only read afterwards. The ghost-house door is kept as a separate
//! overlay: it is open to ghosts heading in or out of the house and
//! closed to everybody else.

use bevy::prelude::*;

/// Position in pixels. Tile `(x, y)` starts at pixel `(x * tile, y * tile)`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPosition {
    pub x: i32,
    pub y: i32,
}

/// Position in tiles.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Neighbour order used by every search. Changing it changes tie-breaking.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Occupancy grid: `true` means a wall covers the tile.
#[derive(Resource, Debug, Clone)]
pub struct BlockedGrid {
    pub cols: i32,
    pub rows: i32,
    pub tile_size: i32,
    blocked: Vec<bool>,
    door: Vec<bool>,
}

/// Build the occupancy grid from wall pixel positions.
///
/// Walls outside `[0, cols) x [0, rows)` are dropped without complaint so a
/// malformed level can't index out of bounds.
pub fn build_blocked_grid(
    walls: &[PixelPosition],
    cols: i32,
    rows: i32,
    tile_size: i32,
) -> BlockedGrid {
    let cols = cols.max(0);
    let rows = rows.max(0);
    let tile_size = tile_size.max(1);
    let cells = (cols * rows) as usize;
    let mut grid = BlockedGrid {
        cols,
        rows,
        tile_size,
        blocked: vec![false; cells],
        door: vec![false; cells],
    };
    for wall in walls {
        let tile = GridPosition {
            x: wall.x.div_euclid(tile_size),
            y: wall.y.div_euclid(tile_size),
        };
        if let Some(i) = grid.index(tile) {
            grid.blocked[i] = true;
        }
    }
    grid
}

impl BlockedGrid {
    /// Mark ghost-house door tiles. Out-of-range tiles are ignored.
    pub fn with_doors(mut self, doors: &[GridPosition]) -> Self {
        for door in doors {
            if let Some(i) = self.index(*door) {
                self.door[i] = true;
            }
        }
        self
    }

    fn index(&self, tile: GridPosition) -> Option<usize> {
        self.in_bounds(tile)
            .then(|| (tile.y * self.cols + tile.x) as usize)
    }

    pub fn in_bounds(&self, tile: GridPosition) -> bool {
        tile.x >= 0 && tile.x < self.cols && tile.y >= 0 && tile.y < self.rows
    }

    /// Wall lookup. Out-of-range tiles count as blocked.
    pub fn is_blocked(&self, tile: GridPosition) -> bool {
        self.index(tile).is_none_or(|i| self.blocked[i])
    }

    pub fn is_door(&self, tile: GridPosition) -> bool {
        self.index(tile).is_some_and(|i| self.door[i])
    }

    /// Whether a ghost may stand on `tile`.
    pub fn is_open(&self, tile: GridPosition, door_open: bool) -> bool {
        match self.index(tile) {
            Some(i) => !self.blocked[i] && (door_open || !self.door[i]),
            None => false,
        }
    }

    /// Open 4-neighbours of `tile` in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(
        &self,
        tile: GridPosition,
        door_open: bool,
    ) -> impl Iterator<Item = GridPosition> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |(dx, dy)| tile.offset(*dx, *dy))
            .filter(move |n| self.is_open(*n, door_open))
    }

    /// Clamp any tile coordinate into the grid.
    pub fn clamp(&self, tile: GridPosition) -> GridPosition {
        GridPosition {
            x: tile.x.clamp(0, (self.cols - 1).max(0)),
            y: tile.y.clamp(0, (self.rows - 1).max(0)),
        }
    }

    /// Tile containing a pixel position, clamped into the grid.
    pub fn tile_of(&self, pos: PixelPosition) -> GridPosition {
        self.clamp(GridPosition {
            x: pos.x.div_euclid(self.tile_size),
            y: pos.y.div_euclid(self.tile_size),
        })
    }

    /// Top-left pixel of a tile.
    pub fn pixel_of(&self, tile: GridPosition) -> PixelPosition {
        PixelPosition {
            x: tile.x * self.tile_size,
            y: tile.y * self.tile_size,
        }
    }

    /// Both coordinates sit exactly on a tile boundary.
    pub fn is_aligned(&self, pos: PixelPosition) -> bool {
        pos.x.rem_euclid(self.tile_size) == 0 && pos.y.rem_euclid(self.tile_size) == 0
    }

    /// Level extent in pixels.
    pub fn pixel_size(&self) -> (i32, i32) {
        (self.cols * self.tile_size, self.rows * self.tile_size)
    }
}
