//! Grid search: breadth-first and A*, reduced to "which tile next".
//!
//! Both searches expand neighbours in [`NEIGHBOR_OFFSETS`] order so results
//! are reproducible. Callers only get the immediate step after `start`.
//!
//! [`NEIGHBOR_OFFSETS`]: crate::grid::NEIGHBOR_OFFSETS

use micromegas_tracing::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::{BlockedGrid, GridPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchAlgorithm {
    Bfs,
    AStar,
}

/// How a ghost picks its search algorithm each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SearchPolicy {
    Bfs,
    AStar,
    /// BFS below `threshold_tiles` of Euclidean distance, A* at or above it.
    Hybrid { threshold_tiles: f32 },
}

impl SearchPolicy {
    pub fn algorithm_for(&self, start: GridPosition, goal: GridPosition) -> SearchAlgorithm {
        match *self {
            SearchPolicy::Bfs => SearchAlgorithm::Bfs,
            SearchPolicy::AStar => SearchAlgorithm::AStar,
            SearchPolicy::Hybrid { threshold_tiles } => {
                if super::euclidean(&start, &goal) >= threshold_tiles {
                    SearchAlgorithm::AStar
                } else {
                    SearchAlgorithm::Bfs
                }
            }
        }
    }
}

/// Full shortest path from `start` to `goal`, both included.
/// `None` if the goal is unreachable or `start == goal`.
pub fn find_path(
    algorithm: SearchAlgorithm,
    start: GridPosition,
    goal: GridPosition,
    grid: &BlockedGrid,
    door_open: bool,
) -> Option<Vec<GridPosition>> {
    let start = grid.clamp(start);
    let goal = grid.clamp(goal);
    if start == goal {
        return None;
    }

    match algorithm {
        SearchAlgorithm::Bfs => pathfinding::prelude::bfs(
            &start,
            |pos| grid.neighbors(*pos, door_open).collect::<Vec<_>>(),
            |pos| *pos == goal,
        ),
        SearchAlgorithm::AStar => pathfinding::prelude::astar(
            &start,
            |pos| {
                grid.neighbors(*pos, door_open)
                    .map(|n| (n, 1u32))
                    .collect::<Vec<_>>()
            },
            |pos| super::manhattan(pos, &goal),
            |pos| *pos == goal,
        )
        .map(|(steps, _cost)| steps),
    }
}

/// First tile after `start` on a shortest path to `goal`.
#[span_fn]
pub fn find_next_step(
    algorithm: SearchAlgorithm,
    start: GridPosition,
    goal: GridPosition,
    grid: &BlockedGrid,
    door_open: bool,
) -> Option<GridPosition> {
    let next = find_path(algorithm, start, goal, grid, door_open).and_then(|steps| {
        // A path must begin at start and hold at least one step.
        if steps.len() < 2 {
            return None;
        }
        Some(steps[1])
    });
    if next.is_none() {
        debug!(
            "search {:?}: no step from ({},{}) to ({},{})",
            algorithm, start.x, start.y, goal.x, goal.y
        );
    }
    next
}
