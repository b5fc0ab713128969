//! Per-ghost behaviour mode and the transitions between modes.
//!
//! A ghost starts in `House`, leaves through the door into `Scatter` or
//! `Chase`, alternates between the two on a timer, turns `Frightened` when a
//! power pellet is eaten and `Eaten` when touched while frightened. An eaten
//! ghost walks back into the house and starts over.
//!
//! Every trigger is a method on [`GhostBrain`]. Triggers that make no sense
//! in the current mode are ignored.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::frightened::{self, FrightenedPolicy};
use crate::ai::search::{find_next_step, SearchAlgorithm};
use crate::ai::{greedy_direction, step_toward, GhostStrategy, WorldSnapshot};
use crate::components::Direction;
use crate::grid::{BlockedGrid, GridPosition};
use crate::resources::GhostTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GhostMode {
    #[default]
    House,
    Scatter,
    Chase,
    Frightened,
    Eaten,
}

/// What touching the rival amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The ghost was already eaten.
    Ignored,
    /// Frightened ghost caught by the rival.
    GhostEaten,
    /// The ghost caught the rival.
    RivalCaught,
}

/// How a ghost should currently be drawn. Refreshed every tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GhostVisual {
    #[default]
    Normal,
    Frightened,
    FrightenedFlashing,
    Eaten,
}

/// Where a mode wants the ghost to go this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveGoal {
    /// Steer greedily toward a tile.
    Toward { target: GridPosition, door_open: bool },
    /// Search the grid for the way to a tile.
    Search { goal: GridPosition, door_open: bool },
    /// Run according to the frightened policy.
    Frightened,
}

/// Tiles around the ghost house that trigger mode changes.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GhostHouse {
    /// Just outside the door. Reaching it ends `House` mode.
    pub exit: GridPosition,
    /// Just inside the door. Reaching it ends `Eaten` mode.
    pub inside: GridPosition,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct GhostBrain {
    mode: GhostMode,
    mode_timer: u32,
    fright_timer: u32,
    was_chasing: bool,
}

impl Default for GhostBrain {
    fn default() -> Self {
        Self::new(GhostMode::House)
    }
}

impl GhostBrain {
    pub fn new(mode: GhostMode) -> Self {
        Self {
            mode,
            mode_timer: 0,
            fright_timer: 0,
            was_chasing: mode == GhostMode::Chase,
        }
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn mode_timer(&self) -> u32 {
        self.mode_timer
    }

    pub fn fright_timer(&self) -> u32 {
        self.fright_timer
    }

    /// Which of Chase/Scatter the alternation currently selects.
    pub fn was_chasing(&self) -> bool {
        self.was_chasing
    }

    fn resume_alternation(&mut self) {
        self.mode = if self.was_chasing {
            GhostMode::Chase
        } else {
            GhostMode::Scatter
        };
    }

    /// Advance the fright and alternation timers by one tick.
    /// Returns true if the mode changed.
    pub fn tick_timers(&mut self, tuning: &GhostTuning) -> bool {
        match self.mode {
            GhostMode::Frightened => {
                self.fright_timer += 1;
                if self.fright_timer >= tuning.fright_ticks {
                    self.resume_alternation();
                    return true;
                }
                false
            }
            GhostMode::Scatter | GhostMode::Chase => {
                self.mode_timer += 1;
                let limit = if self.was_chasing {
                    tuning.chase_ticks
                } else {
                    tuning.scatter_ticks
                };
                if self.mode_timer >= limit {
                    self.mode_timer = 0;
                    self.was_chasing = !self.was_chasing;
                    self.resume_alternation();
                    return true;
                }
                false
            }
            GhostMode::House | GhostMode::Eaten => false,
        }
    }

    /// The ghost stands on the tile just outside the house.
    pub fn on_outside_house(&mut self) -> bool {
        if self.mode != GhostMode::House {
            return false;
        }
        self.resume_alternation();
        true
    }

    /// The ghost stands on the tile just inside the house.
    pub fn on_inside_house(&mut self) -> bool {
        if self.mode != GhostMode::Eaten {
            return false;
        }
        self.mode = GhostMode::House;
        true
    }

    /// A power pellet was eaten somewhere. Restarts the fright timer if the
    /// ghost is already frightened.
    pub fn on_power_pellet(&mut self) -> bool {
        match self.mode {
            GhostMode::Scatter | GhostMode::Chase => {
                self.mode = GhostMode::Frightened;
                self.fright_timer = 0;
                true
            }
            GhostMode::Frightened => {
                self.fright_timer = 0;
                false
            }
            GhostMode::House | GhostMode::Eaten => false,
        }
    }

    /// The rival touched this ghost.
    pub fn on_touched(&mut self) -> ContactOutcome {
        match self.mode {
            GhostMode::Frightened => {
                self.mode = GhostMode::Eaten;
                self.fright_timer = 0;
                ContactOutcome::GhostEaten
            }
            GhostMode::Eaten => ContactOutcome::Ignored,
            GhostMode::House | GhostMode::Scatter | GhostMode::Chase => {
                ContactOutcome::RivalCaught
            }
        }
    }

    pub fn visual(&self, tuning: &GhostTuning) -> GhostVisual {
        match self.mode {
            GhostMode::Frightened => {
                if self.fright_timer > tuning.fright_flash_after && self.fright_timer % 20 <= 10 {
                    GhostVisual::FrightenedFlashing
                } else {
                    GhostVisual::Frightened
                }
            }
            GhostMode::Eaten => GhostVisual::Eaten,
            _ => GhostVisual::Normal,
        }
    }

    /// The goal the current mode steers toward.
    pub fn plan_target(
        &self,
        strategy: &GhostStrategy,
        world: &WorldSnapshot,
        grid: &BlockedGrid,
        house: &GhostHouse,
    ) -> MoveGoal {
        match self.mode {
            GhostMode::Chase => MoveGoal::Toward {
                target: strategy.chase_target(world, grid),
                door_open: false,
            },
            GhostMode::Scatter => MoveGoal::Toward {
                target: strategy.scatter_target(grid),
                door_open: false,
            },
            GhostMode::House => MoveGoal::Toward {
                target: house.exit,
                door_open: true,
            },
            GhostMode::Eaten => MoveGoal::Search {
                goal: house.inside,
                door_open: true,
            },
            GhostMode::Frightened => MoveGoal::Frightened,
        }
    }
}

/// Everything needed to turn a mode into a direction.
pub struct SteeringContext<'a> {
    pub strategy: &'a GhostStrategy,
    pub world: WorldSnapshot,
    pub grid: &'a BlockedGrid,
    pub house: &'a GhostHouse,
    pub frightened_policy: FrightenedPolicy,
}

/// Direction the ghost should take from its current tile, `None` if boxed in.
pub fn next_direction(
    brain: &GhostBrain,
    ctx: &SteeringContext,
    rng: &mut impl Rng,
) -> Option<Direction> {
    let pos = ctx.world.ghost;
    let heading = ctx.world.heading;
    match brain.plan_target(ctx.strategy, &ctx.world, ctx.grid, ctx.house) {
        MoveGoal::Toward { target, door_open } => {
            step_toward(pos, heading, target, ctx.grid, door_open)
        }
        MoveGoal::Search { goal, door_open } => {
            match find_next_step(SearchAlgorithm::AStar, pos, goal, ctx.grid, door_open) {
                Some(next) => step_toward(pos, heading, next, ctx.grid, door_open),
                None => greedy_direction(pos, heading, goal, ctx.grid, door_open),
            }
        }
        MoveGoal::Frightened => frightened::choose_direction(
            ctx.frightened_policy,
            pos,
            heading,
            ctx.world.rival,
            ctx.grid,
            rng,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Corner, Targeting};
    use crate::grid::{build_blocked_grid, PixelPosition};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tuning() -> GhostTuning {
        GhostTuning::default()
    }

    fn run(brain: &mut GhostBrain, ticks: u32) -> u32 {
        let mut changes = 0;
        for _ in 0..ticks {
            if brain.tick_timers(&tuning()) {
                changes += 1;
            }
        }
        changes
    }

    #[test]
    fn scatter_then_chase_then_scatter() {
        let t = tuning();
        let mut brain = GhostBrain::new(GhostMode::Scatter);
        run(&mut brain, t.scatter_ticks - 1);
        assert_eq!(brain.mode(), GhostMode::Scatter);
        run(&mut brain, 1);
        assert_eq!(brain.mode(), GhostMode::Chase);
        assert!(brain.was_chasing());

        run(&mut brain, t.chase_ticks - 1);
        assert_eq!(brain.mode(), GhostMode::Chase);
        run(&mut brain, 1);
        assert_eq!(brain.mode(), GhostMode::Scatter);
        assert!(!brain.was_chasing());
        assert_eq!(brain.mode_timer(), 0);
    }

    #[test]
    fn house_and_eaten_do_not_alternate() {
        let mut brain = GhostBrain::new(GhostMode::House);
        assert_eq!(run(&mut brain, 5000), 0);
        assert_eq!(brain.mode(), GhostMode::House);
        let mut brain = GhostBrain::new(GhostMode::Eaten);
        assert_eq!(run(&mut brain, 5000), 0);
        assert_eq!(brain.mode(), GhostMode::Eaten);
    }

    #[test]
    fn fright_returns_to_chase() {
        let t = tuning();
        let mut brain = GhostBrain::new(GhostMode::Chase);
        run(&mut brain, 100);
        assert!(brain.on_power_pellet());
        assert_eq!(brain.mode(), GhostMode::Frightened);
        run(&mut brain, t.fright_ticks - 1);
        assert_eq!(brain.mode(), GhostMode::Frightened);
        run(&mut brain, 1);
        assert_eq!(brain.mode(), GhostMode::Chase);
        // The alternation timer was paused, not reset.
        assert_eq!(brain.mode_timer(), 100);
    }

    #[test]
    fn fright_returns_to_scatter() {
        let t = tuning();
        let mut brain = GhostBrain::new(GhostMode::Scatter);
        brain.on_power_pellet();
        run(&mut brain, t.fright_ticks);
        assert_eq!(brain.mode(), GhostMode::Scatter);
    }

    #[test]
    fn power_pellet_ignored_in_house_and_eaten() {
        let mut brain = GhostBrain::new(GhostMode::House);
        assert!(!brain.on_power_pellet());
        assert_eq!(brain.mode(), GhostMode::House);
        let mut brain = GhostBrain::new(GhostMode::Eaten);
        assert!(!brain.on_power_pellet());
        assert_eq!(brain.mode(), GhostMode::Eaten);
    }

    #[test]
    fn second_pellet_restarts_fright() {
        let t = tuning();
        let mut brain = GhostBrain::new(GhostMode::Chase);
        brain.on_power_pellet();
        run(&mut brain, t.fright_ticks - 10);
        brain.on_power_pellet();
        assert_eq!(brain.fright_timer(), 0);
        run(&mut brain, t.fright_ticks - 1);
        assert_eq!(brain.mode(), GhostMode::Frightened);
    }

    #[test]
    fn house_exit_follows_alternation_flag() {
        let mut brain = GhostBrain::new(GhostMode::House);
        assert!(brain.on_outside_house());
        assert_eq!(brain.mode(), GhostMode::Scatter);
        // Only House reacts to the outside trigger.
        assert!(!brain.on_outside_house());
        assert_eq!(brain.mode(), GhostMode::Scatter);
    }

    #[test]
    fn touch_outcomes() {
        let mut brain = GhostBrain::new(GhostMode::Chase);
        assert_eq!(brain.on_touched(), ContactOutcome::RivalCaught);

        brain.on_power_pellet();
        assert_eq!(brain.on_touched(), ContactOutcome::GhostEaten);
        assert_eq!(brain.mode(), GhostMode::Eaten);
        assert_eq!(brain.on_touched(), ContactOutcome::Ignored);

        assert!(!brain.on_outside_house());
        assert!(brain.on_inside_house());
        assert_eq!(brain.mode(), GhostMode::House);
        assert!(!brain.on_inside_house());
    }

    #[test]
    fn flashing_near_fright_end() {
        let t = tuning();
        let mut brain = GhostBrain::new(GhostMode::Scatter);
        brain.on_power_pellet();
        run(&mut brain, 10);
        assert_eq!(brain.visual(&t), GhostVisual::Frightened);
        run(&mut brain, t.fright_flash_after - 10 + 20);
        // fright_timer == flash_after + 20, 20 % 20 == 0 -> flashing frame
        assert_eq!(brain.visual(&t), GhostVisual::FrightenedFlashing);
        run(&mut brain, 15);
        assert_eq!(brain.visual(&t), GhostVisual::Frightened);
    }

    // -- steering --------------------------------------------------------

    /// 7x7 open box with a house door at (3,3), walls either side of it.
    fn house_fixture() -> (BlockedGrid, GhostHouse) {
        let walls: Vec<_> = [(2, 3), (4, 3)]
            .iter()
            .map(|(x, y)| PixelPosition { x: x * 8, y: y * 8 })
            .collect();
        let door = GridPosition::new(3, 3);
        let grid = build_blocked_grid(&walls, 7, 7, 8).with_doors(&[door]);
        let house = GhostHouse {
            exit: GridPosition::new(3, 2),
            inside: GridPosition::new(3, 4),
        };
        (grid, house)
    }

    fn strategy() -> GhostStrategy {
        GhostStrategy {
            targeting: Targeting::Direct,
            corner: Corner::TopLeft,
        }
    }

    fn ctx<'a>(
        strategy: &'a GhostStrategy,
        grid: &'a BlockedGrid,
        house: &'a GhostHouse,
        ghost: GridPosition,
        heading: Option<Direction>,
    ) -> SteeringContext<'a> {
        SteeringContext {
            strategy,
            world: WorldSnapshot {
                ghost,
                heading,
                rival: GridPosition::new(6, 6),
                rival_facing: Direction::Left,
            },
            grid,
            house,
            frightened_policy: FrightenedPolicy::Flee,
        }
    }

    #[test]
    fn house_ghost_walks_up_through_door() {
        let (grid, house) = house_fixture();
        let s = strategy();
        let mut rng = StdRng::seed_from_u64(0);
        let brain = GhostBrain::new(GhostMode::House);
        let dir = next_direction(&brain, &ctx(&s, &grid, &house, house.inside, None), &mut rng);
        assert_eq!(dir, Some(Direction::Up));
    }

    #[test]
    fn eaten_ghost_searches_back_inside() {
        let (grid, house) = house_fixture();
        let s = strategy();
        let mut rng = StdRng::seed_from_u64(0);
        let brain = GhostBrain::new(GhostMode::Eaten);
        let dir = next_direction(
            &brain,
            &ctx(&s, &grid, &house, GridPosition::new(3, 1), Some(Direction::Up)),
            &mut rng,
        );
        // Heading away from the house, but search turns it around.
        assert_eq!(dir, Some(Direction::Down));
    }

    #[test]
    fn scatter_ghost_keeps_out_of_house() {
        let (grid, house) = house_fixture();
        let s = GhostStrategy {
            targeting: Targeting::Direct,
            corner: Corner::BottomLeft,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let brain = GhostBrain::new(GhostMode::Scatter);
        let dir = next_direction(
            &brain,
            &ctx(&s, &grid, &house, house.exit, Some(Direction::Right)),
            &mut rng,
        );
        assert_ne!(dir, Some(Direction::Down));
        assert!(dir.is_some());
    }

    #[test]
    fn chase_ghost_heads_for_rival() {
        let (grid, house) = house_fixture();
        let s = strategy();
        let mut rng = StdRng::seed_from_u64(0);
        let brain = GhostBrain::new(GhostMode::Chase);
        let dir = next_direction(
            &brain,
            &ctx(&s, &grid, &house, GridPosition::new(5, 6), Some(Direction::Right)),
            &mut rng,
        );
        assert_eq!(dir, Some(Direction::Right));
    }
}
