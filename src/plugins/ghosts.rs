//! Ghost spawning, per-tick mode updates, steering, and contact with the rival.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::ai::{GhostStrategy, WorldSnapshot};
use crate::app_state::RoundState;
use crate::components::*;
use crate::events::{GhostEaten, GhostModeChanged, PowerPelletEaten, RivalCaught};
use crate::ghost_mode::{
    next_direction, ContactOutcome, GhostBrain, GhostHouse, GhostVisual, SteeringContext,
};
use crate::grid::BlockedGrid;
use crate::plugins::maze::Level;
use crate::plugins::TickSet;
use crate::resources::{GhostRng, GhostTuning};

pub struct GhostPlugin;

const RIVAL_FACING: Direction = Direction::Left;
const GHOST_FACING: Direction = Direction::Up;

impl Plugin for GhostPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, ghost_modes.in_set(TickSet::Modes));
        app.add_systems(FixedUpdate, ghost_steering.in_set(TickSet::Steering));
        app.add_systems(FixedUpdate, rival_contact.in_set(TickSet::Contact));
        app.add_observer(on_power_pellet);
        app.add_observer(on_rival_caught);
        app.add_systems(OnExit(RoundState::Caught), reset_agents);
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Spawn the rival and one ghost per ghost spawn of `level`.
pub fn spawn_agents(world: &mut World, level: &Level, tuning: &GhostTuning) {
    let pixel = |tile: GridPosition| PixelPosition {
        x: tile.x * tuning.tile_size,
        y: tile.y * tuning.tile_size,
    };

    world.spawn((
        Rival,
        level.rival_spawn,
        pixel(level.rival_spawn),
        SpawnPosition(level.rival_spawn),
        Velocity::ZERO,
        Facing(RIVAL_FACING),
        AnimationFrame::new(4, 0.2),
        MoveSpeed(tuning.ghost_speed),
    ));

    for (personality, tile) in &level.ghost_spawns {
        world.spawn((
            Ghost,
            *personality,
            GhostStrategy::for_personality(*personality, tuning),
            GhostBrain::default(),
            GhostVisual::Normal,
            *tile,
            pixel(*tile),
            SpawnPosition(*tile),
            Velocity::ZERO,
            Facing(GHOST_FACING),
            AnimationFrame::new(2, 0.1),
            MoveSpeed(tuning.ghost_speed),
        ));
    }
}

/// Put every agent back on its spawn tile with a fresh brain.
#[allow(clippy::type_complexity)]
fn reset_agents(
    grid: Option<Res<BlockedGrid>>,
    mut agents: Query<(
        Entity,
        &SpawnPosition,
        &mut GridPosition,
        &mut PixelPosition,
        &mut Velocity,
        Option<&mut Facing>,
        Option<&mut GhostBrain>,
        Option<&mut GhostVisual>,
    )>,
    mut commands: Commands,
) {
    let Some(grid) = grid else { return };
    for (entity, spawn, mut tile, mut pos, mut velocity, facing, brain, visual) in &mut agents {
        *tile = spawn.0;
        *pos = grid.pixel_of(spawn.0);
        *velocity = Velocity::ZERO;
        if let Some(mut facing) = facing {
            facing.0 = if brain.is_some() {
                GHOST_FACING
            } else {
                RIVAL_FACING
            };
        }
        if let Some(mut visual) = visual {
            visual.set_if_neq(GhostVisual::Normal);
        }
        if let Some(mut brain) = brain {
            let from = brain.mode();
            *brain = GhostBrain::default();
            let to = brain.mode();
            if from != to {
                commands.trigger(GhostModeChanged {
                    ghost: entity,
                    from,
                    to,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tick systems
// ---------------------------------------------------------------------------

/// Advance timers, apply the house triggers and refresh the visual.
#[allow(clippy::type_complexity)]
#[span_fn]
fn ghost_modes(
    tuning: Res<GhostTuning>,
    grid: Option<Res<BlockedGrid>>,
    house: Option<Res<GhostHouse>>,
    mut ghosts: Query<
        (
            Entity,
            &PixelPosition,
            &Personality,
            &mut GhostBrain,
            Option<&mut GhostVisual>,
        ),
        With<Ghost>,
    >,
    mut commands: Commands,
) {
    let Some(grid) = grid else { return };
    let house_pixels = house.map(|h| (grid.pixel_of(h.exit), grid.pixel_of(h.inside)));

    for (entity, pos, personality, mut brain, visual) in &mut ghosts {
        let from = brain.mode();
        brain.tick_timers(&tuning);
        if let Some((exit, inside)) = house_pixels {
            if *pos == exit {
                brain.on_outside_house();
            }
            if *pos == inside {
                brain.on_inside_house();
            }
        }
        if let Some(mut visual) = visual {
            visual.set_if_neq(brain.visual(&tuning));
        }
        let to = brain.mode();
        if from != to {
            info!("ghost {:?}: {:?} -> {:?}", personality, from, to);
            commands.trigger(GhostModeChanged {
                ghost: entity,
                from,
                to,
            });
        }
    }
}

/// Pick a new direction for every ghost sitting exactly on a tile.
#[allow(clippy::type_complexity)]
#[span_fn]
fn ghost_steering(
    tuning: Res<GhostTuning>,
    grid: Option<Res<BlockedGrid>>,
    house: Option<Res<GhostHouse>>,
    mut rng: ResMut<GhostRng>,
    rival_query: Query<(&PixelPosition, &Facing), With<Rival>>,
    mut ghosts: Query<
        (&PixelPosition, &GhostBrain, &GhostStrategy, &MoveSpeed, &mut Velocity),
        (With<Ghost>, Without<Rival>),
    >,
) {
    let (Some(grid), Some(house)) = (grid, house) else {
        return;
    };
    let Ok((rival_pos, rival_facing)) = rival_query.single() else {
        return;
    };
    let rival = grid.tile_of(*rival_pos);

    for (pos, brain, strategy, speed, mut velocity) in &mut ghosts {
        if !grid.is_aligned(*pos) {
            continue;
        }
        let ctx = SteeringContext {
            strategy,
            world: WorldSnapshot {
                ghost: grid.tile_of(*pos),
                heading: velocity.direction(),
                rival,
                rival_facing: rival_facing.0,
            },
            grid: &grid,
            house: &house,
            frightened_policy: tuning.frightened_policy,
        };
        *velocity = match next_direction(brain, &ctx, &mut rng.0) {
            Some(dir) => Velocity::new(dir, speed.0),
            None => Velocity::ZERO,
        };
    }
}

/// Resolve ghosts overlapping the rival.
#[span_fn]
fn rival_contact(
    grid: Option<Res<BlockedGrid>>,
    rival_query: Query<&PixelPosition, With<Rival>>,
    mut ghosts: Query<(Entity, &PixelPosition, &Personality, &mut GhostBrain), With<Ghost>>,
    mut commands: Commands,
) {
    let Some(grid) = grid else { return };
    let Ok(rival) = rival_query.single() else {
        return;
    };

    for (entity, pos, personality, mut brain) in &mut ghosts {
        if !touching(*pos, *rival, grid.tile_size) {
            continue;
        }
        let from = brain.mode();
        match brain.on_touched() {
            ContactOutcome::Ignored => {}
            ContactOutcome::GhostEaten => {
                info!("ghost {:?} eaten", personality);
                imetric!("ghosts_eaten", "count", 1);
                commands.trigger(GhostModeChanged {
                    ghost: entity,
                    from,
                    to: brain.mode(),
                });
                commands.trigger(GhostEaten { ghost: entity });
            }
            ContactOutcome::RivalCaught => {
                info!("rival caught by {:?} in {:?}", personality, from);
                commands.trigger(RivalCaught { ghost: entity });
            }
        }
    }
}

/// Tile-sized hitboxes overlap.
pub fn touching(a: PixelPosition, b: PixelPosition, tile_size: i32) -> bool {
    (a.x - b.x).abs() < tile_size && (a.y - b.y).abs() < tile_size
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

fn on_power_pellet(
    _trigger: On<PowerPelletEaten>,
    mut ghosts: Query<(Entity, &mut GhostBrain), With<Ghost>>,
    mut commands: Commands,
) {
    for (entity, mut brain) in &mut ghosts {
        let from = brain.mode();
        if brain.on_power_pellet() {
            commands.trigger(GhostModeChanged {
                ghost: entity,
                from,
                to: brain.mode(),
            });
        }
    }
}

fn on_rival_caught(_trigger: On<RivalCaught>, next_state: Option<ResMut<NextState<RoundState>>>) {
    if let Some(mut next_state) = next_state {
        next_state.set(RoundState::Caught);
    }
}
