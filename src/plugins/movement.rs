//! Pixel-step movement shared by the rival and the ghosts.
//!
//! Each tick an agent moves by its `Velocity`, wrapping around the edges of
//! the maze. `GridPosition` follows the pixel position, and `Facing` plus
//! `AnimationFrame` advance while the agent is moving.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::components::*;
use crate::grid::BlockedGrid;
use crate::plugins::TickSet;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, agent_motion.in_set(TickSet::Motion));
    }
}

/// Step `pos` by `vel` inside a `width` x `height` pixel area, wrapping.
pub fn advance(pos: PixelPosition, vel: Velocity, width: i32, height: i32) -> PixelPosition {
    PixelPosition {
        x: (pos.x + vel.vx).rem_euclid(width.max(1)),
        y: (pos.y + vel.vy).rem_euclid(height.max(1)),
    }
}

#[allow(clippy::type_complexity)]
#[span_fn]
fn agent_motion(
    grid: Option<Res<BlockedGrid>>,
    mut query: Query<(
        &mut PixelPosition,
        &Velocity,
        Option<&mut GridPosition>,
        Option<&mut Facing>,
        Option<&mut AnimationFrame>,
    )>,
) {
    let Some(grid) = grid else { return };
    let (width, height) = grid.pixel_size();

    for (mut pos, vel, tile, facing, anim) in &mut query {
        let Some(dir) = vel.direction() else {
            continue;
        };
        *pos = advance(*pos, *vel, width, height);

        if let Some(mut tile) = tile {
            let now = grid.tile_of(*pos);
            if *tile != now {
                *tile = now;
            }
        }
        if let Some(mut facing) = facing {
            facing.0 = dir;
        }
        if let Some(mut anim) = anim {
            anim.frame += anim.speed;
            if anim.frame >= anim.frames as f32 {
                anim.frame = 0.0;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_blocked_grid;

    fn setup_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(build_blocked_grid(&[], 4, 3, 8));
        app.add_plugins(MovementPlugin);
        app
    }

    fn tick(app: &mut App) {
        app.world_mut().run_schedule(FixedUpdate);
    }

    #[test]
    fn advance_wraps_both_edges() {
        let left = advance(PixelPosition { x: 0, y: 8 }, Velocity::new(Direction::Left, 2), 32, 24);
        assert_eq!(left, PixelPosition { x: 30, y: 8 });
        let down = advance(PixelPosition { x: 8, y: 22 }, Velocity::new(Direction::Down, 2), 32, 24);
        assert_eq!(down, PixelPosition { x: 8, y: 0 });
    }

    #[test]
    fn agent_moves_and_updates_tile() {
        let mut app = setup_app();
        let agent = app
            .world_mut()
            .spawn((
                PixelPosition { x: 8, y: 8 },
                GridPosition::new(1, 1),
                Velocity::new(Direction::Right, 2),
                Facing(Direction::Left),
            ))
            .id();

        for _ in 0..4 {
            tick(&mut app);
        }

        let entity = app.world().entity(agent);
        assert_eq!(*entity.get::<PixelPosition>().unwrap(), PixelPosition { x: 16, y: 8 });
        assert_eq!(*entity.get::<GridPosition>().unwrap(), GridPosition::new(2, 1));
        assert_eq!(entity.get::<Facing>().unwrap().0, Direction::Right);
    }

    #[test]
    fn resting_agent_keeps_facing_and_frame() {
        let mut app = setup_app();
        let agent = app
            .world_mut()
            .spawn((
                PixelPosition { x: 8, y: 8 },
                Velocity::ZERO,
                Facing(Direction::Up),
                AnimationFrame::new(2, 0.5),
            ))
            .id();

        tick(&mut app);

        let entity = app.world().entity(agent);
        assert_eq!(entity.get::<Facing>().unwrap().0, Direction::Up);
        assert_eq!(entity.get::<AnimationFrame>().unwrap().index(), 0);
    }

    #[test]
    fn animation_loops() {
        let mut app = setup_app();
        let agent = app
            .world_mut()
            .spawn((
                PixelPosition { x: 0, y: 0 },
                Velocity::new(Direction::Down, 2),
                AnimationFrame::new(2, 0.5),
            ))
            .id();

        tick(&mut app);
        tick(&mut app);
        assert_eq!(app.world().entity(agent).get::<AnimationFrame>().unwrap().index(), 1);
        tick(&mut app);
        tick(&mut app);
        assert_eq!(app.world().entity(agent).get::<AnimationFrame>().unwrap().index(), 0);
    }
}
