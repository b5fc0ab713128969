pub mod ai;
pub mod app_state;
pub mod components;
pub mod events;
pub mod ghost_mode;
pub mod grid;
pub mod plugins;
pub mod resources;
pub mod tracing_bridge;

use bevy::prelude::*;

use app_state::RoundState;
use plugins::TickSet;
use plugins::ghosts::GhostPlugin;
use plugins::maze::MazePlugin;
use plugins::movement::MovementPlugin;
use plugins::telemetry::TelemetryPlugin;
use resources::{GhostRng, GhostTuning};

/// Everything needed to run the ghosts inside a host app.
///
/// Insert a custom [`GhostTuning`] before adding the plugin to override the
/// defaults; the fixed tick rate and the RNG seed are taken from it here.
/// The host must add `StatesPlugin` (or `DefaultPlugins`).
pub struct GhostAiPlugin;

impl Plugin for GhostAiPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<RoundState>();

        let tuning = app.world_mut().get_resource_or_init::<GhostTuning>().clone();
        app.insert_resource(GhostRng::from_tuning(&tuning));
        app.insert_resource(Time::<Fixed>::from_hz(tuning.tick_rate));

        // Nothing moves before the rival's first input.
        app.configure_sets(
            FixedUpdate,
            (
                TickSet::Modes,
                TickSet::Steering,
                TickSet::Motion,
                TickSet::Contact,
            )
                .chain()
                .run_if(in_state(RoundState::Running)),
        );

        app.add_plugins(MazePlugin);
        app.add_plugins(MovementPlugin);
        app.add_plugins(GhostPlugin);
        app.add_plugins(TelemetryPlugin);
    }
}
