//! Tick-level telemetry: frame time plus how many ghosts sit in each mode.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, span_scope};

use crate::app_state::RoundState;
use crate::ghost_mode::{GhostBrain, GhostMode};
use crate::plugins::TickSet;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, frame_telemetry);
        app.add_systems(
            FixedUpdate,
            mode_census
                .after(TickSet::Contact)
                .run_if(in_state(RoundState::Running)),
        );
    }
}

fn frame_telemetry(time: Res<Time>) {
    span_scope!("frame");
    let dt_ms = time.delta_secs_f64() * 1000.0;
    fmetric!("frame_time_ms", "ms", dt_ms);
}

/// Number of ghosts in each mode, in `GhostMode` declaration order.
pub fn count_modes<'a>(brains: impl IntoIterator<Item = &'a GhostBrain>) -> [u64; 5] {
    let mut counts = [0u64; 5];
    for brain in brains {
        let slot = match brain.mode() {
            GhostMode::House => 0,
            GhostMode::Scatter => 1,
            GhostMode::Chase => 2,
            GhostMode::Frightened => 3,
            GhostMode::Eaten => 4,
        };
        counts[slot] += 1;
    }
    counts
}

fn mode_census(brains: Query<&GhostBrain>) {
    span_scope!("mode_census");
    let [house, scatter, chase, frightened, eaten] = count_modes(brains.iter());
    imetric!("ghosts_in_house", "count", house);
    imetric!("ghosts_scatter", "count", scatter);
    imetric!("ghosts_chase", "count", chase);
    imetric!("ghosts_frightened", "count", frightened);
    imetric!("ghosts_eaten_mode", "count", eaten);
}
