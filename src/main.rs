use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::tasks::{ComputeTaskPool, TaskPoolBuilder};
use clap::Parser;
use ghost_ai::GhostAiPlugin;
use ghost_ai::ai::candidate_directions;
use ghost_ai::app_state::RoundState;
use ghost_ai::components::{Direction, MoveSpeed, PixelPosition, Rival, Velocity};
use ghost_ai::events::PowerPelletEaten;
use ghost_ai::grid::BlockedGrid;
use ghost_ai::plugins::TickSet;
use ghost_ai::plugins::maze::Level;
use ghost_ai::resources::{GhostTuning, LevelSource};
use ghost_ai::tracing_bridge::ScopeBridgeLayer;
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_telemetry_sink::tracing_interop::TracingCaptureLayer;
use micromegas_tracing::dispatch::{flush_thread_buffer, init_thread_stream, unregister_thread_stream};
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::{info, warn};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Parser)]
#[command(author, version, about = "Headless ghost AI simulation", long_about = None)]
struct Args {
    /// ASCII level file
    #[arg(short, long, default_value = "assets/levels/classic.txt")]
    level: PathBuf,

    /// Tuning overrides as JSON
    #[arg(short, long)]
    tuning: Option<PathBuf>,

    /// Fixed ticks to simulate before exiting
    #[arg(long, default_value_t = 3600)]
    ticks: u32,

    /// Ticks between scripted power pellets, 0 for none
    #[arg(long, default_value_t = 900)]
    pellet_every: u32,

    /// Bridge per-system spans as well as schedule spans
    #[arg(long, default_value_t = false)]
    trace_systems: bool,
}

#[derive(Resource, Debug, Clone, Copy)]
struct SimLimits {
    ticks: u32,
    pellet_every: u32,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    // Spans require MICROMEGAS_ENABLE_CPU_TRACING=true; logs and metrics always flow.
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_install_tracing_capture(false)
        .build()
        .map_err(|e| format!("failed to initialize telemetry: {}", e))?;

    // Must be installed before Bevy starts emitting spans.
    let bridge = if args.trace_systems {
        ScopeBridgeLayer::schedules_and_systems()
    } else {
        ScopeBridgeLayer::schedules()
    };
    let subscriber = Registry::default().with(bridge).with(TracingCaptureLayer {
        max_level: LevelFilter::Info,
    });
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("failed to set tracing subscriber: {}", e))?;

    let tuning = match &args.tuning {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            GhostTuning::from_json(&text)?
        }
        None => GhostTuning::default(),
    };
    let level_text = std::fs::read_to_string(&args.level)
        .map_err(|e| format!("cannot read {}: {}", args.level.display(), e))?;
    info!(
        "ghost-sim starting: level={} ticks={} policy={:?}",
        args.level.display(),
        args.ticks,
        tuning.frightened_policy
    );

    // Must happen before App::new() so TaskPoolPlugin keeps this pool.
    ComputeTaskPool::get_or_init(|| {
        TaskPoolBuilder::new()
            .on_thread_spawn(|| {
                init_thread_stream();
            })
            .on_thread_destroy(|| {
                flush_thread_buffer();
                unregister_thread_stream();
            })
            .build()
    });

    let frame = Duration::from_secs_f64(1.0 / tuning.tick_rate);
    let exit = App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)))
        .add_plugins(StatesPlugin)
        .insert_resource(tuning)
        .insert_resource(LevelSource(level_text))
        .insert_resource(SimLimits {
            ticks: args.ticks,
            pellet_every: args.pellet_every,
        })
        .add_plugins(GhostAiPlugin)
        .add_systems(Update, begin_round.run_if(in_state(RoundState::AwaitingInput)))
        .add_systems(FixedUpdate, drive_rival.in_set(TickSet::Steering))
        .add_systems(
            FixedUpdate,
            (scripted_pellets, stop_after_limit)
                .after(TickSet::Contact)
                .run_if(in_state(RoundState::Running)),
        )
        .add_systems(OnEnter(RoundState::Caught), finish_caught)
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("simulation failed with code {}", code)),
    }
}

/// Stand-in for the player's first key press: start moving left.
fn begin_round(
    level: Option<Res<Level>>,
    tuning: Res<GhostTuning>,
    mut rival: Query<&mut Velocity, With<Rival>>,
    mut next_state: ResMut<NextState<RoundState>>,
    mut exit: MessageWriter<AppExit>,
) {
    if level.is_none() {
        warn!("no level installed, exiting");
        exit.write(AppExit::error());
        return;
    }
    for mut velocity in &mut rival {
        *velocity = Velocity::new(Direction::Left, tuning.ghost_speed);
    }
    next_state.set(RoundState::Running);
}

/// Scripted rival: keep going straight, turn at walls.
fn drive_rival(
    grid: Option<Res<BlockedGrid>>,
    mut rival: Query<(&PixelPosition, &MoveSpeed, &mut Velocity), With<Rival>>,
) {
    let Some(grid) = grid else { return };
    for (pos, speed, mut velocity) in &mut rival {
        if !grid.is_aligned(*pos) {
            continue;
        }
        let tile = grid.tile_of(*pos);
        let heading = velocity.direction();
        let ahead_open = heading.is_some_and(|dir| {
            let (dx, dy) = dir.delta();
            grid.is_open(tile.offset(dx, dy), false)
        });
        if ahead_open {
            continue;
        }
        *velocity = match candidate_directions(tile, heading, &grid, false).first() {
            Some(dir) => Velocity::new(*dir, speed.0),
            None => Velocity::ZERO,
        };
    }
}

fn scripted_pellets(limits: Res<SimLimits>, mut tick: Local<u32>, mut commands: Commands) {
    *tick += 1;
    if limits.pellet_every > 0 && *tick % limits.pellet_every == 0 {
        info!("power pellet at tick {}", *tick);
        commands.trigger(PowerPelletEaten);
    }
}

fn stop_after_limit(limits: Res<SimLimits>, mut tick: Local<u32>, mut exit: MessageWriter<AppExit>) {
    *tick += 1;
    if *tick >= limits.ticks {
        info!("tick limit reached");
        exit.write(AppExit::Success);
    }
}

fn finish_caught(mut exit: MessageWriter<AppExit>) {
    info!("round over: rival caught");
    exit.write(AppExit::Success);
}
