use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use ghost_ai::GhostAiPlugin;
use ghost_ai::ai::search::{SearchAlgorithm, find_next_step};
use ghost_ai::app_state::RoundState;
use ghost_ai::grid::{GridPosition, PixelPosition, build_blocked_grid};
use ghost_ai::plugins::maze::{Level, install_level};
use micromegas_tracing::dispatch::{flush_log_buffer, flush_metrics_buffer};
use micromegas_tracing::levels::{self, LevelFilter};
use micromegas_tracing::test_utils::init_in_memory_tracing;
use serial_test::serial;

const LEVEL: &str = "\
#########
#.......#
#.##-##.#
#.#b..#.#
#.#####.#
#...P...#
#########";

/// Level install, mode changes and the per-tick census all reach the sink.
#[test]
#[serial]
fn ghost_ticks_emit_logs_and_metrics() {
    let guard = init_in_memory_tracing();
    levels::set_max_level(LevelFilter::Trace);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(GhostAiPlugin);
    install_level(app.world_mut(), &Level::parse(LEVEL).unwrap());
    app.insert_state(RoundState::Running);

    // Long enough for the ghost to leave the house.
    for _ in 0..13 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    flush_log_buffer();
    flush_metrics_buffer();

    let sink = &guard.sink;
    // "level installed" plus House -> Scatter.
    assert!(
        sink.total_log_events() >= 2,
        "expected >= 2 log events, got {}",
        sink.total_log_events()
    );
    // Five mode counters per tick.
    assert!(
        sink.total_metrics_events() >= 5 * 13,
        "expected >= 65 metrics events, got {}",
        sink.total_metrics_events()
    );
}

/// No census is taken while the round waits for the rival.
#[test]
#[serial]
fn idle_round_emits_no_metrics() {
    let guard = init_in_memory_tracing();
    levels::set_max_level(LevelFilter::Trace);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(GhostAiPlugin);
    install_level(app.world_mut(), &Level::parse(LEVEL).unwrap());
    app.insert_state(RoundState::AwaitingInput);

    for _ in 0..10 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    flush_metrics_buffer();
    assert_eq!(guard.sink.total_metrics_events(), 0);
}

/// A search with no answer leaves a debug trail instead of failing loudly.
#[test]
#[serial]
fn unreachable_search_is_logged() {
    let guard = init_in_memory_tracing();
    levels::set_max_level(LevelFilter::Trace);

    let walls: Vec<_> = (0..3).map(|y| PixelPosition { x: 8, y: y * 8 }).collect();
    let grid = build_blocked_grid(&walls, 3, 3, 8);
    let next = find_next_step(
        SearchAlgorithm::Bfs,
        GridPosition::new(0, 0),
        GridPosition::new(2, 2),
        &grid,
        false,
    );
    assert_eq!(next, None);

    flush_log_buffer();
    assert!(guard.sink.total_log_events() >= 1);
}
