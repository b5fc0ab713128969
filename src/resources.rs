use std::collections::HashMap;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::ai::frightened::FrightenedPolicy;
use crate::ai::GhostStrategy;
use crate::components::Personality;

// ---------------------------------------------------------------------------
// Ghost tuning
// ---------------------------------------------------------------------------

/// Timings and thresholds for the ghost AI. Durations are in ticks.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostTuning {
    pub tick_rate: f64,
    pub tile_size: i32,
    /// Pixels per tick. Must divide `tile_size` so ghosts land on tiles.
    pub ghost_speed: i32,
    pub scatter_ticks: u32,
    pub chase_ticks: u32,
    pub fright_ticks: u32,
    /// Fright ticks after which the frightened sprite starts flashing.
    pub fright_flash_after: u32,
    pub lookahead_tiles: i32,
    pub distance_gate_tiles: f32,
    pub search_switch_tiles: f32,
    pub frightened_policy: FrightenedPolicy,
    pub rng_seed: u64,
    /// Replaces the built-in strategy of the listed personalities.
    pub strategies: HashMap<Personality, GhostStrategy>,
}

impl Default for GhostTuning {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            tile_size: 8,
            ghost_speed: 2,
            scatter_ticks: 60 * 5,
            chase_ticks: 60 * 20,
            fright_ticks: 60 * 7,
            fright_flash_after: 60 * 5,
            lookahead_tiles: 2,
            distance_gate_tiles: 8.0,
            search_switch_tiles: 12.0,
            frightened_policy: FrightenedPolicy::Flee,
            rng_seed: 0x5eed,
            strategies: HashMap::new(),
        }
    }
}

impl GhostTuning {
    /// Parse tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let tuning: GhostTuning =
            serde_json::from_str(text).map_err(|e| format!("Invalid tuning JSON: {}", e))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size <= 0 {
            return Err(format!("tile_size must be positive, got {}", self.tile_size));
        }
        if self.ghost_speed <= 0 || self.tile_size % self.ghost_speed != 0 {
            return Err(format!(
                "ghost_speed {} must be positive and divide tile_size {}",
                self.ghost_speed, self.tile_size
            ));
        }
        if self.scatter_ticks == 0 || self.chase_ticks == 0 || self.fright_ticks == 0 {
            return Err("mode durations must be at least one tick".to_string());
        }
        if self.tick_rate <= 0.0 {
            return Err(format!("tick_rate must be positive, got {}", self.tick_rate));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Level source and randomness
// ---------------------------------------------------------------------------

/// ASCII level text to load when a round starts.
#[derive(Resource, Debug, Clone)]
pub struct LevelSource(pub String);

/// Seeded RNG for frightened wandering, so runs are reproducible.
#[derive(Resource, Debug)]
pub struct GhostRng(pub StdRng);

impl GhostRng {
    pub fn from_tuning(tuning: &GhostTuning) -> Self {
        GhostRng(StdRng::seed_from_u64(tuning.rng_seed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_arcade_timings() {
        let t = GhostTuning::default();
        assert_eq!(t.scatter_ticks, 300);
        assert_eq!(t.chase_ticks, 1200);
        assert_eq!(t.fright_ticks, 420);
        assert_eq!(t.tile_size, 8);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let t = GhostTuning::from_json(r#"{ "scatter_ticks": 10, "frightened_policy": "Wander" }"#)
            .unwrap();
        assert_eq!(t.scatter_ticks, 10);
        assert_eq!(t.frightened_policy, FrightenedPolicy::Wander);
        assert_eq!(t.chase_ticks, 1200);
    }

    #[test]
    fn speed_must_divide_tile() {
        let result = GhostTuning::from_json(r#"{ "ghost_speed": 3 }"#);
        assert!(result.unwrap_err().contains("must be positive and divide"));
    }

    #[test]
    fn zero_duration_rejected() {
        let result = GhostTuning::from_json(r#"{ "fright_ticks": 0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_json_rejected() {
        let result = GhostTuning::from_json("{ scatter_ticks: ");
        assert!(result.unwrap_err().contains("Invalid tuning JSON"));
    }

    #[test]
    fn strategy_overrides_replace_defaults() {
        use crate::ai::search::SearchPolicy;
        use crate::ai::{Corner, Targeting};

        let t = GhostTuning::from_json(
            r#"{
                "strategies": {
                    "Pinky": { "targeting": { "GraphSearch": { "policy": "AStar" } }, "corner": "TopLeft" },
                    "Clyde": { "targeting": "Direct", "corner": "BottomLeft" }
                }
            }"#,
        )
        .unwrap();

        let pinky = GhostStrategy::for_personality(Personality::Pinky, &t);
        assert_eq!(
            pinky.targeting,
            Targeting::GraphSearch {
                policy: SearchPolicy::AStar
            }
        );
        assert_eq!(pinky.corner, Corner::TopLeft);
        assert_eq!(
            GhostStrategy::for_personality(Personality::Clyde, &t).targeting,
            Targeting::Direct
        );
        // Personalities without an override keep their default.
        assert_eq!(
            GhostStrategy::for_personality(Personality::Inky, &t),
            GhostStrategy::for_personality(Personality::Inky, &GhostTuning::default())
        );
    }

    #[test]
    fn unknown_personality_override_rejected() {
        let result = GhostTuning::from_json(
            r#"{ "strategies": { "Sue": { "targeting": "Direct", "corner": "TopLeft" } } }"#,
        );
        assert!(result.unwrap_err().contains("Invalid tuning JSON"));
    }

    #[test]
    fn rng_is_seeded() {
        use rand::Rng;
        let t = GhostTuning::default();
        let a: u32 = GhostRng::from_tuning(&t).0.r#gen();
        let b: u32 = GhostRng::from_tuning(&t).0.r#gen();
        assert_eq!(a, b);
    }
}
