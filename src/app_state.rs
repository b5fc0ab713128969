use bevy::prelude::*;

/// Round lifecycle as seen by the ghosts. Ghosts stay put until the game
/// reports the rival's first input by moving the round to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, States)]
pub enum RoundState {
    #[default]
    AwaitingInput,
    Running,
    Caught,
}
