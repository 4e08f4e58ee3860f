use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ability::Ability;

/// Audio/visual feedback cues for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    FountainCollect,
    Restore,
    ShardCollect,
    Hurt,
    RockShatter,
    Dash,
}

/// Things that happened during one `update`, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Cue(Cue),
    AbilityQueued(Ability),
    AbilityStarted(Ability),
    AbilityEnded(Ability),
    ShardCollected { collected: usize, total: usize },
    CheckpointReached { position: Vec2 },
    RockShattered { position: Vec2 },
    FellOut,
    ProgressSaved,
    Paused,
    Resumed,
    MapToggled { open: bool },
    LevelRestarted,
    LevelComplete,
    LevelFailed,
    ExitRequested,
}
