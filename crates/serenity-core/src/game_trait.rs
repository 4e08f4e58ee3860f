use serde::{Deserialize, Serialize};

use crate::input::InputFrame;

/// Core trait implemented by every playable level simulation.
///
/// The host owns the frame loop, the real-time tick clock and persistence;
/// the game only handles level-specific logic.
pub trait LevelGame: Send {
    /// Events emitted from `update` (cues, ability transitions, completion).
    type Event;

    /// Static description used by level select and diagnostics.
    fn metadata(&self) -> GameMetadata;

    /// Advance one fixed simulation step.
    fn update(&mut self, dt: f32, input: &InputFrame) -> Vec<Self::Event>;

    /// Encode a snapshot of the observable state for HUD and diagnostic consumers.
    fn serialize_state(&self) -> Vec<u8>;

    /// Fixed simulation rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Freeze the simulation (pause menu or map screen).
    fn pause(&mut self);

    /// Unfreeze after `pause`.
    fn resume(&mut self);

    /// Whether the simulation is currently frozen.
    fn is_paused(&self) -> bool;

    /// Rebuild the level from its layout, discarding all runtime state.
    fn restart(&mut self);

    /// Current level outcome.
    fn outcome(&self) -> LevelOutcome;
}

/// Level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub collectibles: usize,
}

/// Terminal or running state of a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    #[default]
    InProgress,
    Complete,
    Failed,
}

impl LevelOutcome {
    pub fn is_finished(self) -> bool {
        !matches!(self, LevelOutcome::InProgress)
    }
}

/// Generates the `serialize_state`, `pause`, `resume`, `is_paused` and `outcome`
/// methods shared by every level game.
///
/// Requires the implementing struct to have a `paused: bool` field, an
/// `outcome: LevelOutcome` field and a `snapshot()` method returning a
/// serializable value.
#[macro_export]
macro_rules! level_game_boilerplate {
    () => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.snapshot()).expect("snapshot serialization must succeed")
        }

        fn pause(&mut self) {
            self.set_paused(true);
        }

        fn resume(&mut self) {
            self.set_paused(false);
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn outcome(&self) -> $crate::game_trait::LevelOutcome {
            self.outcome
        }
    };
}
