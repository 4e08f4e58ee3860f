use glam::Vec2;
use serde::{Deserialize, Serialize};

use serenity_core::game_trait::LevelOutcome;

use crate::ability::Ability;
use crate::obstacles::{ObstacleId, ObstacleKind};
use crate::player::{Facing, PlayerDrawState};

/// Read-only values the HUD draws each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub active_ability: Option<Ability>,
    /// Drives the countdown bar.
    pub ability_remaining_secs: f32,
    pub ability_paused: bool,
    pub queue: Vec<Ability>,
    pub last_used: Option<Ability>,
    pub serenity: f32,
    pub serenity_max: f32,
    pub shards_collected: usize,
    pub shards_total: usize,
    pub rock_hit: bool,
    pub monster_hit: bool,
    pub map_open: bool,
    pub facing: Facing,
    /// Sprite opacity; lowered while transparent.
    pub alpha: f32,
    pub hurt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    pub position: Vec2,
}

/// Full observable state, encoded by `serialize_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplaySnapshot {
    pub frame: u64,
    pub outcome: LevelOutcome,
    pub paused: bool,
    pub hud: HudSnapshot,
    pub player: PlayerDrawState,
    pub obstacles: Vec<ObstacleView>,
    /// Availability per fountain, by id.
    pub fountains: Vec<bool>,
    /// Claimed flag per shard, by id.
    pub shards: Vec<bool>,
}
