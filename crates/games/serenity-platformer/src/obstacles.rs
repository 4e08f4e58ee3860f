use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::world::{BodyId, BodySet, FixtureId};

/// Index of an obstacle within its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FountainId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardId(pub u32);

/// Side of a spiked platform that carries the spikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeDirection {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl SpikeDirection {
    /// Unit vector the player is thrown along on contact.
    pub fn launch(self) -> Vec2 {
        match self {
            SpikeDirection::Up => Vec2::Y,
            SpikeDirection::Down => Vec2::NEG_Y,
            SpikeDirection::Left => Vec2::NEG_X,
            SpikeDirection::Right => Vec2::X,
        }
    }
}

/// Back-and-forth motion along `velocity`, reversing once the body is more
/// than `range` from `origin` and still moving away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub origin: Vec2,
    pub velocity: Vec2,
    /// Zero or negative means the patrol never turns around.
    pub range: f32,
}

impl Patrol {
    /// Velocity to use for the next step given the body's current position.
    pub fn next_velocity(&self, position: Vec2, current: Vec2) -> Vec2 {
        if self.range <= 0.0 {
            return current;
        }
        let offset = position - self.origin;
        if offset.length() >= self.range && offset.dot(current) > 0.0 {
            -current
        } else {
            current
        }
    }
}

/// Falling hazard state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockState {
    /// Hanging position the rock returns to after landing.
    pub origin: Vec2,
    pub released: bool,
    /// Set when the rock lands; the level resets it after the step.
    pub landed: bool,
}

/// Obstacle variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    RegularPlatform,
    /// One-way platform: solid only for a transparent player landing on top.
    CloudPlatform,
    SpikedPlatform { direction: SpikeDirection },
    Crocodile,
    FlyingMonster,
    Rock(RockState),
}

impl ObstacleKind {
    pub fn is_platform(&self) -> bool {
        matches!(
            self,
            ObstacleKind::RegularPlatform
                | ObstacleKind::CloudPlatform
                | ObstacleKind::SpikedPlatform { .. }
        )
    }

    pub fn is_monster(&self) -> bool {
        matches!(self, ObstacleKind::Crocodile | ObstacleKind::FlyingMonster)
    }

    pub fn is_rock(&self) -> bool {
        matches!(self, ObstacleKind::Rock(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObstacleKind::RegularPlatform => "platform",
            ObstacleKind::CloudPlatform => "cloud",
            ObstacleKind::SpikedPlatform { .. } => "spikes",
            ObstacleKind::Crocodile => "crocodile",
            ObstacleKind::FlyingMonster => "flying_monster",
            ObstacleKind::Rock(_) => "rock",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    pub body: BodyId,
    pub fixture: FixtureId,
    pub half_extents: Vec2,
    /// Present on movable obstacles.
    pub patrol: Option<Patrol>,
}

impl Obstacle {
    pub fn is_movable(&self) -> bool {
        self.patrol.is_some()
    }

    /// Per-second velocity that a rider on this obstacle is carried by.
    pub fn carry_velocity(&self, bodies: &BodySet) -> Vec2 {
        if self.is_movable() {
            bodies.velocity(self.body)
        } else {
            Vec2::ZERO
        }
    }

    pub fn rock_mut(&mut self) -> Option<&mut RockState> {
        match &mut self.kind {
            ObstacleKind::Rock(state) => Some(state),
            _ => None,
        }
    }
}

/// Ability source the player touches to collect a grant.
#[derive(Debug, Clone)]
pub struct Fountain {
    pub id: FountainId,
    pub ability: Ability,
    pub body: BodyId,
    pub position: Vec2,
    /// False while the grant is queued, running, or consumed.
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct MoonShard {
    pub id: ShardId,
    pub body: BodyId,
    pub position: Vec2,
    pub claimed: bool,
}

/// Level exit. Only opens once every shard is claimed.
#[derive(Debug, Clone)]
pub struct GoalDoor {
    pub body: BodyId,
    pub position: Vec2,
}
