//! Contact classification and gameplay response.
//!
//! Every fixture pair reported by the world is first classified into a
//! [`Pairing`]. Classification fails for untagged fixtures or ids the level
//! does not know; such pairs are logged and skipped so one bad pair never
//! stops the step. Structural changes (shard removal, rock resets) and player
//! translations are only requested here and applied outside the step.

use std::collections::HashSet;

use glam::Vec2;

use crate::ability::{AbilityController, AbilityGrant};
use crate::config::ContactTuning;
use crate::deferred::DeferredQueue;
use crate::events::{Cue, GameEvent};
use crate::level::Level;
use crate::obstacles::{FountainId, ObstacleId, ObstacleKind, ShardId, SpikeDirection};
use crate::player::PlayerModel;
use crate::serenity::Serenity;
use crate::world::{Aabb, BodySet, Contact, ContactListener, FixtureId, FixtureTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    Untagged(FixtureId),
    UnknownObstacle(ObstacleId),
    UnknownFountain(FountainId),
    UnknownShard(ShardId),
}

impl std::fmt::Display for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untagged(id) => write!(f, "fixture {} carries no gameplay tag", id.0),
            Self::UnknownObstacle(id) => write!(f, "obstacle {} is not part of the level", id.0),
            Self::UnknownFountain(id) => write!(f, "fountain {} is not part of the level", id.0),
            Self::UnknownShard(id) => write!(f, "shard {} is not part of the level", id.0),
        }
    }
}

impl std::error::Error for ContactError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Player,
    Foot,
    Obstacle(ObstacleId),
    Fountain(FountainId),
    Shard(ShardId),
    Goal,
}

impl Party {
    fn classify(tag: FixtureTag, fixture: FixtureId, level: &Level) -> Result<Self, ContactError> {
        match tag {
            FixtureTag::Player => Ok(Party::Player),
            FixtureTag::PlayerFoot => Ok(Party::Foot),
            FixtureTag::Obstacle(id) => level
                .obstacle(id)
                .map(|_| Party::Obstacle(id))
                .ok_or(ContactError::UnknownObstacle(id)),
            FixtureTag::Fountain(id) => level
                .fountain(id)
                .map(|_| Party::Fountain(id))
                .ok_or(ContactError::UnknownFountain(id)),
            FixtureTag::Shard(id) => level
                .shard(id)
                .map(|_| Party::Shard(id))
                .ok_or(ContactError::UnknownShard(id)),
            FixtureTag::Goal => Ok(Party::Goal),
            FixtureTag::Untagged => Err(ContactError::Untagged(fixture)),
        }
    }
}

/// What a contact pair means for gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pairing {
    /// Foot sensor against a solid surface.
    Ground { surface: FixtureId, obstacle: Option<ObstacleId> },
    /// Player collision box against anything else.
    Player { fixture: FixtureId, other: Party },
    RockOnPlatform { rock: ObstacleId },
    Unrelated,
}

fn classify(contact: &Contact, level: &Level) -> Result<Pairing, ContactError> {
    let a = Party::classify(contact.tag_a, contact.fixture_a, level)?;
    let b = Party::classify(contact.tag_b, contact.fixture_b, level)?;

    let pairing = match (a, b) {
        (Party::Foot, Party::Player) | (Party::Player, Party::Foot) => Pairing::Unrelated,
        (Party::Foot, other) => ground(contact.fixture_b, other),
        (other, Party::Foot) => ground(contact.fixture_a, other),
        (Party::Player, other) => Pairing::Player {
            fixture: contact.fixture_b,
            other,
        },
        (other, Party::Player) => Pairing::Player {
            fixture: contact.fixture_a,
            other,
        },
        (Party::Obstacle(x), Party::Obstacle(y)) => rock_on_platform(x, y, level)
            .or_else(|| rock_on_platform(y, x, level))
            .unwrap_or(Pairing::Unrelated),
        _ => Pairing::Unrelated,
    };
    Ok(pairing)
}

fn ground(surface: FixtureId, other: Party) -> Pairing {
    let obstacle = match other {
        Party::Obstacle(id) => Some(id),
        _ => None,
    };
    Pairing::Ground { surface, obstacle }
}

fn rock_on_platform(rock: ObstacleId, platform: ObstacleId, level: &Level) -> Option<Pairing> {
    let is_rock = level.obstacle(rock)?.kind.is_rock();
    let is_platform = level.obstacle(platform)?.kind.is_platform();
    (is_rock && is_platform).then_some(Pairing::RockOnPlatform { rock })
}

/// Whether `mover` reached `surface` through the face that `side` names,
/// judged from where it was before this step's displacement.
fn approaches_from(side: SpikeDirection, mover: Aabb, displacement: Vec2, surface: Aabb, tolerance: f32) -> bool {
    let before = mover.translated(-displacement);
    let center = mover.center();
    let within_x = center.x >= surface.min.x && center.x <= surface.max.x;
    let within_y = center.y >= surface.min.y && center.y <= surface.max.y;
    match side {
        SpikeDirection::Up => {
            within_x && displacement.y <= 0.0 && before.min.y >= surface.max.y - tolerance
        },
        SpikeDirection::Down => {
            within_x && displacement.y >= 0.0 && before.max.y <= surface.min.y + tolerance
        },
        SpikeDirection::Left => {
            within_y && displacement.x >= 0.0 && before.max.x <= surface.min.x + tolerance
        },
        SpikeDirection::Right => {
            within_y && displacement.x <= 0.0 && before.min.x >= surface.max.x - tolerance
        },
    }
}

/// Contact bookkeeping that outlives a single step.
#[derive(Debug, Default)]
pub struct ContactState {
    /// Surfaces currently under the player's feet.
    grounded: HashSet<FixtureId>,
    /// Spike fixtures that already knocked the player back during their
    /// current contact.
    spiked: HashSet<FixtureId>,
    pub rock_hit: bool,
    pub monster_hit: bool,
    pub save_requested: bool,
    level_complete: bool,
}

impl ContactState {
    /// Clear the per-frame flags.
    pub fn begin_frame(&mut self) {
        self.rock_hit = false;
        self.monster_hit = false;
        self.save_requested = false;
    }

    pub fn is_grounded(&self) -> bool {
        !self.grounded.is_empty()
    }

    pub fn ground_contacts(&self) -> usize {
        self.grounded.len()
    }

    /// Re-derive the player's grounded flag from the surfaces underfoot.
    pub fn sync_player(&self, player: &mut PlayerModel) {
        player.set_grounded(self.is_grounded());
    }

    pub fn clear_ground(&mut self) {
        self.grounded.clear();
    }

    pub fn level_complete(&self) -> bool {
        self.level_complete
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Gameplay response to world contacts for one step.
pub struct ContactResponder<'a> {
    pub state: &'a mut ContactState,
    pub player: &'a mut PlayerModel,
    pub abilities: &'a mut AbilityController,
    pub level: &'a mut Level,
    pub serenity: &'a mut Serenity,
    pub deferred: &'a mut DeferredQueue,
    pub tuning: &'a ContactTuning,
    pub restore_amount: f32,
    pub dt: f32,
    pub events: &'a mut Vec<GameEvent>,
}

impl ContactResponder<'_> {
    fn classify_or_log(&self, contact: &Contact, phase: &'static str) -> Option<Pairing> {
        match classify(contact, self.level) {
            Ok(pairing) => Some(pairing),
            Err(e) => {
                tracing::warn!(
                    phase,
                    fixture_a = contact.fixture_a.0,
                    fixture_b = contact.fixture_b.0,
                    "Skipping malformed contact: {e}"
                );
                None
            },
        }
    }

    fn add_ground(&mut self, surface: FixtureId) {
        self.state.grounded.insert(surface);
        self.player.set_grounded(true);
    }

    fn remove_ground(&mut self, surface: FixtureId) {
        if self.state.grounded.remove(&surface) && self.state.grounded.is_empty() {
            self.player.set_grounded(false);
        }
    }

    fn player_approaches(&self, side: SpikeDirection, surface: FixtureId, bodies: &BodySet) -> bool {
        let body = self.player.body();
        let (Some(mover), Some(surface)) = (bodies.body_aabb(body), bodies.fixture_aabb(surface)) else {
            return false;
        };
        let displacement = bodies.velocity(body) * self.dt;
        approaches_from(side, mover, displacement, surface, self.tuning.cloud_landing_tolerance)
    }

    fn schedule_carry(&mut self, obstacle: ObstacleId, bodies: &BodySet) {
        let Some(o) = self.level.obstacle(obstacle) else {
            return;
        };
        let delta = o.carry_velocity(bodies) * self.dt;
        if delta != Vec2::ZERO {
            let generation = self.deferred.generation();
            self.deferred
                .schedule_carry(generation, self.player.body(), o.body, delta);
        }
    }

    fn penalize(&mut self, amount: f32) {
        let taken = self.serenity.drain(amount);
        tracing::trace!(amount, taken, remaining = self.serenity.value(), "Serenity penalty");
    }

    // ---- begin ----

    fn ground_begin(&mut self, surface: FixtureId, obstacle: Option<ObstacleId>, bodies: &BodySet) {
        let is_cloud = obstacle
            .and_then(|id| self.level.obstacle(id))
            .is_some_and(|o| o.kind == ObstacleKind::CloudPlatform);
        if is_cloud
            && !(self.player.is_transparent()
                && self.player_approaches(SpikeDirection::Up, surface, bodies))
        {
            return;
        }
        self.add_ground(surface);
    }

    fn fountain_begin(&mut self, id: FountainId) {
        let Some(fountain) = self.level.fountain_mut(id) else {
            return;
        };
        if !fountain.available {
            return;
        }
        fountain.available = false;
        let ability = fountain.ability;
        let position = fountain.position;

        if ability.is_queueable() {
            self.abilities.enqueue(AbilityGrant {
                fountain: id,
                ability,
            });
            self.events.push(GameEvent::Cue(Cue::FountainCollect));
            self.events.push(GameEvent::AbilityQueued(ability));
        } else {
            self.serenity.restore(self.restore_amount);
            self.level.record_checkpoint(id);
            self.state.save_requested = true;
            self.events.push(GameEvent::Cue(Cue::Restore));
            self.events.push(GameEvent::CheckpointReached { position });
            tracing::info!(fountain = id.0, serenity = self.serenity.value(), "Checkpoint reached");
        }
    }

    fn shard_begin(&mut self, id: ShardId) {
        if self.level.claim_shard(id) {
            let collected = self.level.shards_claimed();
            let total = self.level.shards().len();
            self.events.push(GameEvent::Cue(Cue::ShardCollect));
            self.events.push(GameEvent::ShardCollected { collected, total });
            tracing::debug!(shard = id.0, collected, total, "Shard collected");
        }
    }

    fn goal_begin(&mut self) {
        if self.state.level_complete || !self.level.all_shards_claimed() {
            return;
        }
        self.state.level_complete = true;
        self.events.push(GameEvent::LevelComplete);
    }

    fn rock_hits_player(&mut self) {
        if self.player.is_transparent() {
            return;
        }
        self.penalize(self.tuning.rock_penalty);
        self.state.rock_hit = true;
        self.player.mark_hurt();
        self.events.push(GameEvent::Cue(Cue::Hurt));
    }

    // ---- pre-solve ----

    fn player_obstacle_pre_solve(
        &mut self,
        contact: &mut Contact,
        fixture: FixtureId,
        id: ObstacleId,
        bodies: &mut BodySet,
    ) {
        let Some(kind) = self.level.obstacle(id).map(|o| o.kind) else {
            return;
        };
        match kind {
            ObstacleKind::CloudPlatform => {
                let valid = self.player.is_transparent()
                    && self.player_approaches(SpikeDirection::Up, fixture, bodies);
                if !valid {
                    contact.set_enabled(false);
                    self.remove_ground(fixture);
                    return;
                }
                self.add_ground(fixture);
                self.schedule_carry(id, bodies);
            },
            ObstacleKind::SpikedPlatform { direction } => {
                if self.player_approaches(direction, fixture, bodies) || self.state.spiked.contains(&fixture) {
                    contact.set_enabled(false);
                    if self.state.spiked.insert(fixture) {
                        self.spike_knockback(direction, fixture, bodies);
                    }
                }
                self.schedule_carry(id, bodies);
            },
            ObstacleKind::RegularPlatform => self.schedule_carry(id, bodies),
            ObstacleKind::Crocodile | ObstacleKind::FlyingMonster => {
                self.state.monster_hit = true;
                self.penalize(self.tuning.monster_penalty_per_tick);
            },
            ObstacleKind::Rock(_) => {},
        }
    }

    /// Other surfaces stay in the grounded set so the player lands on them again.
    fn spike_knockback(&mut self, direction: SpikeDirection, spike: FixtureId, bodies: &mut BodySet) {
        self.state.grounded.remove(&spike);
        let velocity = direction.launch() * self.tuning.knockback_speed;
        self.player.knock_back(bodies, velocity);
        self.player.set_grounded(false);
        self.penalize(self.tuning.spike_penalty);
        self.events.push(GameEvent::Cue(Cue::Hurt));
        tracing::debug!(?direction, "Spike knockback");
    }
}

impl ContactListener for ContactResponder<'_> {
    fn begin_contact(&mut self, contact: &Contact, bodies: &mut BodySet) {
        let Some(pairing) = self.classify_or_log(contact, "begin") else {
            return;
        };
        match pairing {
            Pairing::Ground { surface, obstacle } => self.ground_begin(surface, obstacle, bodies),
            Pairing::Player { other, .. } => match other {
                Party::Fountain(id) => self.fountain_begin(id),
                Party::Shard(id) => self.shard_begin(id),
                Party::Goal => self.goal_begin(),
                Party::Obstacle(id) => {
                    if self.level.obstacle(id).is_some_and(|o| o.kind.is_rock()) {
                        self.rock_hits_player();
                    }
                },
                Party::Player | Party::Foot => {},
            },
            Pairing::RockOnPlatform { rock } => {
                if self.level.land_rock(rock) {
                    tracing::debug!(rock = rock.0, "Rock landed");
                }
            },
            Pairing::Unrelated => {},
        }
    }

    fn pre_solve(&mut self, contact: &mut Contact, bodies: &mut BodySet) {
        let Some(pairing) = self.classify_or_log(contact, "pre_solve") else {
            return;
        };
        if let Pairing::Player {
            fixture,
            other: Party::Obstacle(id),
        } = pairing
        {
            self.player_obstacle_pre_solve(contact, fixture, id, bodies);
        }
    }

    fn end_contact(&mut self, contact: &Contact, _bodies: &mut BodySet) {
        let Some(pairing) = self.classify_or_log(contact, "end") else {
            return;
        };
        match pairing {
            Pairing::Ground { surface, .. } => self.remove_ground(surface),
            Pairing::Player {
                fixture,
                other: Party::Obstacle(_),
            } => {
                self.state.spiked.remove(&fixture);
                self.remove_ground(fixture);
            },
            _ => {},
        }
    }
}
