//! Player motion: input intents, ability-gated effects, and the per-frame
//! force model.
//!
//! Input only ever sets *intent*. Whether an intent has an effect depends on
//! grounding, cooldowns, and which ability session is running, which the
//! controller mirrors in through [`PlayerModel::sync_abilities`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use serenity_core::input::Edge;
use serenity_core::timer::{Countdown, FrameCooldown};

use crate::ability::{Ability, AbilityController};
use crate::config::PlayerTuning;
use crate::world::{BodyDef, BodyId, BodyKind, BodySet, FixtureDef, FixtureId, FixtureTag, World};

/// Foot sensor is slightly narrower than the body so walls never ground it.
const FOOT_WIDTH_FACTOR: f32 = 0.9;
/// Render alpha while transparent.
const TRANSPARENT_ALPHA: f32 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Time-boxed burst after a dash starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct DashWindow {
    remaining: Countdown,
    /// Simulation time accumulated toward the next pulse.
    pulse_accum: f32,
    direction: f32,
}

/// Per-entity draw state for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerDrawState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub alpha: f32,
    pub hurt: bool,
    pub grounded: bool,
    pub dashing: bool,
    pub flying: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerModel {
    body: BodyId,
    body_fixture: FixtureId,
    foot: FixtureId,
    tuning: PlayerTuning,

    movement: f32,
    facing: Facing,
    jump_intent: bool,
    dash_intent: Edge,
    fly_intent: bool,
    transparent_intent: bool,

    dash_active: bool,
    flight_active: bool,
    transparency_active: bool,

    grounded: bool,
    jump_cooldown: FrameCooldown,
    ability_cooldown: FrameCooldown,
    jumped_this_frame: bool,
    ability_used_this_frame: bool,

    dash_window: Option<DashWindow>,
    /// False during the post-dash and post-knockback grace period.
    limit_motion: bool,
    motion_recheck: Option<Countdown>,
    hurt: Countdown,
}

impl PlayerModel {
    /// Create the player's body, collision box, and foot sensor.
    pub fn spawn(world: &mut World, position: Vec2, tuning: &PlayerTuning) -> Self {
        let body = world.create_body(
            BodyDef::new(BodyKind::Dynamic, position).with_mass(tuning.mass.max(0.01)),
        );
        let half = Vec2::new(tuning.width, tuning.height) * 0.5;
        let body_fixture = world.add_fixture(body, FixtureDef::solid(half, FixtureTag::Player));
        let foot_half = Vec2::new(half.x * FOOT_WIDTH_FACTOR, tuning.foot_sensor_height * 0.5);
        let foot = world.add_fixture(
            body,
            FixtureDef::sensor(foot_half, FixtureTag::PlayerFoot)
                .with_offset(Vec2::new(0.0, -half.y - foot_half.y)),
        );
        Self {
            body,
            body_fixture,
            foot,
            tuning: tuning.clone(),
            movement: 0.0,
            facing: Facing::Right,
            jump_intent: false,
            dash_intent: Edge::default(),
            fly_intent: false,
            transparent_intent: false,
            dash_active: false,
            flight_active: false,
            transparency_active: false,
            grounded: false,
            jump_cooldown: FrameCooldown::default(),
            ability_cooldown: FrameCooldown::default(),
            jumped_this_frame: false,
            ability_used_this_frame: false,
            dash_window: None,
            limit_motion: true,
            motion_recheck: None,
            hurt: Countdown::default(),
        }
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn body_fixture(&self) -> FixtureId {
        self.body_fixture
    }

    pub fn foot(&self) -> FixtureId {
        self.foot
    }

    // ---- intents ----

    pub fn set_movement(&mut self, axis: f32) {
        let axis = if axis.is_finite() { axis.clamp(-1.0, 1.0) } else { 0.0 };
        self.movement = axis;
        if axis > 0.0 {
            self.facing = Facing::Right;
        } else if axis < 0.0 {
            self.facing = Facing::Left;
        }
    }

    pub fn set_jumping(&mut self, pressed: bool) {
        self.jump_intent = pressed;
    }

    /// Call once per frame; a dash fires on the rising edge only.
    pub fn set_dashing(&mut self, intent: bool) {
        self.dash_intent.update(intent);
    }

    pub fn set_flying(&mut self, intent: bool) {
        self.fly_intent = intent;
    }

    pub fn set_transparent(&mut self, intent: bool) {
        self.transparent_intent = intent;
    }

    /// Mirror which ability sessions are running.
    pub fn sync_abilities(&mut self, abilities: &AbilityController) {
        self.dash_active = abilities.is_active(Ability::Dash);
        self.flight_active = abilities.is_active(Ability::Flight);
        self.transparency_active = abilities.is_active(Ability::Transparency);
    }

    // ---- effects ----

    pub fn is_jumping(&self) -> bool {
        self.jump_intent && self.grounded && self.jump_cooldown.is_ready()
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_intent.pressed() && self.dash_active
    }

    pub fn is_flying(&self) -> bool {
        self.fly_intent && self.flight_active
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent_intent && self.transparency_active
    }

    pub fn in_dash_window(&self) -> bool {
        self.dash_window.is_some()
    }

    pub fn limits_motion(&self) -> bool {
        self.limit_motion
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn set_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_hurt(&self) -> bool {
        !self.hurt.is_expired()
    }

    pub fn mark_hurt(&mut self) {
        self.hurt = Countdown::new(self.tuning.hurt_display_secs);
    }

    /// Whether the use-ability button may activate the next grant.
    pub fn ability_ready(&self) -> bool {
        self.ability_cooldown.is_ready()
    }

    pub fn trigger_ability_cooldown(&mut self) {
        self.ability_cooldown.trigger(self.tuning.ability_cooldown_frames);
        self.ability_used_this_frame = true;
    }

    /// Horizontal cap used to gate movement force.
    pub fn speed_cap(&self) -> f32 {
        if self.dash_window.is_some() {
            self.tuning.dash_max_speed
        } else if !self.limit_motion {
            self.tuning.relaxed_max_speed
        } else {
            self.tuning.max_speed
        }
    }

    /// Velocity override from a hazard. Lifts motion limiting until the player
    /// is back on the ground.
    pub fn knock_back(&mut self, bodies: &mut BodySet, velocity: Vec2) {
        bodies.set_velocity(self.body, velocity);
        self.grounded = false;
        self.dash_window = None;
        self.limit_motion = false;
        self.motion_recheck = Some(Countdown::new(self.tuning.dash_recheck_secs));
        self.mark_hurt();
    }

    /// Apply this frame's forces and impulses. Runs before the world step.
    pub fn apply_force(&mut self, bodies: &mut BodySet) {
        let velocity = bodies.velocity(self.body);
        let dashing_window = self.dash_window.is_some();
        let mut force = Vec2::ZERO;

        if self.movement == 0.0 && !dashing_window {
            force.x -= self.tuning.damping * velocity.x;
        }

        if velocity.x.abs() < self.speed_cap() && !self.is_flying() {
            let scale = if dashing_window {
                self.tuning.dash_force_multiplier
            } else {
                1.0
            };
            force.x += self.movement * self.tuning.move_force * scale;
        }
        bodies.apply_force(self.body, force);

        if self.is_jumping() {
            bodies.apply_impulse(self.body, Vec2::new(0.0, self.tuning.jump_impulse));
            self.jump_cooldown.trigger(self.tuning.jump_cooldown_frames);
            self.jumped_this_frame = true;
            self.grounded = false;
        }

        if self.is_dashing() {
            self.start_dash(bodies);
        } else if self.is_flying() {
            bodies.apply_impulse(self.body, Vec2::new(0.0, self.tuning.fly_impulse));
            let mut v = bodies.velocity(self.body);
            if v.y > self.tuning.fly_max_speed {
                v.y = self.tuning.fly_max_speed;
                bodies.set_velocity(self.body, v);
            }
        }
    }

    fn start_dash(&mut self, bodies: &mut BodySet) {
        let direction = self.facing.sign();
        let mut v = bodies.velocity(self.body);
        v.y = 0.0;
        bodies.set_velocity(self.body, v);
        bodies.apply_impulse(self.body, Vec2::new(direction * self.tuning.dash_impulse, 0.0));
        self.dash_window = Some(DashWindow {
            remaining: Countdown::new(self.tuning.dash_window_secs),
            pulse_accum: 0.0,
            direction,
        });
        self.limit_motion = false;
        self.motion_recheck = None;
        tracing::debug!(direction, "Dash started");
    }

    /// Advance timers and clamp velocity. Runs after the world step.
    pub fn update(&mut self, dt: f32, bodies: &mut BodySet) {
        if !self.jumped_this_frame {
            self.jump_cooldown.step();
        }
        if !self.ability_used_this_frame {
            self.ability_cooldown.step();
        }
        self.jumped_this_frame = false;
        self.ability_used_this_frame = false;
        self.hurt.tick(dt);

        if let Some(window) = &mut self.dash_window {
            window.remaining.tick(dt);
            window.pulse_accum += dt;
            let interval = 1.0 / self.tuning.dash_pulse_hz.max(1.0);
            while window.pulse_accum >= interval {
                window.pulse_accum -= interval;
                bodies.apply_impulse(
                    self.body,
                    Vec2::new(window.direction * self.tuning.dash_pulse_impulse, 0.0),
                );
            }
            if window.remaining.is_expired() {
                self.dash_window = None;
                self.settle_motion_limit();
            }
        } else if let Some(recheck) = &mut self.motion_recheck {
            recheck.tick(dt);
            if recheck.is_expired() {
                self.settle_motion_limit();
            }
        }

        self.clamp_velocity(bodies);
    }

    /// Restore motion limiting if grounded, otherwise check again shortly.
    fn settle_motion_limit(&mut self) {
        if self.grounded {
            self.limit_motion = true;
            self.motion_recheck = None;
        } else {
            self.motion_recheck = Some(Countdown::new(self.tuning.dash_recheck_secs));
        }
    }

    fn clamp_velocity(&self, bodies: &mut BodySet) {
        let cap = if self.dash_window.is_some() {
            self.tuning.dash_max_speed
        } else if self.limit_motion {
            self.tuning.max_speed
        } else {
            // Grace period: keep the launch trajectory.
            return;
        };
        let mut v = bodies.velocity(self.body);
        if v.x.abs() > cap {
            v.x = v.x.signum() * cap;
            bodies.set_velocity(self.body, v);
        }
    }

    /// Put the player back at `position` at rest, keeping intents.
    pub fn respawn(&mut self, bodies: &mut BodySet, position: Vec2) {
        bodies.set_position(self.body, position);
        bodies.set_velocity(self.body, Vec2::ZERO);
        self.grounded = false;
        self.dash_window = None;
        self.limit_motion = true;
        self.motion_recheck = None;
    }

    pub fn draw_state(&self, bodies: &BodySet) -> PlayerDrawState {
        PlayerDrawState {
            position: bodies.position(self.body),
            velocity: bodies.velocity(self.body),
            facing: self.facing,
            alpha: if self.is_transparent() {
                TRANSPARENT_ALPHA
            } else {
                1.0
            },
            hurt: self.is_hurt(),
            grounded: self.grounded,
            dashing: self.dash_window.is_some(),
            flying: self.is_flying(),
        }
    }
}
