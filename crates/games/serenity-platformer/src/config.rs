use std::time::Duration;

use serde::{Deserialize, Serialize};

/// World gravity (units/s^2, downward).
pub const GRAVITY: f32 = -20.0;
/// Fixed simulation rate.
pub const TICK_RATE_HZ: f32 = 60.0;
/// Ability countdown granularity.
pub const ABILITY_TICK: Duration = Duration::from_millis(100);
/// Ability session length.
pub const ABILITY_DURATION: Duration = Duration::from_secs(5);
/// Player collision box width.
pub const PLAYER_WIDTH: f32 = 0.8;
/// Player collision box height.
pub const PLAYER_HEIGHT: f32 = 1.4;
/// Baseline horizontal speed cap.
pub const MAX_SPEED: f32 = 5.0;
/// Speed cap while a dash window is open.
pub const DASH_MAX_SPEED: f32 = 18.0;
/// Speed cap during the post-dash free-movement grace period.
pub const RELAXED_MAX_SPEED: f32 = 9.0;
/// Horizontal speed applied by a spike knockback.
pub const KNOCKBACK_SPEED: f32 = 12.0;

/// Player motion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub mass: f32,
    /// Height of the foot sensor hanging below the body.
    pub foot_sensor_height: f32,
    /// Horizontal force for full movement input.
    pub move_force: f32,
    /// Braking coefficient applied against vx when there is no input.
    pub damping: f32,
    pub max_speed: f32,
    pub relaxed_max_speed: f32,
    pub dash_max_speed: f32,
    /// Movement force multiplier while dashing.
    pub dash_force_multiplier: f32,
    /// One-shot horizontal impulse when a dash starts.
    pub dash_impulse: f32,
    /// Horizontal impulse re-applied at every dash pulse.
    pub dash_pulse_impulse: f32,
    pub dash_window_secs: f32,
    pub dash_pulse_hz: f32,
    /// Delay before re-checking grounding when a dash window ends mid-air.
    pub dash_recheck_secs: f32,
    pub jump_impulse: f32,
    pub jump_cooldown_frames: u32,
    pub ability_cooldown_frames: u32,
    /// Upward impulse applied every frame while flying.
    pub fly_impulse: f32,
    pub fly_max_speed: f32,
    pub hurt_display_secs: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            mass: 1.0,
            foot_sensor_height: 0.1,
            move_force: 30.0,
            damping: 8.0,
            max_speed: MAX_SPEED,
            relaxed_max_speed: RELAXED_MAX_SPEED,
            dash_max_speed: DASH_MAX_SPEED,
            dash_force_multiplier: 10.0,
            dash_impulse: 14.0,
            dash_pulse_impulse: 0.8,
            dash_window_secs: 0.6,
            dash_pulse_hz: 33.0,
            dash_recheck_secs: 0.1,
            jump_impulse: 9.0,
            jump_cooldown_frames: 30,
            ability_cooldown_frames: 20,
            fly_impulse: 0.6,
            fly_max_speed: 5.0,
            hurt_display_secs: 0.5,
        }
    }
}

/// Ability session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    pub duration_ms: u64,
    pub tick_ms: u64,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            duration_ms: ABILITY_DURATION.as_millis() as u64,
            tick_ms: ABILITY_TICK.as_millis() as u64,
        }
    }
}

impl AbilityTuning {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Contact response tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTuning {
    pub knockback_speed: f32,
    pub spike_penalty: f32,
    pub rock_penalty: f32,
    /// Applied on every solver pass while a monster overlaps the player.
    pub monster_penalty_per_tick: f32,
    pub fall_penalty: f32,
    /// How far below a cloud's top edge the player's feet may be and still land.
    pub cloud_landing_tolerance: f32,
    /// Horizontal distance at which a hanging rock drops toward the player.
    pub rock_trigger_distance: f32,
}

impl Default for ContactTuning {
    fn default() -> Self {
        Self {
            knockback_speed: KNOCKBACK_SPEED,
            spike_penalty: 300.0,
            rock_penalty: 250.0,
            monster_penalty_per_tick: 5.0,
            fall_penalty: 400.0,
            cloud_landing_tolerance: 0.25,
            rock_trigger_distance: 1.5,
        }
    }
}

/// Serenity resource tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerenityTuning {
    pub max: f32,
    pub drain_per_frame: f32,
    pub restore_amount: f32,
}

impl Default for SerenityTuning {
    fn default() -> Self {
        Self {
            max: 3600.0,
            drain_per_frame: 1.0,
            restore_amount: 1200.0,
        }
    }
}

/// Physics world tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub gravity: f32,
    pub tick_rate_hz: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            tick_rate_hz: TICK_RATE_HZ,
        }
    }
}

/// Top-level gameplay configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerenityConfig {
    pub player: PlayerTuning,
    pub abilities: AbilityTuning,
    pub contact: ContactTuning,
    pub serenity: SerenityTuning,
    pub world: WorldTuning,
}

impl SerenityConfig {
    /// Load config from `$SERENITY_CONFIG` or `config/serenity.toml`. Falls back
    /// to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("SERENITY_CONFIG")
            .unwrap_or_else(|_| "config/serenity.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
