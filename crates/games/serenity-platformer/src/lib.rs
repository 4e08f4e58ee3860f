pub mod ability;
pub mod config;
pub mod contact;
pub mod deferred;
pub mod events;
pub mod hud;
pub mod level;
pub mod obstacles;
pub mod player;
pub mod save;
pub mod serenity;
pub mod world;

use serenity_core::game_trait::{GameMetadata, LevelGame, LevelOutcome};
use serenity_core::input::{Edge, InputFrame};
use serenity_core::level_game_boilerplate;
use serenity_core::time::timestamp_now;
use serenity_core::timer::TickCounter;

use ability::{Ability, AbilityController, AbilityGrant};
use config::SerenityConfig;
use contact::{ContactResponder, ContactState};
use deferred::DeferredQueue;
use events::{Cue, GameEvent};
use hud::{GameplaySnapshot, HudSnapshot, ObstacleView};
use level::{Level, LevelLayout};
use player::PlayerModel;
use save::{NullSink, SaveRecord, SaveSink};
use serenity::Serenity;
use world::World;

/// Edge trackers for the menu-style buttons.
#[derive(Debug, Default)]
struct Buttons {
    use_ability: Edge,
    pause: Edge,
    map: Edge,
    reset: Edge,
    exit: Edge,
}

impl Buttons {
    fn update(&mut self, input: &InputFrame) {
        self.use_ability.update(input.use_ability);
        self.pause.update(input.pause);
        self.map.update(input.map);
        self.reset.update(input.reset);
        self.exit.update(input.exit);
    }
}

fn build_scene(layout: &LevelLayout, config: &SerenityConfig) -> (World, Level, PlayerModel) {
    let mut world = World::new(config.world.gravity);
    let level = Level::build(layout, &mut world);
    let player = PlayerModel::spawn(&mut world, layout.spawn, &config.player);
    (world, level, player)
}

/// One playable level: the player, its abilities and everything it touches.
pub struct GameplayController {
    config: SerenityConfig,
    layout: LevelLayout,
    world: World,
    level: Level,
    player: PlayerModel,
    abilities: AbilityController,
    contacts: ContactState,
    serenity: Serenity,
    deferred: DeferredQueue,
    saves: Box<dyn SaveSink>,
    buttons: Buttons,
    /// Frozen while either the pause menu or the map is up.
    paused: bool,
    menu_open: bool,
    map_open: bool,
    /// A running session was frozen by the last pause and needs `resume`.
    session_frozen: bool,
    outcome: LevelOutcome,
    frame: u64,
    /// Events raised outside `update` (pause/resume via the trait).
    pending_events: Vec<GameEvent>,
}

impl GameplayController {
    pub fn new(layout: LevelLayout, config: SerenityConfig) -> Self {
        let (world, level, player) = build_scene(&layout, &config);
        let abilities = AbilityController::new(config.abilities.tick_period());
        let serenity = Serenity::new(config.serenity.max);
        tracing::info!(
            level = %layout.name,
            obstacles = level.obstacles().len(),
            fountains = level.fountains().len(),
            shards = level.shards().len(),
            "Level built"
        );
        Self {
            config,
            layout,
            world,
            level,
            player,
            abilities,
            contacts: ContactState::default(),
            serenity,
            deferred: DeferredQueue::new(),
            saves: Box::new(NullSink),
            buttons: Buttons::default(),
            paused: false,
            menu_open: false,
            map_open: false,
            session_frozen: false,
            outcome: LevelOutcome::InProgress,
            frame: 0,
            pending_events: Vec::new(),
        }
    }

    pub fn with_save_sink(mut self, sink: impl SaveSink + 'static) -> Self {
        self.saves = Box::new(sink);
        self
    }

    /// Handle the real-time clock posts ability ticks to.
    pub fn ability_ticks(&self) -> TickCounter {
        self.abilities.tick_counter()
    }

    pub fn config(&self) -> &SerenityConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> &PlayerModel {
        &self.player
    }

    pub fn abilities(&self) -> &AbilityController {
        &self.abilities
    }

    pub fn serenity(&self) -> &Serenity {
        &self.serenity
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn hud(&self) -> HudSnapshot {
        let player = self.player.draw_state(self.world.bodies());
        HudSnapshot {
            active_ability: self.abilities.active().map(|g| g.ability),
            ability_remaining_secs: self.abilities.remaining_time().as_secs_f32(),
            ability_paused: self.abilities.is_paused(),
            queue: self.abilities.queued_abilities(),
            last_used: self.abilities.last_used().map(|g| g.ability),
            serenity: self.serenity.value(),
            serenity_max: self.serenity.max(),
            shards_collected: self.level.shards_claimed(),
            shards_total: self.level.shards().len(),
            rock_hit: self.contacts.rock_hit,
            monster_hit: self.contacts.monster_hit,
            map_open: self.map_open,
            facing: player.facing,
            alpha: player.alpha,
            hurt: player.hurt,
        }
    }

    pub fn snapshot(&self) -> GameplaySnapshot {
        let bodies = self.world.bodies();
        GameplaySnapshot {
            frame: self.frame,
            outcome: self.outcome,
            paused: self.paused,
            hud: self.hud(),
            player: self.player.draw_state(bodies),
            obstacles: self
                .level
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    kind: o.kind,
                    position: bodies.position(o.body),
                })
                .collect(),
            fountains: self.level.fountains().iter().map(|f| f.available).collect(),
            shards: self.level.shards().iter().map(|s| s.claimed).collect(),
        }
    }

    /// Pause menu requested through the trait. Resuming also closes the map.
    fn set_paused(&mut self, paused: bool) {
        let mut events = std::mem::take(&mut self.pending_events);
        self.menu_open = paused;
        if !paused {
            self.map_open = false;
        }
        self.refresh_pause(&mut events);
        self.pending_events = events;
    }

    fn refresh_pause(&mut self, events: &mut Vec<GameEvent>) {
        self.set_paused_into(self.menu_open || self.map_open, events);
    }

    fn set_paused_into(&mut self, paused: bool, events: &mut Vec<GameEvent>) {
        if paused == self.paused {
            return;
        }
        if paused {
            // Ticks posted before the pause still count.
            if let Some(expired) = self.abilities.sync() {
                self.end_session(expired, events);
            }
            self.session_frozen = self.abilities.pause();
            self.paused = true;
            events.push(GameEvent::Paused);
        } else {
            if self.session_frozen {
                self.abilities.resume();
            } else {
                self.abilities.sync();
            }
            self.session_frozen = false;
            self.paused = false;
            events.push(GameEvent::Resumed);
        }
        tracing::debug!(paused, frame = self.frame, "Pause toggled");
    }

    /// Only a Transparency session latches the transparency intent.
    fn start_session(&mut self, grant: AbilityGrant, events: &mut Vec<GameEvent>) {
        self.player.set_transparent(grant.ability == Ability::Transparency);
        events.push(GameEvent::AbilityStarted(grant.ability));
        tracing::debug!(ability = ?grant.ability, fountain = grant.fountain.0, "Ability session started");
    }

    fn end_session(&mut self, grant: AbilityGrant, events: &mut Vec<GameEvent>) {
        self.player.set_transparent(false);
        self.level.return_fountain(grant.fountain);
        events.push(GameEvent::AbilityEnded(grant.ability));
        tracing::debug!(ability = ?grant.ability, fountain = grant.fountain.0, "Ability session ended");
    }

    fn save(&mut self, completed: bool, events: &mut Vec<GameEvent>) {
        let record = SaveRecord {
            level_name: self.level.name.clone(),
            completed,
            unlocked: completed,
            checkpoints_passed: self.level.checkpoints().iter().map(|c| c.0).collect(),
            serenity_remaining: self.serenity.value(),
            ability_queue: self.abilities.queued_abilities(),
            saved_at: timestamp_now(),
        };
        match self.saves.write(&record) {
            Ok(()) => events.push(GameEvent::ProgressSaved),
            Err(e) => {
                tracing::error!(level = %record.level_name, completed, "Failed to save progress: {e}");
            },
        }
    }

    fn check_fall(&mut self, events: &mut Vec<GameEvent>) {
        let position = self.world.bodies().position(self.player.body());
        if position.y >= self.level.kill_plane_y {
            return;
        }
        self.serenity.drain(self.config.contact.fall_penalty);
        let respawn = self.level.respawn_point();
        self.player.respawn(self.world.bodies_mut(), respawn);
        self.player.mark_hurt();
        self.contacts.clear_ground();
        self.deferred.cancel_all();
        events.push(GameEvent::FellOut);
        events.push(GameEvent::Cue(Cue::Hurt));
        tracing::info!(x = respawn.x, y = respawn.y, "Player fell out, respawning");
    }

    fn step(&mut self, dt: f32, input: &InputFrame, events: &mut Vec<GameEvent>) {
        self.frame += 1;

        // Carries scheduled by the previous step's contacts.
        self.deferred.drain_into(self.world.bodies_mut());
        // A knockback lifts the player for one frame only.
        self.contacts.sync_player(&mut self.player);

        if let Some(expired) = self.abilities.sync() {
            self.end_session(expired, events);
        }

        self.player.set_movement(input.sanitized_axis());
        self.player.set_jumping(input.jump);
        self.player.set_dashing(input.effect);
        self.player.set_flying(input.effect);

        if self.buttons.use_ability.pressed() && self.player.ability_ready() {
            let duration = self.config.abilities.duration();
            if let Some(activation) = self.abilities.activate_next(duration) {
                if let Some(superseded) = activation.superseded {
                    self.end_session(superseded, events);
                }
                self.start_session(activation.started, events);
                self.player.trigger_ability_cooldown();
            }
        }
        self.player.sync_abilities(&self.abilities);

        self.serenity.drain(self.config.serenity.drain_per_frame);

        let player_position = self.world.bodies().position(self.player.body());
        self.level.update_motion(self.world.bodies_mut());
        self.level.release_rocks(
            player_position,
            self.config.contact.rock_trigger_distance,
            self.world.bodies_mut(),
        );

        if self.player.is_dashing() {
            events.push(GameEvent::Cue(Cue::Dash));
        }
        self.player.apply_force(self.world.bodies_mut());

        self.contacts.begin_frame();
        let mut responder = ContactResponder {
            state: &mut self.contacts,
            player: &mut self.player,
            abilities: &mut self.abilities,
            level: &mut self.level,
            serenity: &mut self.serenity,
            deferred: &mut self.deferred,
            tuning: &self.config.contact,
            restore_amount: self.config.serenity.restore_amount,
            dt,
            events: &mut *events,
        };
        self.world.step(dt, &mut responder);

        self.player.update(dt, self.world.bodies_mut());

        for position in self.level.reconcile(&mut self.world) {
            events.push(GameEvent::RockShattered { position });
            events.push(GameEvent::Cue(Cue::RockShatter));
        }

        self.check_fall(events);

        if self.contacts.save_requested {
            self.save(false, events);
        }

        if self.contacts.level_complete() {
            self.outcome = LevelOutcome::Complete;
            tracing::info!(level = %self.level.name, frame = self.frame, "Level complete");
            self.save(true, events);
        } else if self.serenity.is_depleted() {
            self.outcome = LevelOutcome::Failed;
            events.push(GameEvent::LevelFailed);
            tracing::info!(level = %self.level.name, frame = self.frame, "Serenity depleted");
        }
    }
}

impl LevelGame for GameplayController {
    type Event = GameEvent;

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: self.level.name.clone(),
            description: "Collect every moon shard, then reach the door".to_string(),
            collectibles: self.level.shards().len(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.world.tick_rate_hz
    }

    fn update(&mut self, dt: f32, input: &InputFrame) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.pending_events);
        self.buttons.update(input);

        if self.buttons.exit.pressed() {
            events.push(GameEvent::ExitRequested);
        }
        if self.buttons.reset.pressed() {
            self.restart();
            events.push(GameEvent::LevelRestarted);
            return events;
        }
        if self.buttons.map.pressed() {
            self.map_open = !self.map_open;
            self.refresh_pause(&mut events);
            events.push(GameEvent::MapToggled {
                open: self.map_open,
            });
        } else if self.buttons.pause.pressed() && !self.map_open {
            self.menu_open = !self.menu_open;
            self.refresh_pause(&mut events);
        }

        if self.paused {
            // Ticks arriving while frozen never count.
            self.abilities.sync();
            return events;
        }
        if self.outcome.is_finished() || !dt.is_finite() || dt <= 0.0 {
            return events;
        }

        self.step(dt, input, &mut events);
        events
    }

    fn restart(&mut self) {
        let dropped = self.abilities.reset();
        self.deferred.cancel_all();
        let (world, level, player) = build_scene(&self.layout, &self.config);
        self.world = world;
        self.level = level;
        self.player = player;
        self.contacts.reset();
        self.serenity = Serenity::new(self.config.serenity.max);
        self.paused = false;
        self.menu_open = false;
        self.map_open = false;
        self.session_frozen = false;
        self.outcome = LevelOutcome::InProgress;
        self.frame = 0;
        self.pending_events.clear();
        tracing::info!(level = %self.layout.name, dropped_grants = dropped.len(), "Level restarted");
    }

    level_game_boilerplate!();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;
    use serenity_core::test_helpers::{
        contract_fresh_game_in_progress, contract_pause_stops_updates,
        contract_restart_restores_initial_state, contract_update_advances_state, effect,
        moving, post_elapsed, run_frames, use_ability,
    };

    use super::*;
    use crate::ability::Ability;
    use crate::config::{ABILITY_TICK, DASH_MAX_SPEED};
    use crate::level::fixtures::{flat_layout, ground, platform};
    use crate::level::{FountainSpec, MotionSpec, PlatformStyle};
    use crate::obstacles::{FountainId, SpikeDirection};
    use crate::save::MemorySink;

    const DT: f32 = 1.0 / 60.0;

    fn game(layout: LevelLayout) -> GameplayController {
        GameplayController::new(layout, SerenityConfig::default())
    }

    fn fountain(ability: Ability, x: f32) -> FountainSpec {
        FountainSpec {
            position: Vec2::new(x, 0.75),
            ability,
        }
    }

    fn with_fountains(fountains: Vec<FountainSpec>) -> LevelLayout {
        LevelLayout {
            fountains,
            ..flat_layout()
        }
    }

    fn idle() -> InputFrame {
        InputFrame::default()
    }

    fn pause_button() -> InputFrame {
        InputFrame {
            pause: true,
            ..Default::default()
        }
    }

    /// Let the player land on the fountain under the spawn point and queue its grant.
    fn settled(layout: LevelLayout) -> GameplayController {
        let mut g = game(layout);
        run_frames(&mut g, 10, DT, &idle());
        g
    }

    // ================================================================
    // LevelGame contract tests
    // ================================================================

    #[test]
    fn contract_fresh_game() {
        contract_fresh_game_in_progress(&game(flat_layout()));
    }

    #[test]
    fn contract_update_changes_state() {
        contract_update_advances_state(&mut game(flat_layout()));
    }

    #[test]
    fn contract_pause() {
        contract_pause_stops_updates(&mut game(flat_layout()));
    }

    #[test]
    fn contract_restart() {
        let layout = with_fountains(vec![fountain(Ability::Dash, 3.0)]);
        contract_restart_restores_initial_state(&mut game(layout));
    }

    #[test]
    fn snapshot_decodes_from_serialized_state() {
        let mut g = game(flat_layout());
        run_frames(&mut g, 5, DT, &moving(1.0));
        let decoded: GameplaySnapshot = rmp_serde::from_slice(&g.serialize_state()).unwrap();
        assert_eq!(decoded, g.snapshot());
        assert_eq!(decoded.frame, 5);
    }

    // ================================================================
    // Ability sessions
    // ================================================================

    #[test]
    fn touching_fountain_queues_grant() {
        let g = settled(with_fountains(vec![fountain(Ability::Flight, 0.0)]));
        assert_eq!(g.abilities().queued_abilities(), vec![Ability::Flight]);
        assert!(!g.level().fountain(FountainId(0)).unwrap().available);
        assert_eq!(g.hud().queue, vec![Ability::Flight]);
    }

    #[test]
    fn dash_stays_in_facing_direction_under_cap() {
        let mut g = settled(with_fountains(vec![fountain(Ability::Dash, 0.0)]));
        assert!(g.player().is_grounded());

        let events = g.update(DT, &use_ability());
        assert!(events.contains(&GameEvent::AbilityStarted(Ability::Dash)));
        assert!(g.abilities().is_active(Ability::Dash));

        let events = g.update(DT, &effect());
        assert!(events.contains(&GameEvent::Cue(Cue::Dash)));
        assert!(g.player().in_dash_window());

        let window_frames = (0.6 / DT) as usize;
        for _ in 0..window_frames {
            let vx = g.world().bodies().velocity(g.player().body()).x;
            assert!(vx > 0.0, "dash reversed direction: vx={vx}");
            assert!(vx <= DASH_MAX_SPEED + 1e-4, "dash exceeded cap: vx={vx}");
            g.update(DT, &effect());
        }
    }

    #[test]
    fn expiry_ends_session_and_returns_fountain() {
        let mut g = settled(with_fountains(vec![fountain(Ability::Flight, 0.0)]));
        g.update(DT, &use_ability());
        assert!(g.abilities().is_active(Ability::Flight));
        assert!(!g.player().is_transparent(), "Flight never grants transparency");

        post_elapsed(&g.ability_ticks(), Duration::from_millis(5100), ABILITY_TICK);
        let events = g.update(DT, &idle());
        assert!(events.contains(&GameEvent::AbilityEnded(Ability::Flight)));
        assert!(g.abilities().active().is_none());
        assert!(!g.player().is_transparent());
        assert!(g.level().fountain(FountainId(0)).unwrap().available);
        assert_eq!(g.hud().last_used, Some(Ability::Flight));
    }

    #[test]
    fn activating_next_grant_supersedes_running_session() {
        let mut g = settled(with_fountains(vec![
            fountain(Ability::Dash, 0.0),
            fountain(Ability::Transparency, 0.3),
        ]));
        assert_eq!(
            g.abilities().queued_abilities(),
            vec![Ability::Dash, Ability::Transparency]
        );

        g.update(DT, &use_ability());
        // Wait out the use-ability cooldown.
        run_frames(&mut g, 25, DT, &idle());
        let events = g.update(DT, &use_ability());

        let ended = events
            .iter()
            .position(|e| *e == GameEvent::AbilityEnded(Ability::Dash))
            .expect("dash session ended");
        let started = events
            .iter()
            .position(|e| *e == GameEvent::AbilityStarted(Ability::Transparency))
            .expect("transparency session started");
        assert!(ended < started);
        assert!(g.abilities().is_active(Ability::Transparency));
        assert!(g.player().is_transparent());
    }

    #[test]
    fn use_ability_with_empty_queue_does_nothing() {
        let mut g = settled(flat_layout());
        let events = g.update(DT, &use_ability());
        assert!(!events.iter().any(|e| matches!(e, GameEvent::AbilityStarted(_))));
        assert!(g.abilities().active().is_none());
    }

    #[test]
    fn pause_freezes_ability_countdown() {
        let mut g = settled(with_fountains(vec![fountain(Ability::Flight, 0.0)]));
        g.update(DT, &use_ability());
        let before = g.abilities().remaining_time();

        let events = g.update(DT, &pause_button());
        assert!(events.contains(&GameEvent::Paused));
        assert!(g.hud().ability_paused);

        post_elapsed(&g.ability_ticks(), Duration::from_secs(3), ABILITY_TICK);
        run_frames(&mut g, 5, DT, &idle());
        assert_eq!(g.abilities().remaining_time(), before);

        let events = g.update(DT, &pause_button());
        assert!(events.contains(&GameEvent::Resumed));
        assert!(!g.is_paused());
        assert_eq!(g.abilities().remaining_time(), before);
        assert!(g.abilities().is_active(Ability::Flight));
    }

    #[test]
    fn trait_pause_reports_through_next_update() {
        let mut g = game(flat_layout());
        g.pause();
        let events = g.update(DT, &idle());
        assert_eq!(events, vec![GameEvent::Paused]);
        g.resume();
        let events = g.update(DT, &idle());
        assert!(events.contains(&GameEvent::Resumed));
    }

    #[test]
    fn map_toggle_pauses_and_ignores_pause_button() {
        let mut g = game(flat_layout());
        let map = InputFrame {
            map: true,
            ..Default::default()
        };
        let events = g.update(DT, &map);
        assert!(events.contains(&GameEvent::MapToggled { open: true }));
        assert!(g.is_paused());

        g.update(DT, &pause_button());
        assert!(g.is_paused());

        g.update(DT, &idle());
        let events = g.update(DT, &map);
        assert!(events.contains(&GameEvent::MapToggled { open: false }));
        assert!(!g.is_paused());
    }

    #[test]
    fn closing_map_keeps_pause_menu_up() {
        let mut g = game(flat_layout());
        let map = InputFrame {
            map: true,
            ..Default::default()
        };
        g.update(DT, &pause_button());
        g.update(DT, &idle());
        assert!(g.is_paused());

        g.update(DT, &map);
        g.update(DT, &idle());
        let events = g.update(DT, &map);
        assert!(events.contains(&GameEvent::MapToggled { open: false }));
        assert!(!events.contains(&GameEvent::Resumed));
        assert!(g.is_paused());
        let frame = g.frame();
        g.update(DT, &idle());
        assert_eq!(g.frame(), frame);

        let events = g.update(DT, &pause_button());
        assert!(events.contains(&GameEvent::Resumed));
        assert!(!g.is_paused());
    }

    #[test]
    fn trait_resume_closes_map() {
        let mut g = game(flat_layout());
        let map = InputFrame {
            map: true,
            ..Default::default()
        };
        g.update(DT, &map);
        assert!(g.is_paused());
        g.resume();
        assert!(!g.is_paused());
        assert!(!g.hud().map_open);
    }

    // ================================================================
    // Contacts through the controller
    // ================================================================

    #[test]
    fn side_spike_knockback_regrounds_on_floor() {
        let mut layout = flat_layout();
        let mut block = platform(PlatformStyle::Spiked, Vec2::new(3.0, 0.5), Vec2::new(1.0, 1.0));
        block.spikes = SpikeDirection::Left;
        layout.platforms.push(block);
        let mut g = settled(layout);
        assert!(g.player().is_grounded());

        let mut knocked = false;
        for _ in 0..180 {
            let events = g.update(DT, &moving(1.0));
            if events.contains(&GameEvent::Cue(Cue::Hurt)) {
                knocked = true;
                break;
            }
        }
        assert!(knocked, "Never reached the spike face");
        assert!(!g.player().is_grounded());

        run_frames(&mut g, 120, DT, &idle());
        assert!(g.player().is_grounded());
        assert!(g.player().limits_motion());
        let x = g.world().bodies().position(g.player().body()).x;
        assert!(x < 2.5, "Player ended inside the spike block at x={x}");
    }

    #[test]
    fn reset_drops_carry_from_moving_platform() {
        let mut floor = ground(0.0, 40.0);
        floor.motion = Some(MotionSpec {
            velocity: Vec2::new(2.0, 0.0),
            range: 0.0,
        });
        let layout = LevelLayout {
            name: "conveyor".to_string(),
            spawn: Vec2::new(0.0, 0.7),
            platforms: vec![floor],
            ..Default::default()
        };
        let mut g = game(layout);
        run_frames(&mut g, 60, DT, &idle());
        let carried = g.world().bodies().position(g.player().body()).x;
        assert!(carried > 1.0, "Platform never carried the player: x={carried}");

        let reset = InputFrame {
            reset: true,
            ..Default::default()
        };
        g.update(DT, &reset);
        assert_eq!(g.world().bodies().position(g.player().body()).x, 0.0);

        g.update(DT, &idle());
        let x = g.world().bodies().position(g.player().body()).x;
        assert!(x.abs() < 1e-6, "Stale carry moved the respawned player to x={x}");
    }

    // ================================================================
    // Level flow
    // ================================================================

    #[test]
    fn falling_out_costs_serenity_and_respawns() {
        let layout = LevelLayout {
            name: "void".to_string(),
            spawn: Vec2::new(0.0, 2.0),
            kill_plane_y: -5.0,
            ..Default::default()
        };
        let mut g = game(layout);
        let events = run_frames(&mut g, 80, DT, &idle());
        assert!(events.contains(&GameEvent::FellOut));

        let config = SerenityConfig::default();
        assert!(
            g.serenity().value()
                <= config.serenity.max - config.contact.fall_penalty - 80.0 * config.serenity.drain_per_frame
                    + 1e-3
        );
        let y = g.world().bodies().position(g.player().body()).y;
        assert!(y > -5.0);
    }

    #[test]
    fn depleted_serenity_fails_level_once() {
        let mut config = SerenityConfig::default();
        config.serenity.max = 10.0;
        let mut g = GameplayController::new(flat_layout(), config);

        let events = run_frames(&mut g, 10, DT, &idle());
        assert_eq!(g.outcome(), LevelOutcome::Failed);
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::LevelFailed).count(),
            1
        );

        let frozen = g.serialize_state();
        let events = run_frames(&mut g, 5, DT, &moving(1.0));
        assert!(events.is_empty());
        assert_eq!(frozen, g.serialize_state());
    }

    #[test]
    fn reaching_goal_completes_and_saves() {
        let sink = MemorySink::new();
        let layout = LevelLayout {
            goal: Some(Vec2::new(0.0, 1.0)),
            ..flat_layout()
        };
        let mut g = game(layout).with_save_sink(sink.clone());

        let events = run_frames(&mut g, 10, DT, &idle());
        assert_eq!(g.outcome(), LevelOutcome::Complete);
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::LevelComplete).count(),
            1
        );
        assert!(events.contains(&GameEvent::ProgressSaved));

        let record = sink.last().expect("completion saved");
        assert_eq!(record.level_name, "flat");
        assert!(record.completed);
        assert!(record.unlocked);
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn goal_waits_for_every_shard() {
        let layout = LevelLayout {
            goal: Some(Vec2::new(0.0, 1.0)),
            shards: vec![Vec2::new(10.0, 0.5)],
            ..flat_layout()
        };
        let mut g = game(layout);
        run_frames(&mut g, 10, DT, &idle());
        assert_eq!(g.outcome(), LevelOutcome::InProgress);
        assert_eq!(g.metadata().collectibles, 1);
    }

    #[test]
    fn restore_fountain_saves_checkpoint() {
        let sink = MemorySink::new();
        let layout = with_fountains(vec![fountain(Ability::Restore, 0.0)]);
        let mut g = game(layout).with_save_sink(sink.clone());

        let events = run_frames(&mut g, 10, DT, &idle());
        assert!(events.contains(&GameEvent::ProgressSaved));
        let record = sink.last().expect("checkpoint saved");
        assert!(!record.completed);
        assert!(!record.unlocked);
        assert_eq!(record.checkpoints_passed, vec![0]);
        assert!(record.ability_queue.is_empty());
    }

    #[test]
    fn reset_button_restarts_level() {
        let mut g = settled(with_fountains(vec![fountain(Ability::Flight, 0.0)]));
        g.update(DT, &use_ability());
        assert!(g.abilities().active().is_some());
        let ticks = g.ability_ticks();

        let reset = InputFrame {
            reset: true,
            ..Default::default()
        };
        let events = g.update(DT, &reset);
        assert_eq!(events, vec![GameEvent::LevelRestarted]);
        assert_eq!(g.frame(), 0);
        assert!(g.abilities().active().is_none());
        assert!(g.abilities().last_used().is_none());
        assert!(g.level().fountain(FountainId(0)).unwrap().available);

        // The clock handle taken before the restart still drives sessions.
        run_frames(&mut g, 30, DT, &idle());
        g.update(DT, &use_ability());
        assert!(g.abilities().is_active(Ability::Flight));
        ticks.post_many(10);
        g.update(DT, &idle());
        assert!(g.abilities().remaining_time() < g.config().abilities.duration());
    }

    #[test]
    fn exit_button_is_reported() {
        let mut g = game(flat_layout());
        let exit = InputFrame {
            exit: true,
            ..Default::default()
        };
        assert!(g.update(DT, &exit).contains(&GameEvent::ExitRequested));
        assert!(!g.update(DT, &exit).contains(&GameEvent::ExitRequested));
    }
}
