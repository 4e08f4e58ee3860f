#[cfg(feature = "realtime")]
pub mod clock;
pub mod game_trait;
pub mod input;
pub mod time;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::time::Duration;

    use crate::game_trait::{LevelGame, LevelOutcome};
    use crate::input::InputFrame;
    use crate::timer::{TickCounter, ticks_in};

    /// Input holding the move axis at `axis` and nothing else.
    pub fn moving(axis: f32) -> InputFrame {
        InputFrame {
            move_axis: axis,
            ..Default::default()
        }
    }

    /// Input pressing only the use-ability button.
    pub fn use_ability() -> InputFrame {
        InputFrame {
            use_ability: true,
            ..Default::default()
        }
    }

    /// Input pressing only the effect button.
    pub fn effect() -> InputFrame {
        InputFrame {
            effect: true,
            ..Default::default()
        }
    }

    /// Post the number of clock ticks that `elapsed` wall-clock time would produce.
    pub fn post_elapsed(counter: &TickCounter, elapsed: Duration, period: Duration) {
        counter.post_many(ticks_in(elapsed, period));
    }

    /// Run N frames with the same input, returning all accumulated events.
    pub fn run_frames<G: LevelGame + ?Sized>(
        game: &mut G,
        n: usize,
        dt: f32,
        input: &InputFrame,
    ) -> Vec<G::Event> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt, input));
        }
        all_events
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed<G: LevelGame + ?Sized>(game: &G, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    // ================================================================
    // LevelGame contract tests
    // ================================================================
    // Every LevelGame implementation is expected to pass these. Game crates
    // call them from their own #[cfg(test)] modules with a freshly built game.

    /// A fresh game must be in progress and produce a non-empty snapshot.
    pub fn contract_fresh_game_in_progress<G: LevelGame + ?Sized>(game: &G) {
        assert_eq!(game.outcome(), LevelOutcome::InProgress);
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// update() with dt>0 must change the observable state.
    pub fn contract_update_advances_state<G: LevelGame + ?Sized>(game: &mut G) {
        let before = game.serialize_state();
        game.update(1.0 / game.tick_rate(), &InputFrame::default());
        assert_game_state_changed(game, &before);
    }

    /// pause() must freeze the simulation, resume() must unfreeze it.
    pub fn contract_pause_stops_updates<G: LevelGame + ?Sized>(game: &mut G) {
        let dt = 1.0 / game.tick_rate();
        game.pause();
        assert!(game.is_paused());
        let before = game.serialize_state();
        game.update(dt, &InputFrame::default());
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        assert!(!game.is_paused());
        game.update(dt, &InputFrame::default());
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// restart() must return the game to its initial snapshot.
    pub fn contract_restart_restores_initial_state<G: LevelGame + ?Sized>(game: &mut G) {
        let dt = 1.0 / game.tick_rate();
        let initial = game.serialize_state();
        run_frames(game, 30, dt, &moving(1.0));
        game.restart();
        assert_eq!(game.outcome(), LevelOutcome::InProgress);
        assert_eq!(
            initial,
            game.serialize_state(),
            "restart() must reproduce the initial snapshot"
        );
    }
}
