mod autopilot;

use std::path::PathBuf;
use std::time::Duration;

use serenity_core::clock::spawn_tick_clock;
use serenity_core::game_trait::LevelGame;
use serenity_platformer::GameplayController;
use serenity_platformer::config::SerenityConfig;
use serenity_platformer::events::GameEvent;
use serenity_platformer::level::LevelLayout;
use serenity_platformer::save::JsonFileSink;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use autopilot::Autopilot;

const DEMO_LEVEL: &str = include_str!("../levels/meadow.toml");
const DEFAULT_RUN_SECS: u64 = 30;

/// Level from `$SERENITY_LEVEL`, falling back to the bundled meadow.
fn load_layout() -> LevelLayout {
    if let Ok(path) = std::env::var("SERENITY_LEVEL") {
        match std::fs::read_to_string(&path) {
            Ok(content) => match LevelLayout::from_toml(&content) {
                Ok(layout) => return layout,
                Err(e) => tracing::warn!("Failed to parse {path}: {e}, using bundled level"),
            },
            Err(e) => tracing::warn!("Failed to read {path}: {e}, using bundled level"),
        }
    }
    LevelLayout::from_toml(DEMO_LEVEL).unwrap_or_else(|e| {
        tracing::error!("Bundled level is invalid: {e}");
        LevelLayout::default()
    })
}

fn run_limit() -> Duration {
    let secs = std::env::var("SERENITY_SIM_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RUN_SECS);
    Duration::from_secs(secs)
}

fn log_event(frame: u64, event: &GameEvent) {
    match event {
        GameEvent::Cue(cue) => tracing::trace!(frame, ?cue, "Cue"),
        GameEvent::LevelComplete | GameEvent::LevelFailed | GameEvent::FellOut => {
            tracing::info!(frame, ?event, "Level event");
        },
        other => tracing::debug!(frame, event = ?other, "Game event"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SerenityConfig::load();
    let layout = load_layout();
    let save_path = std::env::var("SERENITY_SAVE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("saves").join(format!("{}.json", layout.name)));
    let tick_period = config.abilities.tick_period();

    let mut game =
        GameplayController::new(layout, config).with_save_sink(JsonFileSink::new(save_path));
    let clock = spawn_tick_clock(game.ability_ticks(), tick_period);

    let tick_rate = game.tick_rate().max(1.0);
    let dt = 1.0 / tick_rate;
    let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let limit = tokio::time::sleep(run_limit());
    tokio::pin!(limit);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut pilot = Autopilot::meadow();
    tracing::info!(level = %game.metadata().name, tick_rate, "Serenity sim starting");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let input = pilot.next_input();
                for event in game.update(dt, &input) {
                    log_event(game.frame(), &event);
                }
                if game.outcome().is_finished() {
                    break;
                }
            }
            _ = &mut limit => {
                tracing::info!("Run time limit reached");
                break;
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    clock.shutdown().await;

    let hud = game.hud();
    tracing::info!(
        outcome = ?game.outcome(),
        frames = game.frame(),
        serenity = hud.serenity,
        shards = hud.shards_collected,
        shards_total = hud.shards_total,
        "Serenity sim finished"
    );
}
