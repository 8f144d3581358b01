//! Deepdig entry point
//!
//! Headless demo runner: loads the settings file, seeds a round and lets the
//! autonomous command generator play it out at the configured frame rate.
//! A presentation layer would drive the same loop, rendering the state after
//! every tick.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use deepdig::Config;
use deepdig::sim::{GamePhase, GameState, TickInput, tick};

fn main() -> Result<()> {
    env_logger::init();

    let cfg = Config::load(Path::new("settings.json"))?;
    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse().context("seed must be an unsigned integer")?,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock before unix epoch")?
            .as_nanos() as u64,
    };

    let dt = cfg.sim_dt();
    let ticks_per_second = cfg.fps as u64;
    let mut state = GameState::new(cfg, seed);
    log::info!("starting round with seed {seed}");

    let input = TickInput::default();
    let mut ticks: u64 = 0;
    while state.phase == GamePhase::Playing {
        tick(&mut state, &input, dt);
        ticks += 1;
        if ticks % ticks_per_second == 0 {
            log::info!(
                "t={:>3.0}s score {:>6} depth {:>4}m hp {} skill {}",
                state.time,
                state.score,
                state.depth,
                state.player.hp,
                state.active_skill_name
            );
        }
    }

    match state.phase {
        GamePhase::GameOver => {
            log::info!("game over: final score {} depth {}m", state.score, state.depth);
        }
        _ => {
            log::info!(
                "round complete: final score {} depth {}m",
                state.score,
                state.depth
            );
        }
    }
    Ok(())
}
