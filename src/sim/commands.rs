//! Command queue, timed effects and sponsor skills
//!
//! One FIFO queue is shared by player input and the autonomous command
//! generator, rate-limited by a single global enqueue cooldown. At most one
//! command is popped per pop interval. Effects are absolute-expiry timers;
//! reapplying one resets the timer rather than extending it.

use rand::Rng;

use super::state::{GameState, TNT_COLOR};
use crate::Config;
use crate::consts::*;

/// Symbolic commands accepted by the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tnt,
    Boost,
    Slow,
    Big,
    Shield,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Tnt,
        Command::Boost,
        Command::Slow,
        Command::Big,
        Command::Shield,
    ];

    /// HUD label
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Tnt => "tnt",
            Command::Boost => "boost",
            Command::Slow => "slow",
            Command::Big => "big",
            Command::Shield => "shield",
        }
    }
}

/// Sponsor skills: display name plus the effect they grant
pub const SPONSOR_SKILLS: [(&str, Command); 3] = [
    ("Cloud AutoScale", Command::Boost),
    ("Security ShieldWall", Command::Shield),
    ("AI SmartPath", Command::Big),
];

fn effect_duration(cfg: &Config, cmd: Command) -> f64 {
    match cmd {
        Command::Boost => cfg.boost_duration_seconds,
        Command::Slow => cfg.slow_duration_seconds,
        Command::Big => cfg.big_duration_seconds,
        Command::Shield => cfg.shield_duration_seconds,
        Command::Tnt => 0.0,
    }
}

/// Set (refresh, never extend) an effect's expiry to `now + seconds`
fn apply_effect(state: &mut GameState, cmd: Command, seconds: f64) {
    let expiry = state.time + seconds;
    match cmd {
        Command::Boost => state.effects.boost = expiry,
        Command::Slow => state.effects.slow = expiry,
        Command::Big => state.effects.big = expiry,
        Command::Shield => state.effects.shield = expiry,
        Command::Tnt => {}
    }
}

/// Append a command, subject to the global enqueue cooldown shared by every
/// command source
pub fn enqueue(state: &mut GameState, cmd: Command) {
    if state.time - state.last_command_at < state.cfg.command_cooldown_seconds {
        return;
    }
    state.command_queue.push_back(cmd);
    state.last_command_at = state.time;
    log::debug!("enqueued command {:?}", cmd);
}

/// Pop at most one command, subject to the pop interval
pub fn pop_pending(state: &mut GameState) {
    if state.time - state.last_queue_pop < state.cfg.queue_pop_interval_seconds {
        return;
    }
    let Some(cmd) = state.command_queue.pop_front() else {
        return;
    };
    state.recent_commands.insert(0, cmd);
    state.recent_commands.truncate(COMMAND_HISTORY_LEN);
    state.last_queue_pop = state.time;

    match cmd {
        Command::Tnt => trigger_tnt(state),
        effect => {
            let seconds = effect_duration(&state.cfg, effect);
            apply_effect(state, effect, seconds);
        }
    }
}

/// Clear every block whose center lies within the TNT radius of the player
pub fn trigger_tnt(state: &mut GameState) {
    let center = state.player.pos;
    let radius = state.cfg.tnt_radius;
    let block_size = state.cfg.block_size as f32;

    let blocks = std::mem::take(&mut state.blocks);
    let mut kept = Vec::with_capacity(blocks.len());
    let mut cleared = Vec::new();
    for block in blocks {
        let c = block.center(block_size);
        if c.distance(center) <= radius {
            cleared.push(c);
        } else {
            kept.push(block);
        }
    }
    state.blocks = kept;

    state.score += cleared.len() as u64 * state.cfg.tnt_block_bonus;
    state.shake_power = state.shake_power.max(TNT_SHAKE_IMPULSE);
    log::debug!("tnt cleared {} blocks", cleared.len());
    for c in cleared {
        state.spawn_particles(c, 6, TNT_COLOR);
    }
}

/// Fire a sponsor skill at most once per configured interval: a uniform pick
/// from [`SPONSOR_SKILLS`], applied for a fixed 5-second window
pub fn apply_sponsor_skill(state: &mut GameState) {
    if state.time - state.last_skill < state.cfg.sponsor_skill_interval_seconds {
        return;
    }
    let (name, effect) = SPONSOR_SKILLS[state.rng.random_range(0..SPONSOR_SKILLS.len())];
    state.active_skill_name = name;
    apply_effect(state, effect, SPONSOR_EFFECT_SECONDS);
    state.last_skill = state.time;
    state.sponsor_card_until = state.time + SPONSOR_CARD_SECONDS;
    log::debug!("sponsor skill: {name}");
}

/// Recompute the effect multipliers from scratch for this tick.
///
/// Pure function of the expiry table and the current time; no residual state
/// survives an expiry. Boost and slow combine multiplicatively when both
/// windows overlap.
pub fn update_effects(state: &mut GameState) {
    let now = state.time;
    state.speed_mul = 1.0;
    state.size_mul = 1.0;
    state.shield = false;

    if state.effects.boost > now {
        state.speed_mul *= BOOST_SPEED_FACTOR;
    }
    if state.effects.slow > now {
        state.speed_mul *= SLOW_SPEED_FACTOR;
    }
    if state.effects.big > now {
        state.size_mul = BIG_SIZE_FACTOR;
    }
    if state.effects.shield > now {
        state.shield = true;
    }
}
