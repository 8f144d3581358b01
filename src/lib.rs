//! Deepdig - a vertical digging arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, rows, commands)
//! - `config`: Settings file loading with write-defaults-on-first-run
//!
//! The simulation is headless. A presentation layer owns the frame clock and
//! input polling, calls [`sim::tick`] once per frame, and renders the
//! resulting [`sim::GameState`].

pub mod config;
pub mod sim;

pub use config::Config;
pub use sim::{GamePhase, GameState, TickInput, tick};

/// Fixed gameplay constants (everything tunable lives in [`Config`])
pub mod consts {
    /// Speed multiplier while the boost effect is active
    pub const BOOST_SPEED_FACTOR: f32 = 1.45;
    /// Speed multiplier while the slow effect is active
    pub const SLOW_SPEED_FACTOR: f32 = 0.68;
    /// Size multiplier while the big effect is active (set, not multiplied)
    pub const BIG_SIZE_FACTOR: f32 = 1.7;

    /// Duration of a sponsor-skill effect window
    pub const SPONSOR_EFFECT_SECONDS: f64 = 5.0;
    /// How long the sponsor card stays on screen
    pub const SPONSOR_CARD_SECONDS: f64 = 1.6;
    /// HUD history of recently popped commands
    pub const COMMAND_HISTORY_LEN: usize = 4;

    /// Impact speed above which contact damage gains +1
    pub const IMPACT_MEDIUM_THRESHOLD: f32 = 170.0;
    /// Impact speed above which contact damage gains a further +1
    pub const IMPACT_HIGH_THRESHOLD: f32 = 280.0;

    /// Hit points carried by hazard blocks (shield bookkeeping only)
    pub const HAZARD_HP: i32 = 2;
    /// Velocity kick away from a hazard on unshielded contact
    pub const HAZARD_KICK: glam::Vec2 = glam::Vec2::new(180.0, 220.0);

    /// Downward acceleration applied to particles
    pub const PARTICLE_GRAVITY: f32 = 420.0;

    /// Contact-cooldown map is pruned once it grows past this many entries
    pub const CONTACT_MAP_MAX_ENTRIES: usize = 2500;
    /// Entries older than this are discarded by the prune pass
    pub const CONTACT_MAP_HORIZON_SECONDS: f64 = 1.2;

    /// Minimum camera-shake impulse raised by a TNT blast
    pub const TNT_SHAKE_IMPULSE: f32 = 10.0;

    /// Player hit points at round start
    pub const PLAYER_START_HP: i32 = 5;
    /// Player's fixed screen anchor as a fraction of window height
    pub const SCREEN_ANCHOR_FRAC: f32 = 0.42;
    /// Pickaxe reach as a fraction of block size, before `pickaxe_scale`
    pub const PICKAXE_BLOCK_FRAC: f32 = 0.45;
    /// Fraction of `max_fall_speed` the fall clamp actually allows
    pub const FALL_CLAMP_FRAC: f32 = 0.72;
    /// Vertical damping applied when the player breaks through a block
    pub const DESTROY_FALL_DAMP: f32 = 0.96;
}

/// Decay a feedback channel (shake/flash) toward zero, snapping tiny values
#[inline]
pub fn decay_feedback(value: f32, factor: f32) -> f32 {
    let v = value * factor;
    if v < 0.01 { 0.0 } else { v }
}
