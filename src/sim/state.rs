//! Game state and core simulation types
//!
//! The whole simulation lives in one aggregate root, [`GameState`], threaded
//! explicitly through every update function. No ambient globals.

use std::collections::{HashMap, VecDeque};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::commands::Command;
use super::rowgen;
use crate::Config;
use crate::consts::*;

/// RGB color attached to a particle (presentation reads it verbatim)
pub type Color = (u8, u8, u8);

/// Grey chips knocked off a mined block
pub const CHIP_COLOR: Color = (180, 180, 200);
/// Pale debris of a fully destroyed block
pub const DEBRIS_COLOR: Color = (245, 235, 190);
/// TNT blast
pub const TNT_COLOR: Color = (255, 170, 80);
/// Shield consumed on a hazard
pub const SHIELD_COLOR: Color = (100, 220, 255);
/// Unshielded hazard damage
pub const HAZARD_COLOR: Color = (255, 90, 90);

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Round timer expired; waiting for restart
    RoundEnd,
    /// Player ran out of hit points; waiting for restart
    GameOver,
}

/// Destructible block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Normal,
    Hard,
    Ore,
    /// Damages the player instead of being mined; never removed by contact
    Hazard,
}

impl BlockKind {
    /// Score awarded per contact-damage application
    pub fn score_gain(self) -> u64 {
        match self {
            BlockKind::Normal => 4,
            BlockKind::Hard => 8,
            BlockKind::Ore => 20,
            BlockKind::Hazard => 0,
        }
    }
}

/// A destructible block on the world grid
///
/// Position is world pixels and immutable after creation; only `hp` changes.
#[derive(Debug, Clone)]
pub struct Block {
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub kind: BlockKind,
}

impl Block {
    /// Center of the block in world space
    pub fn center(&self, block_size: f32) -> Vec2 {
        Vec2::new(
            self.x as f32 + block_size / 2.0,
            self.y as f32 + block_size / 2.0,
        )
    }

    /// Key into the contact-cooldown map
    pub fn grid_key(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// The player avatar (single instance)
#[derive(Debug, Clone)]
pub struct Player {
    /// x is screen-space (clamped to the window), y is world-space
    pub pos: Vec2,
    pub vel: Vec2,
    /// Movement intent for this tick: -1, 0 or +1
    pub move_dir: i32,
    pub hp: i32,
    /// Absolute sim time until which hazard contact is ignored
    pub invuln_until: f64,
}

/// Short-lived cosmetic entity
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in seconds; removed at <= 0
    pub life: f32,
    pub color: Color,
}

/// Absolute expiry time per effect; an effect is active iff `expiry > now`
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectTable {
    pub boost: f64,
    pub slow: f64,
    pub big: f64,
    pub shield: f64,
}

/// Complete game state for one round
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// The only randomness source in the simulation
    pub rng: Pcg32,
    pub cfg: Config,

    /// Simulation clock, seconds since round start
    pub time: f64,
    pub phase: GamePhase,

    pub player: Player,
    pub blocks: Vec<Block>,
    pub particles: Vec<Particle>,

    /// World scroll offset, reconciled from the player's world position
    pub camera_y: f32,
    /// High-water mark of generated rows (monotonically non-decreasing)
    pub last_generated_row: i32,
    /// Depth reached, in block rows
    pub depth: i32,
    pub score: u64,

    pub effects: EffectTable,
    /// Recomputed from scratch each tick from `effects` and `time`
    pub speed_mul: f32,
    pub size_mul: f32,
    pub shield: bool,

    pub command_queue: VecDeque<Command>,
    /// Most recently popped commands, newest first, for the HUD
    pub recent_commands: Vec<Command>,
    pub last_command_at: f64,
    pub last_queue_pop: f64,

    pub last_skill: f64,
    pub active_skill_name: &'static str,
    pub sponsor_card_until: f64,

    pub shake_power: f32,
    pub hit_flash: f32,
    /// World integration is skipped while `time < hit_stop_until`
    pub hit_stop_until: f64,

    /// Per-block last-hit times, throttling sustained-contact damage
    pub block_hit_at: HashMap<(i32, i32), f64>,
}

impl GameState {
    /// Create a fresh round from config and seed
    pub fn new(cfg: Config, seed: u64) -> Self {
        let anchor_y = cfg.window_height as f32 * SCREEN_ANCHOR_FRAC;
        let spawn_ahead = cfg.spawn_rows_ahead;

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player {
                pos: Vec2::new(cfg.window_width as f32 / 2.0, anchor_y),
                vel: Vec2::new(0.0, cfg.player_start_fall_speed),
                move_dir: 0,
                hp: PLAYER_START_HP,
                invuln_until: f64::NEG_INFINITY,
            },
            cfg,
            time: 0.0,
            phase: GamePhase::Playing,
            blocks: Vec::new(),
            particles: Vec::new(),
            camera_y: 0.0,
            last_generated_row: -1,
            depth: 0,
            score: 0,
            effects: EffectTable::default(),
            speed_mul: 1.0,
            size_mul: 1.0,
            shield: false,
            command_queue: VecDeque::new(),
            recent_commands: Vec::new(),
            last_command_at: f64::NEG_INFINITY,
            last_queue_pop: f64::NEG_INFINITY,
            last_skill: f64::NEG_INFINITY,
            active_skill_name: "-",
            sponsor_card_until: 0.0,
            shake_power: 0.0,
            hit_flash: 0.0,
            hit_stop_until: f64::NEG_INFINITY,
            block_hit_at: HashMap::new(),
        };

        rowgen::generate_rows(&mut state, 0, spawn_ahead);
        state
    }

    /// Fixed screen-space y the player stays anchored at
    pub fn screen_anchor_y(&self) -> f32 {
        self.cfg.window_height as f32 * SCREEN_ANCHOR_FRAC
    }

    /// Effective collision radius: base pickaxe reach times the size effect
    pub fn pickaxe_radius(&self) -> f32 {
        self.cfg
            .player_radius
            .max(self.cfg.block_size as f32 * PICKAXE_BLOCK_FRAC * self.cfg.pickaxe_scale)
            * self.size_mul
    }

    /// Seconds left on the round clock
    pub fn remaining_seconds(&self) -> f64 {
        (self.cfg.round_seconds - self.time).max(0.0)
    }

    /// Spawn a radial burst of particles at a world position
    pub fn spawn_particles(&mut self, at: Vec2, count: usize, color: Color) {
        for _ in 0..count {
            let ang = self.rng.random_range(0.0..std::f32::consts::TAU);
            let spd = self.rng.random_range(40.0..200.0f32);
            let life = self.rng.random_range(0.2..0.5f32);
            self.particles.push(Particle {
                pos: at,
                vel: Vec2::new(ang.cos(), ang.sin()) * spd,
                life,
                color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_pregenerates_rows() {
        let cfg = Config::default();
        let ahead = cfg.spawn_rows_ahead;
        let state = GameState::new(cfg, 7);

        assert_eq!(state.last_generated_row, ahead - 1);
        assert!(!state.blocks.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.hp, PLAYER_START_HP);
    }

    #[test]
    fn test_pickaxe_radius_scales_with_size_effect() {
        let mut state = GameState::new(Config::default(), 7);
        let base = state.pickaxe_radius();
        state.size_mul = BIG_SIZE_FACTOR;
        assert!((state.pickaxe_radius() - base * BIG_SIZE_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_particles_uses_state_rng() {
        let mut a = GameState::new(Config::default(), 42);
        let mut b = GameState::new(Config::default(), 42);
        a.spawn_particles(Vec2::new(10.0, 20.0), 8, CHIP_COLOR);
        b.spawn_particles(Vec2::new(10.0, 20.0), 8, CHIP_COLOR);
        assert_eq!(a.particles.len(), 8);
        for (pa, pb) in a.particles.iter().zip(&b.particles) {
            assert_eq!(pa.vel, pb.vel);
            assert_eq!(pa.life, pb.life);
        }
    }
}
