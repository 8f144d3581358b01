//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, clocks, or platform dependencies
//!
//! Per-tick pipeline (strict order, see [`tick`]): commands → effect
//! recompute → world integration (skipped during hit-stop) → collision
//! resolution → particle integration.

pub mod collision;
pub mod commands;
pub mod rowgen;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Contact, apply_bounce, circle_aabb_contact};
pub use commands::Command;
pub use rowgen::{ensure_rows_ahead, generate_rows};
pub use state::{Block, BlockKind, EffectTable, GamePhase, GameState, Particle, Player};
pub use tick::{TickInput, tick};
