//! Procedural row generation
//!
//! Rows of destructible blocks are appended on demand, keeping generation
//! ahead of the scroll position via a monotone high-water mark
//! (`GameState::last_generated_row`). Already-generated rows are never
//! revisited.

use rand::Rng;

use super::state::{Block, BlockKind, GameState};
use crate::Config;
use crate::consts::HAZARD_HP;

/// Classify one cell roll into a block kind and hit points.
///
/// The thresholds form an ordered cascade (hazard > ore > hard > normal);
/// checking them independently would double-classify overlapping bands.
fn classify(roll: f64, cfg: &Config) -> (BlockKind, i32) {
    if roll > cfg.hazard_threshold {
        (BlockKind::Hazard, HAZARD_HP)
    } else if roll > cfg.ore_threshold {
        (BlockKind::Ore, cfg.block_hp)
    } else if roll > cfg.hard_threshold {
        (BlockKind::Hard, cfg.block_hp + 1)
    } else {
        (BlockKind::Normal, cfg.block_hp)
    }
}

/// Append blocks for `row_count` consecutive rows starting at `start_row`.
///
/// Every processed row advances the high-water mark, including rows left
/// entirely empty (the top clear zone, or unlucky rolls).
pub fn generate_rows(state: &mut GameState, start_row: i32, row_count: i32) {
    let cols = (state.cfg.window_width / state.cfg.block_size) as i32;
    let block_size = state.cfg.block_size as i32;

    for row in start_row..start_row + row_count {
        if row < state.cfg.top_clear_rows {
            state.last_generated_row = row;
            continue;
        }
        for col in 0..cols {
            let roll: f64 = state.rng.random();
            if roll < state.cfg.row_empty_prob {
                continue;
            }
            let (kind, hp) = classify(roll, &state.cfg);
            state.blocks.push(Block {
                x: col * block_size,
                y: row * block_size,
                hp,
                kind,
            });
        }
        state.last_generated_row = row;
    }
}

/// Generate whatever rows are needed to cover the camera's look-ahead window
/// (current scroll plus two screen heights). Idempotent via the high-water
/// mark.
pub fn ensure_rows_ahead(state: &mut GameState) {
    let lookahead = state.camera_y + state.cfg.window_height as f32 * 2.0;
    let target = (lookahead / state.cfg.block_size as f32) as i32;
    if target > state.last_generated_row {
        let start = state.last_generated_row + 1;
        let count = target - state.last_generated_row;
        generate_rows(state, start, count);
    }
}
