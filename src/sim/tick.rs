//! Fixed timestep simulation tick
//!
//! One call per frame, strict intra-tick ordering: commands → effect
//! recompute → world integration (skipped during hit-stop) → collision
//! resolution → particle integration. Effect multipliers are recomputed
//! before integration consumes them.

use rand::Rng;

use super::collision::{Aabb, apply_bounce, circle_aabb_contact};
use super::commands::{self, Command};
use super::rowgen;
use super::state::{
    BlockKind, CHIP_COLOR, DEBRIS_COLOR, GamePhase, GameState, HAZARD_COLOR, SHIELD_COLOR,
};
use crate::consts::*;
use crate::decay_feedback;

/// Input intents for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Movement direction: -1, 0 or +1
    pub move_dir: i32,
    /// Player-triggered command for this frame, if any
    pub command: Option<Command>,
    /// Restart request; honored only once the round has ended
    pub restart: bool,
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time += dt as f64;

    state.shake_power = decay_feedback(state.shake_power, 0.85);
    state.hit_flash = decay_feedback(state.hit_flash, 0.85);

    if state.phase != GamePhase::Playing {
        if input.restart {
            let cfg = state.cfg.clone();
            let seed = state.seed;
            *state = GameState::new(cfg, seed);
            log::info!("round restarted");
        }
        return;
    }

    if state.time >= state.cfg.round_seconds {
        state.phase = GamePhase::RoundEnd;
        log::info!("round end: score {} depth {}m", state.score, state.depth);
        return;
    }

    state.player.move_dir = input.move_dir.clamp(-1, 1);

    // The autonomous generator and the player share one queue and cooldown
    if state.cfg.auto_mode && state.rng.random::<f64>() < state.cfg.auto_command_chance {
        let pick = state.rng.random_range(0..Command::ALL.len());
        commands::enqueue(state, Command::ALL[pick]);
    }
    if let Some(cmd) = input.command {
        commands::enqueue(state, cmd);
    }

    commands::pop_pending(state);
    commands::apply_sponsor_skill(state);
    commands::update_effects(state);

    // Hit-stop freezes integration only; collisions and particles keep
    // running so feedback animation survives the freeze-frame
    if state.time >= state.hit_stop_until {
        update_world(state, dt);
    }
    handle_collisions(state);
    update_particles(state, dt);
}

/// Integrate player kinematics and advance the scroll
fn update_world(state: &mut GameState, dt: f32) {
    let target_vx = state.player.move_dir as f32 * state.cfg.player_base_speed * state.speed_mul;
    // Frame-rate-independent blend, bounded so large steps cannot overshoot
    let blend = (state.cfg.air_control * dt).min(1.0);
    state.player.vel.x += (target_vx - state.player.vel.x) * blend;

    state.player.vel.y += state.cfg.gravity * dt * state.cfg.gravity_mul;
    state.player.vel.y = state
        .player
        .vel
        .y
        .min(state.cfg.max_fall_speed * FALL_CLAMP_FRAC);

    state.player.pos.x += state.player.vel.x * dt;
    let reach = state.pickaxe_radius();
    let width = state.cfg.window_width as f32;
    state.player.pos.x = state.player.pos.x.clamp(reach, width - reach);

    // Descent decouples fall speed from perceived scroll speed
    state.player.pos.y += state.player.vel.y * dt * state.speed_mul * state.cfg.auto_fall_mul;

    state.camera_y = state.player.pos.y - state.screen_anchor_y();
    state.depth = ((state.camera_y / state.cfg.block_size as f32) as i32).max(0);

    rowgen::ensure_rows_ahead(state);
}

/// Resolve every circle-vs-block contact for this tick.
///
/// Runs even during hit-stop. Removal is a retain pass over an owned list,
/// never in-place deletion during iteration.
fn handle_collisions(state: &mut GameState) {
    let now = state.time;
    let block_size = state.cfg.block_size as f32;
    let width = state.cfg.window_width as f32;
    let reach = state.pickaxe_radius();
    let contact_cooldown = state.cfg.block_contact_cooldown_seconds;

    let mut pos = state.player.pos;
    let mut vel = state.player.vel;

    let blocks = std::mem::take(&mut state.blocks);
    let mut kept = Vec::with_capacity(blocks.len());

    for mut block in blocks {
        let rect = Aabb::from_block(block.x, block.y, block_size);
        let Some(contact) = circle_aabb_contact(pos, reach, vel, &rect) else {
            kept.push(block);
            continue;
        };

        pos += contact.normal * contact.penetration;
        pos.x = pos.x.clamp(reach, width - reach);

        let restitution = if block.kind == BlockKind::Hazard {
            state.cfg.restitution_hazard
        } else {
            state.cfg.restitution_normal
        };
        vel = apply_bounce(vel, contact.normal, restitution, state.cfg.wall_friction);

        if block.kind == BlockKind::Hazard {
            if state.shield {
                // Shield takes the hit; the hazard survives
                state.effects.shield = 0.0;
                state.spawn_particles(block.center(block_size), 12, SHIELD_COLOR);
                state.shake_power = state.shake_power.max(8.0);
                state.hit_flash = state.hit_flash.max(0.12);
                kept.push(block);
                continue;
            }
            if now >= state.player.invuln_until {
                state.player.hp -= 1;
                state.player.invuln_until = now + state.cfg.hazard_invuln_seconds;
                vel += contact.normal * HAZARD_KICK;
                state.shake_power = state.shake_power.max(10.0);
                state.hit_flash = state.hit_flash.max(0.2);
                state.spawn_particles(block.center(block_size), 16, HAZARD_COLOR);
                if state.player.hp <= 0 {
                    state.phase = GamePhase::GameOver;
                    log::info!("game over: score {} depth {}m", state.score, state.depth);
                }
            }
            kept.push(block);
            continue;
        }

        // Sustained contact is throttled per block
        let key = block.grid_key();
        let since_last = now
            - state
                .block_hit_at
                .get(&key)
                .copied()
                .unwrap_or(f64::NEG_INFINITY);
        if since_last > contact_cooldown {
            let mut bonus: i32 = 0;
            if contact.impact > IMPACT_MEDIUM_THRESHOLD {
                bonus += 1;
            }
            if contact.impact > IMPACT_HIGH_THRESHOLD {
                bonus += 1;
            }
            block.hp -= 1 + bonus;
            state.score += block.kind.score_gain() + bonus as u64 * 2;
            state.block_hit_at.insert(key, now);

            state.spawn_particles(block.center(block_size), 6 + bonus as usize * 3, CHIP_COLOR);
            state.shake_power = state.shake_power.max((2.0 + contact.impact * 0.015).min(9.0));
            state.hit_flash = state
                .hit_flash
                .max((0.04 + contact.impact * 0.00018).min(0.14));
            let stop = now
                + (0.01 + contact.impact as f64 * 0.00003)
                    .min(state.cfg.impact_hitstop_max_seconds);
            state.hit_stop_until = state.hit_stop_until.max(stop);
        }

        if block.hp > 0 {
            kept.push(block);
        } else {
            state.spawn_particles(block.center(block_size), 12, DEBRIS_COLOR);
            vel.y *= DESTROY_FALL_DAMP;
            state.shake_power = state.shake_power.max(6.0);
            state.hit_flash = state.hit_flash.max(0.12);
        }
    }

    state.blocks = kept;
    state.player.pos = pos;
    state.player.vel = vel;
    // Reconcile the camera with the corrected world position
    state.camera_y = pos.y - state.screen_anchor_y();

    // Memory bound on the cooldown cache, not correctness-critical
    if state.block_hit_at.len() > CONTACT_MAP_MAX_ENTRIES {
        let cutoff = now - CONTACT_MAP_HORIZON_SECONDS;
        state.block_hit_at.retain(|_, t| *t > cutoff);
    }
}

fn update_particles(state: &mut GameState, dt: f32) {
    for p in &mut state.particles {
        p.life -= dt;
        p.pos += p.vel * dt;
        p.vel.y += PARTICLE_GRAVITY * dt;
    }
    state.particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::sim::state::{Block, Particle};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn bare_state() -> GameState {
        let mut cfg = Config::default();
        cfg.spawn_rows_ahead = 0;
        cfg.auto_mode = false;
        GameState::new(cfg, 7)
    }

    /// Place a block straight under the player, overlapping the pickaxe circle
    fn block_under_player(state: &GameState, hp: i32, kind: BlockKind) -> Block {
        let reach = state.pickaxe_radius();
        let half = state.cfg.block_size as i32 / 2;
        Block {
            x: state.player.pos.x as i32 - half,
            y: (state.player.pos.y + reach * 0.8) as i32,
            hp,
            kind,
        }
    }

    #[test]
    fn test_low_impact_contact_deals_one_damage() {
        let mut state = bare_state();
        let block = block_under_player(&state, 2, BlockKind::Normal);
        state.blocks.push(block);
        state.player.vel = Vec2::new(0.0, 50.0);

        handle_collisions(&mut state);
        assert_eq!(state.blocks.len(), 1, "block below destruction stays");
        assert_eq!(state.blocks[0].hp, 1);
        assert_eq!(state.score, 4);
    }

    #[test]
    fn test_high_impact_contact_destroys_block() {
        let mut state = bare_state();
        let block = block_under_player(&state, 2, BlockKind::Normal);
        state.blocks.push(block);
        state.player.vel = Vec2::new(0.0, 400.0);

        handle_collisions(&mut state);
        // damage = 1 + 2 tiers = 3 >= hp, block removed with debris
        assert!(state.blocks.is_empty());
        assert_eq!(state.score, 4 + 2 * 2);
        assert!(!state.particles.is_empty());
        assert!(state.shake_power >= 6.0);
    }

    #[test]
    fn test_impact_between_thresholds_deals_two() {
        let mut state = bare_state();
        let block = block_under_player(&state, 5, BlockKind::Ore);
        state.blocks.push(block);
        state.player.vel = Vec2::new(0.0, 200.0);

        handle_collisions(&mut state);
        assert_eq!(state.blocks[0].hp, 3);
        assert_eq!(state.score, 20 + 2);
    }

    #[test]
    fn test_resolved_contact_is_not_closing() {
        let mut state = bare_state();
        let block = block_under_player(&state, 50, BlockKind::Hard);
        state.blocks.push(block);
        state.player.vel = Vec2::new(0.0, 300.0);

        handle_collisions(&mut state);
        // Bounced off a floor contact: vertical velocity no longer downward
        assert!(state.player.vel.y <= 0.0);
    }

    #[test]
    fn test_contact_cooldown_throttles_damage() {
        let mut state = bare_state();
        let block = block_under_player(&state, 10, BlockKind::Normal);
        let start_pos = state.player.pos;
        state.blocks.push(block);

        state.player.vel = Vec2::new(0.0, 50.0);
        handle_collisions(&mut state);
        assert_eq!(state.blocks[0].hp, 9);

        // Same instant, restored overlap: throttled
        state.player.pos = start_pos;
        state.player.vel = Vec2::new(0.0, 50.0);
        handle_collisions(&mut state);
        assert_eq!(state.blocks[0].hp, 9);

        // Past the cooldown damage applies again
        state.time += state.cfg.block_contact_cooldown_seconds + 0.01;
        state.player.pos = start_pos;
        state.player.vel = Vec2::new(0.0, 50.0);
        handle_collisions(&mut state);
        assert_eq!(state.blocks[0].hp, 8);
    }

    #[test]
    fn test_hazard_contact_with_shield_consumes_shield() {
        let mut state = bare_state();
        let block = block_under_player(&state, 2, BlockKind::Hazard);
        state.blocks.push(block);
        state.effects.shield = 100.0;
        commands::update_effects(&mut state);
        state.player.vel = Vec2::new(0.0, 100.0);

        handle_collisions(&mut state);
        assert_eq!(state.effects.shield, 0.0);
        assert_eq!(state.player.hp, PLAYER_START_HP);
        assert_eq!(state.blocks.len(), 1, "hazard survives the shield hit");
        assert_eq!(state.blocks[0].hp, HAZARD_HP);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_hazard_contact_damages_and_grants_invulnerability() {
        let mut state = bare_state();
        let block = block_under_player(&state, 2, BlockKind::Hazard);
        let start_pos = state.player.pos;
        state.blocks.push(block);
        state.player.vel = Vec2::new(0.0, 100.0);

        handle_collisions(&mut state);
        assert_eq!(state.player.hp, PLAYER_START_HP - 1);
        assert_eq!(
            state.player.invuln_until,
            state.time + state.cfg.hazard_invuln_seconds
        );
        assert_eq!(state.blocks.len(), 1, "contact damage never removes hazards");
        // Kick away from the block (upward normal)
        assert!(state.player.vel.y < 0.0);

        // While invulnerable a second contact is free
        state.player.pos = start_pos;
        state.player.vel = Vec2::new(0.0, 100.0);
        handle_collisions(&mut state);
        assert_eq!(state.player.hp, PLAYER_START_HP - 1);
    }

    #[test]
    fn test_hazard_drains_hp_to_game_over() {
        let mut state = bare_state();
        state.player.hp = 1;
        let block = block_under_player(&state, 2, BlockKind::Hazard);
        state.blocks.push(block);
        state.player.vel = Vec2::new(0.0, 100.0);

        handle_collisions(&mut state);
        assert_eq!(state.player.hp, 0);
        assert_eq!(state.phase, GamePhase::GameOver);

        // Terminal phase: further ticks leave the world untouched
        let score = state.score;
        let blocks = state.blocks.len();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, score);
        assert_eq!(state.blocks.len(), blocks);
    }

    #[test]
    fn test_hit_stop_skips_integration_but_not_particles() {
        let mut state = bare_state();
        state.hit_stop_until = 10.0;
        state.particles.push(Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(100.0, 0.0),
            life: 1.0,
            color: CHIP_COLOR,
        });
        let pos_before = state.player.pos;

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player.pos, pos_before);
        assert!(state.particles[0].pos.x > 0.0);
        assert!(state.particles[0].life < 1.0);
    }

    #[test]
    fn test_round_end_and_restart() {
        let mut state = bare_state();
        state.time = state.cfg.round_seconds - 0.001;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::RoundEnd);

        // Restart only in a terminal phase, rebuilding from the same seed
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time, 0.0);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.hp, PLAYER_START_HP);

        let reference = GameState::new(state.cfg.clone(), state.seed);
        assert_eq!(state.blocks.len(), reference.blocks.len());
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut state = bare_state();
        state.score = 42;
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, DT);
        assert_eq!(state.score, 42);
    }

    #[test]
    fn test_contact_map_is_pruned() {
        let mut state = bare_state();
        state.time = 100.0;
        for i in 0..3000 {
            state.block_hit_at.insert((i, 0), 1.0); // long stale
        }
        handle_collisions(&mut state);
        assert!(state.block_hit_at.is_empty());
    }

    #[test]
    fn test_generation_keeps_pace_with_scroll() {
        let mut cfg = Config::default();
        cfg.auto_mode = false;
        let mut state = GameState::new(cfg, 3);
        let mut last_mark = state.last_generated_row;

        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), DT);
            let needed = ((state.camera_y + state.cfg.window_height as f32 * 2.0)
                / state.cfg.block_size as f32) as i32;
            assert!(state.last_generated_row >= needed);
            assert!(state.last_generated_row >= last_mark);
            last_mark = state.last_generated_row;
        }
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = GameState::new(Config::default(), 99999);
        let mut b = GameState::new(Config::default(), 99999);

        let inputs = [
            TickInput {
                move_dir: 1,
                ..Default::default()
            },
            TickInput {
                command: Some(Command::Boost),
                ..Default::default()
            },
            TickInput {
                move_dir: -1,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, DT);
            tick(&mut b, input, DT);
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.blocks.len(), b.blocks.len());
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.player.vel, b.player.vel);
        assert_eq!(a.depth, b.depth);
    }

    #[test]
    fn test_boost_raises_horizontal_target_speed() {
        let mut state = bare_state();
        state.player.move_dir = 1;
        let mut boosted = bare_state();
        boosted.player.move_dir = 1;
        boosted.speed_mul = BOOST_SPEED_FACTOR;

        update_world(&mut state, DT);
        update_world(&mut boosted, DT);
        assert!(boosted.player.vel.x > state.player.vel.x);
    }

    #[test]
    fn test_horizontal_clamp_keeps_circle_inside_window() {
        let mut state = bare_state();
        state.player.pos.x = 5.0;
        state.player.vel = Vec2::new(-500.0, 0.0);
        update_world(&mut state, DT);
        assert!(state.player.pos.x >= state.pickaxe_radius());
    }

    #[test]
    fn test_fall_speed_is_clamped() {
        let mut state = bare_state();
        state.player.vel.y = 10_000.0;
        update_world(&mut state, DT);
        assert!(state.player.vel.y <= state.cfg.max_fall_speed * FALL_CLAMP_FRAC);
    }
}
