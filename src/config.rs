//! Game settings
//!
//! One flat mapping of named tuning parameters, persisted as a JSON file.
//! On first run the documented defaults are written out; afterwards the user
//! file is merged over the defaults key by key, so a partial override file is
//! valid. A file that is not a JSON object, or that carries a wrongly typed
//! value, is a fatal startup error.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Flat tuning-parameter table shared by the whole simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Window & clock
    pub window_width: u32,
    pub window_height: u32,
    pub fps: u32,
    pub block_size: u32,
    pub round_seconds: f64,

    // Player kinematics
    pub player_radius: f32,
    pub player_base_speed: f32,
    pub player_start_fall_speed: f32,
    pub gravity: f32,
    pub gravity_mul: f32,
    pub max_fall_speed: f32,
    pub air_control: f32,
    pub auto_fall_mul: f32,
    pub pickaxe_scale: f32,

    // Collision response
    pub restitution_normal: f32,
    pub restitution_hazard: f32,
    pub wall_friction: f32,
    pub block_contact_cooldown_seconds: f64,
    pub hazard_invuln_seconds: f64,
    pub impact_hitstop_max_seconds: f64,

    // Row generation
    pub spawn_rows_ahead: i32,
    pub top_clear_rows: i32,
    pub block_hp: i32,
    pub row_empty_prob: f64,
    pub hazard_threshold: f64,
    pub ore_threshold: f64,
    pub hard_threshold: f64,

    // Commands & effects
    pub command_cooldown_seconds: f64,
    pub queue_pop_interval_seconds: f64,
    pub sponsor_skill_interval_seconds: f64,
    pub boost_duration_seconds: f64,
    pub slow_duration_seconds: f64,
    pub big_duration_seconds: f64,
    pub shield_duration_seconds: f64,
    pub tnt_radius: f32,
    pub tnt_block_bonus: u64,

    // Autonomous command generator
    pub auto_mode: bool,
    pub auto_command_chance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 900,
            window_height: 640,
            fps: 60,
            block_size: 36,
            round_seconds: 90.0,

            player_radius: 14.0,
            player_base_speed: 340.0,
            player_start_fall_speed: 130.0,
            gravity: 2400.0,
            gravity_mul: 0.022,
            max_fall_speed: 780.0,
            air_control: 9.5,
            auto_fall_mul: 0.55,
            pickaxe_scale: 1.6,

            restitution_normal: 0.18,
            restitution_hazard: 0.05,
            wall_friction: 0.82,
            block_contact_cooldown_seconds: 0.085,
            hazard_invuln_seconds: 0.85,
            impact_hitstop_max_seconds: 0.05,

            spawn_rows_ahead: 24,
            top_clear_rows: 2,
            block_hp: 2,
            row_empty_prob: 0.20,
            hazard_threshold: 0.93,
            ore_threshold: 0.82,
            hard_threshold: 0.70,

            command_cooldown_seconds: 0.35,
            queue_pop_interval_seconds: 0.45,
            sponsor_skill_interval_seconds: 9.0,
            boost_duration_seconds: 4.0,
            slow_duration_seconds: 4.0,
            big_duration_seconds: 5.0,
            shield_duration_seconds: 6.0,
            tnt_radius: 120.0,
            tnt_block_bonus: 12,

            auto_mode: true,
            auto_command_chance: 0.018,
        }
    }
}

impl Config {
    /// Load settings from `path`, writing the defaults there first if absent.
    ///
    /// An existing file is merged over the defaults: keys present in the file
    /// win, everything else keeps its documented default.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let cfg = Self::default();
            cfg.save(path)?;
            log::info!("wrote default settings to {}", path.display());
            return Ok(cfg);
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let user: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("settings file {} is not valid JSON", path.display()))?;
        let serde_json::Value::Object(overrides) = user else {
            bail!("settings file {} must be a JSON object", path.display());
        };

        let mut merged =
            serde_json::to_value(Self::default()).context("serialize default settings")?;
        if let serde_json::Value::Object(map) = &mut merged {
            for (key, value) in overrides {
                map.insert(key, value);
            }
        }

        let cfg: Config = serde_json::from_value(merged)
            .with_context(|| format!("invalid value in settings file {}", path.display()))?;
        log::info!("loaded settings from {}", path.display());
        Ok(cfg)
    }

    /// Write settings as pretty JSON to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }

    /// Fixed simulation timestep derived from the configured frame rate
    pub fn sim_dt(&self) -> f32 {
        1.0 / self.fps as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.fps, Config::default().fps);
        assert!(path.exists(), "defaults should be persisted on first run");

        // Second load round-trips the written file
        let again = Config::load(&path).unwrap();
        assert_eq!(again.block_size, cfg.block_size);
    }

    #[test]
    fn test_partial_override_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fps": 30, "round_seconds": 45.0 }"#).unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.round_seconds, 45.0);
        // Untouched keys keep their defaults
        assert_eq!(cfg.block_size, Config::default().block_size);
        assert_eq!(cfg.tnt_block_bonus, 12);
    }

    #[test]
    fn test_garbage_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_non_object_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_wrongly_typed_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fps": "fast" }"#).unwrap();
        assert!(Config::load(&path).is_err());
    }
}
