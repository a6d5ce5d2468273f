//! Runtime game configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.settle_duration`, `config.drop_height`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{validate_positive, GameError, GameResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the configuration override file.
pub const CONFIG_PATH: &str = "assets/game.toml";

/// Runtime-tunable physics and gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/game.toml`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── World ────────────────────────────────────────────────────────────────
    pub world_width: f32,
    pub world_height: f32,
    pub gravity: f32,
    pub physics_dt: f32,
    pub floor_y: f32,
    pub floor_friction: f32,

    // ── Turn gating ───────────────────────────────────────────────────────────
    pub settle_speed_threshold: f32,
    pub settle_duration: f32,
    pub flight_speed_threshold: f32,

    // ── Slingshot ─────────────────────────────────────────────────────────────
    pub max_impulse: f32,
    pub power_multiplier: f32,

    // ── Projectiles ───────────────────────────────────────────────────────────
    pub projectile_mass: f32,
    pub projectile_radius: f32,
    pub projectile_elasticity: f32,
    pub projectile_friction: f32,
    pub projectile_lifetime: f32,
    pub boost_multiplier: f32,
    pub split_spread_degrees: f32,

    // ── Catapult ──────────────────────────────────────────────────────────────
    pub drop_height: f32,
    pub ramp_lifetime: f32,
    pub ramp_thickness: f32,
    pub ramp_friction: f32,
    pub ramp_elasticity: f32,

    // ── Targets & obstacles ───────────────────────────────────────────────────
    pub target_mass: f32,
    pub target_radius: f32,
    pub target_elasticity: f32,
    pub target_friction: f32,
    /// Keep targets inside `[radius, world_width - radius]` horizontally.
    pub target_soft_wall: bool,
    pub obstacle_mass: f32,
    pub obstacle_half_width: f32,
    pub obstacle_half_height: f32,
    pub obstacle_elasticity: f32,
    pub obstacle_friction: f32,

    // ── Collision policy ──────────────────────────────────────────────────────
    pub impulse_ignore_threshold: f32,
    pub impulse_destroy_threshold: f32,
    pub proximity_epsilon: f32,
    pub target_score_award: u32,
    pub score_popup_lifetime: f32,

    // ── Rendering ─────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // World
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            gravity: GRAVITY,
            physics_dt: PHYSICS_DT,
            floor_y: FLOOR_Y,
            floor_friction: FLOOR_FRICTION,
            // Turn gating
            settle_speed_threshold: SETTLE_SPEED_THRESHOLD,
            settle_duration: SETTLE_DURATION,
            flight_speed_threshold: FLIGHT_SPEED_THRESHOLD,
            // Slingshot
            max_impulse: MAX_IMPULSE,
            power_multiplier: POWER_MULTIPLIER,
            // Projectiles
            projectile_mass: PROJECTILE_MASS,
            projectile_radius: PROJECTILE_RADIUS,
            projectile_elasticity: PROJECTILE_ELASTICITY,
            projectile_friction: PROJECTILE_FRICTION,
            projectile_lifetime: PROJECTILE_LIFETIME,
            boost_multiplier: BOOST_MULTIPLIER,
            split_spread_degrees: SPLIT_SPREAD_DEGREES,
            // Catapult
            drop_height: DROP_HEIGHT,
            ramp_lifetime: RAMP_LIFETIME,
            ramp_thickness: RAMP_THICKNESS,
            ramp_friction: RAMP_FRICTION,
            ramp_elasticity: RAMP_ELASTICITY,
            // Targets & obstacles
            target_mass: TARGET_MASS,
            target_radius: TARGET_RADIUS,
            target_elasticity: TARGET_ELASTICITY,
            target_friction: TARGET_FRICTION,
            target_soft_wall: true,
            obstacle_mass: OBSTACLE_MASS,
            obstacle_half_width: OBSTACLE_HALF_WIDTH,
            obstacle_half_height: OBSTACLE_HALF_HEIGHT,
            obstacle_elasticity: OBSTACLE_ELASTICITY,
            obstacle_friction: OBSTACLE_FRICTION,
            // Collision policy
            impulse_ignore_threshold: IMPULSE_IGNORE_THRESHOLD,
            impulse_destroy_threshold: IMPULSE_DESTROY_THRESHOLD,
            proximity_epsilon: PROXIMITY_EPSILON,
            target_score_award: TARGET_SCORE_AWARD,
            score_popup_lifetime: SCORE_POPUP_LIFETIME,
            // Rendering
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

impl GameConfig {
    /// Parse a TOML document; keys not present keep their defaults.
    pub fn from_toml_str(path: &str, contents: &str) -> GameResult<Self> {
        toml::from_str::<GameConfig>(contents).map_err(|e| GameError::ConfigParse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Check every value that would break the simulation if mis-tuned.
    pub fn validate(&self) -> GameResult<()> {
        validate_positive("physics_dt", self.physics_dt)?;
        validate_positive("world_width", self.world_width)?;
        validate_positive("world_height", self.world_height)?;
        validate_positive("settle_duration", self.settle_duration)?;
        validate_positive("projectile_mass", self.projectile_mass)?;
        validate_positive("projectile_radius", self.projectile_radius)?;
        validate_positive("projectile_lifetime", self.projectile_lifetime)?;
        validate_positive("ramp_thickness", self.ramp_thickness)?;
        validate_positive("ramp_lifetime", self.ramp_lifetime)?;
        validate_positive("target_mass", self.target_mass)?;
        validate_positive("target_radius", self.target_radius)?;
        validate_positive("obstacle_mass", self.obstacle_mass)?;
        validate_positive("obstacle_half_width", self.obstacle_half_width)?;
        validate_positive("obstacle_half_height", self.obstacle_half_height)?;
        validate_positive("impulse_destroy_threshold", self.impulse_destroy_threshold)?;
        if self.impulse_ignore_threshold >= self.impulse_destroy_threshold {
            return Err(GameError::UnsafeConstant {
                name: "impulse_ignore_threshold",
                value: self.impulse_ignore_threshold,
                safe_range: "[0.0, impulse_destroy_threshold)",
            });
        }
        Ok(())
    }
}

/// `true` once `steps` fixed steps of `dt` cover `duration`.
///
/// Summing `dt` in `f32` drifts below the exact total (sixty steps of 1/60
/// add up to 0.99999994), so elapsed time is counted in whole steps and
/// compared with a tolerance of a thousandth of a step.
pub fn steps_cover(steps: u32, dt: f32, duration: f32) -> bool {
    steps as f32 * dt >= duration - dt * 1e-3
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse errors and values
/// outside their safe range are reported but do not abort the game; the
/// compiled defaults stay in place.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = CONFIG_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match GameConfig::from_toml_str(path, &contents) {
            Ok(loaded) => match loaded.validate() {
                Ok(()) => {
                    *config = loaded;
                    println!("✓ Loaded game config from {path}");
                }
                Err(e) => eprintln!("⚠ Rejected {path}: {e}; using defaults"),
            },
            Err(e) => eprintln!("⚠ {e}; using defaults"),
        },
        Err(_) => {
            // Defaults are already in place.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}
