//! Centralised physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! [`crate::config::GameConfig`] mirrors every value below and can override
//! any of them from `assets/game.toml`.  The numbers here stay the
//! authoritative defaults.  World units are pixels (Rapier runs with
//! `pixels_per_meter(1.0)`), with the origin at the bottom-left corner of the
//! playfield and +Y pointing up.

// ── World ─────────────────────────────────────────────────────────────────────

/// Width of the playfield (world units).
pub const WORLD_WIDTH: f32 = 1800.0;

/// Height of the playfield (world units).
pub const WORLD_HEIGHT: f32 = 800.0;

/// Downward gravitational acceleration (u/s²).  Applied as `(0, -GRAVITY)`.
pub const GRAVITY: f32 = 900.0;

/// Fixed simulation step (s).  Rapier advances by exactly this much once per
/// frame and every in-game countdown (settle, ramp, life-time) uses the same
/// value, so a run is reproducible regardless of the display rate.
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Height of the static floor segment above the bottom edge.
pub const FLOOR_Y: f32 = 15.0;

/// Floor friction.  Deliberately very high so rolling bodies come to rest.
pub const FLOOR_FRICTION: f32 = 10.0;

/// Anchor of the decorative catapult base (a static triangle collider).
pub const CATAPULT_BASE_X: f32 = 200.0;
pub const CATAPULT_BASE_Y: f32 = 100.0;

// ── Turn gating ───────────────────────────────────────────────────────────────

/// Below this speed (u/s) the current projectile counts as "stopped".
pub const SETTLE_SPEED_THRESHOLD: f32 = 5.0;

/// Time (s) the current projectile must stay below the settle speed before
/// the next turn is unlocked.  Any bounce back above the threshold restarts it.
pub const SETTLE_DURATION: f32 = 1.0;

/// Above this speed (u/s) a projectile is "in flight" and may use its ability.
pub const FLIGHT_SPEED_THRESHOLD: f32 = 10.0;

// ── Slingshot ─────────────────────────────────────────────────────────────────

/// Upper bound on the drag length fed into the launch impulse.
pub const MAX_IMPULSE: f32 = 100.0;

/// Scale applied to the clamped drag length to obtain the launch impulse.
///
/// A full drag (100 u) on a mass-5 projectile yields 5000 u·m/s, i.e. a launch
/// speed of ~1000 u/s.
pub const POWER_MULTIPLIER: f32 = 50.0;

// ── Projectiles ───────────────────────────────────────────────────────────────

pub const PROJECTILE_MASS: f32 = 5.0;
pub const PROJECTILE_RADIUS: f32 = 12.0;
pub const PROJECTILE_ELASTICITY: f32 = 0.8;
pub const PROJECTILE_FRICTION: f32 = 1.0;

/// Seconds a live projectile may exist before it is removed unconditionally.
pub const PROJECTILE_LIFETIME: f32 = 5.0;

/// Speed multiplier applied by the boost ability.
pub const BOOST_MULTIPLIER: f32 = 1.3;

/// Angular offset (degrees) of the two outer copies produced by a split.
pub const SPLIT_SPREAD_DEGREES: f32 = 30.0;

// ── Catapult ──────────────────────────────────────────────────────────────────

/// Height above the release click from which a staged projectile is dropped.
pub const DROP_HEIGHT: f32 = 400.0;

/// Seconds a finished ramp stays in the world before it is removed.
pub const RAMP_LIFETIME: f32 = 5.0;

/// Radius of each ramp capsule, on the order of the projectile radius.
/// Projectiles carry `Ccd`, which keeps a falling one from tunnelling
/// through the stroke at this thickness.
pub const RAMP_THICKNESS: f32 = 14.0;

/// High friction: the ramp should carry the projectile, not let it skid.
pub const RAMP_FRICTION: f32 = 1.2;

/// Low restitution: the ramp should guide, not bounce.
pub const RAMP_ELASTICITY: f32 = 0.1;

// ── Targets & obstacles ───────────────────────────────────────────────────────

pub const TARGET_MASS: f32 = 2.0;
pub const TARGET_RADIUS: f32 = 20.0;
pub const TARGET_ELASTICITY: f32 = 0.8;
pub const TARGET_FRICTION: f32 = 0.4;

pub const OBSTACLE_MASS: f32 = 2.0;
pub const OBSTACLE_HALF_WIDTH: f32 = 10.0;
pub const OBSTACLE_HALF_HEIGHT: f32 = 35.0;
pub const OBSTACLE_ELASTICITY: f32 = 0.8;
pub const OBSTACLE_FRICTION: f32 = 1.0;

// ── Collision policy ──────────────────────────────────────────────────────────

/// Contacts whose total impulse is below this are ignored outright.
pub const IMPULSE_IGNORE_THRESHOLD: f32 = 100.0;

/// Contacts whose total impulse exceeds this destroy every participating
/// target or obstacle.
pub const IMPULSE_DESTROY_THRESHOLD: f32 = 1200.0;

/// Centre-to-centre distance under which a projectile and a target are
/// treated as colliding even if no contact event was reported.
pub const PROXIMITY_EPSILON: f32 = 5.0;

/// Points awarded per destroyed target.
pub const TARGET_SCORE_AWARD: u32 = 100;

/// Display time (s) of a floating score popup.
pub const SCORE_POPUP_LIFETIME: f32 = 1.0;

/// Upward drift (u/s) of a floating score popup.
pub const SCORE_POPUP_RISE_SPEED: f32 = 40.0;

// ── Rendering ─────────────────────────────────────────────────────────────────

pub const HUD_FONT_SIZE: f32 = 20.0;
pub const DEBRIS_PARTICLES_PER_BODY: u32 = 8;
