//! Slingshot: a turn-based projectile game on Bevy and Rapier2D.
//!
//! Two launch modes share one turn: the slingshot fires along a drag, the
//! catapult stages a projectile, lets the player draw a temporary ramp, and
//! drops the projectile onto it.  Targets are destroyed on contact, by
//! violent impacts, or by a proximity fallback, each scored at most once.
//!
//! [`game::GamePlugin`] contains all gameplay and runs headless;
//! [`game::SlingshotPhysicsPlugin`], [`input::PlayerInputPlugin`],
//! [`rendering::RenderingPlugin`] and [`particles::ParticlesPlugin`] add the
//! physics backend, hardware input and presentation.

pub mod ability;
pub mod aim;
pub mod catapult;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod input;
pub mod launch;
pub mod level;
pub mod particles;
pub mod progress;
pub mod projectile;
pub mod ramp;
pub mod rendering;
pub mod scenario;
