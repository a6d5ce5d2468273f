//! Slingshot aiming: turning a drag gesture into a launch impulse.
//!
//! The player presses at `start`, drags to `end` and releases.  The projectile
//! flies in the direction *opposite* the drag (pulling back a sling), with a
//! strength proportional to the drag length.

use crate::config::GameConfig;
use bevy::prelude::*;
use std::f32::consts::PI;

/// Polar description of a launch: direction and raw drag length.
///
/// `magnitude` is the unclamped drag distance; clamping and the power
/// multiplier are applied by [`launch_impulse`] when the projectile is built.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImpulseVector {
    /// Launch direction in radians (world frame, CCW from +X).
    pub angle: f32,
    /// Drag length in world units.
    pub magnitude: f32,
}

/// Derive the launch impulse from an aim drag.
///
/// `angle = atan2(end - start) + π`, `magnitude = |end - start|`.
/// A zero-length drag yields `magnitude == 0.0`; that still builds a valid
/// projectile which simply falls under gravity.
pub fn impulse_vector(start: Vec2, end: Vec2) -> ImpulseVector {
    let delta = end - start;
    ImpulseVector {
        angle: delta.y.atan2(delta.x) + PI,
        magnitude: delta.length(),
    }
}

/// World-space impulse applied to a freshly launched projectile.
///
/// The magnitude is clamped to `max_impulse` and then scaled by
/// `power_multiplier`; the resulting `(impulse, 0)` vector is rotated by the
/// launch angle.
pub fn launch_impulse(vector: ImpulseVector, config: &GameConfig) -> Vec2 {
    let strength = vector.magnitude.min(config.max_impulse) * config.power_multiplier;
    Vec2::from_angle(vector.angle).rotate(Vec2::new(strength, 0.0))
}

/// An aim drag in progress (slingshot mode only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimDrag {
    pub start: Vec2,
    pub end: Vec2,
}

impl AimDrag {
    pub fn new(at: Vec2) -> Self {
        Self { start: at, end: at }
    }

    pub fn impulse(&self) -> ImpulseVector {
        impulse_vector(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn wrap(angle: f32) -> f32 {
        angle.rem_euclid(TAU)
    }

    #[test]
    fn zero_length_drag_has_zero_magnitude() {
        for p in [Vec2::ZERO, Vec2::new(250.0, -40.0), Vec2::new(-3.5, 1e4)] {
            let v = impulse_vector(p, p);
            assert_eq!(v.magnitude, 0.0);
            assert_eq!(launch_impulse(v, &GameConfig::default()), Vec2::ZERO);
        }
    }

    #[test]
    fn angle_is_opposite_the_drag() {
        let cases = [
            (Vec2::ZERO, Vec2::new(100.0, 0.0)),
            (Vec2::new(10.0, 10.0), Vec2::new(10.0, 90.0)),
            (Vec2::new(-5.0, 3.0), Vec2::new(-50.0, -60.0)),
            (Vec2::new(400.0, 200.0), Vec2::new(300.0, 250.0)),
        ];
        for (start, end) in cases {
            let d = end - start;
            let v = impulse_vector(start, end);
            let expected = wrap(d.y.atan2(d.x) + PI);
            assert!((wrap(v.angle) - expected).abs() < 1e-5);
            assert!((v.magnitude - d.length()).abs() < 1e-4);
            // The launch direction points back along the drag.
            let dir = Vec2::from_angle(v.angle);
            assert!(dir.dot(d.normalize()) < -0.999);
        }
    }

    #[test]
    fn rightward_drag_launches_left_with_clamped_power() {
        let config = GameConfig::default();
        let v = impulse_vector(Vec2::ZERO, Vec2::new(100.0, 0.0));
        assert!((v.angle - PI).abs() < 1e-6);

        let impulse = launch_impulse(v, &config);
        let expected = config.max_impulse.min(100.0) * config.power_multiplier;
        assert!((impulse.x + expected).abs() < 1e-2);
        assert!(impulse.y.abs() < 1e-2);
    }

    #[test]
    fn long_drag_is_clamped_to_max_impulse() {
        let config = GameConfig::default();
        let short = launch_impulse(impulse_vector(Vec2::ZERO, Vec2::new(0.0, 100.0)), &config);
        let long = launch_impulse(impulse_vector(Vec2::ZERO, Vec2::new(0.0, 900.0)), &config);
        assert!((short.length() - long.length()).abs() < 1e-2);
        assert!((long.length() - config.max_impulse * config.power_multiplier).abs() < 1e-2);
    }
}
