//! Game-specific error types.
//!
//! Player gestures never produce errors: an invalid gesture is a silent no-op.
//! The variants below cover the genuinely fatal paths, i.e. geometry the
//! physics engine would reject, a level that cannot be built, or a
//! configuration value outside its safe range.  Systems log these with
//! `error!` and abort the operation instead of panicking.
//!
//! ## Usage
//!
//! ```ignore
//! use slingshot::error::{validate_positive, GameResult};
//!
//! fn check_radius(radius: f32) -> GameResult<()> {
//!     validate_positive("projectile_radius", radius)?;
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Top-level error enum for the game.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// A collider description would be rejected by the physics engine
    /// (non-finite coordinates, non-positive extent, empty compound).
    DegenerateShape {
        /// Which body was being built ("target", "ramp", ...).
        shape: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// A level contains no targets, so it could never be won.
    EmptyLevel {
        /// Index of the offending level in the catalog.
        index: usize,
    },

    /// Configuration value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// A configuration file exists but could not be parsed.
    ConfigParse {
        /// Path of the file that failed to parse.
        path: String,
        /// Parser diagnostic.
        message: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::DegenerateShape { shape, reason } => {
                write!(f, "degenerate {} shape: {}", shape, reason)
            }
            GameError::EmptyLevel { index } => {
                write!(f, "level {} has no targets", index + 1)
            }
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            GameError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> GameResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless every point is finite.
pub fn validate_points(shape: &'static str, points: &[bevy::math::Vec2]) -> GameResult<()> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(i) => Err(GameError::DegenerateShape {
            shape,
            reason: format!("point {} is not finite ({:?})", i, points[i]),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    #[test]
    fn positive_validation_rejects_zero_negative_and_nan() {
        assert!(validate_positive("x", 1.0).is_ok());
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", -3.0).is_err());
        assert!(validate_positive("x", f32::NAN).is_err());
    }

    #[test]
    fn point_validation_reports_first_bad_index() {
        let pts = [Vec2::ZERO, Vec2::new(f32::INFINITY, 0.0)];
        let err = validate_points("ramp", &pts).unwrap_err();
        assert!(err.to_string().contains("point 1"));
    }
}
