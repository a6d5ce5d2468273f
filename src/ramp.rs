//! Freehand ramp: a player-drawn stroke turned into static collision geometry.
//!
//! [`RampBuilder`] accumulates the stroke and owns the ramp's lifetime; it
//! never touches the ECS.  A finished stroke produces an immutable
//! [`RampGeometry`] which [`spawn_ramp`] turns into a single fixed Rapier body
//! with one capsule per consecutive point pair.  Geometry is never edited in
//! place: a new stroke replaces the previous ramp wholesale.

use crate::config::{steps_cover, GameConfig};
use crate::error::{validate_points, validate_positive, GameError, GameResult};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Marker for the (single) ramp body in the world.
#[derive(Component, Debug, Clone)]
pub struct Ramp {
    /// Polyline vertices, kept for rendering.
    pub points: Vec<Vec2>,
    /// Capsule radius, kept for rendering.
    pub thickness: f32,
}

/// Immutable description of a finished ramp, consumed once by [`spawn_ramp`].
#[derive(Debug, Clone, PartialEq)]
pub struct RampGeometry {
    pub points: Vec<Vec2>,
    pub thickness: f32,
    pub friction: f32,
    pub elasticity: f32,
}

impl RampGeometry {
    /// Consecutive point pairs, one per collision segment.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Build the compound collider: one thick segment (capsule) per pair.
    ///
    /// Segments are expressed in world coordinates on a body placed at the
    /// origin.  Rejects geometry the physics engine could not use.
    pub fn collider(&self) -> GameResult<Collider> {
        validate_points("ramp", &self.points)?;
        validate_positive("ramp_thickness", self.thickness)?;
        if self.segment_count() == 0 {
            return Err(GameError::DegenerateShape {
                shape: "ramp",
                reason: "a ramp needs at least one segment".to_string(),
            });
        }
        let parts = self
            .segments()
            .map(|(a, b)| (Vec2::ZERO, 0.0, Collider::capsule(a, b, self.thickness)))
            .collect();
        Ok(Collider::compound(parts))
    }
}

/// Stroke accumulator and ramp lifecycle.
///
/// | Field     | Meaning                                              |
/// |-----------|------------------------------------------------------|
/// | `drawing` | a stroke is in progress; points are being appended   |
/// | `ready`   | a ramp body exists in the world                      |
/// | `remaining` | seconds until the ready ramp expires               |
/// | `steps`   | fixed steps the ready ramp has existed               |
#[derive(Debug, Clone, Default)]
pub struct RampBuilder {
    points: Vec<Vec2>,
    drawing: bool,
    ready: bool,
    remaining: f32,
    lifetime: f32,
    steps: u32,
}

impl RampBuilder {
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Seconds left before the current ramp is removed (0 when none exists).
    pub fn remaining(&self) -> f32 {
        if self.ready {
            self.remaining
        } else {
            0.0
        }
    }

    /// Points of the stroke being drawn (for the live preview).
    pub fn stroke(&self) -> &[Vec2] {
        &self.points
    }

    /// Begin a new stroke at `at`.
    ///
    /// Returns `true` if a ramp was alive and has been discarded; the caller
    /// must remove its body from the world before anything else happens.
    pub fn start_stroke(&mut self, at: Vec2) -> bool {
        let discarded = self.discard();
        self.points.clear();
        self.points.push(at);
        self.drawing = true;
        discarded
    }

    /// Append a point to the active stroke.  No-op when not drawing.
    pub fn append_point(&mut self, at: Vec2) {
        if self.drawing {
            self.points.push(at);
        }
    }

    /// End the stroke.
    ///
    /// Fewer than two points is a degenerate stroke: no geometry, the ramp
    /// stays not-ready.  Otherwise the ramp becomes ready with a fresh
    /// lifetime and its geometry is returned for spawning.
    pub fn finish_stroke(&mut self, config: &GameConfig) -> Option<RampGeometry> {
        if !self.drawing {
            return None;
        }
        self.drawing = false;
        let points = std::mem::take(&mut self.points);
        if points.len() < 2 {
            self.ready = false;
            return None;
        }
        self.ready = true;
        self.remaining = config.ramp_lifetime;
        self.lifetime = config.ramp_lifetime;
        self.steps = 0;
        Some(RampGeometry {
            points,
            thickness: config.ramp_thickness,
            friction: config.ramp_friction,
            elasticity: config.ramp_elasticity,
        })
    }

    /// Drop an in-progress stroke without touching a ready ramp.
    pub fn cancel_stroke(&mut self) {
        self.drawing = false;
        self.points.clear();
    }

    /// Forget the ready ramp.  Returns `true` if there was one.
    pub fn discard(&mut self) -> bool {
        let had_ramp = self.ready;
        self.ready = false;
        self.remaining = 0.0;
        self.steps = 0;
        had_ramp
    }

    /// Forget everything: stroke and ramp.  Returns `true` if a ramp existed.
    pub fn clear(&mut self) -> bool {
        self.cancel_stroke();
        self.discard()
    }

    /// Advance the lifetime countdown by `dt`.
    ///
    /// Returns `true` on the tick the ramp expires; the caller removes its
    /// geometry from the world.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.ready {
            return false;
        }
        self.steps += 1;
        self.remaining = (self.lifetime - self.steps as f32 * dt).max(0.0);
        if steps_cover(self.steps, dt, self.lifetime) {
            self.discard();
            return true;
        }
        false
    }
}

/// Spawn the ramp body described by `geometry`.
///
/// Any previous ramp must already have been removed via [`despawn_ramps`].
pub fn spawn_ramp(commands: &mut Commands, geometry: &RampGeometry) -> GameResult<Entity> {
    let collider = geometry.collider()?;
    let entity = commands
        .spawn((
            Ramp {
                points: geometry.points.clone(),
                thickness: geometry.thickness,
            },
            RigidBody::Fixed,
            collider,
            Friction::coefficient(geometry.friction),
            Restitution::coefficient(geometry.elasticity),
            Transform::default(),
        ))
        .id();
    Ok(entity)
}

/// Remove every ramp body.  Safe to call when none exists.
pub fn despawn_ramps(commands: &mut Commands, ramps: &Query<Entity, With<Ramp>>) {
    for entity in ramps.iter() {
        commands.entity(entity).try_despawn();
    }
}
