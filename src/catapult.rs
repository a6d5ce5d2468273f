//! Catapult sub-flow: stage a frozen projectile, draw a ramp, drop from height.
//!
//! [`CatapultFlow`] holds the staged projectile and the [`RampBuilder`]; its
//! visible [`CatapultStage`] is derived from those two rather than stored, so
//! the stage can never disagree with what actually exists.

use crate::config::GameConfig;
use crate::launch::LaunchRequest;
use crate::ramp::RampBuilder;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatapultStage {
    /// Nothing staged; a click stages a projectile.
    Empty,
    /// Projectile staged, no ramp; a press starts a stroke.
    Loaded,
    /// Stroke in progress.
    DrawingRamp,
    /// Projectile staged and ramp alive; a click drops.
    RampReady,
}

#[derive(Debug, Clone, Default)]
pub struct CatapultFlow {
    staged: Option<Entity>,
    ramp: RampBuilder,
}

impl CatapultFlow {
    pub fn stage(&self) -> CatapultStage {
        match self.staged {
            None => CatapultStage::Empty,
            Some(_) if self.ramp.is_drawing() => CatapultStage::DrawingRamp,
            Some(_) if self.ramp.is_ready() => CatapultStage::RampReady,
            Some(_) => CatapultStage::Loaded,
        }
    }

    pub fn staged(&self) -> Option<Entity> {
        self.staged
    }

    pub fn ramp(&self) -> &RampBuilder {
        &self.ramp
    }

    /// Record the projectile that was just spawned frozen on the catapult.
    pub fn load(&mut self, projectile: Entity) {
        self.staged = Some(projectile);
    }

    /// Hand the staged projectile over for the drop.
    pub fn take_staged(&mut self) -> Option<Entity> {
        self.staged.take()
    }

    pub fn begin_ramp(&mut self, at: Vec2) -> Vec<LaunchRequest> {
        if self.ramp.start_stroke(at) {
            vec![LaunchRequest::ClearRamp]
        } else {
            Vec::new()
        }
    }

    pub fn extend_ramp(&mut self, at: Vec2) {
        self.ramp.append_point(at);
    }

    /// Close the stroke at `at`; a stroke of fewer than two points builds nothing.
    pub fn finish_ramp(&mut self, at: Vec2, config: &GameConfig) -> Vec<LaunchRequest> {
        if !self.ramp.is_drawing() {
            return Vec::new();
        }
        self.ramp.append_point(at);
        match self.ramp.finish_stroke(config) {
            Some(geometry) => vec![LaunchRequest::BuildRamp(geometry)],
            None => {
                debug!("ramp stroke too short, nothing built");
                Vec::new()
            }
        }
    }

    /// The ramp body could not be created; forget it.
    pub fn ramp_rejected(&mut self) {
        self.ramp.discard();
    }

    pub fn tick(&mut self, dt: f32) -> Vec<LaunchRequest> {
        if self.ramp.tick(dt) {
            info!("ramp expired");
            vec![LaunchRequest::ClearRamp]
        } else {
            Vec::new()
        }
    }

    /// Drop every piece of partial catapult state: stroke, staged projectile, ramp.
    pub fn discard(&mut self) -> Vec<LaunchRequest> {
        let mut requests = Vec::new();
        if let Some(projectile) = self.staged.take() {
            requests.push(LaunchRequest::Discard(projectile));
        }
        if self.ramp.clear() {
            requests.push(LaunchRequest::ClearRamp);
        }
        requests
    }
}

/// Marker for the static triangular catapult base.
#[derive(Component, Debug, Clone)]
pub struct CatapultBase {
    pub vertices: [Vec2; 3],
}

/// Triangle vertices of the catapult base anchored at `anchor`.
pub fn catapult_base_vertices(anchor: Vec2) -> [Vec2; 3] {
    [
        anchor + Vec2::new(20.0, 0.0),
        anchor + Vec2::new(120.0, 0.0),
        anchor + Vec2::new(70.0, 40.0),
    ]
}

pub fn spawn_catapult_base(commands: &mut Commands, anchor: Vec2) -> Entity {
    let [a, b, c] = catapult_base_vertices(anchor);
    commands
        .spawn((
            CatapultBase {
                vertices: [a, b, c],
            },
            RigidBody::Fixed,
            Collider::triangle(a, b, c),
            Friction::coefficient(1.0),
            Restitution::coefficient(0.0),
            Transform::default(),
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> CatapultFlow {
        let mut flow = CatapultFlow::default();
        flow.load(Entity::PLACEHOLDER);
        flow
    }

    #[test]
    fn stage_follows_staged_projectile_and_ramp() {
        let config = GameConfig::default();
        let mut flow = CatapultFlow::default();
        assert_eq!(flow.stage(), CatapultStage::Empty);

        flow = loaded();
        assert_eq!(flow.stage(), CatapultStage::Loaded);

        assert!(flow.begin_ramp(Vec2::new(50.0, 50.0)).is_empty());
        assert_eq!(flow.stage(), CatapultStage::DrawingRamp);

        let requests = flow.finish_ramp(Vec2::new(300.0, 150.0), &config);
        assert!(matches!(requests.as_slice(), [LaunchRequest::BuildRamp(g)] if g.segment_count() == 1));
        assert_eq!(flow.stage(), CatapultStage::RampReady);
    }

    #[test]
    fn press_and_release_in_place_still_builds_a_ramp() {
        let config = GameConfig::default();
        let mut flow = loaded();
        let p = Vec2::new(80.0, 80.0);
        flow.begin_ramp(p);
        let requests = flow.finish_ramp(p, &config);
        assert_eq!(requests.len(), 1);
        assert_eq!(flow.stage(), CatapultStage::RampReady);
    }

    #[test]
    fn release_without_a_stroke_builds_nothing() {
        let config = GameConfig::default();
        let mut flow = loaded();
        assert!(flow.finish_ramp(Vec2::new(10.0, 10.0), &config).is_empty());
        assert_eq!(flow.stage(), CatapultStage::Loaded);
    }

    #[test]
    fn ramp_expiry_returns_to_loaded() {
        let config = GameConfig::default();
        let mut flow = loaded();
        flow.begin_ramp(Vec2::ZERO);
        flow.finish_ramp(Vec2::new(100.0, 20.0), &config);
        assert_eq!(flow.stage(), CatapultStage::RampReady);

        let requests = flow.tick(config.ramp_lifetime + 0.5);
        assert!(matches!(requests.as_slice(), [LaunchRequest::ClearRamp]));
        assert_eq!(flow.stage(), CatapultStage::Loaded);
    }

    #[test]
    fn discard_releases_everything() {
        let config = GameConfig::default();
        let mut flow = loaded();
        flow.begin_ramp(Vec2::ZERO);
        flow.finish_ramp(Vec2::new(100.0, 20.0), &config);

        let requests = flow.discard();
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], LaunchRequest::Discard(_)));
        assert!(matches!(requests[1], LaunchRequest::ClearRamp));
        assert_eq!(flow.stage(), CatapultStage::Empty);
        assert!(flow.discard().is_empty());
    }

    #[test]
    fn base_triangle_matches_anchor() {
        let [a, b, c] = catapult_base_vertices(Vec2::new(200.0, 100.0));
        assert_eq!(a, Vec2::new(220.0, 100.0));
        assert_eq!(b, Vec2::new(320.0, 100.0));
        assert_eq!(c, Vec2::new(270.0, 140.0));
    }
}
