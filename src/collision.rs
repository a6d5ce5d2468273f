//! Collision policy: turning physics contacts into destruction and score.
//!
//! Three independent paths can observe a target being destroyed:
//!
//! | Path        | Source                     | Destroys                    |
//! |-------------|----------------------------|-----------------------------|
//! | Contact     | `CollisionEvent::Started`  | the target hit by a projectile |
//! | Impact      | `ContactForceEvent`        | every target/obstacle in a contact above the destroy threshold |
//! | Proximity   | per-step distance scan     | targets a projectile centre is practically on top of |
//!
//! All of them go through [`DestructionLog::claim`], so whichever path sees a
//! body first removes it and the rest skip it, in the same step and later.

use crate::config::GameConfig;
use crate::constants::SCORE_POPUP_RISE_SPEED;
use crate::level::{Obstacle, Target};
use crate::particles::spawn_debris_particles;
use crate::projectile::Projectile;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

// ── Resources & messages ─────────────────────────────────────────────────────

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    pub points: u32,
    pub targets_destroyed: u32,
}

/// Every body removed by the collision policy during the current attempt.
#[derive(Resource, Debug, Clone, Default)]
pub struct DestructionLog {
    removed: HashSet<Entity>,
}

impl DestructionLog {
    /// Mark `entity` as removed.  `false` if it already was.
    pub fn claim(&mut self, entity: Entity) -> bool {
        self.removed.insert(entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.removed.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    pub fn clear(&mut self) {
        self.removed.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructionCause {
    Contact,
    Impact,
    Proximity,
}

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct TargetDestroyed {
    pub target: Entity,
    pub position: Vec2,
    pub award: u32,
    pub cause: DestructionCause,
}

/// Floating "+100" shown where a target was destroyed.  Cosmetic only.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ScorePopup {
    pub value: u32,
    pub remaining: f32,
}

// ── Impact classification ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactClass {
    /// Below the ignore threshold.
    Ignored,
    /// Between the thresholds: logged, nothing removed.
    Absorbed,
    /// Above the destroy threshold.
    Destructive,
}

pub fn classify_impact(impulse: f32, config: &GameConfig) -> ImpactClass {
    if impulse < config.impulse_ignore_threshold {
        ImpactClass::Ignored
    } else if impulse > config.impulse_destroy_threshold {
        ImpactClass::Destructive
    } else {
        ImpactClass::Absorbed
    }
}

/// Impulse delivered by a contact over one physics step.
pub fn contact_impulse(event: &ContactForceEvent, dt: f32) -> f32 {
    event.total_force_magnitude * dt
}

// ── Destruction helpers ──────────────────────────────────────────────────────

fn destroy_target(
    commands: &mut Commands,
    target: Entity,
    position: Vec2,
    cause: DestructionCause,
    config: &GameConfig,
    score: &mut Score,
    destroyed: &mut MessageWriter<TargetDestroyed>,
) {
    commands.entity(target).try_despawn();
    score.points += config.target_score_award;
    score.targets_destroyed += 1;
    commands.spawn((
        ScorePopup {
            value: config.target_score_award,
            remaining: config.score_popup_lifetime,
        },
        Transform::from_translation(position.extend(1.0)),
    ));
    spawn_debris_particles(commands, position, Color::srgb(0.45, 0.80, 0.30));
    destroyed.write(TargetDestroyed {
        target,
        position,
        award: config.target_score_award,
        cause,
    });
    info!(
        "target {target} destroyed ({cause:?}) at ({:.0}, {:.0}); score {}",
        position.x, position.y, score.points
    );
}

fn destroy_obstacle(commands: &mut Commands, obstacle: Entity, position: Vec2) {
    commands.entity(obstacle).try_despawn();
    spawn_debris_particles(commands, position, Color::srgb(0.60, 0.45, 0.30));
    info!("obstacle {obstacle} shattered at ({:.0}, {:.0})", position.x, position.y);
}

fn live_projectile(q: &Query<&Projectile>, entity: Entity) -> bool {
    q.get(entity).is_ok_and(|p| !p.staged)
}

// ── Systems ──────────────────────────────────────────────────────────────────

/// Projectile touches target: remove the target and score it.
#[allow(clippy::too_many_arguments)]
pub fn contact_destruction_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    config: Res<GameConfig>,
    mut log: ResMut<DestructionLog>,
    mut score: ResMut<Score>,
    q_projectile: Query<&Projectile>,
    q_target: Query<&Transform, With<Target>>,
    mut destroyed: MessageWriter<TargetDestroyed>,
) {
    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let target = if live_projectile(&q_projectile, e1) && q_target.contains(e2) {
            e2
        } else if live_projectile(&q_projectile, e2) && q_target.contains(e1) {
            e1
        } else {
            continue;
        };

        if !log.claim(target) {
            continue;
        }
        let Ok(transform) = q_target.get(target) else {
            continue;
        };
        destroy_target(
            &mut commands,
            target,
            transform.translation.truncate(),
            DestructionCause::Contact,
            &config,
            &mut score,
            &mut destroyed,
        );
    }
}

/// Any sufficiently violent contact shatters the targets and obstacles in it.
#[allow(clippy::too_many_arguments)]
pub fn impact_destruction_system(
    mut commands: Commands,
    mut force_events: MessageReader<ContactForceEvent>,
    config: Res<GameConfig>,
    mut log: ResMut<DestructionLog>,
    mut score: ResMut<Score>,
    q_target: Query<&Transform, With<Target>>,
    q_obstacle: Query<&Transform, With<Obstacle>>,
    mut destroyed: MessageWriter<TargetDestroyed>,
) {
    for event in force_events.read() {
        let impulse = contact_impulse(event, config.physics_dt);
        match classify_impact(impulse, &config) {
            ImpactClass::Ignored => continue,
            ImpactClass::Absorbed => {
                debug!("contact impulse {impulse:.0} absorbed");
                continue;
            }
            ImpactClass::Destructive => {
                debug!("contact impulse {impulse:.0} is destructive");
            }
        }

        for entity in [event.collider1, event.collider2] {
            if let Ok(transform) = q_target.get(entity) {
                if log.claim(entity) {
                    destroy_target(
                        &mut commands,
                        entity,
                        transform.translation.truncate(),
                        DestructionCause::Impact,
                        &config,
                        &mut score,
                        &mut destroyed,
                    );
                }
            } else if let Ok(transform) = q_obstacle.get(entity) {
                if log.claim(entity) {
                    destroy_obstacle(&mut commands, entity, transform.translation.truncate());
                }
            }
        }
    }
}

/// Fallback for tunnelled or missed contacts: a projectile centre within
/// `proximity_epsilon` of a target centre counts as a hit.
#[allow(clippy::too_many_arguments)]
pub fn proximity_destruction_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut log: ResMut<DestructionLog>,
    mut score: ResMut<Score>,
    q_projectile: Query<(&Transform, &Projectile)>,
    q_target: Query<(Entity, &Transform), With<Target>>,
    mut destroyed: MessageWriter<TargetDestroyed>,
) {
    let eps_sq = config.proximity_epsilon * config.proximity_epsilon;
    for (target, target_tf) in q_target.iter() {
        if log.contains(target) {
            continue;
        }
        let target_pos = target_tf.translation.truncate();
        let hit = q_projectile.iter().any(|(tf, projectile)| {
            !projectile.staged && tf.translation.truncate().distance_squared(target_pos) < eps_sq
        });
        if hit && log.claim(target) {
            destroy_target(
                &mut commands,
                target,
                target_pos,
                DestructionCause::Proximity,
                &config,
                &mut score,
                &mut destroyed,
            );
        }
    }
}

/// Rise, count down, and remove score popups.
pub fn score_popup_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut popups: Query<(Entity, &mut ScorePopup, &mut Transform)>,
) {
    let dt = config.physics_dt;
    for (entity, mut popup, mut transform) in popups.iter_mut() {
        popup.remaining -= dt;
        transform.translation.y += SCORE_POPUP_RISE_SPEED * dt;
        if popup.remaining <= 0.0 {
            commands.entity(entity).try_despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_thresholds_partition_impulses() {
        let config = GameConfig::default();
        assert_eq!(classify_impact(0.0, &config), ImpactClass::Ignored);
        assert_eq!(classify_impact(99.9, &config), ImpactClass::Ignored);
        assert_eq!(classify_impact(100.0, &config), ImpactClass::Absorbed);
        assert_eq!(classify_impact(1200.0, &config), ImpactClass::Absorbed);
        assert_eq!(classify_impact(1200.5, &config), ImpactClass::Destructive);
    }

    #[test]
    fn log_claims_each_entity_once() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut log = DestructionLog::default();
        assert!(log.claim(a));
        assert!(!log.claim(a));
        assert!(log.claim(b));
        assert_eq!(log.len(), 2);
        log.clear();
        assert!(log.is_empty());
        assert!(log.claim(a));
    }
}
