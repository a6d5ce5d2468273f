//! Projectiles: variant tags, one-shot abilities, spawning and per-frame upkeep.
//!
//! A projectile carries a [`ProjectileVariant`] tag and, for the variants that
//! have one, an [`AbilityState`].  Ability logic switches on the tag; there is
//! no per-variant type.  Every ability is usable at most once per projectile.
//!
//! ## Lifecycle
//!
//! | Path       | Body kind on spawn | Ages? | Becomes live by            |
//! |------------|--------------------|-------|----------------------------|
//! | Slingshot  | Dynamic            | yes   | launch impulse             |
//! | Catapult   | Fixed (staged)     | no    | [`release_staged`] at drop |
//! | Split copy | Dynamic            | yes   | velocity set on spawn      |

use crate::config::GameConfig;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Variants & abilities ─────────────────────────────────────────────────────

/// Which kind of projectile the player has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ProjectileVariant {
    /// No special ability.
    #[default]
    Basic,
    /// Speed boost along the current heading.
    Boost,
    /// Three-way fan-out.
    Split,
}

impl ProjectileVariant {
    pub const ALL: [ProjectileVariant; 3] = [Self::Basic, Self::Boost, Self::Split];

    pub fn ability(self) -> Option<AbilityKind> {
        match self {
            Self::Basic => None,
            Self::Boost => Some(AbilityKind::Boost),
            Self::Split => Some(AbilityKind::Split),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Red",
            Self::Boost => "Yellow",
            Self::Split => "Blue",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Basic => Color::srgb(0.90, 0.20, 0.20),
            Self::Boost => Color::srgb(0.95, 0.85, 0.20),
            Self::Split => Color::srgb(0.30, 0.55, 0.95),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityKind {
    Boost,
    Split,
}

/// One-shot ability slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityState {
    pub kind: AbilityKind,
    pub used: bool,
}

// ── Component ────────────────────────────────────────────────────────────────

/// A launched, staged, or split projectile.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub variant: ProjectileVariant,
    /// Seconds since the projectile went live.
    pub age: f32,
    /// Removal deadline for `age`.
    pub life_time: f32,
    /// `speed > flight_speed_threshold`, recomputed every frame.
    pub in_flight: bool,
    /// Frozen on the catapult, waiting for the drop.
    pub staged: bool,
    pub ability: Option<AbilityState>,
}

impl Projectile {
    pub fn new(variant: ProjectileVariant, life_time: f32) -> Self {
        Self {
            variant,
            age: 0.0,
            life_time,
            in_flight: false,
            staged: false,
            ability: variant.ability().map(|kind| AbilityState { kind, used: false }),
        }
    }

    pub fn staged(variant: ProjectileVariant, life_time: f32) -> Self {
        Self {
            staged: true,
            ..Self::new(variant, life_time)
        }
    }

    /// A copy produced by a split: same variant, ability already spent.
    pub fn split_child(variant: ProjectileVariant, life_time: f32) -> Self {
        let mut child = Self::new(variant, life_time);
        if let Some(ability) = child.ability.as_mut() {
            ability.used = true;
        }
        child
    }

    pub fn ability_used(&self) -> bool {
        self.ability.is_some_and(|a| a.used)
    }

    fn take_ability(&mut self, kind: AbilityKind) -> bool {
        if !self.in_flight {
            return false;
        }
        match self.ability.as_mut() {
            Some(ability) if ability.kind == kind && !ability.used => {
                ability.used = true;
                true
            }
            _ => false,
        }
    }

    /// Boost: returns the new velocity (same heading, speed × `multiplier`).
    ///
    /// `None` when this is not a boost projectile, it is not in flight, the
    /// boost is spent, or the projectile is motionless.
    pub fn try_boost(&mut self, velocity: Vec2, multiplier: f32) -> Option<Vec2> {
        if velocity.length_squared() <= 0.0 {
            return None;
        }
        if !self.take_ability(AbilityKind::Boost) {
            return None;
        }
        Some(velocity.normalize() * velocity.length() * multiplier)
    }

    /// Split: returns the three child velocities at `angle + spread`, `angle`
    /// and `angle - spread`, each with the parent's speed.
    pub fn try_split(&mut self, velocity: Vec2, spread_degrees: f32) -> Option<[Vec2; 3]> {
        if velocity.length_squared() <= 0.0 {
            return None;
        }
        if !self.take_ability(AbilityKind::Split) {
            return None;
        }
        Some(split_velocities(velocity, spread_degrees))
    }
}

/// Velocities of the three copies produced by splitting at `velocity`.
pub fn split_velocities(velocity: Vec2, spread_degrees: f32) -> [Vec2; 3] {
    let speed = velocity.length();
    let angle = velocity.y.atan2(velocity.x);
    let spread = spread_degrees.to_radians();
    [angle + spread, angle, angle - spread].map(|a| Vec2::from_angle(a) * speed)
}

// ── Spawning ─────────────────────────────────────────────────────────────────

fn projectile_body(config: &GameConfig) -> impl Bundle {
    (
        Collider::ball(config.projectile_radius),
        ColliderMassProperties::Mass(config.projectile_mass),
        Restitution::coefficient(config.projectile_elasticity),
        Friction::coefficient(config.projectile_friction),
        Ccd::enabled(),
        ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS,
        ContactForceEventThreshold(config.impulse_ignore_threshold / config.physics_dt),
    )
}

/// Spawn a live projectile at `origin` and kick it with `impulse`.
///
/// A zero impulse is valid: the projectile just drops.
pub fn spawn_projectile(
    commands: &mut Commands,
    variant: ProjectileVariant,
    origin: Vec2,
    impulse: Vec2,
    config: &GameConfig,
) -> Entity {
    commands
        .spawn((
            Projectile::new(variant, config.projectile_lifetime),
            RigidBody::Dynamic,
            projectile_body(config),
            Velocity::zero(),
            ExternalImpulse {
                impulse,
                torque_impulse: 0.0,
            },
            Transform::from_translation(origin.extend(0.0)),
        ))
        .id()
}

/// Spawn a frozen projectile on the catapult.
pub fn spawn_staged_projectile(
    commands: &mut Commands,
    variant: ProjectileVariant,
    at: Vec2,
    config: &GameConfig,
) -> Entity {
    commands
        .spawn((
            Projectile::staged(variant, config.projectile_lifetime),
            RigidBody::Fixed,
            projectile_body(config),
            Velocity::zero(),
            Transform::from_translation(at.extend(0.0)),
        ))
        .id()
}

/// Spawn one split copy moving at `velocity`.
pub fn spawn_split_child(
    commands: &mut Commands,
    variant: ProjectileVariant,
    at: Vec2,
    velocity: Vec2,
    config: &GameConfig,
) -> Entity {
    commands
        .spawn((
            Projectile::split_child(variant, config.projectile_lifetime),
            RigidBody::Dynamic,
            projectile_body(config),
            Velocity {
                linvel: velocity,
                angvel: 0.0,
            },
            Transform::from_translation(at.extend(0.0)),
        ))
        .id()
}

/// Turn a staged projectile live at `at`: dynamic, motionless, ageing.
pub fn release_staged(
    commands: &mut Commands,
    entity: Entity,
    projectile: &mut Projectile,
    at: Vec2,
) {
    projectile.staged = false;
    projectile.age = 0.0;
    if let Ok(mut e) = commands.get_entity(entity) {
        e.insert((
            RigidBody::Dynamic,
            Velocity::zero(),
            Transform::from_translation(at.extend(0.0)),
        ));
    }
}

// ── Systems ──────────────────────────────────────────────────────────────────

/// Age live projectiles and remove any past their life-time, even mid-flight.
pub fn projectile_lifetime_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut query: Query<(Entity, &mut Projectile)>,
) {
    let dt = config.physics_dt;
    for (entity, mut projectile) in query.iter_mut() {
        if projectile.staged {
            continue;
        }
        projectile.age += dt;
        if projectile.age >= projectile.life_time {
            debug!("projectile {entity} expired after {:.2}s", projectile.age);
            commands.entity(entity).try_despawn();
        }
    }
}

/// Recompute the flight flag from the current speed.
pub fn flight_state_system(
    config: Res<GameConfig>,
    mut query: Query<(&mut Projectile, &Velocity)>,
) {
    for (mut projectile, velocity) in query.iter_mut() {
        let in_flight = !projectile.staged && velocity.linvel.length() > config.flight_speed_threshold;
        if projectile.in_flight != in_flight {
            projectile.in_flight = in_flight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flying(variant: ProjectileVariant) -> Projectile {
        let mut p = Projectile::new(variant, 5.0);
        p.in_flight = true;
        p
    }

    #[test]
    fn only_ability_variants_get_a_slot() {
        assert!(Projectile::new(ProjectileVariant::Basic, 5.0).ability.is_none());
        assert_eq!(
            Projectile::new(ProjectileVariant::Boost, 5.0).ability,
            Some(AbilityState {
                kind: AbilityKind::Boost,
                used: false
            })
        );
    }

    #[test]
    fn boost_keeps_heading_and_scales_speed_once() {
        let mut p = flying(ProjectileVariant::Boost);
        let v = Vec2::new(300.0, 400.0);
        let boosted = p.try_boost(v, 1.3).unwrap();
        assert!((boosted.length() - 650.0).abs() < 1e-3);
        assert!(boosted.normalize().dot(v.normalize()) > 0.9999);
        assert!(p.ability_used());

        assert!(p.try_boost(boosted, 1.3).is_none());
    }

    #[test]
    fn boost_requires_flight() {
        let mut p = Projectile::new(ProjectileVariant::Boost, 5.0);
        assert!(p.try_boost(Vec2::new(5.0, 0.0), 1.3).is_none());
        assert!(!p.ability_used());
    }

    #[test]
    fn wrong_variant_cannot_use_other_ability() {
        let mut basic = flying(ProjectileVariant::Basic);
        assert!(basic.try_boost(Vec2::X * 100.0, 1.3).is_none());
        assert!(basic.try_split(Vec2::X * 100.0, 30.0).is_none());

        let mut split = flying(ProjectileVariant::Split);
        assert!(split.try_boost(Vec2::X * 100.0, 1.3).is_none());
        assert!(!split.ability_used());
    }

    #[test]
    fn split_fans_out_at_equal_speed() {
        let mut p = flying(ProjectileVariant::Split);
        let v = Vec2::new(200.0, 0.0);
        let [up, mid, down] = p.try_split(v, 30.0).unwrap();
        for child in [up, mid, down] {
            assert!((child.length() - 200.0).abs() < 1e-3);
        }
        assert!((up.y.atan2(up.x) - 30f32.to_radians()).abs() < 1e-5);
        assert!(mid.y.abs() < 1e-3);
        assert!((down.y.atan2(down.x) + 30f32.to_radians()).abs() < 1e-5);
        assert!(p.try_split(v, 30.0).is_none());
    }

    #[test]
    fn split_children_cannot_split_again() {
        let mut child = Projectile::split_child(ProjectileVariant::Split, 5.0);
        child.in_flight = true;
        assert!(child.ability_used());
        assert!(child.try_split(Vec2::X * 100.0, 30.0).is_none());
    }

    #[test]
    fn staged_projectiles_do_not_age() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.add_systems(Update, projectile_lifetime_system);

        let staged = app
            .world_mut()
            .spawn(Projectile::staged(ProjectileVariant::Basic, 0.01))
            .id();
        let live = app
            .world_mut()
            .spawn(Projectile::new(ProjectileVariant::Basic, 0.01))
            .id();

        app.update();

        assert!(app.world().get_entity(staged).is_ok());
        assert!(app.world().get_entity(live).is_err());
    }

    #[test]
    fn flight_flag_tracks_speed_threshold() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.add_systems(Update, flight_state_system);

        let fast = app
            .world_mut()
            .spawn((
                Projectile::new(ProjectileVariant::Boost, 5.0),
                Velocity::linear(Vec2::new(0.0, 50.0)),
            ))
            .id();
        let slow = app
            .world_mut()
            .spawn((
                Projectile::new(ProjectileVariant::Boost, 5.0),
                Velocity::linear(Vec2::new(3.0, 4.0)),
            ))
            .id();

        app.update();

        assert!(app.world().get::<Projectile>(fast).unwrap().in_flight);
        assert!(!app.world().get::<Projectile>(slow).unwrap().in_flight);
    }
}
