//! Special-ability triggers for the current projectile.
//!
//! The trigger always targets the session's *current* projectile.  Every
//! refusal (no projectile, not in flight, already used, no ability) is a
//! logged no-op.

use crate::config::GameConfig;
use crate::input::PlayerInput;
use crate::launch::LaunchSession;
use crate::projectile::{spawn_split_child, AbilityKind, Projectile};
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

pub fn ability_trigger_system(
    mut commands: Commands,
    mut inputs: MessageReader<PlayerInput>,
    config: Res<GameConfig>,
    session: Res<LaunchSession>,
    mut projectiles: Query<(&mut Projectile, &mut Velocity, &Transform)>,
) {
    for input in inputs.read() {
        if *input != PlayerInput::TriggerAbility {
            continue;
        }
        let Some(current) = session.current() else {
            debug!("ability: no active projectile");
            continue;
        };
        let Ok((mut projectile, mut velocity, transform)) = projectiles.get_mut(current) else {
            debug!("ability: active projectile already removed");
            continue;
        };

        let Some(kind) = projectile.ability.map(|a| a.kind) else {
            debug!("ability: {:?} has none", projectile.variant);
            continue;
        };
        match kind {
            AbilityKind::Boost => match projectile.try_boost(velocity.linvel, config.boost_multiplier) {
                Some(boosted) => {
                    velocity.linvel = boosted;
                    info!("boost: speed now {:.0}", boosted.length());
                }
                None => debug!("boost refused (in flight: {})", projectile.in_flight),
            },
            AbilityKind::Split => {
                match projectile.try_split(velocity.linvel, config.split_spread_degrees) {
                    Some(children) => {
                        let at = transform.translation.truncate();
                        for child in children {
                            spawn_split_child(&mut commands, projectile.variant, at, child, &config);
                        }
                        commands.entity(current).try_despawn();
                        info!("split into {} at ({:.0}, {:.0})", children.len(), at.x, at.y);
                    }
                    None => debug!("split refused (in flight: {})", projectile.in_flight),
                }
            }
        }
    }
}
