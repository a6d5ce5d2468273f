//! Plugin wiring: resources, messages, and the per-frame gameplay order.
//!
//! [`GamePlugin`] holds everything that does not need a window or a physics
//! backend, so headless tests can run it on `MinimalPlugins` and inject
//! contact events by hand.  [`SlingshotPhysicsPlugin`] adds Rapier on top.
//!
//! Gameplay systems run chained in `Update`; Rapier steps in `PostUpdate`, so
//! contact events written by step *N* are consumed by the gameplay pass of
//! frame *N + 1*.

use crate::ability::ability_trigger_system;
use crate::collision::{
    contact_destruction_system, impact_destruction_system, proximity_destruction_system,
    score_popup_system, DestructionLog, Score, TargetDestroyed,
};
use crate::config::{load_game_config, GameConfig};
use crate::input::PlayerInput;
use crate::launch::{launch_input_system, turn_tick_system, LaunchSession, TurnReady};
use crate::level::{
    level_command_system, level_load_system, load_level_catalog, request_first_level,
    target_soft_wall_system, LevelCatalog, LoadLevel,
};
use crate::progress::{win_detection_system, LevelWon, Progress};
use crate::projectile::{flight_state_system, projectile_lifetime_system};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Every gameplay system, in the order listed in [`GamePlugin`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameplaySet;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<LevelCatalog>()
            .init_resource::<LaunchSession>()
            .init_resource::<Progress>()
            .init_resource::<Score>()
            .init_resource::<DestructionLog>()
            .add_message::<PlayerInput>()
            .add_message::<LoadLevel>()
            .add_message::<TurnReady>()
            .add_message::<TargetDestroyed>()
            .add_message::<LevelWon>()
            // Registered by Rapier too; repeated registration is a no-op.
            .add_message::<CollisionEvent>()
            .add_message::<ContactForceEvent>()
            .add_systems(
                Startup,
                (load_game_config, load_level_catalog, request_first_level).chain(),
            )
            .add_systems(
                Update,
                (
                    (level_command_system, level_load_system).chain(),
                    flight_state_system,
                    (launch_input_system, ability_trigger_system).chain(),
                    turn_tick_system,
                    (
                        contact_destruction_system,
                        impact_destruction_system,
                        proximity_destruction_system,
                    )
                        .chain(),
                    projectile_lifetime_system,
                    win_detection_system,
                    (target_soft_wall_system, score_popup_system),
                )
                    .chain()
                    .in_set(GameplaySet),
            );
    }
}

/// Rapier at one world unit per metre, stepping exactly `physics_dt` per frame.
pub struct SlingshotPhysicsPlugin;

impl Plugin for SlingshotPhysicsPlugin {
    fn build(&self, app: &mut App) {
        let dt = app
            .world()
            .get_resource::<GameConfig>()
            .map_or_else(|| GameConfig::default().physics_dt, |c| c.physics_dt);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
            .insert_resource(TimestepMode::Fixed { dt, substeps: 1 })
            .add_systems(Startup, setup_gravity.after(load_game_config));
    }
}

/// Point gravity down the screen and re-apply the step once `game.toml` is in.
fn setup_gravity(
    config: Res<GameConfig>,
    mut timestep: ResMut<TimestepMode>,
    mut rapier: Query<&mut RapierConfiguration>,
) {
    *timestep = TimestepMode::Fixed {
        dt: config.physics_dt,
        substeps: 1,
    };
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -config.gravity);
    }
}
