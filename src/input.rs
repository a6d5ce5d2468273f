//! Player input abstraction.
//!
//! Hardware is translated into [`PlayerInput`] messages; game logic only ever
//! reads those.  Tests write `PlayerInput` directly and never touch a window.
//!
//! | Input              | Message                          |
//! |--------------------|----------------------------------|
//! | LMB press          | `PointerDown(world)`             |
//! | LMB held + move    | `PointerDrag(world)`             |
//! | LMB release        | `PointerUp(world)`               |
//! | `1` / `2` / `3`    | `SelectVariant(Basic/Boost/Split)` |
//! | `C`                | `ToggleMode`                     |
//! | `Space`            | `TriggerAbility`                 |
//! | `R`                | `RestartLevel`                   |
//! | `Enter`            | `NextLevel`                      |

use crate::game::GameplaySet;
use crate::projectile::ProjectileVariant;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum PlayerInput {
    PointerDown(Vec2),
    PointerDrag(Vec2),
    PointerUp(Vec2),
    SelectVariant(ProjectileVariant),
    ToggleMode,
    TriggerAbility,
    RestartLevel,
    NextLevel,
}

/// Camera whose viewport maps the cursor into world space.
#[derive(Component)]
pub struct MainCamera;

/// Hardware → [`PlayerInput`] mapping.  Not needed in headless runs.
pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (keyboard_input_system, pointer_input_system).before(GameplaySet),
        );
    }
}

pub fn keyboard_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut out: MessageWriter<PlayerInput>,
) {
    let bindings = [
        (KeyCode::Digit1, PlayerInput::SelectVariant(ProjectileVariant::Basic)),
        (KeyCode::Digit2, PlayerInput::SelectVariant(ProjectileVariant::Boost)),
        (KeyCode::Digit3, PlayerInput::SelectVariant(ProjectileVariant::Split)),
        (KeyCode::KeyC, PlayerInput::ToggleMode),
        (KeyCode::Space, PlayerInput::TriggerAbility),
        (KeyCode::KeyR, PlayerInput::RestartLevel),
        (KeyCode::Enter, PlayerInput::NextLevel),
    ];
    for (key, input) in bindings {
        if keys.just_pressed(key) {
            out.write(input);
        }
    }
}

/// Emit pointer messages in world coordinates.
///
/// Drags are only reported when the cursor actually moved since the last one.
pub fn pointer_input_system(
    buttons: Res<ButtonInput<MouseButton>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut last: Local<Option<Vec2>>,
    mut out: MessageWriter<PlayerInput>,
) {
    let Ok(window) = q_window.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_tf)) = q_camera.single() else {
        return;
    };
    let world = match camera.viewport_to_world_2d(camera_tf, cursor) {
        Ok(p) => p,
        Err(e) => {
            debug!("viewport_to_world_2d failed: {e:?}");
            return;
        }
    };

    if buttons.just_pressed(MouseButton::Left) {
        out.write(PlayerInput::PointerDown(world));
        *last = Some(world);
    } else if buttons.just_released(MouseButton::Left) {
        out.write(PlayerInput::PointerUp(world));
        *last = None;
    } else if buttons.pressed(MouseButton::Left) && *last != Some(world) {
        out.write(PlayerInput::PointerDrag(world));
        *last = Some(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Seen(Vec<PlayerInput>);

    fn record(mut inputs: MessageReader<PlayerInput>, mut seen: ResMut<Seen>) {
        seen.0.extend(inputs.read().copied());
    }

    #[test]
    fn number_keys_select_variants() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<PlayerInput>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.init_resource::<Seen>();
        app.add_systems(Update, (keyboard_input_system, record).chain());

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Digit3);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyC);
        app.update();

        let seen = &app.world().resource::<Seen>().0;
        assert_eq!(
            seen,
            &vec![
                PlayerInput::SelectVariant(ProjectileVariant::Split),
                PlayerInput::ToggleMode
            ]
        );
    }
}
