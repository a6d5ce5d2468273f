//! Rendering: camera, HUD text, and gizmo drawing of the playfield.
//!
//! ## System Responsibilities
//!
//! | System                     | Schedule | Purpose                                   |
//! |----------------------------|----------|-------------------------------------------|
//! | `setup_camera`             | Startup  | 2-D camera centred on the playfield        |
//! | `setup_hud`                | Startup  | Status line (top-left) and key help        |
//! | `hud_display_system`       | Update   | Refresh the status line when state changes |
//! | `attach_popup_text_system` | Update   | Give new score popups their `Text2d`       |
//! | `gizmo_rendering_system`   | Update   | Bodies, ramp, live stroke, aim line        |
//!
//! Nothing here feeds back into gameplay, and the whole plugin is skipped in
//! headless runs.

use crate::catapult::{CatapultBase, CatapultStage};
use crate::collision::{Score, ScorePopup};
use crate::config::GameConfig;
use crate::input::MainCamera;
use crate::launch::{LaunchMode, LaunchSession, TurnPhase};
use crate::level::{Floor, LevelCatalog, Obstacle, Target};
use crate::progress::Progress;
use crate::projectile::Projectile;
use crate::ramp::Ramp;
use bevy::prelude::*;

#[derive(Component)]
pub struct HudDisplay;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.55, 0.78, 0.95)))
            .add_systems(Startup, (setup_camera, setup_hud))
            .add_systems(
                Update,
                (
                    hud_display_system,
                    attach_popup_text_system,
                    gizmo_rendering_system,
                ),
            );
    }
}

// ── Startup ──────────────────────────────────────────────────────────────────

pub fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        Camera2d,
        MainCamera,
        Transform::from_xyz(config.world_width / 2.0, config.world_height / 2.0, 0.0),
    ));
}

/// Spawn the status line and the key-binding help under it.
pub fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            HudDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.1, 0.1, 0.15)),
            ));
        });

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            bottom: Val::Px(10.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(
                    "Drag: aim / draw ramp   1-3: projectile   C: mode   \
                     Space: ability   R: restart   Enter: next level",
                ),
                TextFont {
                    font_size: config.hud_font_size * 0.7,
                    ..default()
                },
                TextColor(Color::srgba(0.1, 0.1, 0.15, 0.8)),
            ));
        });
}

// ── HUD ──────────────────────────────────────────────────────────────────────

/// One-line summary of the attempt.
pub fn hud_text(
    score: &Score,
    session: &LaunchSession,
    progress: &Progress,
    level_count: usize,
) -> String {
    let mut line = format!(
        "Level {}/{}   Score: {}   Shots: {}   Mode: {}   Projectile: {}",
        progress.level + 1,
        level_count,
        score.points,
        progress.projectiles_used,
        session.mode().label(),
        session.variant().label(),
    );
    if session.mode() == LaunchMode::Catapult {
        let stage = match session.catapult_stage() {
            CatapultStage::Empty => "click to load",
            CatapultStage::Loaded => "draw a ramp",
            CatapultStage::DrawingRamp => "drawing",
            CatapultStage::RampReady => "click to drop",
        };
        line.push_str(&format!("   Catapult: {stage}"));
    }
    match session.phase() {
        TurnPhase::Idle => {}
        TurnPhase::InFlight => line.push_str("   (in flight)"),
        TurnPhase::Settling => line.push_str("   (settling)"),
    }
    if let Some(stars) = progress.stars {
        let filled = "*".repeat(stars as usize);
        let empty = "-".repeat(3 - stars.min(3) as usize);
        line.push_str(&format!("\nLevel cleared! [{filled}{empty}]  Enter: next   R: retry"));
    } else if !progress.loaded {
        line.push_str("\nLevel failed to load");
    }
    line
}

pub fn hud_display_system(
    score: Res<Score>,
    session: Res<LaunchSession>,
    progress: Res<Progress>,
    catalog: Res<LevelCatalog>,
    parent_query: Query<&Children, With<HudDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    if !(score.is_changed() || session.is_changed() || progress.is_changed()) {
        return;
    }
    let line = hud_text(&score, &session, &progress, catalog.len());
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(line.clone());
            }
        }
    }
}

pub fn attach_popup_text_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    popups: Query<(Entity, &ScorePopup), Added<ScorePopup>>,
) {
    for (entity, popup) in popups.iter() {
        commands.entity(entity).insert((
            Text2d::new(format!("+{}", popup.value)),
            TextFont {
                font_size: config.hud_font_size,
                ..default()
            },
            TextColor(Color::srgb(1.0, 0.85, 0.1)),
        ));
    }
}

// ── Gizmos ───────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn gizmo_rendering_system(
    mut gizmos: Gizmos,
    config: Res<GameConfig>,
    session: Res<LaunchSession>,
    floors: Query<&Floor>,
    bases: Query<&CatapultBase>,
    targets: Query<&Transform, With<Target>>,
    obstacles: Query<&Transform, With<Obstacle>>,
    projectiles: Query<(&Transform, &Projectile)>,
    ramps: Query<&Ramp>,
) {
    for floor in floors.iter() {
        gizmos.line_2d(
            Vec2::new(0.0, floor.y),
            Vec2::new(floor.width, floor.y),
            Color::srgb(0.25, 0.45, 0.2),
        );
    }

    for base in bases.iter() {
        let [a, b, c] = base.vertices;
        let color = Color::srgb(0.45, 0.3, 0.15);
        gizmos.line_2d(a, b, color);
        gizmos.line_2d(b, c, color);
        gizmos.line_2d(c, a, color);
    }

    for transform in targets.iter() {
        gizmos.circle_2d(
            transform.translation.truncate(),
            config.target_radius,
            Color::srgb(0.3, 0.75, 0.25),
        );
    }

    let half = Vec2::new(config.obstacle_half_width, config.obstacle_half_height);
    for transform in obstacles.iter() {
        gizmos.rect_2d(
            Isometry2d::new(
                transform.translation.truncate(),
                Rot2::radians(transform.rotation.to_euler(EulerRot::ZYX).0),
            ),
            half * 2.0,
            Color::srgb(0.6, 0.45, 0.3),
        );
    }

    for (transform, projectile) in projectiles.iter() {
        let pos = transform.translation.truncate();
        let color = projectile.variant.color();
        gizmos.circle_2d(pos, config.projectile_radius, color);
        if projectile.ability.is_some_and(|a| !a.used) && projectile.in_flight {
            gizmos.circle_2d(pos, config.projectile_radius + 4.0, color.with_alpha(0.4));
        }
    }

    let ramp_color = Color::srgb(0.35, 0.25, 0.2);
    for ramp in ramps.iter() {
        for pair in ramp.points.windows(2) {
            gizmos.line_2d(pair[0], pair[1], ramp_color);
        }
        for p in &ramp.points {
            gizmos.circle_2d(*p, ramp.thickness, ramp_color.with_alpha(0.25));
        }
    }

    let stroke = session.catapult().ramp().stroke();
    for pair in stroke.windows(2) {
        gizmos.line_2d(pair[0], pair[1], Color::srgba(0.35, 0.25, 0.2, 0.6));
    }

    if let Some(aim) = session.aim() {
        gizmos.line_2d(aim.start, aim.end, Color::srgb(0.9, 0.2, 0.2));
        gizmos.circle_2d(aim.start, 4.0, Color::srgb(0.9, 0.2, 0.2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hud_reports_mode_and_win() {
        let mut session = LaunchSession::default();
        let mut progress = Progress {
            loaded: true,
            par: 1,
            ..Default::default()
        };
        let score = Score::default();

        let line = hud_text(&score, &session, &progress, 5);
        assert!(line.starts_with("Level 1/5"));
        assert!(line.contains("Mode: Slingshot"));
        assert!(!line.contains("Catapult:"));

        session.toggle_mode();
        progress.stars = Some(2);
        let line = hud_text(&score, &session, &progress, 5);
        assert!(line.contains("Catapult: click to load"));
        assert!(line.contains("[**-]"));
    }
}
