//! Levels: target/obstacle layouts, the playfield, and (re)loading attempts.
//!
//! A level is pure data ([`LevelData`]).  [`LevelCatalog`] holds the built-in
//! levels, optionally replaced from `assets/levels.toml`.  Loading a level
//! clears every per-attempt entity and resource, then rebuilds the playfield.

use crate::catapult::spawn_catapult_base;
use crate::collision::{DestructionLog, Score, ScorePopup};
use crate::config::GameConfig;
use crate::constants::{CATAPULT_BASE_X, CATAPULT_BASE_Y, WORLD_WIDTH};
use crate::error::{validate_points, GameError, GameResult};
use crate::input::PlayerInput;
use crate::launch::LaunchSession;
use crate::particles::Particle;
use crate::progress::Progress;
use crate::projectile::Projectile;
use crate::ramp::Ramp;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use serde::Deserialize;

/// Optional level override file.
pub const LEVELS_PATH: &str = "assets/levels.toml";

// ── Level data ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelData {
    pub targets: Vec<[f32; 2]>,
    #[serde(default)]
    pub obstacles: Vec<[f32; 2]>,
    #[serde(default)]
    pub description: String,
}

impl LevelData {
    /// Par for the star rating: one projectile per target.
    pub fn par(&self) -> u32 {
        self.targets.len() as u32
    }

    pub fn validate(&self, index: usize) -> GameResult<()> {
        if self.targets.is_empty() {
            return Err(GameError::EmptyLevel { index });
        }
        let targets: Vec<Vec2> = self.targets.iter().map(|p| Vec2::from(*p)).collect();
        validate_points("target", &targets)?;
        let obstacles: Vec<Vec2> = self.obstacles.iter().map(|p| Vec2::from(*p)).collect();
        validate_points("obstacle", &obstacles)?;
        Ok(())
    }
}

/// `n` targets 200 apart starting at `start_x`, each flanked by two columns.
pub fn basic_level(n: usize, start_x: f32) -> LevelData {
    let mut targets = Vec::with_capacity(n);
    let mut obstacles = Vec::with_capacity(n * 2);
    for i in 0..n {
        let x = start_x + 200.0 * i as f32;
        targets.push([x, 100.0]);
        obstacles.push([x - 50.0, 50.0]);
        obstacles.push([x + 50.0, 50.0]);
    }
    LevelData {
        targets,
        obstacles,
        description: format!("{n} target(s) between columns"),
    }
}

/// Targets walled in by two stacked column towers each.
pub fn tower_level(positions: &[[f32; 2]]) -> LevelData {
    let mut obstacles = Vec::with_capacity(positions.len() * 8);
    for [x, _] in positions {
        for height in [50.0, 130.0, 210.0, 290.0] {
            obstacles.push([x - 30.0, height]);
            obstacles.push([x + 30.0, height]);
        }
    }
    LevelData {
        targets: positions.to_vec(),
        obstacles,
        description: "Targets behind defensive towers".to_string(),
    }
}

#[derive(Deserialize)]
struct LevelFile {
    levels: Vec<LevelData>,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LevelCatalog {
    pub levels: Vec<LevelData>,
}

impl Default for LevelCatalog {
    /// Five levels with 1–5 targets spaced 200 apart from mid-field, standing
    /// on a row of columns.
    fn default() -> Self {
        let mid = WORLD_WIDTH / 2.0;
        let levels = (1..=5)
            .map(|n| LevelData {
                targets: (0..n).map(|i| [mid + 200.0 * i as f32, 100.0]).collect(),
                obstacles: if n == 1 {
                    vec![[mid, 50.0], [mid + 400.0, 50.0]]
                } else {
                    (0..=n).map(|i| [mid + 200.0 * i as f32, 50.0]).collect()
                },
                description: format!("Level {n}"),
            })
            .collect();
        Self { levels }
    }
}

impl LevelCatalog {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The level at `index`, or the last one when `index` is past the end.
    pub fn get(&self, index: usize) -> Option<(usize, &LevelData)> {
        let clamped = index.min(self.levels.len().checked_sub(1)?);
        self.levels.get(clamped).map(|level| (clamped, level))
    }

    pub fn from_toml_str(path: &str, contents: &str) -> GameResult<Self> {
        let file: LevelFile = toml::from_str(contents).map_err(|e| GameError::ConfigParse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let catalog = Self {
            levels: file.levels,
        };
        for (index, level) in catalog.levels.iter().enumerate() {
            level.validate(index)?;
        }
        Ok(catalog)
    }
}

/// Startup system: replace the built-in levels from `assets/levels.toml`.
pub fn load_level_catalog(mut catalog: ResMut<LevelCatalog>) {
    let path = LEVELS_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match LevelCatalog::from_toml_str(path, &contents) {
            Ok(loaded) if !loaded.is_empty() => {
                println!("✓ Loaded {} level(s) from {path}", loaded.len());
                *catalog = loaded;
            }
            Ok(_) => eprintln!("⚠ {path} defines no levels; using built-in levels"),
            Err(e) => eprintln!("⚠ {e}; using built-in levels"),
        },
        Err(_) => println!("ℹ No {path} found; using built-in levels"),
    }
}

// ── Components & messages ────────────────────────────────────────────────────

/// Scored destructible; the level is won when none remain.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Target;

/// Destructible scenery (columns).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Obstacle;

/// Anything rebuilt when a level loads: floor, catapult base, targets, obstacles.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LevelEntity;

/// Static ground segment.
#[derive(Component, Debug, Clone, Copy)]
pub struct Floor {
    pub y: f32,
    pub width: f32,
}

/// Request to (re)build the level at `index`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLevel {
    pub index: usize,
}

// ── Spawning ─────────────────────────────────────────────────────────────────

pub fn spawn_target(commands: &mut Commands, at: Vec2, config: &GameConfig) -> Entity {
    commands
        .spawn((
            Target,
            LevelEntity,
            RigidBody::Dynamic,
            Collider::ball(config.target_radius),
            ColliderMassProperties::Mass(config.target_mass),
            Restitution::coefficient(config.target_elasticity),
            Friction::coefficient(config.target_friction),
            Velocity::zero(),
            ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS,
            ContactForceEventThreshold(config.impulse_ignore_threshold / config.physics_dt),
            Transform::from_translation(at.extend(0.0)),
        ))
        .id()
}

pub fn spawn_obstacle(commands: &mut Commands, at: Vec2, config: &GameConfig) -> Entity {
    commands
        .spawn((
            Obstacle,
            LevelEntity,
            RigidBody::Dynamic,
            Collider::cuboid(config.obstacle_half_width, config.obstacle_half_height),
            ColliderMassProperties::Mass(config.obstacle_mass),
            Restitution::coefficient(config.obstacle_elasticity),
            Friction::coefficient(config.obstacle_friction),
            Velocity::zero(),
            ActiveEvents::CONTACT_FORCE_EVENTS,
            ContactForceEventThreshold(config.impulse_ignore_threshold / config.physics_dt),
            Transform::from_translation(at.extend(0.0)),
        ))
        .id()
}

/// Build the playfield and the level's bodies.
///
/// The level is validated before anything is spawned, so a bad level leaves
/// the world empty rather than half-built.
pub fn spawn_level(
    commands: &mut Commands,
    index: usize,
    level: &LevelData,
    config: &GameConfig,
) -> GameResult<()> {
    level.validate(index)?;

    commands.spawn((
        Floor {
            y: config.floor_y,
            width: config.world_width,
        },
        LevelEntity,
        RigidBody::Fixed,
        Collider::segment(
            Vec2::new(0.0, config.floor_y),
            Vec2::new(config.world_width, config.floor_y),
        ),
        Friction::coefficient(config.floor_friction),
        Transform::default(),
    ));
    let base = spawn_catapult_base(commands, Vec2::new(CATAPULT_BASE_X, CATAPULT_BASE_Y));
    commands.entity(base).insert(LevelEntity);

    for p in &level.obstacles {
        spawn_obstacle(commands, Vec2::from(*p), config);
    }
    for p in &level.targets {
        spawn_target(commands, Vec2::from(*p), config);
    }
    Ok(())
}

// ── Systems ──────────────────────────────────────────────────────────────────

pub fn request_first_level(mut load: MessageWriter<LoadLevel>) {
    load.write(LoadLevel { index: 0 });
}

/// `RestartLevel` reloads the current level; `NextLevel` advances after a win.
pub fn level_command_system(
    mut inputs: MessageReader<PlayerInput>,
    progress: Res<Progress>,
    catalog: Res<LevelCatalog>,
    mut load: MessageWriter<LoadLevel>,
) {
    for input in inputs.read() {
        match input {
            PlayerInput::RestartLevel => {
                load.write(LoadLevel {
                    index: progress.level,
                });
            }
            PlayerInput::NextLevel if progress.is_won() => {
                if progress.level + 1 < catalog.len() {
                    load.write(LoadLevel {
                        index: progress.level + 1,
                    });
                } else {
                    info!("all levels complete");
                }
            }
            _ => {}
        }
    }
}

/// Tear down the current attempt and build the requested level.
#[allow(clippy::too_many_arguments)]
pub fn level_load_system(
    mut commands: Commands,
    mut requests: MessageReader<LoadLevel>,
    config: Res<GameConfig>,
    catalog: Res<LevelCatalog>,
    mut session: ResMut<LaunchSession>,
    mut progress: ResMut<Progress>,
    mut score: ResMut<Score>,
    mut log: ResMut<DestructionLog>,
    q_attempt: Query<
        Entity,
        Or<(
            With<LevelEntity>,
            With<Projectile>,
            With<Ramp>,
            With<ScorePopup>,
            With<Particle>,
        )>,
    >,
) {
    // Only the latest request matters.
    let Some(request) = requests.read().last().copied() else {
        return;
    };

    for entity in q_attempt.iter() {
        commands.entity(entity).try_despawn();
    }
    session.reset();
    *score = Score::default();
    log.clear();

    let Some((index, level)) = catalog.get(request.index) else {
        error!("level catalog is empty; nothing to load");
        *progress = Progress::default();
        session.freeze();
        return;
    };
    match spawn_level(&mut commands, index, level, &config) {
        Ok(()) => {
            *progress = Progress {
                level: index,
                par: level.par(),
                loaded: true,
                ..Default::default()
            };
            info!(
                "loaded level {} ({} targets): {}",
                index + 1,
                level.par(),
                level.description
            );
        }
        Err(e) => {
            error!("failed to load level {}: {e}", index + 1);
            *progress = Progress {
                level: index,
                ..Default::default()
            };
            session.freeze();
        }
    }
}

/// Keep targets inside the playfield horizontally.
pub fn target_soft_wall_system(
    config: Res<GameConfig>,
    mut targets: Query<(&mut Transform, &mut Velocity), With<Target>>,
) {
    if !config.target_soft_wall {
        return;
    }
    let min_x = config.target_radius;
    let max_x = config.world_width - config.target_radius;
    for (mut transform, mut velocity) in targets.iter_mut() {
        let x = transform.translation.x;
        if x < min_x {
            transform.translation.x = min_x;
            velocity.linvel.x = velocity.linvel.x.max(0.0);
        } else if x > max_x {
            transform.translation.x = max_x;
            velocity.linvel.x = velocity.linvel.x.min(0.0);
        }
    }
}
