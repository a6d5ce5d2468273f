//! Debris particles for destroyed targets and shattered obstacles.
//!
//! ## Design
//!
//! Particles are lightweight ECS entities with a [`Particle`] component that
//! stores motion state (velocity, age, colour).  A two-system pipeline handles
//! them:
//!
//! | System                        | Schedule | Purpose                                      |
//! |-------------------------------|----------|----------------------------------------------|
//! | `attach_particle_mesh_system` | Update   | Attach `Mesh2d` to freshly-spawned particles |
//! | `particle_update_system`      | Update   | Move, fall, fade, and despawn expired ones   |
//!
//! [`spawn_debris_particles`] only needs `&mut Commands`, so gameplay systems
//! can emit debris without touching render assets.  Headless runs never add
//! [`ParticlesPlugin`]; the particles there are plain data and are cleared
//! with the level.

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;

use crate::constants::DEBRIS_PARTICLES_PER_BODY;

// ── Resources ────────────────────────────────────────────────────────────────

/// Shared circle mesh used by all particle entities (created once at startup).
#[derive(Resource)]
pub struct ParticleMesh(pub Handle<Mesh>);

// ── Component ────────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct Particle {
    /// World-space velocity (units/s).
    pub velocity: Vec2,
    pub age: f32,
    /// Entity is despawned when `age >= lifetime`.
    pub lifetime: f32,
    pub color: Srgba,
    /// `None` until `attach_particle_mesh_system` runs.
    pub material: Option<Handle<ColorMaterial>>,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_particle_mesh).add_systems(
            Update,
            (attach_particle_mesh_system, particle_update_system).chain(),
        );
    }
}

fn init_particle_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(2.5, 6));
    commands.insert_resource(ParticleMesh(handle));
}

// ── Update systems ────────────────────────────────────────────────────────────

pub fn attach_particle_mesh_system(
    mut commands: Commands,
    particle_mesh: Res<ParticleMesh>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Particle), Added<Particle>>,
) {
    for (entity, mut particle) in query.iter_mut() {
        let mat_handle = materials.add(ColorMaterial::from_color(particle.color));
        particle.material = Some(mat_handle.clone());
        commands
            .entity(entity)
            .insert((Mesh2d(particle_mesh.0.clone()), MeshMaterial2d(mat_handle)));
    }
}

/// Debris falls at a fraction of world gravity so it reads as dust, not rubble.
const DEBRIS_GRAVITY: f32 = 300.0;

pub fn particle_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Transform, &mut Particle)>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut particle) in query.iter_mut() {
        particle.age += dt;

        if particle.age >= particle.lifetime {
            commands.entity(entity).try_despawn();
            continue;
        }

        particle.velocity.y -= DEBRIS_GRAVITY * dt;
        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;

        // Quadratic ease-out alpha: bright at birth, rapid fade at end.
        let t = particle.age / particle.lifetime;
        let alpha = (1.0 - t).powi(2);

        if let Some(ref handle) = particle.material {
            if let Some(mat) = materials.get_mut(handle) {
                mat.color = Color::Srgba(particle.color.with_alpha(alpha));
            }
        }
    }
}

// ── Public spawn helpers ──────────────────────────────────────────────────────

/// Burst of debris at `pos` tinted around `tint`.
pub fn spawn_debris_particles(commands: &mut Commands, pos: Vec2, tint: Color) {
    let mut rng = rand::thread_rng();
    let base = tint.to_srgba();

    for _ in 0..DEBRIS_PARTICLES_PER_BODY {
        let angle = rng.gen_range(0.0_f32..std::f32::consts::PI);
        let speed = rng.gen_range(60.0_f32..180.0_f32);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;

        let jitter = rng.gen_range(-0.08_f32..0.08_f32);
        let color = Srgba::new(
            (base.red + jitter).clamp(0.0, 1.0),
            (base.green + jitter).clamp(0.0, 1.0),
            (base.blue + jitter).clamp(0.0, 1.0),
            1.0,
        );

        let lifetime = rng.gen_range(0.35_f32..0.70_f32);
        let offset = Vec2::new(rng.gen_range(-6.0..6.0), rng.gen_range(-6.0..6.0));

        commands.spawn((
            Particle {
                velocity,
                age: 0.0,
                lifetime,
                color,
                material: None,
            },
            Transform::from_translation((pos + offset).extend(0.9)),
            Visibility::default(),
        ));
    }
}

// ── Mesh helper ───────────────────────────────────────────────────────────────

/// Build a filled circle mesh approximated by an `n`-sided regular polygon.
///
/// Uses a triangle fan from the centre: `(0, i, i+1 mod n)`.
fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    positions.push([0.0, 0.0, 0.0]);
    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        positions.push([radius * angle.cos(), radius * angle.sin(), 0.0]);
    }
    let normals = vec![[0.0, 0.0, 1.0]; n + 1];

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        indices.extend_from_slice(&[0, i + 1, (i + 1) % n as u32 + 1]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debris_burst_has_fixed_size() {
        let mut world = World::new();
        let mut queue = bevy::ecs::world::CommandQueue::default();
        let mut commands = Commands::new(&mut queue, &world);
        spawn_debris_particles(&mut commands, Vec2::new(10.0, 20.0), Color::WHITE);
        queue.apply(&mut world);

        let count = world
            .query::<&Particle>()
            .iter(&world)
            .filter(|p| p.lifetime > 0.0 && p.velocity.y >= 0.0)
            .count();
        assert_eq!(count, DEBRIS_PARTICLES_PER_BODY as usize);
    }
}
