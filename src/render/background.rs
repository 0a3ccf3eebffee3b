//! Starfield and lighting.

use bevy::prelude::*;
use rand::Rng;

use crate::render::Spin;
use crate::render::bodies::SUN_COLOR;

pub const STAR_COUNT: usize = 1500;

/// Stars sit on a shell between these radii, well outside Neptune's orbit.
pub const STARFIELD_RADII: (f32, f32) = (20_000.0, 30_000.0);

/// The starfield turns backwards slowly.
pub const STARFIELD_SPIN: f32 = -0.0005;

/// Parent of every star; rotating it rotates the whole sky.
#[derive(Component)]
pub struct Starfield;

/// Plugin providing background visual elements.
pub struct BackgroundPlugin;

impl Plugin for BackgroundPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_starfield, spawn_lighting));
    }
}

/// Uniformly distributed point on a spherical shell.
pub fn random_shell_point(rng: &mut impl Rng, inner: f32, outer: f32) -> Vec3 {
    // Uniform in z and longitude gives a uniform direction
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let longitude: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let ring = (1.0 - z * z).sqrt();
    let radius = rng.gen_range(inner..=outer);
    Vec3::new(ring * longitude.cos(), z, ring * longitude.sin()) * radius
}

fn spawn_starfield(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let star_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        emissive: LinearRgba::WHITE * 2.0,
        unlit: true,
        ..default()
    });
    let star_mesh = meshes.add(Sphere::new(12.0).mesh().uv(8, 6));

    let root = commands
        .spawn((
            Name::new("Starfield"),
            Starfield,
            Spin::new(STARFIELD_SPIN),
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    let mut rng = rand::thread_rng();
    let (inner, outer) = STARFIELD_RADII;
    for _ in 0..STAR_COUNT {
        let position = random_shell_point(&mut rng, inner, outer);
        let scale = rng.gen_range(0.5..1.5);
        commands.spawn((
            Mesh3d(star_mesh.clone()),
            MeshMaterial3d(star_material.clone()),
            Transform::from_translation(position).with_scale(Vec3::splat(scale)),
            ChildOf(root),
        ));
    }

    info!("Spawned {} background stars", STAR_COUNT);
}

fn spawn_lighting(mut commands: Commands) {
    // The Sun lights the planets it faces
    commands.spawn((
        Name::new("Sunlight"),
        PointLight {
            color: SUN_COLOR,
            intensity: 1.0e13,
            range: 50_000.0,
            radius: 200.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::default(),
    ));

    // Fill so the night sides are not pitch black
    commands.spawn((
        Name::new("Fill light"),
        DirectionalLight {
            illuminance: 1500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-2.0, 0.5, 1.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("Scene lighting initialized");
}
