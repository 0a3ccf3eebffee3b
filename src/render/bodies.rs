//! Celestial body registry and spawning.
//!
//! Every body comes from one [`BodyDefinition`] row and is spawned once by
//! [`create_body`]. Materials start untextured; a [`PendingTexture`] attaches
//! the image when the asset server has it.

use std::f32::consts::FRAC_PI_2;

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::metadata::{BodyMetadata, ObjectMetadataIndex};
use crate::orbit::{OrbitDescriptor, OrbitOrigin};
use crate::picking::PickBounds;
use crate::render::Spin;
use crate::types::DEG_TO_RAD;

/// Identity of a celestial body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl BodyKind {
    pub fn name(self) -> &'static str {
        match self {
            BodyKind::Sun => "Sun",
            BodyKind::Mercury => "Mercury",
            BodyKind::Venus => "Venus",
            BodyKind::Earth => "Earth",
            BodyKind::Mars => "Mars",
            BodyKind::Jupiter => "Jupiter",
            BodyKind::Saturn => "Saturn",
            BodyKind::Uranus => "Uranus",
            BodyKind::Neptune => "Neptune",
        }
    }
}

/// Component marking an entity as a renderable celestial body.
#[derive(Component, Clone, Copy, Debug)]
pub struct CelestialBody {
    pub kind: BodyKind,
}

/// Marker on the Earth group (the collision target).
#[derive(Component)]
pub struct EarthBody;

/// Image waiting to be attached to a material once loaded.
#[derive(Component, Clone)]
pub struct PendingTexture {
    pub image: Handle<Image>,
    pub material: Handle<StandardMaterial>,
}

/// Static description of one body.
#[derive(Clone, Copy, Debug)]
pub struct BodyDefinition {
    pub kind: BodyKind,
    pub radius: f32,
    pub color: Color,
    pub texture: Option<&'static str>,
    /// Self-lit (the Sun).
    pub emissive: bool,
    /// Axial tilt about Z, degrees.
    pub tilt_degrees: f32,
    /// Axial spin, radians per frame tick.
    pub spin: f32,
    /// `(radius, angular speed)` around the Sun; `None` keeps the body fixed.
    pub orbit: Option<(f32, f32)>,
    pub detail: &'static str,
}

const fn planet(
    kind: BodyKind,
    radius: f32,
    color: Color,
    texture: &'static str,
    tilt_degrees: f32,
    orbit: (f32, f32),
    detail: &'static str,
) -> BodyDefinition {
    BodyDefinition {
        kind,
        radius,
        color,
        texture: Some(texture),
        emissive: false,
        tilt_degrees,
        spin: 0.002,
        orbit: Some(orbit),
        detail,
    }
}

pub const SUN_COLOR: Color = Color::srgb(0.992, 0.722, 0.075);

/// Earth and its cloud layer spin this much per frame tick.
pub const EARTH_SPIN: f32 = 0.005;

/// Everything the registry spawns, Sun first.
pub static BODIES: [BodyDefinition; 9] = [
    BodyDefinition {
        kind: BodyKind::Sun,
        radius: 200.0,
        color: SUN_COLOR,
        texture: None,
        emissive: true,
        tilt_degrees: 0.0,
        spin: 0.0,
        orbit: None,
        detail: "G-type main-sequence star holding 99.8% of the solar system's mass.",
    },
    planet(
        BodyKind::Mercury,
        1.92,
        Color::srgb(0.6, 0.6, 0.6),
        "textures/2k_mercury.jpg",
        0.0,
        (400.0, 0.004),
        "Smallest planet and closest to the Sun. A year lasts 88 days.",
    ),
    planet(
        BodyKind::Venus,
        4.75,
        Color::srgb(0.9, 0.85, 0.7),
        "textures/2k_venus.jpg",
        3.0,
        (600.0, 0.003),
        "Hottest planet, wrapped in a dense carbon dioxide atmosphere.",
    ),
    BodyDefinition {
        kind: BodyKind::Earth,
        radius: 5.0,
        color: Color::srgb(0.2, 0.5, 0.8),
        texture: Some("textures/earth-min.png"),
        emissive: false,
        tilt_degrees: -23.4,
        spin: EARTH_SPIN,
        orbit: Some((800.0, 0.0025)),
        detail: "Our home. Click an asteroid and enable collision to watch it strike.",
    },
    planet(
        BodyKind::Mars,
        2.66,
        Color::srgb(0.8, 0.4, 0.2),
        "textures/2k_mars.jpg",
        -25.0,
        (1000.0, 0.002),
        "The red planet, home of Olympus Mons.",
    ),
    planet(
        BodyKind::Jupiter,
        30.0,
        Color::srgb(0.8, 0.7, 0.6),
        "textures/2k_jupiter.jpg",
        0.0,
        (1500.0, 0.0012),
        "Largest planet; its Great Red Spot is a centuries-old storm.",
    ),
    planet(
        BodyKind::Saturn,
        25.2,
        Color::srgb(0.9, 0.85, 0.6),
        "textures/2k_saturn.jpg",
        0.0,
        (2000.0, 0.0009),
        "Gas giant with the most prominent ring system.",
    ),
    planet(
        BodyKind::Uranus,
        20.05,
        Color::srgb(0.6, 0.8, 0.9),
        "textures/2k_uranus.jpg",
        0.0,
        (2500.0, 0.0006),
        "Ice giant that rotates on its side.",
    ),
    planet(
        BodyKind::Neptune,
        19.4,
        Color::srgb(0.3, 0.5, 0.9),
        "textures/2k_neptune.jpg",
        0.0,
        (3000.0, 0.0005),
        "Outermost planet, with the fastest winds in the solar system.",
    ),
];

pub const SATURN_RING: (f32, f32) = (28.0, 50.0);
const SATURN_RING_TEXTURE: &str = "textures/2k_saturn_ring.png";
const EARTH_CLOUDS_TEXTURE: &str = "textures/8k_earth_clouds-min.jpg";
const CLOUD_SCALE: f32 = 1.005;
const CLOUD_OPACITY: f32 = 0.8;

pub fn definition(kind: BodyKind) -> &'static BodyDefinition {
    // Every kind has exactly one row
    match BODIES.iter().position(|def| def.kind == kind) {
        Some(i) => &BODIES[i],
        None => &BODIES[0],
    }
}

/// Asset stores used while building bodies.
pub struct BodyAssets<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub asset_server: &'a AssetServer,
}

impl BodyAssets<'_> {
    /// Untextured material, plus the pending texture to attach later.
    fn material(
        &mut self,
        material: StandardMaterial,
        texture: Option<&'static str>,
    ) -> (Handle<StandardMaterial>, Option<PendingTexture>) {
        let handle = self.materials.add(material);
        let pending = texture.map(|path| PendingTexture {
            image: self.asset_server.load(path),
            material: handle.clone(),
        });
        (handle, pending)
    }
}

/// Spawn one body and register its metadata. Returns the pickable root.
pub fn create_body(
    commands: &mut Commands,
    assets: &mut BodyAssets,
    index: &mut ObjectMetadataIndex,
    def: &BodyDefinition,
) -> Entity {
    let orbit = def
        .orbit
        .map(|(radius, speed)| OrbitDescriptor::new(radius, speed, orbit_phase(def.kind)));
    let position = orbit.map_or(Vec3::ZERO, |o| o.position(Vec3::ZERO));
    let tilt = Quat::from_rotation_z(def.tilt_degrees * DEG_TO_RAD);
    let mesh = assets.meshes.add(Sphere::new(def.radius).mesh().uv(64, 32));

    let base = StandardMaterial {
        base_color: if def.texture.is_some() { Color::WHITE } else { def.color },
        emissive: if def.emissive {
            def.color.to_linear() * 4.0
        } else {
            LinearRgba::BLACK
        },
        unlit: def.emissive,
        ..default()
    };
    let (material, pending) = assets.material(base, def.texture);

    let mut root = commands.spawn((
        Name::new(def.kind.name()),
        CelestialBody { kind: def.kind },
        PickBounds::new(def.radius),
        Transform::from_translation(position).with_rotation(tilt),
        Visibility::default(),
    ));
    if let Some(orbit) = orbit {
        root.insert(orbit);
    }
    let entity = root.id();

    match def.kind {
        BodyKind::Sun => {
            commands.entity(entity).insert((
                OrbitOrigin,
                Mesh3d(mesh),
                MeshMaterial3d(material),
            ));
        }
        BodyKind::Earth => {
            // Tilt lives on the group; surface and clouds spin inside it
            commands.entity(entity).insert(EarthBody);
            let surface = commands
                .spawn((
                    Name::new("Earth surface"),
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material),
                    Transform::default(),
                    Spin::new(def.spin),
                    ChildOf(entity),
                ))
                .id();
            if let Some(pending) = pending {
                commands.entity(surface).insert(pending);
            }

            let clouds = StandardMaterial {
                base_color: Color::srgba(1.0, 1.0, 1.0, CLOUD_OPACITY),
                alpha_mode: AlphaMode::Add,
                ..default()
            };
            let (clouds_material, clouds_pending) =
                assets.material(clouds, Some(EARTH_CLOUDS_TEXTURE));
            let mut layer = commands.spawn((
                Name::new("Earth clouds"),
                Mesh3d(mesh),
                MeshMaterial3d(clouds_material),
                Transform::from_scale(Vec3::splat(CLOUD_SCALE)),
                Spin::new(def.spin),
                ChildOf(entity),
            ));
            if let Some(pending) = clouds_pending {
                layer.insert(pending);
            }
            register(index, entity, def);
            return entity;
        }
        _ => {
            commands.entity(entity).insert((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Spin::new(def.spin),
            ));
        }
    }

    if let Some(pending) = pending {
        commands.entity(entity).insert(pending);
    }

    if def.kind == BodyKind::Saturn {
        let (inner, outer) = SATURN_RING;
        let ring = StandardMaterial {
            base_color: Color::srgba(0.9, 0.85, 0.7, 0.9),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        };
        let (ring_material, ring_pending) = assets.material(ring, Some(SATURN_RING_TEXTURE));
        let mut ring_entity = commands.spawn((
            Name::new("Saturn ring"),
            Mesh3d(assets.meshes.add(Annulus::new(inner, outer))),
            MeshMaterial3d(ring_material),
            Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
            ChildOf(entity),
        ));
        if let Some(pending) = ring_pending {
            ring_entity.insert(pending);
        }
    }

    register(index, entity, def);
    entity
}

fn register(index: &mut ObjectMetadataIndex, entity: Entity, def: &BodyDefinition) {
    index.register(entity, BodyMetadata::new(def.kind.name(), def.detail));
}

/// Starting angle so the planets do not line up at startup.
fn orbit_phase(kind: BodyKind) -> f32 {
    kind as u8 as f32 * 0.9
}

pub struct CelestialBodyPlugin;

impl Plugin for CelestialBodyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObjectMetadataIndex>()
            .add_systems(Startup, spawn_solar_system)
            .add_systems(Update, attach_loaded_textures);
    }
}

fn spawn_solar_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    mut index: ResMut<ObjectMetadataIndex>,
) {
    let mut assets = BodyAssets {
        meshes: &mut meshes,
        materials: &mut materials,
        asset_server: &asset_server,
    };
    for def in &BODIES {
        create_body(&mut commands, &mut assets, &mut index, def);
    }
    info!("Spawned {} celestial bodies", BODIES.len());
}

/// Move loaded images into their materials. Failed images leave the body
/// untextured.
fn attach_loaded_textures(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    pending: Query<(Entity, &PendingTexture)>,
) {
    for (entity, texture) in &pending {
        match asset_server.load_state(texture.image.id()) {
            LoadState::Loaded => {
                if let Some(mut material) = materials.get_mut(&texture.material) {
                    material.base_color_texture = Some(texture.image.clone());
                }
                commands.entity(entity).remove::<PendingTexture>();
            }
            LoadState::Failed(err) => {
                warn!("Texture failed to load, keeping plain material: {}", err);
                commands.entity(entity).remove::<PendingTexture>();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_kind_defined_once() {
        let kinds = [
            BodyKind::Sun,
            BodyKind::Mercury,
            BodyKind::Venus,
            BodyKind::Earth,
            BodyKind::Mars,
            BodyKind::Jupiter,
            BodyKind::Saturn,
            BodyKind::Uranus,
            BodyKind::Neptune,
        ];
        for kind in kinds {
            assert_eq!(BODIES.iter().filter(|d| d.kind == kind).count(), 1, "{:?}", kind);
            assert_eq!(definition(kind).kind, kind);
        }
    }

    #[test]
    fn test_only_the_sun_is_fixed() {
        for def in &BODIES {
            assert_eq!(def.orbit.is_none(), def.kind == BodyKind::Sun, "{:?}", def.kind);
        }
    }

    #[test]
    fn test_orbit_radii_clear_the_sun_and_increase_outward() {
        let radii: Vec<f32> = BODIES.iter().filter_map(|d| d.orbit.map(|o| o.0)).collect();
        assert!(radii[0] > definition(BodyKind::Sun).radius);
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_reference_radii() {
        assert_eq!(definition(BodyKind::Sun).radius, 200.0);
        assert_eq!(definition(BodyKind::Earth).radius, 5.0);
        assert_eq!(definition(BodyKind::Saturn).radius, 25.2);
        assert_eq!(definition(BodyKind::Earth).spin, EARTH_SPIN);
    }
}
