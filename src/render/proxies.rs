//! Visuals for asteroid proxies.
//!
//! Proxies are spawned headless by the asteroid field. This plugin gives each
//! one an instance of the shared asteroid model once the model has loaded, or
//! a plain sphere of the same size when it failed.

use bevy::asset::LoadState;
use bevy::gltf::{Gltf, GltfAssetLabel};
use bevy::prelude::*;

use crate::asteroid::{AsteroidProxy, PROXY_MODEL_RADIUS, ProxyVisual};

pub const PROXY_MODEL_PATH: &str = "models/asteroid.glb";

/// Shared model used by every proxy.
#[derive(Resource)]
pub struct ProxyTemplate {
    pub gltf: Handle<Gltf>,
    pub scene: Handle<Scene>,
    fallback: Option<(Handle<Mesh>, Handle<StandardMaterial>)>,
}

/// What a waiting proxy should receive this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateReadiness {
    Waiting,
    Model,
    Fallback,
}

impl TemplateReadiness {
    pub fn from_load_state(state: &LoadState) -> Self {
        match state {
            LoadState::Loaded => TemplateReadiness::Model,
            LoadState::Failed(_) => TemplateReadiness::Fallback,
            _ => TemplateReadiness::Waiting,
        }
    }
}

pub struct ProxyVisualPlugin;

impl Plugin for ProxyVisualPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_template)
            .add_systems(Update, attach_proxy_visuals);
    }
}

fn load_template(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(ProxyTemplate {
        gltf: asset_server.load(PROXY_MODEL_PATH),
        scene: asset_server.load(GltfAssetLabel::Scene(0).from_asset(PROXY_MODEL_PATH)),
        fallback: None,
    });
}

fn attach_proxy_visuals(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    template: Option<ResMut<ProxyTemplate>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    waiting: Query<Entity, (With<AsteroidProxy>, Without<ProxyVisual>)>,
) {
    let Some(mut template) = template else {
        return;
    };
    if waiting.is_empty() {
        return;
    }

    let state = asset_server.load_state(template.gltf.id());
    match TemplateReadiness::from_load_state(&state) {
        TemplateReadiness::Waiting => {}
        TemplateReadiness::Model => {
            for entity in &waiting {
                commands
                    .entity(entity)
                    .insert((SceneRoot(template.scene.clone()), ProxyVisual));
            }
        }
        TemplateReadiness::Fallback => {
            let (mesh, material) = template
                .fallback
                .get_or_insert_with(|| {
                    if let LoadState::Failed(err) = &state {
                        warn!("Asteroid model failed to load, using spheres: {}", err);
                    }
                    (
                        meshes.add(Sphere::new(PROXY_MODEL_RADIUS).mesh().uv(24, 16)),
                        materials.add(StandardMaterial {
                            base_color: Color::srgb(0.45, 0.42, 0.4),
                            perceptual_roughness: 0.95,
                            ..default()
                        }),
                    )
                })
                .clone();
            for entity in &waiting {
                commands.entity(entity).insert((
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    ProxyVisual,
                ));
            }
        }
    }
}
