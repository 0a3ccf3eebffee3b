//! Skyfall - interactive solar system with near-Earth asteroid impacts.
//!
//! A desktop application showing the planets, today's near-Earth asteroids
//! and what one of them would look like hitting Earth.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use skyfall::asteroid::AsteroidPlugin;
use skyfall::camera::CameraPlugin;
use skyfall::collision::CollisionPlugin;
use skyfall::input::InputPlugin;
use skyfall::orbit::OrbitPlugin;
use skyfall::picking::PickingPlugin;
use skyfall::render::{FramePlugin, RenderPlugin};
use skyfall::ui::UiPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Skyfall".to_string(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .add_plugins(EguiPlugin::default())
        // Frame ordering first, then the simulation, then everything that draws
        .add_plugins((
            FramePlugin,
            OrbitPlugin,
            AsteroidPlugin,
            CollisionPlugin,
            PickingPlugin,
            CameraPlugin,
            InputPlugin,
        ))
        .add_plugins((RenderPlugin, UiPlugin))
        .run();
}
