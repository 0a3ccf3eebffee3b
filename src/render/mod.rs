//! Rendering systems for the solar system scene.
//!
//! [`FramePlugin`] fixes the per-frame order of the simulation and is safe
//! to run headless; [`RenderPlugin`] adds everything that draws.

pub mod background;
pub mod bodies;
pub mod effects;
pub mod highlight;
pub mod labels;
pub mod orbits;
pub mod proxies;

use bevy::prelude::*;

use crate::types::FrameSet;

use self::background::BackgroundPlugin;
use self::bodies::CelestialBodyPlugin;
use self::effects::EffectsPlugin;
use self::highlight::HighlightPlugin;
use self::labels::LabelPlugin;
use self::orbits::OrbitPathPlugin;
use self::proxies::ProxyVisualPlugin;

pub use self::bodies::{BodyKind, CelestialBody, EarthBody};
pub use self::labels::LabelSettings;

/// Axial rotation applied every frame tick, in radians about local Y.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub rate: f32,
}

impl Spin {
    pub fn new(rate: f32) -> Self {
        Self { rate }
    }
}

/// Orders one frame: commands, orbits, spin, animations, camera.
pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                FrameSet::Commands,
                FrameSet::Orbit,
                FrameSet::Spin,
                FrameSet::Animate,
                FrameSet::Camera,
            )
                .chain(),
        )
        .add_systems(Update, spin_bodies.in_set(FrameSet::Spin));
    }
}

/// Spin never pauses; only revolution is toggled.
pub fn spin_bodies(mut spinning: Query<(&Spin, &mut Transform)>) {
    for (spin, mut transform) in &mut spinning {
        if spin.rate != 0.0 {
            transform.rotate_local_y(spin.rate);
        }
    }
}

/// Plugin aggregating all rendering functionality.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            CelestialBodyPlugin,
            BackgroundPlugin,
            ProxyVisualPlugin,
            OrbitPathPlugin,
            EffectsPlugin,
            HighlightPlugin,
            LabelPlugin,
        ));
    }
}
