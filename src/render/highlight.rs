//! Selection ring around the selected asteroid.

use bevy::prelude::*;

use crate::asteroid::{AsteroidField, PROXY_MODEL_RADIUS};
use crate::camera::MainCamera;
use crate::render::effects::draw_circle_segments;
use crate::types::FrameSet;

/// Ring radius relative to the proxy's scaled model radius.
const RING_MARGIN: f32 = 1.6;
/// Rings never shrink below this many world units.
const MIN_RING_RADIUS: f32 = 4.0;

/// Plugin providing selection highlighting.
pub struct HighlightPlugin;

impl Plugin for HighlightPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_selection_ring.after(FrameSet::Camera));
    }
}

pub fn ring_radius(scale: Vec3) -> f32 {
    (scale.max_element() * PROXY_MODEL_RADIUS * RING_MARGIN).max(MIN_RING_RADIUS)
}

/// Draw a camera-facing cyan ring around the selected, visible proxy.
fn draw_selection_ring(
    mut gizmos: Gizmos,
    field: Res<AsteroidField>,
    proxies: Query<&Transform, Without<MainCamera>>,
    camera: Query<&Transform, With<MainCamera>>,
) {
    let Some(record) = field.selected_record() else {
        return;
    };
    if !record.visible {
        return;
    }
    let Some(transform) = record.proxy_entity().and_then(|e| proxies.get(e).ok()) else {
        return;
    };
    let Ok(camera) = camera.single() else {
        return;
    };

    let color = Color::srgba(0.0, 1.0, 1.0, 0.8);
    draw_circle_segments(
        &mut gizmos,
        transform.translation,
        *camera.right(),
        *camera.up(),
        ring_radius(transform.scale),
        color,
        48,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ring_wraps_scaled_model() {
        assert_relative_eq!(ring_radius(Vec3::splat(0.03)), 4.8, epsilon = 1e-4);
        assert_eq!(ring_radius(Vec3::splat(0.001)), MIN_RING_RADIUS);
    }
}
