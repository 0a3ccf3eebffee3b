//! Orbit rings and asteroid trajectory lines using Bevy gizmos.
//!
//! Orbit rings are the circles the orbit simulator moves bodies along, so a
//! planet always sits on its drawn ring. Trajectories are straight lines from
//! each asteroid proxy along its velocity direction, colored by hazard.

use bevy::prelude::*;

use crate::asteroid::AsteroidField;
use crate::orbit::{OrbitDescriptor, OrbitOrigin};
use crate::render::bodies::{CelestialBody, definition};
use crate::render::effects::circle_points;
use crate::types::{FrameSet, VisualSettings};

/// Plugin providing orbit path visualization.
pub struct OrbitPathPlugin;

impl Plugin for OrbitPathPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitPathSettings>()
            .init_resource::<VisualSettings>()
            .add_systems(
                Update,
                (draw_orbit_paths, draw_trajectories).after(FrameSet::Animate),
            );
    }
}

/// Settings for orbit path rendering.
#[derive(Resource)]
pub struct OrbitPathSettings {
    pub visible: bool,
    /// Number of segments per ring (higher = smoother).
    pub segments: usize,
    pub alpha: f32,
    /// Dash pattern: draw N segments, then skip M segments, repeating.
    ///
    /// Set to (1, 0) for a solid line.
    pub dash_on: usize,
    pub dash_off: usize,
    /// Trajectory length in world units.
    pub trajectory_length: f32,
}

impl Default for OrbitPathSettings {
    fn default() -> Self {
        Self {
            visible: true,
            segments: 256,
            alpha: 0.3,
            dash_on: 2,
            dash_off: 3,
            trajectory_length: 2500.0,
        }
    }
}

/// Whether segment `index` is drawn under a dash pattern.
///
/// The pattern is tied to the segment index so it does not crawl as bodies move.
pub fn dash_visible(index: usize, on: usize, off: usize) -> bool {
    let on = on.max(1);
    index % (on + off) < on
}

/// End points of a trajectory line, or `None` without a usable direction.
pub fn trajectory_segment(start: Vec3, direction: Option<Vec3>, length: f32) -> Option<(Vec3, Vec3)> {
    direction.map(|direction| (start, start + direction * length))
}

fn draw_orbit_paths(
    mut gizmos: Gizmos,
    settings: Res<OrbitPathSettings>,
    origin: Query<&Transform, With<OrbitOrigin>>,
    bodies: Query<(&OrbitDescriptor, &CelestialBody)>,
) {
    if !settings.visible {
        return;
    }

    let center = origin
        .iter()
        .next()
        .map(|transform| transform.translation)
        .unwrap_or(Vec3::ZERO);

    for (orbit, body) in &bodies {
        if orbit.radius <= 0.0 {
            continue;
        }
        let color = definition(body.kind).color.with_alpha(settings.alpha);
        let points = circle_points(center, Vec3::X, Vec3::Z, orbit.radius, settings.segments);
        for (i, pair) in points.windows(2).enumerate() {
            if dash_visible(i, settings.dash_on, settings.dash_off) {
                gizmos.line(pair[0], pair[1], color);
            }
        }
    }
}

fn draw_trajectories(
    mut gizmos: Gizmos,
    settings: Res<OrbitPathSettings>,
    visual: Res<VisualSettings>,
    field: Res<AsteroidField>,
    proxies: Query<&Transform>,
) {
    for record in field.iter() {
        if !record.visible || !record.trajectory_visible {
            continue;
        }
        let Some(entity) = record.proxy_entity() else {
            continue;
        };
        let Ok(transform) = proxies.get(entity) else {
            continue;
        };
        let direction = record.velocity.ready().and_then(|v| v.direction());
        if let Some((start, end)) =
            trajectory_segment(transform.translation, direction, settings.trajectory_length)
        {
            gizmos.line(start, end, visual.hazard_color(record.hazardous));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_pattern() {
        let drawn: Vec<bool> = (0..5).map(|i| dash_visible(i, 2, 3)).collect();
        assert_eq!(drawn, vec![true, true, false, false, false]);
        assert!(dash_visible(5, 2, 3));
        // Solid line
        assert!((0..10).all(|i| dash_visible(i, 1, 0)));
    }

    #[test]
    fn test_trajectory_needs_direction() {
        assert!(trajectory_segment(Vec3::ZERO, None, 10.0).is_none());
        let (start, end) = trajectory_segment(Vec3::ONE, Some(Vec3::X), 10.0).unwrap();
        assert_eq!(start, Vec3::ONE);
        assert_eq!(end, Vec3::new(11.0, 1.0, 1.0));
    }
}
