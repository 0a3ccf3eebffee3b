//! Decorative circular revolution around the Sun.
//!
//! Orbits are not physical: every body with a non-zero radius moves on a
//! circle in the XZ plane around the Sun's current position, advancing a
//! fixed angle per frame tick while revolution is enabled.

use bevy::prelude::*;

use crate::types::{FrameSet, VisualSettings};

/// Marker for the entity whose translation is the center of all orbits.
#[derive(Component, Default)]
pub struct OrbitOrigin;

/// Per-body revolution state.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct OrbitDescriptor {
    /// Orbit radius in world units. Zero means the body never revolves.
    pub radius: f32,
    /// Signed angle advanced per frame tick, in radians.
    pub angular_speed: f32,
    /// Current angle. Not wrapped; trigonometry handles any magnitude.
    pub angle: f32,
}

impl OrbitDescriptor {
    pub fn new(radius: f32, angular_speed: f32, angle: f32) -> Self {
        Self {
            radius,
            angular_speed,
            angle,
        }
    }

    /// Position on the orbit circle for the current angle.
    pub fn position(&self, origin: Vec3) -> Vec3 {
        origin + Vec3::new(self.radius * self.angle.cos(), 0.0, self.radius * self.angle.sin())
    }

    /// Advance one tick. Returns the new position, or `None` when the body
    /// stays where it is (revolution disabled or a fixed body).
    pub fn advance(&mut self, origin: Vec3, enabled: bool) -> Option<Vec3> {
        if !enabled || self.radius <= 0.0 {
            return None;
        }
        self.angle += self.angular_speed;
        Some(self.position(origin))
    }
}

/// Plugin providing the orbit simulator.
pub struct OrbitPlugin;

impl Plugin for OrbitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisualSettings>()
            .add_systems(Update, advance_orbits.in_set(FrameSet::Orbit));
    }
}

/// Advance every orbit descriptor and move its body.
///
/// Disabled revolution leaves both the angle and the transform untouched,
/// so toggling is a pause/resume.
pub fn advance_orbits(
    settings: Res<VisualSettings>,
    origin: Query<&Transform, (With<OrbitOrigin>, Without<OrbitDescriptor>)>,
    mut bodies: Query<(&mut OrbitDescriptor, &mut Transform)>,
) {
    if !settings.revolve {
        return;
    }

    let origin = origin
        .iter()
        .next()
        .map(|transform| transform.translation)
        .unwrap_or(Vec3::ZERO);

    for (mut orbit, mut transform) in bodies.iter_mut() {
        if let Some(position) = orbit.advance(origin, true) {
            transform.translation = position;
        }
    }
}
