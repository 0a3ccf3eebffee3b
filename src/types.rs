//! Core shared types and constants for the solar system scene.

use std::fmt;

use bevy::prelude::*;

/// World units per coordinate unit reported by the asteroid API.
///
/// Asteroid coordinates arrive in astronomical-scale units; the scene places
/// them at `coordinate * WORLD_UNITS_PER_DISTANCE_UNIT`.
pub const WORLD_UNITS_PER_DISTANCE_UNIT: f32 = 6000.0;

/// Uniform proxy scale per meter of estimated asteroid diameter.
pub const PROXY_SCALE_PER_METER: f32 = 0.0002;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Per-frame ordering of the simulation systems in `Update`.
///
/// One frame: apply queued commands, revolve planets, spin bodies, step
/// animations, then move the camera rig. Bevy renders afterwards.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// User commands and async load results.
    Commands,
    /// Orbit simulator (revolution around the Sun).
    Orbit,
    /// Axial rotation of bodies and the starfield.
    Spin,
    /// Animation scheduler and collision pipeline.
    Animate,
    /// Camera rig and orbit controls.
    Camera,
}

/// External identity of a near-Earth object, as issued by the remote API.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsteroidId(pub String);

impl AsteroidId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AsteroidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Translation and scale captured when a proxy is created.
///
/// Reset restores exactly these floats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformSnapshot {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl TransformSnapshot {
    pub fn of(transform: &Transform) -> Self {
        Self {
            translation: transform.translation,
            scale: transform.scale,
        }
    }

    /// Write the snapshot back into a transform, leaving rotation untouched.
    pub fn restore(&self, transform: &mut Transform) {
        transform.translation = self.translation;
        transform.scale = self.scale;
    }
}

/// A short user-facing message (precondition violations, load status).
#[derive(Message, Clone, Debug)]
pub struct UserNotice {
    pub text: String,
}

impl UserNotice {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Global toggles exposed in the dock.
#[derive(Resource, Clone, Debug)]
pub struct VisualSettings {
    /// Whether planets revolve around the Sun (pause/resume, never reset).
    pub revolve: bool,
    /// Color-blind friendly palette for hazard coloring.
    pub accessible_palette: bool,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            revolve: true,
            accessible_palette: false,
        }
    }
}

impl VisualSettings {
    /// Color used for an asteroid's label and trajectory.
    pub fn hazard_color(&self, hazardous: bool) -> Color {
        match (self.accessible_palette, hazardous) {
            (false, true) => Color::srgb(0.95, 0.25, 0.2),
            (false, false) => Color::srgb(0.3, 0.85, 0.4),
            (true, true) => Color::srgb(0.9, 0.6, 0.0),
            (true, false) => Color::srgb(0.35, 0.7, 0.9),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_restore_keeps_rotation() {
        let mut transform = Transform::from_xyz(1.0, 2.0, 3.0)
            .with_scale(Vec3::splat(0.5))
            .with_rotation(Quat::from_rotation_y(0.3));
        let snapshot = TransformSnapshot::of(&transform);

        transform.translation = Vec3::ZERO;
        transform.scale = Vec3::splat(4.0);
        snapshot.restore(&mut transform);

        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.scale, Vec3::splat(0.5));
        assert_eq!(transform.rotation, Quat::from_rotation_y(0.3));
    }

    #[test]
    fn test_palettes_differ_by_hazard() {
        let mut settings = VisualSettings::default();
        assert_ne!(settings.hazard_color(true), settings.hazard_color(false));

        let standard = settings.hazard_color(true);
        settings.accessible_palette = true;
        assert_ne!(settings.hazard_color(true), standard);
    }

    #[test]
    fn test_asteroid_id_ordering_is_lexicographic() {
        let a = AsteroidId::new("2000433");
        let b = AsteroidId::new("3542519");
        assert!(a < b);
        assert_eq!(a.to_string(), "2000433");
    }
}
