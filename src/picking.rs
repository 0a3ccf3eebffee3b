//! Pointer picking: click vs drag, ray hit testing and the info overlay.
//!
//! A left press that travels further than the drag threshold before release
//! is a drag (the camera orbits and the overlay hides). A release without a
//! drag casts a ray from the camera; the nearest [`PickBounds`] sphere hit
//! wins and is resolved through the metadata index.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::asteroid::{AsteroidProxy, SelectAsteroid};
use crate::camera::{CameraRig, MainCamera, PointerCapture};
use crate::metadata::ObjectMetadataIndex;
use crate::render::bodies::{BodyKind, CelestialBody};
use crate::types::{AsteroidId, FrameSet};

/// Pick sphere in the entity's local units; scaled by its largest scale axis.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct PickBounds {
    pub radius: f32,
}

impl PickBounds {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct PickSettings {
    /// Pointer travel in logical pixels that turns a press into a drag.
    pub drag_threshold: f32,
}

impl Default for PickSettings {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
        }
    }
}

/// What a hit entity is.
#[derive(Clone, Debug, PartialEq)]
pub enum PickTarget {
    Asteroid(AsteroidId),
    Body(BodyKind),
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PickHit {
    pub entity: Entity,
    pub distance: f32,
    pub target: PickTarget,
}

/// Title and detail shown next to the pointer after a pick.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayContent {
    pub title: String,
    pub detail: String,
    pub screen_position: Vec2,
}

#[derive(Resource, Default, Debug)]
pub struct PickOverlay(pub Option<OverlayContent>);

/// Press/drag tracking for the left button.
#[derive(Resource, Default, Debug)]
pub struct PointerGesture {
    press_at: Option<Vec2>,
    dragging: bool,
}

/// What a pointer update means for picking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    None,
    DragStarted,
    Click(Vec2),
}

impl PointerGesture {
    pub fn press(&mut self, at: Vec2) {
        self.press_at = Some(at);
        self.dragging = false;
    }

    pub fn moved(&mut self, to: Vec2, threshold: f32) -> GestureOutcome {
        match self.press_at {
            Some(start) if !self.dragging && start.distance(to) > threshold => {
                self.dragging = true;
                GestureOutcome::DragStarted
            }
            _ => GestureOutcome::None,
        }
    }

    pub fn release(&mut self, at: Vec2) -> GestureOutcome {
        let outcome = match self.press_at.take() {
            Some(_) if !self.dragging => GestureOutcome::Click(at),
            _ => GestureOutcome::None,
        };
        self.dragging = false;
        outcome
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

/// Distance along a normalized ray to the first intersection with a sphere,
/// or `None` when the sphere is missed or entirely behind the origin.
pub fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let along = to_center.dot(direction);
    let closest_sq = to_center.length_squared() - along * along;
    let radius_sq = radius * radius;
    if closest_sq > radius_sq {
        return None;
    }

    let half_chord = (radius_sq - closest_sq).sqrt();
    let near = along - half_chord;
    let far = along + half_chord;
    if far < 0.0 {
        None
    } else if near >= 0.0 {
        Some(near)
    } else {
        // Origin inside the sphere
        Some(0.0)
    }
}

/// The nearest hit among `(entity, center, radius)` candidates.
pub fn nearest_hit(
    origin: Vec3,
    direction: Vec3,
    candidates: impl IntoIterator<Item = (Entity, Vec3, f32)>,
) -> Option<(Entity, f32)> {
    candidates
        .into_iter()
        .filter_map(|(entity, center, radius)| {
            ray_sphere(origin, direction, center, radius).map(|distance| (entity, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PickSettings>()
            .init_resource::<PickOverlay>()
            .init_resource::<PointerGesture>()
            .init_resource::<PointerCapture>()
            .init_resource::<ObjectMetadataIndex>()
            .init_resource::<CameraRig>()
            .add_message::<SelectAsteroid>()
            .add_systems(Update, handle_pointer.before(FrameSet::Commands));
    }
}

fn handle_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    capture: Res<PointerCapture>,
    settings: Res<PickSettings>,
    mut gesture: ResMut<PointerGesture>,
    mut overlay: ResMut<PickOverlay>,
    targets: Query<(Entity, &GlobalTransform, &PickBounds, Option<&Visibility>)>,
    bodies: Query<&CelestialBody>,
    proxies: Query<&AsteroidProxy>,
    index: Res<ObjectMetadataIndex>,
    mut rig: ResMut<CameraRig>,
    mut select: MessageWriter<SelectAsteroid>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    if mouse.just_pressed(MouseButton::Left) {
        // Presses on UI panels never start a pick or a drag
        if capture.ui_wants_pointer {
            return;
        }
        gesture.press(cursor);
    }
    if mouse.pressed(MouseButton::Left)
        && gesture.moved(cursor, settings.drag_threshold) == GestureOutcome::DragStarted
    {
        overlay.0 = None;
    }
    if !mouse.just_released(MouseButton::Left) {
        return;
    }
    let GestureOutcome::Click(at) = gesture.release(cursor) else {
        return;
    };

    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, at) else {
        return;
    };

    let candidates = targets
        .iter()
        .filter(|(.., visibility)| visibility.is_none_or(|v| *v != Visibility::Hidden))
        .map(|(entity, transform, bounds, _)| {
            let scale = transform.compute_transform().scale.max_element();
            (entity, transform.translation(), bounds.radius * scale)
        });

    let Some((entity, distance)) = nearest_hit(ray.origin, *ray.direction, candidates) else {
        overlay.0 = None;
        return;
    };

    let target = if let Ok(proxy) = proxies.get(entity) {
        PickTarget::Asteroid(proxy.id.clone())
    } else if let Ok(body) = bodies.get(entity) {
        PickTarget::Body(body.kind)
    } else {
        PickTarget::Other
    };
    let hit = PickHit {
        entity,
        distance,
        target,
    };
    debug!("Picked {:?}", hit);

    overlay.0 = Some(match index.lookup(hit.entity) {
        Some(metadata) => OverlayContent {
            title: metadata.title.clone(),
            detail: metadata.detail.clone(),
            screen_position: at,
        },
        None => OverlayContent {
            title: "No info".to_string(),
            detail: String::new(),
            screen_position: at,
        },
    });

    match hit.target {
        PickTarget::Body(BodyKind::Earth) => {
            let position = targets
                .get(hit.entity)
                .map(|(_, transform, ..)| transform.translation())
                .unwrap_or_default();
            rig.focus_on(hit.entity, position);
            info!("Focusing camera on Earth");
        }
        PickTarget::Asteroid(id) => {
            select.write(SelectAsteroid(Some(id)));
        }
        PickTarget::Body(_) | PickTarget::Other => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_ray_sphere_front_hit() {
        let distance = ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 10.0), 2.0).unwrap();
        assert_relative_eq!(distance, 8.0);
    }

    #[test]
    fn test_ray_sphere_miss_and_behind() {
        assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(5.0, 0.0, 10.0), 2.0).is_none());
        assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -10.0), 2.0).is_none());
    }

    #[test]
    fn test_ray_sphere_from_inside() {
        assert_eq!(ray_sphere(Vec3::ZERO, Vec3::X, Vec3::ZERO, 1.0), Some(0.0));
    }

    #[test]
    fn test_nearest_hit_wins_regardless_of_order() {
        let ids = entities(3);
        let candidates = vec![
            (ids[0], Vec3::new(0.0, 0.0, 300.0), 200.0), // large, far (Sun-like)
            (ids[1], Vec3::new(0.0, 0.0, 50.0), 5.0),    // small, near
            (ids[2], Vec3::new(40.0, 0.0, 20.0), 5.0),   // off the ray
        ];
        let (entity, distance) = nearest_hit(Vec3::ZERO, Vec3::Z, candidates).unwrap();
        assert_eq!(entity, ids[1]);
        assert_relative_eq!(distance, 45.0);
    }

    #[test]
    fn test_nearest_hit_none_when_empty() {
        assert!(nearest_hit(Vec3::ZERO, Vec3::Z, Vec::new()).is_none());
    }

    #[test]
    fn test_click_without_movement() {
        let mut gesture = PointerGesture::default();
        gesture.press(Vec2::new(100.0, 100.0));
        assert_eq!(gesture.moved(Vec2::new(102.0, 101.0), 5.0), GestureOutcome::None);
        assert_eq!(
            gesture.release(Vec2::new(102.0, 101.0)),
            GestureOutcome::Click(Vec2::new(102.0, 101.0))
        );
    }

    #[test]
    fn test_drag_suppresses_click() {
        let mut gesture = PointerGesture::default();
        gesture.press(Vec2::ZERO);
        assert_eq!(gesture.moved(Vec2::new(30.0, 0.0), 5.0), GestureOutcome::DragStarted);
        // Only reported once per drag
        assert_eq!(gesture.moved(Vec2::new(60.0, 0.0), 5.0), GestureOutcome::None);
        assert!(gesture.is_dragging());
        // Coming back to the start still counts as a drag
        assert_eq!(gesture.release(Vec2::ZERO), GestureOutcome::None);
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut gesture = PointerGesture::default();
        assert_eq!(gesture.release(Vec2::ZERO), GestureOutcome::None);
    }
}
