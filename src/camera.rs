//! Perspective camera with orbit controls.
//!
//! The camera is driven by a [`CameraRig`]: a target point plus yaw, pitch
//! and distance. Dragging orbits, scrolling zooms, focusing follows an entity
//! (Earth) and going home restores the startup pose.

use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll},
    prelude::*,
};

use crate::types::{DEG_TO_RAD, FrameSet};

/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 75.0;

pub const MIN_DISTANCE: f32 = 20.0;
pub const MAX_DISTANCE: f32 = 40_000.0;

/// Zoom speed multiplier for scroll wheel.
pub const ZOOM_SPEED: f32 = 0.1;

/// Radians of orbit per pixel of drag.
pub const ORBIT_SPEED: f32 = 0.005;

/// Camera distance when focused on Earth.
pub const FOCUS_DISTANCE: f32 = 60.0;

const MAX_PITCH: f32 = 1.5;

/// Marker component for the main camera.
#[derive(Component)]
pub struct MainCamera;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigPose {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for RigPose {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.35,
            distance: 3500.0,
        }
    }
}

/// Orbit-controls state for the main camera.
#[derive(Resource, Clone, Debug)]
pub struct CameraRig {
    pub pose: RigPose,
    /// Entity whose translation the target tracks.
    pub follow: Option<Entity>,
    home: RigPose,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(RigPose::default())
    }
}

impl CameraRig {
    pub fn new(home: RigPose) -> Self {
        Self {
            pose: home,
            follow: None,
            home,
        }
    }

    pub fn home(&self) -> RigPose {
        self.home
    }

    pub fn eye(&self) -> Vec3 {
        let RigPose {
            target,
            yaw,
            pitch,
            distance,
        } = self.pose;
        target
            + distance * Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos())
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.pose.target, Vec3::Y)
    }

    pub fn orbit(&mut self, drag: Vec2) {
        self.pose.yaw -= drag.x * ORBIT_SPEED;
        self.pose.pitch = (self.pose.pitch + drag.y * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, scroll: f32) {
        let factor = 1.0 - scroll * ZOOM_SPEED;
        self.pose.distance = (self.pose.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Follow `entity`, currently at `position`, from close range.
    pub fn focus_on(&mut self, entity: Entity, position: Vec3) {
        self.follow = Some(entity);
        self.pose.target = position;
        self.pose.distance = FOCUS_DISTANCE;
    }

    pub fn go_home(&mut self) {
        self.pose = self.home;
        self.follow = None;
    }
}

/// Whether the UI currently owns the pointer; written by the UI layer.
#[derive(Resource, Default, Debug)]
pub struct PointerCapture {
    pub ui_wants_pointer: bool,
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraRig>()
            .init_resource::<PointerCapture>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (orbit_controls, follow_target, apply_rig)
                    .chain()
                    .in_set(FrameSet::Camera),
            );
    }
}

fn setup_camera(mut commands: Commands, rig: Res<CameraRig>) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: FOV_DEGREES * DEG_TO_RAD,
            near: 0.5,
            far: 200_000.0,
            ..default()
        }),
        rig.transform(),
        MainCamera,
    ));
}

/// Left drag orbits, the scroll wheel zooms.
fn orbit_controls(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    capture: Res<PointerCapture>,
    mut rig: ResMut<CameraRig>,
) {
    if capture.ui_wants_pointer {
        return;
    }

    if mouse_buttons.pressed(MouseButton::Left) && mouse_motion.delta != Vec2::ZERO {
        rig.orbit(mouse_motion.delta);
    }
    if mouse_scroll.delta.y != 0.0 {
        rig.zoom(mouse_scroll.delta.y);
    }
}

fn follow_target(mut rig: ResMut<CameraRig>, targets: Query<&Transform>) {
    let Some(entity) = rig.follow else {
        return;
    };
    match targets.get(entity) {
        Ok(transform) => rig.pose.target = transform.translation,
        Err(_) => rig.follow = None,
    }
}

fn apply_rig(rig: Res<CameraRig>, mut camera: Query<&mut Transform, With<MainCamera>>) {
    if !rig.is_changed() {
        return;
    }
    let Ok(mut transform) = camera.single_mut() else {
        return;
    };
    *transform = rig.transform();
}
