//! Keyboard shortcuts.
//!
//! Every shortcut mirrors a dock control: Space toggles revolution, L reloads
//! today's asteroids, Escape clears the selection and H sends the camera home.

use bevy::prelude::*;

use crate::asteroid::SelectAsteroid;
use crate::asteroid::loader::LoadAsteroids;
use crate::camera::CameraRig;
use crate::picking::PickOverlay;
use crate::types::{FrameSet, VisualSettings};

/// Plugin providing keyboard input handling.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisualSettings>()
            .init_resource::<CameraRig>()
            .init_resource::<PickOverlay>()
            .add_message::<LoadAsteroids>()
            .add_message::<SelectAsteroid>()
            .add_systems(Update, keyboard_shortcuts.before(FrameSet::Commands));
    }
}

fn keyboard_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<VisualSettings>,
    mut rig: ResMut<CameraRig>,
    mut overlay: ResMut<PickOverlay>,
    mut loads: MessageWriter<LoadAsteroids>,
    mut selection: MessageWriter<SelectAsteroid>,
) {
    if keys.just_pressed(KeyCode::Space) {
        settings.revolve = !settings.revolve;
        info!("Revolution {}", if settings.revolve { "on" } else { "off" });
    }

    if keys.just_pressed(KeyCode::KeyL) {
        loads.write(LoadAsteroids);
    }

    if keys.just_pressed(KeyCode::Escape) {
        selection.write(SelectAsteroid(None));
        overlay.0 = None;
    }

    if keys.just_pressed(KeyCode::KeyH) {
        rig.go_home();
    }
}
