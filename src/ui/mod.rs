//! UI module providing the egui interface.
//!
//! Everything here draws in `EguiPrimaryContextPass`. Simulation state is only
//! changed through resources and messages, so the rest of the app runs
//! without egui.

mod banners;
mod dock;
pub mod icons;
mod impact_map;
mod info_panel;

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass};

use crate::asteroid::AsteroidField;
use crate::asteroid::loader::LoadAsteroids;
use crate::camera::{CameraRig, PointerCapture};
use crate::collision::{CollisionCommand, CollisionControls, ImpactCallout};
use crate::picking::PickOverlay;
use crate::types::{UserNotice, VisualSettings};

pub use banners::BannerState;
pub use dock::HelpTooltipState;
pub use impact_map::ImpactMapState;

/// Plugin that adds all UI systems.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BannerState>()
            .init_resource::<HelpTooltipState>()
            .init_resource::<ImpactMapState>()
            .init_resource::<icons::FontsInitialized>()
            .init_resource::<PointerCapture>()
            .init_resource::<PickOverlay>()
            .init_resource::<VisualSettings>()
            .init_resource::<CollisionControls>()
            .init_resource::<CameraRig>()
            .init_resource::<AsteroidField>()
            .add_message::<UserNotice>()
            .add_message::<ImpactCallout>()
            .add_message::<CollisionCommand>()
            .add_message::<LoadAsteroids>()
            // Message collection doesn't need egui context - can stay in Update
            .add_systems(
                Update,
                (banners::update_banner_state, impact_map::receive_callouts),
            )
            // Font initialization MUST run before any UI systems that use icons
            .add_systems(EguiPrimaryContextPass, icons::setup_fonts)
            .add_systems(
                EguiPrimaryContextPass,
                (
                    dock::dock_system,
                    info_panel::info_panel_system,
                    banners::banner_system,
                    impact_map::impact_map_system,
                    capture_pointer,
                )
                    .chain()
                    .after(icons::setup_fonts)
                    .run_if(|init: Res<icons::FontsInitialized>| init.0),
            );
    }
}

/// Record whether egui owns the pointer, for picking and the camera next frame.
fn capture_pointer(mut contexts: EguiContexts, mut capture: ResMut<PointerCapture>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let wants = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    if capture.ui_wants_pointer != wants {
        capture.ui_wants_pointer = wants;
    }
}
