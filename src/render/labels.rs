//! Asteroid name labels using egui for text rendering.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use crate::asteroid::AsteroidField;
use crate::camera::MainCamera;
use crate::types::VisualSettings;

/// Plugin providing asteroid label rendering.
pub struct LabelPlugin;

impl Plugin for LabelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LabelSettings>()
            .add_systems(EguiPrimaryContextPass, draw_asteroid_labels);
    }
}

/// Settings for label rendering.
#[derive(Resource)]
pub struct LabelSettings {
    pub visible: bool,
    /// Offset from the proxy center in screen pixels.
    pub offset: f32,
    pub font_size: f32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            visible: true,
            offset: 12.0,
            font_size: 13.0,
        }
    }
}

pub fn to_color32(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(
        channel(srgba.red),
        channel(srgba.green),
        channel(srgba.blue),
        channel(srgba.alpha),
    )
}

/// Draw a label next to every visible asteroid proxy.
fn draw_asteroid_labels(
    mut contexts: EguiContexts,
    field: Res<AsteroidField>,
    proxies: Query<&GlobalTransform>,
    camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    settings: Res<LabelSettings>,
    visual: Res<VisualSettings>,
) {
    if !settings.visible || field.is_empty() {
        return;
    }
    let Ok((camera, camera_transform)) = camera.single() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("asteroid_labels"))
        .fixed_pos(egui::pos2(0.0, 0.0))
        .order(egui::Order::Background)
        .interactable(false)
        .show(ctx, |ui| {
            let painter = ui.painter();
            let font = egui::FontId::proportional(settings.font_size);

            for record in field.iter().filter(|r| r.visible) {
                let Some(transform) = record.proxy_entity().and_then(|e| proxies.get(e).ok())
                else {
                    continue;
                };
                // Behind the camera or off screen
                let Ok(screen) = camera.world_to_viewport(camera_transform, transform.translation())
                else {
                    continue;
                };

                let position = egui::pos2(screen.x + settings.offset, screen.y - settings.offset);
                painter.text(
                    position + egui::vec2(1.0, 1.0),
                    egui::Align2::LEFT_BOTTOM,
                    &record.name,
                    font.clone(),
                    egui::Color32::from_rgba_unmultiplied(0, 0, 0, 180),
                );
                painter.text(
                    position,
                    egui::Align2::LEFT_BOTTOM,
                    &record.name,
                    font.clone(),
                    to_color32(visual.hazard_color(record.hazardous)),
                );
            }
        });
}
