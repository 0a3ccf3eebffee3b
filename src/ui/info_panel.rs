//! Info overlay next to the last pick.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::picking::PickOverlay;

use super::icons;

/// Offset from the click so the panel does not sit under the pointer.
const PANEL_OFFSET: egui::Vec2 = egui::vec2(16.0, 16.0);

pub fn info_panel_system(mut contexts: EguiContexts, mut overlay: ResMut<PickOverlay>) {
    let Some(content) = overlay.0.as_ref() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let anchor = egui::pos2(content.screen_position.x, content.screen_position.y) + PANEL_OFFSET;
    let mut close = false;

    egui::Area::new(egui::Id::new("pick_info"))
        .fixed_pos(anchor)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .fill(egui::Color32::from_rgba_premultiplied(26, 26, 36, 235))
                .show(ui, |ui| {
                    ui.set_max_width(300.0);
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(format!("{} {}", icons::INFO, content.title))
                                .strong()
                                .size(15.0),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button(icons::CLOSE).clicked() {
                                close = true;
                            }
                        });
                    });
                    if !content.detail.is_empty() {
                        ui.separator();
                        ui.label(egui::RichText::new(&content.detail).size(13.0));
                    }
                });
        });

    if close {
        overlay.0 = None;
    }
}
