//! Impact map callout.
//!
//! After an impact settles the collision pipeline sends an [`ImpactCallout`];
//! this window shows the site on a flat world map with severity rings sized
//! from the asteroid's estimated diameter.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::asteroid::AsteroidField;
use crate::collision::ImpactCallout;

use super::icons;

const MAP_SIZE: egui::Vec2 = egui::vec2(480.0, 240.0);

/// Ring radii in degrees of arc, innermost (most severe) first.
pub fn severity_rings(diameter_m: f64) -> [f32; 3] {
    let base = (diameter_m / 50.0).clamp(1.0, 20.0) as f32;
    [base, base * 2.0, base * 3.0]
}

/// Latitude/longitude in degrees to a point inside `rect`.
pub fn project(lat: f64, lon: f64, rect: egui::Rect) -> egui::Pos2 {
    let x = ((lon.clamp(-180.0, 180.0) + 180.0) / 360.0) as f32;
    let y = ((90.0 - lat.clamp(-90.0, 90.0)) / 180.0) as f32;
    egui::pos2(
        rect.left() + x * rect.width(),
        rect.top() + y * rect.height(),
    )
}

#[derive(Resource, Default, Debug)]
pub struct ImpactMapState {
    pub callout: Option<ImpactCallout>,
}

/// Keep the latest callout.
pub fn receive_callouts(
    mut callouts: MessageReader<ImpactCallout>,
    mut state: ResMut<ImpactMapState>,
) {
    if let Some(callout) = callouts.read().last() {
        state.callout = Some(callout.clone());
    }
}

pub fn impact_map_system(
    mut contexts: EguiContexts,
    mut state: ResMut<ImpactMapState>,
    field: Res<AsteroidField>,
) {
    let Some(callout) = state.callout.clone() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let record = field.get(&callout.asteroid_id);
    let name = record.map_or(callout.asteroid_id.as_str(), |r| r.name.as_str());
    let rings = severity_rings(record.map_or(0.0, |r| r.diameter.estimate()));
    let mut open = true;

    egui::Window::new(format!("{} Impact site", icons::MAP_PIN))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(name).strong().size(15.0));
            ui.label(format!("{:.2}°, {:.2}°", callout.lat, callout.lon));
            ui.add_space(6.0);

            let (response, painter) = ui.allocate_painter(MAP_SIZE, egui::Sense::hover());
            let rect = response.rect;
            painter.rect_filled(rect, egui::CornerRadius::ZERO, egui::Color32::from_rgb(18, 38, 66));

            let grid = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(120, 160, 200, 60));
            for lon in (-180..=180).step_by(30) {
                let top = project(90.0, lon as f64, rect);
                let bottom = project(-90.0, lon as f64, rect);
                painter.line_segment([top, bottom], grid);
            }
            for lat in (-90..=90).step_by(30) {
                let left = project(lat as f64, -180.0, rect);
                let right = project(lat as f64, 180.0, rect);
                painter.line_segment([left, right], grid);
            }

            let site = project(callout.lat, callout.lon, rect);
            let pixels_per_degree = rect.width() / 360.0;
            let colors = [
                egui::Color32::from_rgb(224, 60, 40),
                egui::Color32::from_rgb(235, 140, 40),
                egui::Color32::from_rgb(240, 210, 80),
            ];
            for (radius, color) in rings.iter().zip(colors).rev() {
                painter.circle_stroke(site, radius * pixels_per_degree, egui::Stroke::new(2.0, color));
            }
            painter.circle_filled(site, 4.0, egui::Color32::WHITE);
        });

    if !open {
        state.callout = None;
    }
}
