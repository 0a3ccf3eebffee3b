//! Unified dock (bottom bar) for all primary controls.
//!
//! The dock provides a single horizontal strip with:
//! - Revolve toggle
//! - Color-blind palette toggle
//! - Collide-with-Earth toggle and the reset control after an impact
//! - Asteroid load progress
//! - Reload, camera home and help buttons

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::asteroid::AsteroidField;
use crate::asteroid::loader::{LoadAsteroids, LoadProgress, LoadState};
use crate::camera::CameraRig;
use crate::collision::{CollisionCommand, CollisionControls};
use crate::types::VisualSettings;

use super::icons;

/// Colors for the dock UI.
mod colors {
    use bevy_egui::egui::Color32;

    pub const DOCK_BG: Color32 = Color32::from_rgba_premultiplied(26, 26, 36, 240);
    pub const ACTIVE: Color32 = Color32::from_rgb(85, 221, 136);
    pub const INACTIVE: Color32 = Color32::from_rgb(120, 120, 130);
    pub const PAUSED: Color32 = Color32::from_rgb(221, 170, 85);
    pub const DANGER: Color32 = Color32::from_rgb(224, 85, 85);
    pub const TEXT: Color32 = Color32::from_rgb(220, 220, 230);
}

/// Resource for help tooltip visibility.
#[derive(Resource, Default)]
pub struct HelpTooltipState {
    pub visible: bool,
}

/// Text next to the progress bar.
pub fn progress_caption(progress: &LoadProgress) -> String {
    let date = progress.date.as_deref().unwrap_or("today");
    match &progress.state {
        LoadState::Idle => "Asteroids not loaded".to_string(),
        LoadState::Loading if progress.total == 0 => format!("Fetching asteroids for {}", date),
        LoadState::Loading => format!("Loading asteroids {}/{}", progress.loaded, progress.total),
        LoadState::Complete => match progress.total {
            0 => format!("No asteroids for {}", date),
            1 => format!("1 asteroid for {}", date),
            n => format!("{} asteroids for {}", n, date),
        },
        LoadState::Failed(reason) => format!("Load failed: {}", reason),
    }
}

/// What the collide toggle asks for when flipped to `on`.
pub fn toggle_command(on: bool, controls: &CollisionControls) -> Option<CollisionCommand> {
    if on {
        Some(CollisionCommand::Arm)
    } else {
        controls.armed.clone().map(CollisionCommand::Disarm)
    }
}

/// System that renders the unified dock at the bottom.
#[allow(clippy::too_many_arguments)]
pub fn dock_system(
    mut contexts: EguiContexts,
    mut settings: ResMut<VisualSettings>,
    mut controls: ResMut<CollisionControls>,
    mut help_state: ResMut<HelpTooltipState>,
    mut rig: ResMut<CameraRig>,
    field: Res<AsteroidField>,
    mut collision_commands: MessageWriter<CollisionCommand>,
    mut load_requests: MessageWriter<LoadAsteroids>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::TopBottomPanel::bottom("dock")
        .exact_height(56.0)
        .frame(
            egui::Frame::NONE
                .fill(colors::DOCK_BG)
                .inner_margin(egui::Margin::symmetric(20, 10)),
        )
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing.x = 16.0;

                render_revolve_toggle(ui, &mut settings);
                ui.separator();

                let palette = egui::RichText::new(format!("{} Color-blind palette", icons::PALETTE))
                    .size(14.0)
                    .color(colors::TEXT);
                ui.checkbox(&mut settings.accessible_palette, palette);
                ui.separator();

                render_collision_controls(ui, &mut controls, &field, &mut collision_commands);
                ui.separator();

                render_progress(ui, field.progress());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.spacing_mut().item_spacing.x = 10.0;

                    render_help_button(ui, &mut help_state);

                    let home = egui::Button::new(egui::RichText::new(icons::HOME).size(18.0))
                        .min_size(egui::vec2(32.0, 32.0));
                    if ui.add(home).on_hover_text("Camera home (H)").clicked() {
                        rig.go_home();
                    }

                    let reload = egui::Button::new(egui::RichText::new(icons::RELOAD).size(18.0))
                        .min_size(egui::vec2(32.0, 32.0));
                    if ui
                        .add_enabled(field.progress().state != LoadState::Loading, reload)
                        .on_hover_text("Reload today's asteroids (L)")
                        .clicked()
                    {
                        load_requests.write(LoadAsteroids);
                    }
                });
            });
        });

    if help_state.visible {
        render_help_overlay(ctx);
    }
}

fn render_revolve_toggle(ui: &mut egui::Ui, settings: &mut VisualSettings) {
    let (icon, color, tooltip) = if settings.revolve {
        (icons::PAUSE, colors::PAUSED, "Stop planets revolving (Space)")
    } else {
        (icons::PLAY, colors::ACTIVE, "Revolve planets (Space)")
    };

    let button = egui::Button::new(egui::RichText::new(icon).size(22.0).color(color))
        .min_size(egui::vec2(40.0, 36.0));

    if ui.add(button).on_hover_text(tooltip).clicked() {
        settings.revolve = !settings.revolve;
    }
}

fn render_collision_controls(
    ui: &mut egui::Ui,
    controls: &mut CollisionControls,
    field: &AsteroidField,
    commands: &mut MessageWriter<CollisionCommand>,
) {
    let selected = field
        .selected_record()
        .map_or("No asteroid selected", |record| record.name.as_str());
    ui.label(
        egui::RichText::new(format!("{} {}", icons::ASTEROID, selected))
            .size(14.0)
            .color(colors::TEXT),
    );

    let mut toggle = controls.arm_toggle;
    let text = egui::RichText::new(format!("{} Collide with Earth", icons::TARGET))
        .size(14.0)
        .color(if toggle { colors::DANGER } else { colors::TEXT });
    if ui.checkbox(&mut toggle, text).changed() {
        if let Some(command) = toggle_command(toggle, controls) {
            commands.write(command);
        }
        controls.arm_toggle = toggle;
    }

    let Some(target) = controls.reset_target.clone() else {
        return;
    };
    let name = field.get(&target).map_or(target.as_str(), |r| r.name.as_str());
    let button = egui::Button::new(
        egui::RichText::new(format!("{} Reset {}", icons::RESET, name))
            .size(14.0)
            .color(colors::TEXT),
    );
    if ui.add(button).on_hover_text("Put the asteroid back").clicked() {
        commands.write(CollisionCommand::Reset(target));
    }
}

fn render_progress(ui: &mut egui::Ui, progress: &LoadProgress) {
    let caption = progress_caption(progress);
    match progress.state {
        LoadState::Loading => {
            ui.add(
                egui::ProgressBar::new(progress.fraction())
                    .desired_width(220.0)
                    .text(caption),
            );
        }
        LoadState::Failed(_) => {
            ui.label(
                egui::RichText::new(format!("{} {}", icons::WARNING, caption))
                    .size(14.0)
                    .color(colors::DANGER),
            );
        }
        LoadState::Idle | LoadState::Complete => {
            ui.label(egui::RichText::new(caption).size(14.0).color(colors::INACTIVE));
        }
    }
}

fn render_help_button(ui: &mut egui::Ui, help_state: &mut HelpTooltipState) {
    let button = egui::Button::new(egui::RichText::new(icons::HELP).size(18.0))
        .min_size(egui::vec2(32.0, 32.0));

    let response = ui.add(button);

    if response.hovered() || help_state.visible {
        help_state.visible = response.hovered();
    }

    if response.clicked() {
        help_state.visible = !help_state.visible;
    }
}

/// Render the help overlay showing keyboard shortcuts.
fn render_help_overlay(ctx: &egui::Context) {
    egui::Window::new("Keyboard Shortcuts")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-70.0, -70.0))
        .frame(
            egui::Frame::NONE
                .fill(egui::Color32::from_rgba_premultiplied(26, 26, 36, 245))
                .inner_margin(egui::Margin::same(16))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 60, 80))),
        )
        .show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;

            let shortcuts = [
                ("Space", "Toggle planet revolution"),
                ("L", "Reload today's asteroids"),
                ("Esc", "Clear asteroid selection"),
                ("H", "Camera home"),
                ("Drag", "Orbit the camera"),
                ("Scroll", "Zoom"),
                ("Click", "Show info / select asteroid"),
            ];

            egui::Grid::new("shortcuts_grid")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .show(ui, |ui| {
                    for (key, action) in shortcuts {
                        ui.label(egui::RichText::new(key).strong().monospace().size(14.0));
                        ui.label(egui::RichText::new(action).size(14.0));
                        ui.end_row();
                    }
                });
        });
}
