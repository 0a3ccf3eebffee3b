//! Notice banners: short non-blocking messages at the top of the screen.
//!
//! Anything in the app can send a [`UserNotice`]; banners stack, newest last,
//! and expire on their own.

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::types::UserNotice;

use super::icons;

/// Seconds a banner stays up.
pub const NOTICE_LIFETIME: f32 = 4.0;
/// Older banners are dropped beyond this many.
pub const MAX_NOTICES: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub text: String,
    pub expires_at: f32,
}

#[derive(Resource, Default, Debug)]
pub struct BannerState {
    pub banners: VecDeque<Banner>,
}

impl BannerState {
    pub fn push(&mut self, text: impl Into<String>, now: f32) {
        let text = text.into();
        // Repeats refresh the existing banner instead of stacking
        self.banners.retain(|banner| banner.text != text);
        self.banners.push_back(Banner {
            text,
            expires_at: now + NOTICE_LIFETIME,
        });
        while self.banners.len() > MAX_NOTICES {
            self.banners.pop_front();
        }
    }

    pub fn expire(&mut self, now: f32) {
        self.banners.retain(|banner| banner.expires_at > now);
    }
}

/// Collect this frame's notices and drop expired banners.
pub fn update_banner_state(
    time: Res<Time>,
    mut notices: MessageReader<UserNotice>,
    mut state: ResMut<BannerState>,
) {
    let now = time.elapsed_secs();
    for notice in notices.read() {
        state.push(notice.text.clone(), now);
    }
    state.expire(now);
}

pub fn banner_system(mut contexts: EguiContexts, state: Res<BannerState>) {
    if state.banners.is_empty() {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("notice_banners"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 16.0))
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            for banner in &state.banners {
                egui::Frame::NONE
                    .fill(egui::Color32::from_rgba_premultiplied(30, 50, 80, 240))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(85, 153, 221)))
                    .inner_margin(egui::Margin::symmetric(14, 8))
                    .corner_radius(egui::CornerRadius::same(6))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(format!("{} {}", icons::WARNING, banner.text))
                                .size(14.0)
                                .color(egui::Color32::from_rgb(220, 220, 230)),
                        );
                    });
                ui.add_space(6.0);
            }
        });
}
