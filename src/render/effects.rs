//! Impact burst drawing.
//!
//! The collision pipeline samples each live burst once per frame into
//! [`ActiveBursts`]; this module turns the samples into gizmo rings.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::animation::Burst;
use crate::collision::ActiveBursts;
use crate::types::FrameSet;

const BURST_SEGMENTS: usize = 32;

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveBursts>()
            .add_systems(Update, draw_bursts.after(FrameSet::Animate));
    }
}

/// Three rings in orthogonal planes read as a sphere from any angle.
fn draw_bursts(mut gizmos: Gizmos, bursts: Res<ActiveBursts>) {
    for burst in &bursts.0 {
        draw_burst(&mut gizmos, burst);
    }
}

fn draw_burst(gizmos: &mut Gizmos, burst: &Burst) {
    if burst.alpha <= 0.0 || burst.radius <= 0.0 {
        return;
    }

    let outer = Color::srgba(1.0, 0.6, 0.1, burst.alpha);
    for (u, v) in [(Vec3::X, Vec3::Y), (Vec3::X, Vec3::Z), (Vec3::Y, Vec3::Z)] {
        draw_circle_segments(gizmos, burst.center, u, v, burst.radius, outer, BURST_SEGMENTS);
    }

    // Hot core fades twice as fast
    let core_alpha = (burst.alpha * 2.0 - 1.0).max(0.0);
    if core_alpha > 0.0 {
        let core = Color::srgba(1.0, 1.0, 0.85, core_alpha);
        draw_circle_segments(
            gizmos,
            burst.center,
            Vec3::X,
            Vec3::Z,
            burst.radius * 0.4,
            core,
            BURST_SEGMENTS / 2,
        );
    }
}

/// Points of a circle spanned by the orthonormal axes `u` and `v`.
pub fn circle_points(center: Vec3, u: Vec3, v: Vec3, radius: f32, segments: usize) -> Vec<Vec3> {
    let step = TAU / segments.max(3) as f32;
    (0..=segments.max(3))
        .map(|i| {
            let angle = i as f32 * step;
            center + (u * angle.cos() + v * angle.sin()) * radius
        })
        .collect()
}

/// Draw a circle using line segments.
pub fn draw_circle_segments(
    gizmos: &mut Gizmos,
    center: Vec3,
    u: Vec3,
    v: Vec3,
    radius: f32,
    color: Color,
    segments: usize,
) {
    let points = circle_points(center, u, v, radius, segments);
    for pair in points.windows(2) {
        gizmos.line(pair[0], pair[1], color);
    }
}
