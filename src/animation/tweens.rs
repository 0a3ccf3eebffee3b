//! Concrete animations driven by the scheduler.

use std::f32::consts::TAU;

use bevy::math::Vec3;

use super::easing::{Easing, lerp_exact, progress};
use super::{Animation, AnimationFrame, Burst, StepOutcome};

/// Flight of a proxy toward a target.
///
/// The path is captured on the first step: start is the subject's translation
/// and end is the target's translation at that moment. Every step also checks
/// the distance to that captured end; crossing `collision_radius` ends the
/// flight with an impact regardless of remaining progress. Reaching `t = 1`
/// leaves the subject exactly at the captured end and also reports impact.
#[derive(Clone, Debug)]
pub struct FlightTween {
    pub duration: f32,
    pub collision_radius: f32,
    path: Option<(Vec3, Vec3)>,
}

impl FlightTween {
    pub fn new(duration: f32, collision_radius: f32) -> Self {
        Self {
            duration,
            collision_radius,
            path: None,
        }
    }
}

impl Animation for FlightTween {
    fn step(&mut self, frame: &mut AnimationFrame) -> StepOutcome {
        let (start, end) = *self
            .path
            .get_or_insert((frame.inputs.translation, frame.inputs.target));

        let t = progress(frame.elapsed, self.duration);
        let position = lerp_exact(start, end, Easing::QuadInOut.apply(t));
        frame.output.translation = Some(position);

        if position.distance(end) < self.collision_radius || t >= 1.0 {
            frame.output.impact = true;
            return StepOutcome::Done;
        }
        StepOutcome::Continue
    }
}

/// Uniform scale change relative to the scale at the first step.
#[derive(Clone, Debug)]
pub struct ScaleTween {
    pub factor: f32,
    pub duration: f32,
    pub easing: Easing,
    from: Option<Vec3>,
}

impl ScaleTween {
    pub fn by_factor(factor: f32, duration: f32, easing: Easing) -> Self {
        Self {
            factor,
            duration,
            easing,
            from: None,
        }
    }
}

impl Animation for ScaleTween {
    fn step(&mut self, frame: &mut AnimationFrame) -> StepOutcome {
        let from = *self.from.get_or_insert(frame.inputs.scale);
        let t = progress(frame.elapsed, self.duration);
        frame.output.scale = Some(lerp_exact(from, from * self.factor, self.easing.apply(t)));

        if t >= 1.0 {
            StepOutcome::Done
        } else {
            StepOutcome::Continue
        }
    }
}

/// Expanding, fading pop at a fixed point.
#[derive(Clone, Debug)]
pub struct BurstEffect {
    pub center: Vec3,
    pub max_radius: f32,
    pub duration: f32,
}

impl BurstEffect {
    pub fn new(center: Vec3, max_radius: f32, duration: f32) -> Self {
        Self {
            center,
            max_radius,
            duration,
        }
    }
}

impl Animation for BurstEffect {
    fn step(&mut self, frame: &mut AnimationFrame) -> StepOutcome {
        let t = progress(frame.elapsed, self.duration);
        frame.output.burst = Some(Burst {
            center: self.center,
            radius: self.max_radius * Easing::CubicOut.apply(t),
            alpha: 1.0 - t,
        });

        if t >= 1.0 {
            StepOutcome::Done
        } else {
            StepOutcome::Continue
        }
    }
}

/// Endless sinusoidal scale pulse around a base scale.
#[derive(Clone, Debug)]
pub struct PulseTween {
    pub base: Vec3,
    pub amplitude: f32,
    pub period: f32,
}

impl PulseTween {
    pub fn new(base: Vec3, amplitude: f32, period: f32) -> Self {
        Self {
            base,
            amplitude,
            period,
        }
    }

    pub fn scale_at(&self, elapsed: f32) -> Vec3 {
        if self.period <= 0.0 {
            return self.base;
        }
        self.base * (1.0 + self.amplitude * (TAU * elapsed / self.period).sin())
    }
}

impl Animation for PulseTween {
    fn step(&mut self, frame: &mut AnimationFrame) -> StepOutcome {
        frame.output.scale = Some(self.scale_at(frame.elapsed));
        StepOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameInputs;

    fn frame_at(elapsed: f32, translation: Vec3, target: Vec3) -> AnimationFrame {
        AnimationFrame::new(
            elapsed,
            FrameInputs {
                translation,
                scale: Vec3::splat(0.03),
                target,
            },
        )
    }

    #[test]
    fn test_flight_ends_exactly_at_captured_target() {
        let start = Vec3::new(6000.0, 1200.0, -3000.0);
        let earth = Vec3::new(812.5, 0.0, 133.25);
        let mut flight = FlightTween::new(5.0, 0.0);

        let mut frame = frame_at(0.0, start, earth);
        assert_eq!(flight.step(&mut frame), StepOutcome::Continue);
        assert_eq!(frame.output.translation, Some(start));

        let mut frame = frame_at(5.0, start, earth);
        assert_eq!(flight.step(&mut frame), StepOutcome::Done);
        assert_eq!(frame.output.translation, Some(earth));
        assert!(frame.output.impact);
    }

    #[test]
    fn test_flight_midpoint_is_halfway() {
        let mut flight = FlightTween::new(2.0, 0.0);
        let mut frame = frame_at(0.0, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        flight.step(&mut frame);

        let mut frame = frame_at(1.0, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        flight.step(&mut frame);
        assert_eq!(frame.output.translation, Some(Vec3::new(50.0, 0.0, 0.0)));
        assert!(!frame.output.impact);
    }

    #[test]
    fn test_flight_threshold_short_circuits() {
        let mut flight = FlightTween::new(10.0, 30.0);
        let target = Vec3::new(100.0, 0.0, 0.0);
        let mut frame = frame_at(0.0, Vec3::ZERO, target);
        flight.step(&mut frame);

        // At t = 0.8 eased progress is 0.92, i.e. 8 units from the target
        let mut frame = frame_at(8.0, Vec3::ZERO, target);
        assert_eq!(flight.step(&mut frame), StepOutcome::Done);
        assert!(frame.output.impact);
        assert!(frame.output.translation.unwrap().x < 100.0);
    }

    #[test]
    fn test_flight_path_is_fixed_after_first_step() {
        let mut flight = FlightTween::new(1.0, 0.0);
        let mut frame = frame_at(0.0, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        flight.step(&mut frame);

        // Target moved since; the path still ends where it was captured
        let mut frame = frame_at(1.0, Vec3::splat(3.0), Vec3::new(20.0, 0.0, 0.0));
        flight.step(&mut frame);
        assert_eq!(frame.output.translation, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_threshold_uses_captured_destination() {
        let mut flight = FlightTween::new(10.0, 30.0);
        let mut frame = frame_at(0.0, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        flight.step(&mut frame);

        // The live target has moved far away; proximity to the captured end
        // still counts as the impact
        let mut frame = frame_at(8.0, Vec3::ZERO, Vec3::new(900.0, 0.0, 0.0));
        assert_eq!(flight.step(&mut frame), StepOutcome::Done);
        assert!(frame.output.impact);
        assert_eq!(frame.output.translation, Some(Vec3::new(92.0, 0.0, 0.0)));
    }

    #[test]
    fn test_scale_tween_from_first_step() {
        let mut tween = ScaleTween::by_factor(3.0, 0.6, Easing::CubicOut);
        let mut frame = frame_at(0.0, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(tween.step(&mut frame), StepOutcome::Continue);
        assert_eq!(frame.output.scale, Some(Vec3::splat(0.03)));

        let mut frame = frame_at(0.6, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(tween.step(&mut frame), StepOutcome::Done);
        assert_eq!(frame.output.scale, Some(Vec3::splat(0.03) * 3.0));
    }

    #[test]
    fn test_burst_grows_and_fades() {
        let mut burst = BurstEffect::new(Vec3::ONE, 40.0, 1.0);
        let mut early = frame_at(0.1, Vec3::ZERO, Vec3::ZERO);
        burst.step(&mut early);
        let mut late = frame_at(0.9, Vec3::ZERO, Vec3::ZERO);
        burst.step(&mut late);

        let early = early.output.burst.unwrap();
        let late = late.output.burst.unwrap();
        assert!(late.radius > early.radius);
        assert!(late.alpha < early.alpha);
        assert_eq!(late.center, Vec3::ONE);

        let mut end = frame_at(1.0, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(burst.step(&mut end), StepOutcome::Done);
    }

    #[test]
    fn test_pulse_never_finishes_and_returns_to_base() {
        let mut pulse = PulseTween::new(Vec3::splat(2.0), 0.25, 1.0);
        for i in 0..20 {
            let mut frame = frame_at(i as f32 * 0.1, Vec3::ZERO, Vec3::ZERO);
            assert_eq!(pulse.step(&mut frame), StepOutcome::Continue);
        }
        assert_eq!(pulse.scale_at(0.0), Vec3::splat(2.0));
        assert!((pulse.scale_at(0.25).x - 2.5).abs() < 1e-5);
    }
}
