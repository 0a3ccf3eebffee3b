//! Property-based tests for easing and the scheduler using proptest.

use std::time::Duration;

use bevy::math::Vec3;
use proptest::prelude::*;

use super::easing::{Easing, lerp_exact};
use super::{AnimationFrame, AnimationKey, AnimationScheduler, FrameInputs, StepOutcome, Track};
use crate::types::AsteroidId;

fn easing_strategy() -> impl Strategy<Value = Easing> {
    prop_oneof![
        Just(Easing::Linear),
        Just(Easing::QuadInOut),
        Just(Easing::CubicOut),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Eased progress stays in [0, 1] and never decreases.
    #[test]
    fn prop_easing_monotonic_in_unit_range(
        easing in easing_strategy(),
        a in 0.0f32..1.0,
        b in 0.0f32..1.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (ea, eb) = (easing.apply(lo), easing.apply(hi));
        prop_assert!((0.0..=1.0).contains(&ea));
        prop_assert!((0.0..=1.0).contains(&eb));
        prop_assert!(ea <= eb + 1e-6);
    }

    /// Interpolated points stay inside the bounding box of the endpoints.
    #[test]
    fn prop_lerp_stays_between_endpoints(
        ax in -1e4f32..1e4, ay in -1e4f32..1e4, az in -1e4f32..1e4,
        bx in -1e4f32..1e4, by in -1e4f32..1e4, bz in -1e4f32..1e4,
        t in 0.0f32..=1.0,
    ) {
        let a = Vec3::new(ax, ay, az);
        let b = Vec3::new(bx, by, bz);
        let p = lerp_exact(a, b, t);
        let min = a.min(b) - Vec3::splat(1e-2);
        let max = a.max(b) + Vec3::splat(1e-2);
        prop_assert!(p.cmpge(min).all() && p.cmple(max).all(), "{:?} outside {:?}..{:?}", p, a, b);
    }

    /// Whatever the interleaving of schedule and cancel calls, a key never
    /// holds more than one entry and a live key rejects a new schedule.
    #[test]
    fn prop_one_entry_per_key(ops in proptest::collection::vec((0u8..3, 0u8..2, any::<bool>()), 1..60)) {
        let mut scheduler = AnimationScheduler::default();
        let mut live = std::collections::BTreeSet::new();

        for (asteroid, track, schedule) in ops {
            let key = AnimationKey::new(
                AsteroidId::new(format!("{}", asteroid)),
                if track == 0 { Track::Flight } else { Track::Pulse },
            );
            if schedule {
                let accepted = scheduler
                    .schedule(key.clone(), Duration::from_millis(50), |_: &mut AnimationFrame| {
                        StepOutcome::Continue
                    })
                    .is_some();
                prop_assert_eq!(accepted, !live.contains(&key));
                live.insert(key);
            } else {
                prop_assert_eq!(scheduler.cancel(&key), live.remove(&key));
            }
            prop_assert_eq!(scheduler.len(), live.len());
        }

        let reports = scheduler.tick(Duration::from_millis(100), |_| {
            Some(FrameInputs { translation: Vec3::ZERO, scale: Vec3::ONE, target: Vec3::ZERO })
        });
        prop_assert_eq!(reports.len(), live.len());
    }
}
