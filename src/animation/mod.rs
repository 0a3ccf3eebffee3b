//! Cooperative, cancellable per-frame animations.
//!
//! Every animation is an entry in one [`AnimationScheduler`], keyed by
//! asteroid and track. The frame loop calls [`AnimationScheduler::tick`] once
//! per frame; each live entry is either counting down its start delay or is
//! stepped with its accumulated elapsed time and reports what it wants applied
//! to the scene (translation, scale, burst sample, impact). The scheduler never
//! touches the world itself, which keeps cancellation and ordering testable
//! without a real frame clock.
//!
//! Uniqueness: a key with a live, non-cancelled entry rejects a second
//! `schedule` call instead of queueing it.

pub mod easing;
pub mod tweens;

#[cfg(test)]
mod proptest_animation;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bevy::prelude::*;

use crate::types::AsteroidId;

/// Which kind of animation an entry drives for its asteroid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Track {
    /// Arming delay followed by the flight toward Earth.
    Flight,
    /// Post-impact scale-up of the proxy.
    Impact,
    /// Expanding pop drawn at the impact point.
    Burst,
    /// Delay before the map callout is surfaced.
    Callout,
    /// Selection pulse.
    Pulse,
}

/// Scheduler key: one live entry per asteroid and track.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationKey {
    pub asteroid: AsteroidId,
    pub track: Track,
}

impl AnimationKey {
    pub fn new(asteroid: AsteroidId, track: Track) -> Self {
        Self { asteroid, track }
    }
}

/// Shared cancellation flag, observed at the start of every step.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a step function returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Done,
}

/// Tri-state reported for every entry touched during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Finished,
    Cancelled,
}

/// Sample of an expanding/fading pop effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burst {
    pub center: Vec3,
    pub radius: f32,
    pub alpha: f32,
}

/// Values a step wants applied to the scene this frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationOutput {
    pub translation: Option<Vec3>,
    pub scale: Option<Vec3>,
    pub burst: Option<Burst>,
    /// The subject reached its target.
    pub impact: bool,
}

/// Scene state a step reads: the subject's transform and the target as it stands this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInputs {
    pub translation: Vec3,
    pub scale: Vec3,
    pub target: Vec3,
}

/// Argument passed to a step function once per frame.
#[derive(Debug)]
pub struct AnimationFrame {
    /// Seconds since the entry's delay expired.
    pub elapsed: f32,
    pub inputs: FrameInputs,
    pub output: AnimationOutput,
}

impl AnimationFrame {
    pub fn new(elapsed: f32, inputs: FrameInputs) -> Self {
        Self {
            elapsed,
            inputs,
            output: AnimationOutput::default(),
        }
    }
}

/// A per-frame step function.
pub trait Animation: Send + Sync + 'static {
    fn step(&mut self, frame: &mut AnimationFrame) -> StepOutcome;
}

impl<F> Animation for F
where
    F: FnMut(&mut AnimationFrame) -> StepOutcome + Send + Sync + 'static,
{
    fn step(&mut self, frame: &mut AnimationFrame) -> StepOutcome {
        self(frame)
    }
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Delayed { remaining: Duration },
    Running { elapsed: Duration },
}

struct AnimationEntry {
    token: CancelToken,
    phase: Phase,
    animation: Box<dyn Animation>,
}

/// Result of ticking one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationReport {
    pub key: AnimationKey,
    pub status: AnimationStatus,
    /// This was the entry's first step (its delay just expired).
    pub started: bool,
    pub output: AnimationOutput,
}

/// Resource owning every active animation.
#[derive(Resource, Default)]
pub struct AnimationScheduler {
    entries: BTreeMap<AnimationKey, AnimationEntry>,
}

impl AnimationScheduler {
    /// Register an animation that starts stepping after `delay`.
    ///
    /// Returns `None` without touching the existing entry when the key is
    /// already live.
    pub fn schedule(
        &mut self,
        key: AnimationKey,
        delay: Duration,
        animation: impl Animation,
    ) -> Option<CancelToken> {
        if self.is_active(&key) {
            debug!("Animation {:?} for {} already active", key.track, key.asteroid);
            return None;
        }

        let token = CancelToken::default();
        self.entries.insert(
            key,
            AnimationEntry {
                token: token.clone(),
                phase: Phase::Delayed { remaining: delay },
                animation: Box::new(animation),
            },
        );
        Some(token)
    }

    /// Cancel one entry: clears a pending delay or stops an in-flight step.
    pub fn cancel(&mut self, key: &AnimationKey) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every entry belonging to an asteroid. Returns how many were live.
    pub fn cancel_asteroid(&mut self, asteroid: &AsteroidId) -> usize {
        let keys: Vec<AnimationKey> = self
            .entries
            .keys()
            .filter(|key| &key.asteroid == asteroid)
            .cloned()
            .collect();
        keys.iter().filter(|key| self.cancel(key)).count()
    }

    /// The key has an entry that has not been cancelled.
    pub fn is_active(&self, key: &AnimationKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.token.is_cancelled())
    }

    /// The key is live but still waiting for its delay to expire.
    pub fn is_delayed(&self, key: &AnimationKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| matches!(entry.phase, Phase::Delayed { .. }))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance all entries by one frame, in key order.
    ///
    /// `probe` supplies the scene state for a key's subject; an entry whose
    /// subject no longer exists is cancelled. Entries still counting down
    /// their delay produce no report.
    pub fn tick(
        &mut self,
        dt: Duration,
        mut probe: impl FnMut(&AnimationKey) -> Option<FrameInputs>,
    ) -> Vec<AnimationReport> {
        let mut reports = Vec::new();
        let mut retired = Vec::new();

        for (key, entry) in self.entries.iter_mut() {
            if entry.token.is_cancelled() {
                reports.push(AnimationReport {
                    key: key.clone(),
                    status: AnimationStatus::Cancelled,
                    started: false,
                    output: AnimationOutput::default(),
                });
                retired.push(key.clone());
                continue;
            }

            let phase = entry.phase;
            let (elapsed, started) = match phase {
                Phase::Delayed { remaining } if remaining > dt => {
                    entry.phase = Phase::Delayed {
                        remaining: remaining - dt,
                    };
                    continue;
                }
                Phase::Delayed { remaining } => (dt - remaining, true),
                Phase::Running { elapsed } => (elapsed + dt, false),
            };
            entry.phase = Phase::Running { elapsed };

            let Some(inputs) = probe(key) else {
                warn!(
                    "Animation {:?} for {} lost its subject, cancelling",
                    key.track, key.asteroid
                );
                entry.token.cancel();
                reports.push(AnimationReport {
                    key: key.clone(),
                    status: AnimationStatus::Cancelled,
                    started,
                    output: AnimationOutput::default(),
                });
                retired.push(key.clone());
                continue;
            };

            let mut frame = AnimationFrame::new(elapsed.as_secs_f32(), inputs);
            let status = match entry.animation.step(&mut frame) {
                StepOutcome::Continue => AnimationStatus::Running,
                StepOutcome::Done => {
                    retired.push(key.clone());
                    AnimationStatus::Finished
                }
            };

            reports.push(AnimationReport {
                key: key.clone(),
                status,
                started,
                output: frame.output,
            });
        }

        for key in retired {
            self.entries.remove(&key);
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str, track: Track) -> AnimationKey {
        AnimationKey::new(AsteroidId::new(id), track)
    }

    fn inputs() -> FrameInputs {
        FrameInputs {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            target: Vec3::X,
        }
    }

    fn mover() -> impl Animation {
        |frame: &mut AnimationFrame| {
            frame.output.translation = Some(Vec3::splat(frame.elapsed));
            StepOutcome::Continue
        }
    }

    const FRAME: Duration = Duration::from_millis(100);

    #[test]
    fn test_second_schedule_is_rejected() {
        let mut scheduler = AnimationScheduler::default();
        assert!(scheduler.schedule(key("a", Track::Flight), FRAME, mover()).is_some());
        assert!(scheduler.schedule(key("a", Track::Flight), FRAME, mover()).is_none());
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_different_tracks_coexist() {
        let mut scheduler = AnimationScheduler::default();
        assert!(scheduler.schedule(key("a", Track::Flight), FRAME, mover()).is_some());
        assert!(scheduler.schedule(key("a", Track::Pulse), FRAME, mover()).is_some());
        assert!(scheduler.schedule(key("b", Track::Flight), FRAME, mover()).is_some());
        assert_eq!(scheduler.len(), 3);
    }

    #[test]
    fn test_delay_suppresses_steps() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.schedule(key("a", Track::Flight), Duration::from_millis(250), mover());

        assert!(scheduler.tick(FRAME, |_| Some(inputs())).is_empty());
        assert!(scheduler.tick(FRAME, |_| Some(inputs())).is_empty());
        assert!(scheduler.is_delayed(&key("a", Track::Flight)));

        let reports = scheduler.tick(FRAME, |_| Some(inputs()));
        assert_eq!(reports.len(), 1);
        assert!(reports[0].started);
        // Overshoot past the delay is carried into elapsed time
        let elapsed = reports[0].output.translation.unwrap().x;
        assert!((elapsed - 0.05).abs() < 1e-6);

        let reports = scheduler.tick(FRAME, |_| Some(inputs()));
        assert!(!reports[0].started);
    }

    #[test]
    fn test_cancel_during_delay_never_steps() {
        let mut scheduler = AnimationScheduler::default();
        let k = key("a", Track::Flight);
        scheduler.schedule(k.clone(), Duration::from_millis(150), mover());

        scheduler.tick(FRAME, |_| Some(inputs()));
        assert!(scheduler.cancel(&k));
        assert!(!scheduler.is_active(&k));

        for _ in 0..10 {
            let reports = scheduler.tick(FRAME, |_| Some(inputs()));
            assert!(reports.iter().all(|r| r.output.translation.is_none()));
        }
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_external_token_cancel_is_observed_before_step() {
        let mut scheduler = AnimationScheduler::default();
        let k = key("a", Track::Flight);
        let token = scheduler.schedule(k.clone(), Duration::ZERO, mover()).unwrap();

        scheduler.tick(FRAME, |_| Some(inputs()));
        token.cancel();

        let reports = scheduler.tick(FRAME, |_| Some(inputs()));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, AnimationStatus::Cancelled);
        assert!(reports[0].output.translation.is_none());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancelled_key_can_be_rescheduled() {
        let mut scheduler = AnimationScheduler::default();
        let k = key("a", Track::Flight);
        let token = scheduler.schedule(k.clone(), FRAME, mover()).unwrap();
        token.cancel();
        assert!(scheduler.schedule(k, FRAME, mover()).is_some());
    }

    #[test]
    fn test_done_removes_entry() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.schedule(key("a", Track::Callout), Duration::ZERO, |_: &mut AnimationFrame| {
            StepOutcome::Done
        });

        let reports = scheduler.tick(FRAME, |_| Some(inputs()));
        assert_eq!(reports[0].status, AnimationStatus::Finished);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_missing_subject_cancels() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.schedule(key("gone", Track::Flight), Duration::ZERO, mover());

        let reports = scheduler.tick(FRAME, |_| None);
        assert_eq!(reports[0].status, AnimationStatus::Cancelled);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel_asteroid_only_hits_that_asteroid() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.schedule(key("a", Track::Flight), FRAME, mover());
        scheduler.schedule(key("a", Track::Pulse), FRAME, mover());
        scheduler.schedule(key("b", Track::Flight), FRAME, mover());

        assert_eq!(scheduler.cancel_asteroid(&AsteroidId::new("a")), 2);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.is_active(&key("b", Track::Flight)));
    }

    #[test]
    fn test_reports_in_key_order() {
        let mut scheduler = AnimationScheduler::default();
        scheduler.schedule(key("b", Track::Flight), Duration::ZERO, mover());
        scheduler.schedule(key("a", Track::Pulse), Duration::ZERO, mover());
        scheduler.schedule(key("a", Track::Flight), Duration::ZERO, mover());

        let order: Vec<_> = scheduler
            .tick(FRAME, |_| Some(inputs()))
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(
            order,
            vec![key("a", Track::Flight), key("a", Track::Pulse), key("b", Track::Flight)]
        );
    }
}
