//! Asteroid-Earth collision pipeline.
//!
//! Each asteroid moves through Idle -> Armed -> Flying -> Collided. Arming
//! schedules a delayed flight toward Earth; the first impact report turns it
//! Collided, pops a burst at the impact point and scales the proxy up. When
//! the scale-up finishes the proxy is hidden, the reset control appears and
//! after a short delay the map callout is raised. Disarm returns an armed or
//! flying asteroid to Idle; reset returns a collided one to Idle with its
//! original transform.
//!
//! The state transitions are plain functions over [`AsteroidField`] and
//! [`AnimationScheduler`] so they can be tested without a frame clock.

use std::time::Duration;

use bevy::prelude::*;

use crate::animation::easing::Easing;
use crate::animation::tweens::{BurstEffect, FlightTween, ScaleTween};
use crate::animation::{
    AnimationFrame, AnimationKey, AnimationReport, AnimationScheduler, AnimationStatus, Burst,
    FrameInputs, StepOutcome, Track,
};
use crate::asteroid::{AsteroidField, AsteroidProxy};
use crate::camera::CameraRig;
use crate::render::bodies::EarthBody;
use crate::types::{AsteroidId, FrameSet, TransformSnapshot, UserNotice};

/// Where an asteroid is in the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionPhase {
    #[default]
    Idle,
    /// Flight scheduled, waiting for the arm delay.
    Armed,
    Flying,
    Collided,
}

/// Timing and geometry of the collision animation.
#[derive(Resource, Clone, Debug)]
pub struct CollisionSettings {
    pub arm_delay: Duration,
    /// Seconds for the full flight to Earth.
    pub flight_duration: f32,
    /// Distance to Earth's center that counts as an impact.
    pub collision_radius: f32,
    pub impact_scale_factor: f32,
    pub impact_scale_duration: f32,
    pub burst_radius: f32,
    pub burst_duration: f32,
    pub callout_delay: Duration,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            arm_delay: Duration::from_secs(2),
            flight_duration: 5.0,
            collision_radius: 10.0,
            impact_scale_factor: 3.0,
            impact_scale_duration: 0.6,
            burst_radius: 40.0,
            burst_duration: 0.8,
            callout_delay: Duration::from_millis(1500),
        }
    }
}

/// User-facing precondition failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CollisionError {
    #[error("Select an asteroid first")]
    NothingSelected,

    #[error("Asteroid {0} is not loaded yet")]
    NotLoaded(AsteroidId),

    #[error("Asteroid {0} has already collided; reset it first")]
    AlreadyCollided(AsteroidId),

    #[error("Asteroid {0} has not collided")]
    NotCollided(AsteroidId),

    #[error("Unknown asteroid {0}")]
    Unknown(AsteroidId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArmOutcome {
    Armed(AsteroidId),
    /// The asteroid already has a live flight; nothing changed.
    AlreadyActive(AsteroidId),
}

/// Things the frame systems must apply after a report is processed.
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineEvent {
    FlightStarted(AsteroidId),
    Impact { asteroid: AsteroidId, point: Vec3 },
    /// Scale-up finished; proxy hidden.
    Settled(AsteroidId),
    CalloutDue(AsteroidId),
    /// Flight was cancelled by the scheduler (subject lost).
    Aborted(AsteroidId),
}

/// Arm the selected asteroid: schedule its flight after the arm delay.
pub fn request_arm(
    field: &mut AsteroidField,
    scheduler: &mut AnimationScheduler,
    settings: &CollisionSettings,
) -> Result<ArmOutcome, CollisionError> {
    let id = field.selected.clone().ok_or(CollisionError::NothingSelected)?;
    let record = field
        .get_mut(&id)
        .ok_or_else(|| CollisionError::Unknown(id.clone()))?;

    if !record.is_collidable() {
        return Err(CollisionError::NotLoaded(id));
    }
    match record.phase {
        CollisionPhase::Collided => return Err(CollisionError::AlreadyCollided(id)),
        CollisionPhase::Armed | CollisionPhase::Flying => return Ok(ArmOutcome::AlreadyActive(id)),
        CollisionPhase::Idle => {}
    }

    let flight = FlightTween::new(settings.flight_duration, settings.collision_radius);
    if scheduler
        .schedule(AnimationKey::new(id.clone(), Track::Flight), settings.arm_delay, flight)
        .is_none()
    {
        return Ok(ArmOutcome::AlreadyActive(id));
    }
    scheduler.cancel(&AnimationKey::new(id.clone(), Track::Pulse));

    record.phase = CollisionPhase::Armed;
    record.trajectory_visible = false;
    info!("Asteroid {} armed", id);
    Ok(ArmOutcome::Armed(id))
}

/// Stop an armed or flying asteroid. The proxy stays where it is.
pub fn request_disarm(
    field: &mut AsteroidField,
    scheduler: &mut AnimationScheduler,
    id: &AsteroidId,
) -> bool {
    let Some(record) = field.get_mut(id) else {
        return false;
    };
    if !matches!(record.phase, CollisionPhase::Armed | CollisionPhase::Flying) {
        return false;
    }

    scheduler.cancel_asteroid(id);
    record.phase = CollisionPhase::Idle;
    record.trajectory_visible = true;
    info!("Asteroid {} disarmed", id);
    true
}

/// Return a collided asteroid to Idle. The caller writes the returned
/// snapshot back into the proxy transform.
pub fn request_reset(
    field: &mut AsteroidField,
    scheduler: &mut AnimationScheduler,
    id: &AsteroidId,
) -> Result<TransformSnapshot, CollisionError> {
    let record = field
        .get_mut(id)
        .ok_or_else(|| CollisionError::Unknown(id.clone()))?;
    if record.phase != CollisionPhase::Collided {
        return Err(CollisionError::NotCollided(id.clone()));
    }
    let proxy = record
        .proxy
        .ok_or_else(|| CollisionError::NotLoaded(id.clone()))?;

    scheduler.cancel_asteroid(id);
    record.phase = CollisionPhase::Idle;
    record.visible = true;
    record.trajectory_visible = true;
    info!("Asteroid {} reset", id);
    Ok(proxy.original)
}

/// Advance the pipeline from one scheduler report.
pub fn handle_report(
    field: &mut AsteroidField,
    scheduler: &mut AnimationScheduler,
    settings: &CollisionSettings,
    report: &AnimationReport,
) -> Vec<PipelineEvent> {
    let id = &report.key.asteroid;
    let mut events = Vec::new();
    let Some(record) = field.get_mut(id) else {
        return events;
    };

    match report.key.track {
        Track::Flight => {
            if report.started && record.phase == CollisionPhase::Armed {
                record.phase = CollisionPhase::Flying;
                info!("Asteroid {} launched toward Earth", id);
                events.push(PipelineEvent::FlightStarted(id.clone()));
            }

            if report.status == AnimationStatus::Cancelled
                && matches!(record.phase, CollisionPhase::Armed | CollisionPhase::Flying)
            {
                record.phase = CollisionPhase::Idle;
                record.trajectory_visible = true;
                events.push(PipelineEvent::Aborted(id.clone()));
                return events;
            }

            if report.output.impact && record.phase == CollisionPhase::Flying {
                record.phase = CollisionPhase::Collided;
                let point = report.output.translation.unwrap_or_default();
                info!("Asteroid {} hit Earth at {:?}", id, point);

                scheduler.cancel(&report.key);
                scheduler.schedule(
                    AnimationKey::new(id.clone(), Track::Burst),
                    Duration::ZERO,
                    BurstEffect::new(point, settings.burst_radius, settings.burst_duration),
                );
                scheduler.schedule(
                    AnimationKey::new(id.clone(), Track::Impact),
                    Duration::ZERO,
                    ScaleTween::by_factor(
                        settings.impact_scale_factor,
                        settings.impact_scale_duration,
                        Easing::CubicOut,
                    ),
                );
                events.push(PipelineEvent::Impact {
                    asteroid: id.clone(),
                    point,
                });
            }
        }
        Track::Impact => {
            if report.status == AnimationStatus::Finished && record.phase == CollisionPhase::Collided {
                record.visible = false;
                record.trajectory_visible = false;
                scheduler.schedule(
                    AnimationKey::new(id.clone(), Track::Callout),
                    settings.callout_delay,
                    |_: &mut AnimationFrame| StepOutcome::Done,
                );
                events.push(PipelineEvent::Settled(id.clone()));
            }
        }
        Track::Callout => {
            if report.status == AnimationStatus::Finished {
                events.push(PipelineEvent::CalloutDue(id.clone()));
            }
        }
        Track::Burst | Track::Pulse => {}
    }

    events
}

/// Dock and keyboard requests.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum CollisionCommand {
    /// Arm the currently selected asteroid.
    Arm,
    Disarm(AsteroidId),
    Reset(AsteroidId),
}

/// Surfaced to the map view once an impact settles.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct ImpactCallout {
    pub asteroid_id: AsteroidId,
    pub lat: f64,
    pub lon: f64,
}

/// State of the dock's collision controls.
#[derive(Resource, Default, Debug)]
pub struct CollisionControls {
    /// The "collide with Earth" toggle.
    pub arm_toggle: bool,
    /// Asteroid armed through the toggle.
    pub armed: Option<AsteroidId>,
    /// Asteroid the reset control applies to; `None` hides the control.
    pub reset_target: Option<AsteroidId>,
}

/// Burst samples produced this frame, drawn by the render layer.
#[derive(Resource, Default, Debug)]
pub struct ActiveBursts(pub Vec<Burst>);

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollisionSettings>()
            .init_resource::<CollisionControls>()
            .init_resource::<ActiveBursts>()
            .init_resource::<AnimationScheduler>()
            .init_resource::<CameraRig>()
            .add_message::<CollisionCommand>()
            .add_message::<ImpactCallout>()
            .add_message::<UserNotice>()
            .add_systems(
                Update,
                handle_collision_commands
                    .in_set(FrameSet::Commands)
                    .after(crate::asteroid::apply_selection),
            )
            .add_systems(Update, run_animations.in_set(FrameSet::Animate));
    }
}

pub fn handle_collision_commands(
    mut commands_in: MessageReader<CollisionCommand>,
    mut field: ResMut<AsteroidField>,
    mut scheduler: ResMut<AnimationScheduler>,
    settings: Res<CollisionSettings>,
    mut controls: ResMut<CollisionControls>,
    mut rig: ResMut<CameraRig>,
    mut notices: MessageWriter<UserNotice>,
    mut proxies: Query<&mut Transform, With<AsteroidProxy>>,
) {
    for command in commands_in.read() {
        match command {
            CollisionCommand::Arm => match request_arm(&mut field, &mut scheduler, &settings) {
                Ok(ArmOutcome::Armed(id)) => {
                    // The selection pulse may have left the scale mid-cycle
                    if let Some(proxy) = field.get(&id).and_then(|r| r.proxy) {
                        if let Ok(mut transform) = proxies.get_mut(proxy.entity) {
                            transform.scale = proxy.original.scale;
                        }
                    }
                    controls.arm_toggle = true;
                    controls.armed = Some(id);
                }
                Ok(ArmOutcome::AlreadyActive(id)) => {
                    debug!("Arm ignored, asteroid {} already active", id);
                }
                Err(err) => {
                    warn!("Cannot arm: {}", err);
                    controls.arm_toggle = false;
                    notices.write(UserNotice::new(err.to_string()));
                }
            },
            CollisionCommand::Disarm(id) => {
                request_disarm(&mut field, &mut scheduler, id);
                if controls.armed.as_ref() == Some(id) {
                    controls.armed = None;
                }
                controls.arm_toggle = false;
            }
            CollisionCommand::Reset(id) => match request_reset(&mut field, &mut scheduler, id) {
                Ok(original) => {
                    if let Some(proxy) = field.get(id).and_then(|r| r.proxy) {
                        if let Ok(mut transform) = proxies.get_mut(proxy.entity) {
                            original.restore(&mut transform);
                        }
                    }
                    if controls.reset_target.as_ref() == Some(id) {
                        controls.reset_target = None;
                    }
                    rig.go_home();
                }
                Err(err) => {
                    warn!("Cannot reset: {}", err);
                    notices.write(UserNotice::new(err.to_string()));
                }
            },
        }
    }
}

/// Tick the scheduler, apply its outputs and advance the pipeline.
pub fn run_animations(
    time: Res<Time>,
    mut field: ResMut<AsteroidField>,
    mut scheduler: ResMut<AnimationScheduler>,
    settings: Res<CollisionSettings>,
    mut controls: ResMut<CollisionControls>,
    mut bursts: ResMut<ActiveBursts>,
    mut callouts: MessageWriter<ImpactCallout>,
    mut proxies: Query<&mut Transform, (With<AsteroidProxy>, Without<EarthBody>)>,
    earth: Query<&Transform, With<EarthBody>>,
) {
    bursts.0.clear();
    if scheduler.is_empty() {
        return;
    }

    let target = earth
        .single()
        .map(|transform| transform.translation)
        .unwrap_or(Vec3::ZERO);

    let reports = scheduler.tick(time.delta(), |key| {
        let entity = field.get(&key.asteroid)?.proxy_entity()?;
        let transform = proxies.get(entity).ok()?;
        Some(FrameInputs {
            translation: transform.translation,
            scale: transform.scale,
            target,
        })
    });

    for report in &reports {
        if let Some(entity) = field.get(&report.key.asteroid).and_then(|r| r.proxy_entity()) {
            if let Ok(mut transform) = proxies.get_mut(entity) {
                if let Some(translation) = report.output.translation {
                    transform.translation = translation;
                }
                if let Some(scale) = report.output.scale {
                    transform.scale = scale;
                }
            }
        }
        if let Some(burst) = report.output.burst {
            bursts.0.push(burst);
        }

        for event in handle_report(&mut field, &mut scheduler, &settings, report) {
            match event {
                PipelineEvent::Settled(id) => {
                    if controls.armed.as_ref() == Some(&id) {
                        controls.armed = None;
                        controls.arm_toggle = false;
                    }
                    controls.reset_target = Some(id);
                }
                PipelineEvent::CalloutDue(id) => {
                    let site = field
                        .get(&id)
                        .and_then(|r| r.coordinate.ready())
                        .and_then(|c| c.impact_site());
                    match site {
                        Some((lat, lon)) => {
                            info!("Impact callout for {} at {:.2}, {:.2}", id, lat, lon);
                            callouts.write(ImpactCallout {
                                asteroid_id: id,
                                lat,
                                lon,
                            });
                        }
                        None => info!("No impact site known for {}, skipping map callout", id),
                    }
                }
                PipelineEvent::Aborted(id) => {
                    if controls.armed.as_ref() == Some(&id) {
                        controls.armed = None;
                        controls.arm_toggle = false;
                    }
                }
                PipelineEvent::FlightStarted(_) | PipelineEvent::Impact { .. } => {}
            }
        }
    }
}
