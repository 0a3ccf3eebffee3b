//! Loading today's asteroids.
//!
//! A load is driven by the frame loop: [`AsteroidField::begin_load`] and
//! [`AsteroidField::apply_fetch`] are pure bookkeeping that return the
//! fetches still needed; the systems below run those fetches on the IO task
//! pool and feed the finished results back in on the main thread. Completion
//! order does not matter.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};

use super::api::{ApiError, Coordinate, NearItemsFeed, NeoApi, NeoClient, NeoObject, VelocityVector};
use super::cache::{NEAR_ITEMS_KEY, ResponseCache, coordinate_key};
use super::{AsteroidField, AsteroidRecord, Resolution};
use crate::time::today_utc;
use crate::types::{AsteroidId, UserNotice};

/// One remote call the loader needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
    NearItems,
    Coordinate(AsteroidId),
    Velocity(AsteroidId),
}

/// Owned result of a finished fetch, carrying the raw body.
#[derive(Debug)]
pub enum FetchResult {
    NearItems(Result<String, ApiError>),
    Coordinate(AsteroidId, Result<String, ApiError>),
    Velocity(AsteroidId, Result<String, ApiError>),
}

impl FetchRequest {
    /// Perform the call. Blocking; run it off the main thread.
    pub fn execute(&self, api: &dyn NeoApi) -> FetchResult {
        match self {
            FetchRequest::NearItems => FetchResult::NearItems(api.near_items()),
            FetchRequest::Coordinate(id) => FetchResult::Coordinate(id.clone(), api.coordinate(id)),
            FetchRequest::Velocity(id) => FetchResult::Velocity(id.clone(), api.velocity(id)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Complete,
    Failed(String),
}

/// Progress of the current (or last) load, derived from record settlement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadProgress {
    pub date: Option<String>,
    pub loaded: usize,
    pub total: usize,
    pub state: LoadState,
}

impl LoadProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            match self.state {
                LoadState::Complete => 1.0,
                _ => 0.0,
            }
        } else {
            self.loaded as f32 / self.total as f32
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, LoadState::Complete | LoadState::Failed(_))
    }
}

/// Request to (re)load today's asteroids. Safe to send at any time; a load
/// already in progress absorbs it.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct LoadAsteroids;

/// Fetches running on the IO task pool.
#[derive(Resource, Default)]
pub struct PendingFetches {
    tasks: Vec<Task<FetchResult>>,
}

impl PendingFetches {
    pub fn spawn_all(&mut self, requests: Vec<FetchRequest>, client: &NeoClient) {
        if requests.is_empty() {
            return;
        }
        let pool = IoTaskPool::get();
        for request in requests {
            let api = client.0.clone();
            self.tasks
                .push(pool.spawn(async move { request.execute(api.as_ref()) }));
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl AsteroidField {
    /// Start loading `today`'s asteroids.
    ///
    /// Uses the cached feed when its first date is `today`, otherwise asks for
    /// a fresh one. Ignored while a load is already running.
    pub fn begin_load(&mut self, today: &str, cache: &ResponseCache) -> Vec<FetchRequest> {
        if self.progress.state == LoadState::Loading {
            debug!("Asteroid load already in progress");
            return Vec::new();
        }

        info!("Loading near-Earth objects for {}", today);
        self.progress.date = Some(today.to_string());
        self.progress.state = LoadState::Loading;

        match cache.near_items(today) {
            Some(feed) => {
                info!("Using cached near-Earth object feed");
                let requests = self.ingest(feed.objects_for(today), cache);
                self.refresh_progress();
                requests
            }
            None => {
                self.awaiting_feed = true;
                vec![FetchRequest::NearItems]
            }
        }
    }

    /// Apply one finished fetch and return any follow-up fetches.
    pub fn apply_fetch(&mut self, result: FetchResult, cache: &mut ResponseCache) -> Vec<FetchRequest> {
        let mut requests = Vec::new();

        match result {
            FetchResult::NearItems(result) => {
                self.awaiting_feed = false;
                let parsed = result.and_then(|raw| NearItemsFeed::parse(&raw).map(|feed| (raw, feed)));
                match parsed {
                    Ok((raw, feed)) => {
                        cache.store(NEAR_ITEMS_KEY, &raw);
                        let today = self.progress.date.clone().unwrap_or_else(today_utc);
                        requests = self.ingest(feed.objects_for(&today), cache);
                    }
                    Err(err) => {
                        warn!("Near-Earth object feed failed: {}", err);
                        self.progress.state = LoadState::Failed(err.to_string());
                        return requests;
                    }
                }
            }
            FetchResult::Coordinate(id, result) => {
                let parsed = result.and_then(|raw| Coordinate::parse(&raw).map(|c| (raw, c)));
                let Some(record) = self.records.get_mut(&id) else {
                    warn!("Coordinate for unknown asteroid {}", id);
                    return requests;
                };
                match parsed {
                    Ok((raw, coordinate)) => {
                        cache.store(&coordinate_key(&id), &raw);
                        record.coordinate = Resolution::Ready(coordinate);
                    }
                    Err(err) => {
                        warn!("Coordinate for {} failed: {}", id, err);
                        record.coordinate = Resolution::Failed(err.to_string());
                    }
                }
            }
            FetchResult::Velocity(id, result) => {
                let parsed = result.and_then(|raw| VelocityVector::parse(&raw));
                let Some(record) = self.records.get_mut(&id) else {
                    warn!("Velocity for unknown asteroid {}", id);
                    return requests;
                };
                match parsed {
                    Ok(velocity) => record.velocity = Resolution::Ready(velocity),
                    Err(err) => {
                        warn!("Velocity for {} failed: {}", id, err);
                        record.velocity = Resolution::Failed(err.to_string());
                    }
                }
            }
        }

        self.refresh_progress();
        requests
    }

    /// Create records for new objects and queue whatever they still lack.
    /// Records that already exist keep their resolved fields.
    fn ingest(&mut self, objects: &[NeoObject], cache: &ResponseCache) -> Vec<FetchRequest> {
        let mut requests = Vec::new();

        for object in objects {
            let id = AsteroidId::new(object.id.clone());
            let record = self
                .records
                .entry(id.clone())
                .or_insert_with(|| AsteroidRecord::from_object(object));

            if !record.coordinate.is_ready() {
                match cache.coordinate(&id) {
                    Some(coordinate) => record.coordinate = Resolution::Ready(coordinate),
                    None => {
                        record.coordinate = Resolution::Pending;
                        requests.push(FetchRequest::Coordinate(id.clone()));
                    }
                }
            }
            if !record.velocity.is_ready() {
                record.velocity = Resolution::Pending;
                requests.push(FetchRequest::Velocity(id));
            }
        }

        info!(
            "{} near-Earth objects listed, {} fetches queued",
            objects.len(),
            requests.len()
        );
        requests
    }
}

pub(super) fn request_initial_load(mut requests: MessageWriter<LoadAsteroids>) {
    requests.write(LoadAsteroids);
}

pub(super) fn start_requested_loads(
    mut requests: MessageReader<LoadAsteroids>,
    mut field: ResMut<AsteroidField>,
    cache: Res<ResponseCache>,
    client: Res<NeoClient>,
    mut pending: ResMut<PendingFetches>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let fetches = field.begin_load(&today_utc(), &cache);
    pending.spawn_all(fetches, &client);
}

pub(super) fn poll_fetches(
    mut pending: ResMut<PendingFetches>,
    mut field: ResMut<AsteroidField>,
    mut cache: ResMut<ResponseCache>,
    client: Res<NeoClient>,
    mut notices: MessageWriter<UserNotice>,
) {
    let mut finished = Vec::new();
    pending.tasks.retain_mut(|task| match block_on(future::poll_once(task)) {
        Some(result) => {
            finished.push(result);
            false
        }
        None => true,
    });

    for result in finished {
        let was_terminal = field.progress().is_terminal();
        let follow_up = field.apply_fetch(result, &mut cache);
        pending.spawn_all(follow_up, &client);

        if was_terminal {
            continue;
        }
        match &field.progress().state {
            LoadState::Failed(reason) => {
                notices.write(UserNotice::new(format!("Could not load asteroids: {}", reason)));
            }
            LoadState::Complete => {
                let progress = field.progress();
                info!("Asteroid load complete: {}/{}", progress.loaded, progress.total);
            }
            _ => {}
        }
    }
}
