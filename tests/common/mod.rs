//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use skyfall::asteroid::{AsteroidField, AsteroidProxy, ProxyVisual};
use skyfall::asteroid::api::{ApiError, NeoApi, NeoClient};
use skyfall::asteroid::cache::{MemoryCache, ResponseCache};
use skyfall::asteroid::loader::PendingFetches;
use skyfall::types::AsteroidId;

/// Seconds advanced per `app.update()` in headless apps.
pub const FRAME: Duration = Duration::from_millis(100);

/// One NEO object with a 100..200 m diameter estimate.
pub fn neo_json(id: &str, hazardous: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("({})", id),
        "estimated_diameter": {
            "meters": { "estimated_diameter_min": 100.0, "estimated_diameter_max": 200.0 }
        },
        "close_approach_data": [{
            "relative_velocity": { "kilometers_per_hour": "41234.5" },
            "miss_distance": { "kilometers": "1234567.8" }
        }],
        "is_potentially_hazardous_asteroid": hazardous
    })
}

/// A `near_items` body listing `ids` under `date`.
pub fn feed_json(date: &str, ids: &[&str]) -> String {
    let objects: Vec<serde_json::Value> = ids.iter().map(|id| neo_json(id, false)).collect();
    let mut by_date = serde_json::Map::new();
    by_date.insert(date.to_string(), serde_json::Value::Array(objects));
    serde_json::json!({ "near_earth_objects": by_date }).to_string()
}

pub fn coordinate_json(x: f64, y: f64, z: f64) -> String {
    serde_json::json!({ "x": x, "y": y, "z": z }).to_string()
}

pub fn coordinate_with_site_json(x: f64, y: f64, z: f64, lat: f64, lon: f64) -> String {
    serde_json::json!({ "x": x, "y": y, "z": z, "lat": lat, "lon": lon }).to_string()
}

/// Scripted service: answers from maps, misses are HTTP 404, every call is
/// recorded.
#[derive(Default)]
pub struct FakeNeoApi {
    pub feed: Option<String>,
    pub coordinates: HashMap<AsteroidId, String>,
    pub velocities: HashMap<AsteroidId, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeNeoApi {
    pub fn with_feed(feed: String) -> Self {
        Self {
            feed: Some(feed),
            ..Default::default()
        }
    }

    pub fn coordinate(mut self, id: &str, raw: String) -> Self {
        self.coordinates.insert(AsteroidId::new(id), raw);
        self
    }

    pub fn velocity(mut self, id: &str, raw: String) -> Self {
        self.velocities.insert(AsteroidId::new(id), raw);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of calls whose name starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl NeoApi for FakeNeoApi {
    fn near_items(&self) -> Result<String, ApiError> {
        self.record("near_items".to_string());
        self.feed.clone().ok_or(ApiError::Status {
            endpoint: "near_items",
            status: 404,
        })
    }

    fn coordinate(&self, id: &AsteroidId) -> Result<String, ApiError> {
        self.record(format!("coordinate:{}", id));
        self.coordinates.get(id).cloned().ok_or(ApiError::Status {
            endpoint: "coordinate",
            status: 404,
        })
    }

    fn velocity(&self, id: &AsteroidId) -> Result<String, ApiError> {
        self.record(format!("velocity:{}", id));
        self.velocities.get(id).cloned().ok_or(ApiError::Status {
            endpoint: "velocity_vectors",
            status: 404,
        })
    }
}

/// Headless app with a manual frame clock, backed by `api` and an
/// in-memory cache. Proxies never receive a model. Plugins are added by the
/// caller.
pub fn app_without_models(api: Arc<FakeNeoApi>, cache: ResponseCache) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .insert_resource(NeoClient(api))
        .insert_resource(cache);
    app
}

/// Like [`app_without_models`], but every proxy gets its visual the frame
/// after it spawns, the way the render layer attaches a loaded model.
pub fn headless_app(api: Arc<FakeNeoApi>, cache: ResponseCache) -> App {
    let mut app = app_without_models(api, cache);
    app.add_systems(Update, attach_visuals);
    app
}

fn attach_visuals(
    mut commands: Commands,
    waiting: Query<Entity, (With<AsteroidProxy>, Without<ProxyVisual>)>,
) {
    for entity in &waiting {
        commands.entity(entity).insert(ProxyVisual);
    }
}

pub fn memory_cache() -> ResponseCache {
    ResponseCache::new(MemoryCache::new())
}

/// Update until the current load settles and no fetch is in flight.
pub fn run_until_loaded(app: &mut App) {
    for _ in 0..1000 {
        app.update();
        let settled = app.world().resource::<AsteroidField>().progress().is_terminal();
        let idle = app.world().resource::<PendingFetches>().is_empty();
        if settled && idle {
            // One more frame lets proxy spawning catch up with the last result
            app.update();
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    panic!("asteroid load did not settle");
}
