//! Test utilities: payload fixtures and a scripted asteroid service.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::asteroid::api::{ApiError, NeoApi};
use crate::types::AsteroidId;

/// Fixtures for building service payloads and records.
pub mod fixtures {
    use bevy::prelude::*;

    use crate::asteroid::api::NeoObject;
    use crate::asteroid::{AsteroidRecord, ProxyHandle};
    use crate::types::TransformSnapshot;

    /// One NEO object with a 100..200 m diameter estimate.
    pub fn neo_json(id: &str) -> serde_json::Value {
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
            "is_potentially_hazardous_asteroid": false
        })
    }

    /// A `near_items` body listing `ids` under `date`.
    pub fn feed_json(date: &str, ids: &[&str]) -> String {
        let objects: Vec<serde_json::Value> = ids.iter().map(|id| neo_json(id)).collect();
        let mut by_date = serde_json::Map::new();
        by_date.insert(date.to_string(), serde_json::Value::Array(objects));
        serde_json::json!({ "near_earth_objects": by_date }).to_string()
    }

    pub fn coordinate_json(x: f64, y: f64, z: f64) -> String {
        serde_json::json!({ "x": x, "y": y, "z": z }).to_string()
    }

    pub fn record(id: &str) -> AsteroidRecord {
        let object: NeoObject = serde_json::from_value(neo_json(id)).unwrap();
        AsteroidRecord::from_object(&object)
    }

    /// A record whose proxy already exists at `entity`, model attached.
    pub fn record_with_proxy(id: &str, entity: Entity, original: Transform) -> AsteroidRecord {
        let mut record = record(id);
        record.proxy = Some(ProxyHandle {
            entity,
            original: TransformSnapshot::of(&original),
            model_ready: true,
        });
        record
    }
}

/// Scripted service that answers from maps and records every call.
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

    fn answer(
        endpoint: &'static str,
        body: Option<&String>,
    ) -> Result<String, ApiError> {
        body.cloned()
            .ok_or(ApiError::Status { endpoint, status: 404 })
    }
}

impl NeoApi for FakeNeoApi {
    fn near_items(&self) -> Result<String, ApiError> {
        self.record("near_items".to_string());
        Self::answer("near_items", self.feed.as_ref())
    }

    fn coordinate(&self, id: &AsteroidId) -> Result<String, ApiError> {
        self.record(format!("coordinate:{}", id));
        Self::answer("coordinate", self.coordinates.get(id))
    }

    fn velocity(&self, id: &AsteroidId) -> Result<String, ApiError> {
        self.record(format!("velocity:{}", id));
        Self::answer("velocity_vectors", self.velocities.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asteroid::api::NearItemsFeed;

    #[test]
    fn test_feed_fixture_parses() {
        let feed = NearItemsFeed::parse(&fixtures::feed_json("2026-10-19", &["a", "b"])).unwrap();
        assert_eq!(feed.first_date(), Some("2026-10-19"));
        assert_eq!(feed.objects_for("2026-10-19").len(), 2);
    }

    #[test]
    fn test_fake_counts_calls_and_misses() {
        let api = FakeNeoApi::with_feed(fixtures::feed_json("2026-10-19", &[]));
        assert!(api.near_items().is_ok());
        assert!(api.coordinate(&AsteroidId::new("a")).is_err());
        assert_eq!(api.count("coordinate:"), 1);
        assert_eq!(api.calls(), vec!["near_items", "coordinate:a"]);
    }
}
