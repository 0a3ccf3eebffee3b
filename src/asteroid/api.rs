//! Remote near-Earth-object service: wire types and HTTP client.
//!
//! Responses are returned as raw text so the loader can cache exactly what
//! the service sent; decoding happens on the main thread.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{AsteroidId, WORLD_UNITS_PER_DISTANCE_UNIT};

/// Errors from the remote service or from decoding its payloads.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to /{endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("/{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("asteroid service unavailable: {0}")]
    Unavailable(String),

    #[error("could not decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Connection settings for the remote service.
#[derive(Resource, Clone, Debug)]
pub struct NeoApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for NeoApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl NeoApiConfig {
    /// Defaults overridden by `SKYFALL_API_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("SKYFALL_API_URL") {
            config.base_url = url;
        }
        config
    }
}

/// The three calls the loader needs. Each returns the raw response body.
pub trait NeoApi: Send + Sync + 'static {
    fn near_items(&self) -> Result<String, ApiError>;
    fn coordinate(&self, id: &AsteroidId) -> Result<String, ApiError>;
    fn velocity(&self, id: &AsteroidId) -> Result<String, ApiError>;
}

/// Shared handle to the active service implementation.
#[derive(Resource, Clone)]
pub struct NeoClient(pub Arc<dyn NeoApi>);

/// Blocking HTTP implementation, meant to run on the IO task pool.
pub struct HttpNeoApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpNeoApi {
    pub fn new(config: &NeoApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn post(&self, endpoint: &'static str, body: serde_json::Value) -> Result<String, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .map_err(|source| ApiError::Transport { endpoint, source })
    }
}

impl NeoApi for HttpNeoApi {
    fn near_items(&self) -> Result<String, ApiError> {
        self.post("near_items", serde_json::json!({}))
    }

    fn coordinate(&self, id: &AsteroidId) -> Result<String, ApiError> {
        self.post("coordinate", serde_json::json!({ "id": id.as_str() }))
    }

    fn velocity(&self, id: &AsteroidId) -> Result<String, ApiError> {
        self.post("velocity_vectors", serde_json::json!({ "id": id.as_str() }))
    }
}

/// Used when no HTTP client could be built; every call fails.
pub struct OfflineApi {
    reason: String,
}

impl OfflineApi {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl NeoApi for OfflineApi {
    fn near_items(&self) -> Result<String, ApiError> {
        Err(ApiError::Unavailable(self.reason.clone()))
    }

    fn coordinate(&self, _id: &AsteroidId) -> Result<String, ApiError> {
        Err(ApiError::Unavailable(self.reason.clone()))
    }

    fn velocity(&self, _id: &AsteroidId) -> Result<String, ApiError> {
        Err(ApiError::Unavailable(self.reason.clone()))
    }
}

/// A value shown to the user as-is, whether the service sent text or a number.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Passthrough {
    Text(String),
    Number(f64),
}

impl fmt::Display for Passthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Passthrough::Text(text) => f.write_str(text),
            Passthrough::Number(n) => write!(f, "{}", n),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Passthrough::deserialize(deserializer).map(|value| value.to_string())
}

/// One near-Earth object from the daily feed.
#[derive(Deserialize, Clone, Debug)]
pub struct NeoObject {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub estimated_diameter: EstimatedDiameter,
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproach>,
    #[serde(default)]
    pub is_potentially_hazardous_asteroid: bool,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct EstimatedDiameter {
    #[serde(default)]
    pub meters: DiameterRange,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct DiameterRange {
    #[serde(default, alias = "min")]
    pub estimated_diameter_min: f64,
    #[serde(default, alias = "max")]
    pub estimated_diameter_max: f64,
}

impl DiameterRange {
    /// Single estimate used for proxy sizing: the mean of min and max.
    pub fn estimate(&self) -> f64 {
        (self.estimated_diameter_min + self.estimated_diameter_max) / 2.0
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CloseApproach {
    #[serde(default)]
    pub relative_velocity: RelativeVelocity,
    #[serde(default)]
    pub miss_distance: MissDistance,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct RelativeVelocity {
    #[serde(default)]
    pub kilometers_per_hour: Option<Passthrough>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct MissDistance {
    #[serde(default)]
    pub kilometers: Option<Passthrough>,
}

impl NeoObject {
    pub fn relative_velocity_kph(&self) -> Option<Passthrough> {
        self.close_approach_data
            .first()
            .and_then(|approach| approach.relative_velocity.kilometers_per_hour.clone())
    }

    pub fn miss_distance_km(&self) -> Option<Passthrough> {
        self.close_approach_data
            .first()
            .and_then(|approach| approach.miss_distance.kilometers.clone())
    }
}

/// Date mapping in the order the service sent it.
type DateMap = serde_json::Map<String, serde_json::Value>;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFeed {
    Wrapped { near_earth_objects: DateMap },
    Bare(DateMap),
}

/// The daily feed, keyed by calendar date in payload order.
#[derive(Clone, Debug, Default)]
pub struct NearItemsFeed {
    by_date: Vec<(String, Vec<NeoObject>)>,
}

impl NearItemsFeed {
    /// Decode a feed. Accepts the date mapping at the top level or under
    /// `near_earth_objects`. Individual malformed objects are skipped.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let decode_error = |source| ApiError::Decode {
            what: "near-items feed",
            source,
        };
        let feed: RawFeed = serde_json::from_str(raw).map_err(decode_error)?;
        let raw_by_date = match feed {
            RawFeed::Wrapped { near_earth_objects } => near_earth_objects,
            RawFeed::Bare(map) => map,
        };

        let mut by_date = Vec::with_capacity(raw_by_date.len());
        for (date, values) in raw_by_date {
            let serde_json::Value::Array(values) = values else {
                return Err(decode_error(serde::de::Error::custom(format!(
                    "entry for {} is not a list",
                    date
                ))));
            };
            let mut objects = Vec::with_capacity(values.len());
            for value in values {
                match serde_json::from_value::<NeoObject>(value) {
                    Ok(object) => objects.push(object),
                    Err(err) => warn!("Skipping malformed near-Earth object on {}: {}", date, err),
                }
            }
            by_date.push((date, objects));
        }
        Ok(Self { by_date })
    }

    /// First date key as listed in the payload; the cache is valid only when
    /// this is today.
    pub fn first_date(&self) -> Option<&str> {
        self.by_date.first().map(|(date, _)| date.as_str())
    }

    /// Objects listed for `date`, or for the first date when the feed does
    /// not carry that day.
    pub fn objects_for(&self, date: &str) -> &[NeoObject] {
        self.by_date
            .iter()
            .find(|(listed, _)| listed == date)
            .or_else(|| self.by_date.first())
            .map(|(_, objects)| objects.as_slice())
            .unwrap_or(&[])
    }
}

/// Resolved spatial coordinate of an asteroid.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Coordinate {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        serde_json::from_str(raw).map_err(|source| ApiError::Decode {
            what: "coordinate",
            source,
        })
    }

    /// Scene position of the proxy.
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32) * WORLD_UNITS_PER_DISTANCE_UNIT
    }

    /// Latitude/longitude when both are present and finite.
    pub fn impact_site(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Velocity vector used for the trajectory line.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct VelocityVector {
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl VelocityVector {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        serde_json::from_str(raw).map_err(|source| ApiError::Decode {
            what: "velocity vector",
            source,
        })
    }

    /// Unit direction, or `None` for a zero or non-finite vector.
    pub fn direction(&self) -> Option<Vec3> {
        Vec3::new(self.vx as f32, self.vy as f32, self.vz as f32).try_normalize()
    }
}
