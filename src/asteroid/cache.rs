//! Persistent key-value cache for raw service responses.
//!
//! Two kinds of entries: `near_items` holds the daily feed (valid only when
//! its first date key is today) and `asteroid_coord_<id>` holds one
//! coordinate response. Values are the raw JSON text the service returned.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use super::api::{Coordinate, NearItemsFeed};
use crate::types::AsteroidId;

pub const NEAR_ITEMS_KEY: &str = "near_items";

pub fn coordinate_key(id: &AsteroidId) -> String {
    format!("asteroid_coord_{}", id)
}

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Io(#[from] io::Error),

    #[error("cache contents are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String-keyed store of raw responses.
pub trait CacheStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), CacheError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// JSON file holding every entry; rewritten on each `set`.
pub struct FileCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileCache {
    /// Open the cache at `path`. A missing file starts empty; an unreadable
    /// or corrupt file is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(CacheError::Io(err)) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("Ignoring cache at {}: {}", path.display(), err);
                BTreeMap::new()
            }
        };
        info!("Response cache at {} ({} entries)", path.display(), entries.len());
        Self { path, entries }
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, CacheError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn flush(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Where the file cache lives.
#[derive(Resource, Clone, Debug)]
pub struct CacheConfig {
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".skyfall/cache.json"),
        }
    }
}

impl CacheConfig {
    /// Defaults overridden by `SKYFALL_CACHE`.
    pub fn from_env() -> Self {
        match env::var_os("SKYFALL_CACHE") {
            Some(path) => Self { path: path.into() },
            None => Self::default(),
        }
    }
}

/// The cache as seen by the loader. Only touched on the main thread.
#[derive(Resource)]
pub struct ResponseCache(Box<dyn CacheStore>);

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(MemoryCache::new())
    }
}

impl ResponseCache {
    pub fn new(store: impl CacheStore) -> Self {
        Self(Box::new(store))
    }

    /// Store a raw response. Failures are logged; the cache is best-effort.
    pub fn store(&mut self, key: &str, raw: &str) {
        if let Err(err) = self.0.set(key, raw.to_string()) {
            warn!("Could not cache {}: {}", key, err);
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }

    /// Today's feed, if cached and still current.
    ///
    /// A cached feed whose first date key differs from `today` (or that no
    /// longer decodes) is treated as a miss.
    pub fn near_items(&self, today: &str) -> Option<NearItemsFeed> {
        let raw = self.0.get(NEAR_ITEMS_KEY)?;
        match NearItemsFeed::parse(&raw) {
            Ok(feed) if feed.first_date() == Some(today) => Some(feed),
            Ok(feed) => {
                debug!(
                    "Cached feed is for {:?}, not {}; refetching",
                    feed.first_date(),
                    today
                );
                None
            }
            Err(err) => {
                warn!("Cached feed is unreadable, refetching: {}", err);
                None
            }
        }
    }

    /// Previously resolved coordinate for an asteroid.
    pub fn coordinate(&self, id: &AsteroidId) -> Option<Coordinate> {
        let raw = self.0.get(&coordinate_key(id))?;
        match Coordinate::parse(&raw) {
            Ok(coordinate) => Some(coordinate),
            Err(err) => {
                warn!("Cached coordinate for {} is unreadable: {}", id, err);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
