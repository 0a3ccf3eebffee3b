//! Identity-keyed display metadata for pickable scene objects.
//!
//! Lookups are keyed by the exact [`Entity`], never by name: cloned asteroid
//! proxies can share a display name but must never resolve to each other's
//! entry. Anything not explicitly registered (stars, trajectory lines, burst
//! effects) resolves to `None`.

use std::collections::HashMap;

use bevy::prelude::*;

/// Title and detail text shown in the pointer overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyMetadata {
    pub title: String,
    pub detail: String,
}

impl BodyMetadata {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Resource mapping renderable entities to their display metadata.
#[derive(Resource, Default, Debug)]
pub struct ObjectMetadataIndex {
    entries: HashMap<Entity, BodyMetadata>,
}

impl ObjectMetadataIndex {
    /// Register (or replace) the metadata for an entity.
    pub fn register(&mut self, entity: Entity, metadata: BodyMetadata) {
        self.entries.insert(entity, metadata);
    }

    /// Remove an entity's metadata, returning it if present.
    pub fn unregister(&mut self, entity: Entity) -> Option<BodyMetadata> {
        self.entries.remove(&entity)
    }

    pub fn lookup(&self, entity: Entity) -> Option<&BodyMetadata> {
        self.entries.get(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
