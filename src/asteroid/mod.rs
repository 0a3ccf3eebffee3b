//! Near-Earth asteroids: records, proxies and selection.
//!
//! Records live in the [`AsteroidField`] resource, keyed by the service's
//! asteroid id. Each record whose coordinate resolves gets a proxy entity
//! placed at `coordinate * 6000` with uniform scale `0.0002 * diameter`.
//! The proxy's look (template scene or fallback sphere) is attached by the
//! render layer once assets are available.

pub mod api;
pub mod cache;
pub mod loader;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;

use crate::animation::tweens::PulseTween;
use crate::animation::{AnimationKey, AnimationScheduler, Track};
use crate::collision::CollisionPhase;
use crate::metadata::{BodyMetadata, ObjectMetadataIndex};
use crate::picking::PickBounds;
use crate::types::{
    AsteroidId, FrameSet, PROXY_SCALE_PER_METER, TransformSnapshot, UserNotice,
};

use api::{
    Coordinate, DiameterRange, HttpNeoApi, NeoApiConfig, NeoClient, NeoObject, OfflineApi,
    Passthrough, VelocityVector,
};
use cache::{CacheConfig, FileCache, ResponseCache};
use loader::{LoadAsteroids, LoadProgress, LoadState, PendingFetches};

/// Radius of the proxy model in its own units; picking and the fallback
/// sphere use it.
pub const PROXY_MODEL_RADIUS: f32 = 100.0;

/// Relative amplitude of the selection pulse.
const PULSE_AMPLITUDE: f32 = 0.25;
/// Seconds per selection pulse cycle.
const PULSE_PERIOD: f32 = 1.2;

/// Resolution status of a fetched field.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Resolution<T> {
    #[default]
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Resolution<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Resolution::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Resolution::Pending)
    }
}

/// The proxy entity of a record and the transform it was created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProxyHandle {
    pub entity: Entity,
    pub original: TransformSnapshot,
    /// The model (or its fallback sphere) is attached; only then can the
    /// proxy collide.
    pub model_ready: bool,
}

/// One near-Earth object and everything known about it.
#[derive(Clone, Debug)]
pub struct AsteroidRecord {
    pub id: AsteroidId,
    pub name: String,
    pub diameter: DiameterRange,
    pub hazardous: bool,
    pub relative_velocity_kph: Option<Passthrough>,
    pub miss_distance_km: Option<Passthrough>,
    pub coordinate: Resolution<Coordinate>,
    pub velocity: Resolution<VelocityVector>,
    pub proxy: Option<ProxyHandle>,
    pub phase: CollisionPhase,
    /// Proxy and label are shown.
    pub visible: bool,
    pub trajectory_visible: bool,
}

impl AsteroidRecord {
    pub fn from_object(object: &NeoObject) -> Self {
        Self {
            id: AsteroidId::new(object.id.clone()),
            name: object.name.clone(),
            diameter: object.estimated_diameter.meters,
            hazardous: object.is_potentially_hazardous_asteroid,
            relative_velocity_kph: object.relative_velocity_kph(),
            miss_distance_km: object.miss_distance_km(),
            coordinate: Resolution::Pending,
            velocity: Resolution::Pending,
            proxy: None,
            phase: CollisionPhase::Idle,
            visible: true,
            trajectory_visible: true,
        }
    }

    /// Uniform proxy scale from the mean estimated diameter.
    pub fn proxy_scale(&self) -> f32 {
        PROXY_SCALE_PER_METER * self.diameter.estimate() as f32
    }

    /// Initial proxy transform for a resolved coordinate.
    pub fn proxy_transform(&self, coordinate: &Coordinate) -> Transform {
        Transform::from_translation(coordinate.world_position())
            .with_scale(Vec3::splat(self.proxy_scale()))
    }

    /// Coordinates, velocity and proxy are resolved or known to be impossible.
    pub fn is_settled(&self) -> bool {
        let coordinate_done = match self.coordinate {
            Resolution::Pending => false,
            Resolution::Ready(_) => self.proxy.is_some_and(|proxy| proxy.model_ready),
            Resolution::Failed(_) => true,
        };
        coordinate_done && self.velocity.is_settled()
    }

    pub fn proxy_entity(&self) -> Option<Entity> {
        self.proxy.map(|proxy| proxy.entity)
    }

    /// Proxy exists and its visual is attached.
    pub fn is_collidable(&self) -> bool {
        self.proxy.is_some_and(|proxy| proxy.model_ready)
    }

    pub fn metadata(&self) -> BodyMetadata {
        let unknown = || "unknown".to_string();
        let detail = format!(
            "Estimated diameter: {:.0} m to {:.0} m\n\
             Potentially hazardous: {}\n\
             Relative velocity: {} km/h\n\
             Miss distance: {} km",
            self.diameter.estimated_diameter_min,
            self.diameter.estimated_diameter_max,
            if self.hazardous { "yes" } else { "no" },
            self.relative_velocity_kph
                .as_ref()
                .map_or_else(unknown, ToString::to_string),
            self.miss_distance_km
                .as_ref()
                .map_or_else(unknown, ToString::to_string),
        );
        BodyMetadata::new(self.name.clone(), detail)
    }
}

/// Every loaded asteroid, the current selection and load progress.
#[derive(Resource, Default)]
pub struct AsteroidField {
    records: BTreeMap<AsteroidId, AsteroidRecord>,
    pub selected: Option<AsteroidId>,
    progress: LoadProgress,
    awaiting_feed: bool,
}

impl AsteroidField {
    pub fn get(&self, id: &AsteroidId) -> Option<&AsteroidRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &AsteroidId) -> Option<&mut AsteroidRecord> {
        self.records.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AsteroidRecord> {
        self.records.values()
    }

    pub fn selected_record(&self) -> Option<&AsteroidRecord> {
        self.selected.as_ref().and_then(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }

    /// Recount settled records; a running load completes once all settle.
    pub fn refresh_progress(&mut self) {
        self.progress.total = self.records.len();
        self.progress.loaded = self.records.values().filter(|r| r.is_settled()).count();

        if self.progress.state == LoadState::Loading
            && !self.awaiting_feed
            && self.progress.loaded == self.progress.total
        {
            self.progress.state = LoadState::Complete;
        }
    }

    /// Insert a record directly, bypassing the loader.
    pub fn insert(&mut self, record: AsteroidRecord) {
        self.records.insert(record.id.clone(), record);
    }
}

/// Marker on an asteroid proxy entity.
#[derive(Component, Clone, Debug)]
pub struct AsteroidProxy {
    pub id: AsteroidId,
}

/// Added to a proxy once its model or fallback sphere is attached.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct ProxyVisual;

/// Change the selected asteroid (`None` clears the selection).
#[derive(Message, Clone, Debug)]
pub struct SelectAsteroid(pub Option<AsteroidId>);

/// Loading, proxy lifecycle and selection.
pub struct AsteroidPlugin;

impl Plugin for AsteroidPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<NeoClient>() {
            app.insert_resource(http_client(&NeoApiConfig::from_env()));
        }
        if !app.world().contains_resource::<ResponseCache>() {
            let config = CacheConfig::from_env();
            app.insert_resource(ResponseCache::new(FileCache::open(config.path.clone())))
                .insert_resource(config);
        }

        app.init_resource::<AsteroidField>()
            .init_resource::<PendingFetches>()
            .init_resource::<ObjectMetadataIndex>()
            .init_resource::<AnimationScheduler>()
            .add_message::<LoadAsteroids>()
            .add_message::<SelectAsteroid>()
            .add_message::<UserNotice>()
            .add_systems(Startup, loader::request_initial_load)
            .add_systems(
                Update,
                (
                    loader::start_requested_loads,
                    loader::poll_fetches,
                    spawn_proxies,
                    mark_models_ready,
                    apply_selection,
                )
                    .chain()
                    .in_set(FrameSet::Commands),
            )
            .add_systems(Update, sync_proxy_visibility.after(FrameSet::Animate))
            .add_observer(forget_removed_proxy);
    }
}

fn http_client(config: &NeoApiConfig) -> NeoClient {
    match HttpNeoApi::new(config) {
        Ok(api) => {
            info!("Asteroid service at {}", config.base_url);
            NeoClient(Arc::new(api))
        }
        Err(err) => {
            error!("Asteroid service disabled: {}", err);
            NeoClient(Arc::new(OfflineApi::new(err.to_string())))
        }
    }
}

/// Spawn a proxy for every record whose coordinate just resolved.
pub fn spawn_proxies(
    mut commands: Commands,
    mut field: ResMut<AsteroidField>,
    mut index: ResMut<ObjectMetadataIndex>,
) {
    let mut spawned = 0;
    for record in field.records.values_mut() {
        if record.proxy.is_some() {
            continue;
        }
        let Resolution::Ready(coordinate) = &record.coordinate else {
            continue;
        };

        let transform = record.proxy_transform(coordinate);
        let entity = commands
            .spawn((
                Name::new(format!("Asteroid {}", record.name)),
                AsteroidProxy {
                    id: record.id.clone(),
                },
                PickBounds::new(PROXY_MODEL_RADIUS),
                transform,
                Visibility::Visible,
            ))
            .id();

        index.register(entity, record.metadata());
        record.proxy = Some(ProxyHandle {
            entity,
            original: TransformSnapshot::of(&transform),
            model_ready: false,
        });
        spawned += 1;
    }

    if spawned > 0 {
        info!("Spawned {} asteroid proxies", spawned);
        field.refresh_progress();
    }
}

/// A despawned proxy must not keep resolving in the metadata index.
fn forget_removed_proxy(remove: On<Remove, AsteroidProxy>, mut index: ResMut<ObjectMetadataIndex>) {
    if index.unregister(remove.entity).is_some() {
        debug!("Unregistered proxy {}", remove.entity);
    }
}

/// Flag records whose proxy just received its visual.
pub fn mark_models_ready(
    mut field: ResMut<AsteroidField>,
    attached: Query<&AsteroidProxy, Added<ProxyVisual>>,
) {
    let mut marked = 0;
    for proxy in &attached {
        let Some(handle) = field.get_mut(&proxy.id).and_then(|r| r.proxy.as_mut()) else {
            continue;
        };
        handle.model_ready = true;
        marked += 1;
    }

    if marked > 0 {
        debug!("{} asteroid models ready", marked);
        field.refresh_progress();
    }
}

/// Move the selection pulse from the previous asteroid to the new one.
pub fn apply_selection(
    mut requests: MessageReader<SelectAsteroid>,
    mut field: ResMut<AsteroidField>,
    mut scheduler: ResMut<AnimationScheduler>,
    mut proxies: Query<&mut Transform, With<AsteroidProxy>>,
) {
    for SelectAsteroid(next) in requests.read() {
        if field.selected == *next {
            continue;
        }

        if let Some(previous) = field.selected.take() {
            let key = AnimationKey::new(previous.clone(), Track::Pulse);
            if scheduler.cancel(&key) {
                restore_idle_scale(&field, &previous, &mut proxies);
            }
        }

        let Some(id) = next else {
            continue;
        };
        let Some(record) = field.get(id) else {
            warn!("Cannot select unknown asteroid {}", id);
            continue;
        };

        if let (CollisionPhase::Idle, Some(proxy)) = (record.phase, record.proxy) {
            scheduler.schedule(
                AnimationKey::new(id.clone(), Track::Pulse),
                Duration::ZERO,
                PulseTween::new(proxy.original.scale, PULSE_AMPLITUDE, PULSE_PERIOD),
            );
        }
        info!("Selected asteroid {} ({})", record.name, id);
        field.selected = Some(id.clone());
    }
}

/// Put an idle proxy back at its original scale after the pulse stops.
pub fn restore_idle_scale(
    field: &AsteroidField,
    id: &AsteroidId,
    proxies: &mut Query<&mut Transform, With<AsteroidProxy>>,
) {
    let Some(record) = field.get(id) else {
        return;
    };
    if record.phase != CollisionPhase::Idle {
        return;
    }
    if let Some(proxy) = record.proxy {
        if let Ok(mut transform) = proxies.get_mut(proxy.entity) {
            transform.scale = proxy.original.scale;
        }
    }
}

fn sync_proxy_visibility(
    field: Res<AsteroidField>,
    mut proxies: Query<(&AsteroidProxy, &mut Visibility)>,
) {
    for (proxy, mut visibility) in &mut proxies {
        let Some(record) = field.get(&proxy.id) else {
            continue;
        };
        let wanted = if record.visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn object(id: &str, min: f64, max: f64) -> NeoObject {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("({})", id),
            "estimated_diameter": { "meters": { "min": min, "max": max } },
            "close_approach_data": [{
                "relative_velocity": { "kilometers_per_hour": "41234.5" },
                "miss_distance": { "kilometers": 1234567.8 }
            }],
            "is_potentially_hazardous_asteroid": false
        }))
        .unwrap()
    }

    #[test]
    fn test_proxy_transform_from_coordinate_and_diameter() {
        let record = AsteroidRecord::from_object(&object("x", 100.0, 200.0));
        let coordinate = Coordinate {
            x: 1.0,
            y: 0.2,
            z: -0.5,
            lat: None,
            lon: None,
        };
        let transform = record.proxy_transform(&coordinate);

        assert_relative_eq!(transform.scale.x, 0.03, epsilon = 1e-6);
        assert_eq!(transform.scale.x, transform.scale.z);
        assert_relative_eq!(transform.translation.x, 6000.0);
        assert_relative_eq!(transform.translation.y, 1200.0, epsilon = 1e-3);
        assert_relative_eq!(transform.translation.z, -3000.0);
    }

    #[test]
    fn test_metadata_passes_values_through() {
        let record = AsteroidRecord::from_object(&object("x", 10.0, 20.0));
        let metadata = record.metadata();
        assert_eq!(metadata.title, "(x)");
        assert!(metadata.detail.contains("41234.5 km/h"));
        assert!(metadata.detail.contains("1234567.8 km"));
        assert!(metadata.detail.contains("Potentially hazardous: no"));
    }

    #[test]
    fn test_settlement_requires_proxy_when_coordinate_ready() {
        let mut record = AsteroidRecord::from_object(&object("x", 10.0, 20.0));
        record.velocity = Resolution::Failed("timeout".into());
        assert!(!record.is_settled());

        record.coordinate = Resolution::Ready(Coordinate {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            lat: None,
            lon: None,
        });
        assert!(!record.is_settled());

        record.proxy = Some(ProxyHandle {
            entity: World::new().spawn_empty().id(),
            original: TransformSnapshot::of(&Transform::IDENTITY),
            model_ready: false,
        });
        assert!(!record.is_settled());
        assert!(!record.is_collidable());

        record.proxy.as_mut().unwrap().model_ready = true;
        assert!(record.is_settled());
        assert!(record.is_collidable());
    }

    #[test]
    fn test_spawn_proxies_registers_metadata_and_snapshot() {
        let mut app = App::new();
        app.init_resource::<AsteroidField>()
            .init_resource::<ObjectMetadataIndex>()
            .add_systems(Update, spawn_proxies);

        let mut record = AsteroidRecord::from_object(&object("a", 100.0, 200.0));
        record.coordinate = Resolution::Ready(Coordinate {
            x: 1.0,
            y: 0.2,
            z: -0.5,
            lat: None,
            lon: None,
        });
        app.world_mut().resource_mut::<AsteroidField>().insert(record);
        app.world_mut()
            .resource_mut::<AsteroidField>()
            .insert(AsteroidRecord::from_object(&object("b", 1.0, 1.0)));

        app.update();
        app.update();

        let field = app.world().resource::<AsteroidField>();
        let proxy = field.get(&AsteroidId::new("a")).unwrap().proxy.unwrap();
        assert!(field.get(&AsteroidId::new("b")).unwrap().proxy.is_none());

        let transform = app.world().get::<Transform>(proxy.entity).unwrap();
        assert_eq!(TransformSnapshot::of(transform), proxy.original);

        let index = app.world().resource::<ObjectMetadataIndex>();
        assert_eq!(index.lookup(proxy.entity).unwrap().title, "(a)");
        assert_eq!(index.len(), 1, "spawned once across frames");
        assert!(!proxy.model_ready);
    }

    #[test]
    fn test_despawned_proxy_leaves_the_index() {
        let mut app = App::new();
        app.init_resource::<AsteroidField>()
            .init_resource::<ObjectMetadataIndex>()
            .add_observer(forget_removed_proxy)
            .add_systems(Update, spawn_proxies);

        let mut record = AsteroidRecord::from_object(&object("a", 100.0, 200.0));
        record.coordinate = Resolution::Ready(Coordinate {
            x: 1.0,
            y: 0.0,
            z: 0.0,
            lat: None,
            lon: None,
        });
        app.world_mut().resource_mut::<AsteroidField>().insert(record);
        app.update();

        let entity = app
            .world()
            .resource::<AsteroidField>()
            .get(&AsteroidId::new("a"))
            .and_then(|r| r.proxy_entity())
            .unwrap();
        assert!(app.world().resource::<ObjectMetadataIndex>().lookup(entity).is_some());

        app.world_mut().despawn(entity);
        let index = app.world().resource::<ObjectMetadataIndex>();
        assert!(index.lookup(entity).is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_attached_visual_settles_the_load() {
        let mut app = App::new();
        app.init_resource::<AsteroidField>()
            .init_resource::<ObjectMetadataIndex>()
            .add_systems(Update, (spawn_proxies, mark_models_ready).chain());

        let mut record = AsteroidRecord::from_object(&object("a", 100.0, 200.0));
        record.coordinate = Resolution::Ready(Coordinate {
            x: 1.0,
            y: 0.0,
            z: 0.0,
            lat: None,
            lon: None,
        });
        record.velocity = Resolution::Failed("404".into());
        {
            let mut field = app.world_mut().resource_mut::<AsteroidField>();
            field.insert(record);
            field.progress.state = LoadState::Loading;
        }

        app.update();
        let field = app.world().resource::<AsteroidField>();
        assert_eq!(field.progress().state, LoadState::Loading);
        assert_eq!(field.progress().loaded, 0);
        let entity = field.get(&AsteroidId::new("a")).unwrap().proxy_entity().unwrap();

        app.world_mut().entity_mut(entity).insert(ProxyVisual);
        app.update();
        let field = app.world().resource::<AsteroidField>();
        assert!(field.get(&AsteroidId::new("a")).unwrap().is_collidable());
        assert_eq!(field.progress().loaded, 1);
        assert_eq!(field.progress().state, LoadState::Complete);
    }
}
