// map/src/lifecycle.rs
//
// Owns the map container. Before a new map is built, anything a previous
// (possibly half-finished) initialisation left in the container is torn
// down; failures during that teardown never block the new map.

use crate::config::MapConfig;
use crate::legend::legend_html;
use crate::readiness::wait_until_ready;
use crate::scheduler::Scheduler;
use crate::session::{MapSession, MapSurface};
use estate_shared::{CategoryColors, Listing};
use std::rc::Rc;

/// Id stamped on a container that hosts a map instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u64);

/// A live map instance as the registry sees it.
pub trait InstanceHandle {
    fn dispose(&self) -> Result<(), String>;
}

impl<S: MapSurface> InstanceHandle for MapSession<S> {
    fn dispose(&self) -> Result<(), String> {
        MapSession::dispose(self)
    }
}

/// Page-wide table of live map instances, keyed by the id stamped on their container.
pub trait InstanceRegistry {
    fn lookup(&self, id: InstanceId) -> Option<Rc<dyn InstanceHandle>>;

    fn register(&self, handle: Rc<dyn InstanceHandle>) -> InstanceId;

    fn forget(&self, id: InstanceId);
}

/// The element the map renders into.
pub trait MapContainer {
    fn instance_marker(&self) -> Option<InstanceId>;

    fn set_instance_marker(&self, id: InstanceId);

    fn clear_instance_marker(&self);

    /// Drop all child content.
    fn wipe(&self);
}

pub trait HtmlTarget {
    fn set_inner_html(&self, html: &str);
}

/// The mapping library (Leaflet in the browser).
pub trait MapLibrary {
    type Container: MapContainer;
    type Surface: MapSurface + 'static;

    /// Whether the library's script has loaded.
    fn is_ready(&self) -> bool;

    fn create_map(&self, container: &Self::Container) -> Result<Self::Surface, String>;
}

/// The three elements a map page provides. Raw attribute values are parsed
/// by the lifecycle manager, not the host.
pub struct PageAnchors<C, L> {
    pub listings_json: Option<String>,
    pub colors_json: Option<String>,
    pub legend: L,
    pub container: C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reclaim {
    /// Nothing was left in the container.
    Clean,
    /// A stale instance marker was found and the container reset. `disposed`
    /// tells whether a registered instance was also torn down.
    Reclaimed { disposed: bool },
}

/// Clears whatever a previous initialisation left in `container`.
pub fn reclaim_container(container: &impl MapContainer, registry: &dyn InstanceRegistry) -> Reclaim {
    let Some(id) = container.instance_marker() else {
        return Reclaim::Clean;
    };

    log_warn!("[PropertyMap] Stale map state found, cleaning up before init");

    let mut disposed = false;
    if let Some(stale) = registry.lookup(id) {
        match stale.dispose() {
            Ok(()) => disposed = true,
            Err(e) => log_warn!("[PropertyMap] stale map dispose failed: {e}"),
        }
    }
    registry.forget(id);

    container.clear_instance_marker();
    container.wipe();

    Reclaim::Reclaimed { disposed }
}

/// Listings from the data anchor. Anything that is not a JSON array yields an
/// empty list; malformed records inside the array are skipped.
pub fn parse_listings(raw: Option<&str>) -> Vec<Listing> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("[]");

    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(serde_json::Value::Array(values)) => values,
        Ok(_) => {
            log_error!("[PropertyMap] listing data is not an array");
            return Vec::new();
        }
        Err(e) => {
            log_error!("[PropertyMap] bad JSON: {e}");
            return Vec::new();
        }
    };

    let total = values.len();
    let listings: Vec<Listing> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    if listings.len() != total {
        log_warn!(
            "[PropertyMap] skipped {} malformed listing record(s)",
            total - listings.len()
        );
    }
    listings
}

/// Category colors from the legend anchor. Non-string values are dropped; a
/// payload that does not parse yields an empty map.
pub fn parse_colors(raw: Option<&str>) -> CategoryColors {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("{}");

    match serde_json::from_str::<CategoryColors>(raw) {
        Ok(colors) => colors,
        Err(e) => {
            log_error!("[PropertyMap] bad colors JSON: {e}");
            CategoryColors::new()
        }
    }
}

pub struct MapLifecycle<L: MapLibrary> {
    library: L,
    registry: Rc<dyn InstanceRegistry>,
    scheduler: Rc<dyn Scheduler>,
    config: MapConfig,
}

impl<L: MapLibrary> MapLifecycle<L> {
    pub fn new(
        library: L,
        registry: Rc<dyn InstanceRegistry>,
        scheduler: Rc<dyn Scheduler>,
        config: MapConfig,
    ) -> Self {
        Self {
            library,
            registry,
            scheduler,
            config,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Builds a fresh map in the page's container.
    ///
    /// `None` anchors mean this is not a map page: nothing happens. Every
    /// other failure is logged and ends in "no map", never an error.
    pub async fn initialize<T: HtmlTarget>(
        &self,
        anchors: Option<PageAnchors<L::Container, T>>,
    ) -> Option<Rc<MapSession<L::Surface>>> {
        let anchors = anchors?;

        reclaim_container(&anchors.container, self.registry.as_ref());

        let listings = parse_listings(anchors.listings_json.as_deref());
        let colors = parse_colors(anchors.colors_json.as_deref());
        log!("[PropertyMap] {} properties", listings.len());

        let scheduler = self.scheduler.clone();
        wait_until_ready(
            || self.library.is_ready(),
            self.config.library_poll(),
            move |d| scheduler.sleep(d),
        )
        .await;
        log!("[PropertyMap] map library ready, initialising map");

        // Another initialisation may have claimed the container while we waited.
        reclaim_container(&anchors.container, self.registry.as_ref());

        let surface = match self.library.create_map(&anchors.container) {
            Ok(s) => s,
            Err(e) => {
                log_error!("[PropertyMap] map construction failed: {e}");
                return None;
            }
        };
        if let Err(e) = surface.add_tile_layer(&self.config.tiles) {
            log_warn!("[PropertyMap] base tile layer failed: {e}");
        }

        let session = MapSession::build(
            surface,
            self.scheduler.clone(),
            self.config.clone(),
            &listings,
            &colors,
        );

        anchors.legend.set_inner_html(&legend_html(&colors));

        let id = self.registry.register(session.clone());
        anchors.container.set_instance_marker(id);

        session.schedule_relayout();
        Some(session)
    }
}
