// frontend/src/map_host.rs
//
// Browser implementations of the map core's host traits: Leaflet as the map
// surface, DOM elements as container and legend.

use crate::js::js_object;
use crate::leaflet;
use crate::timers::BrowserScheduler;
use estate_map::config::TileConfig;
use estate_map::lifecycle::HtmlTarget;
use estate_map::marker::{ICON_CLASS, ICON_SIZE_PX, POPUP_OPTIONS};
use estate_map::{
    EventSink, InstanceHandle, InstanceId, InstanceRegistry, LatLng, MapConfig, MapContainer,
    MapEvent, MapLibrary, MapLifecycle, MapSurface, MarkerId, MarkerSpec, PageAnchors, log,
    log_warn,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

/// dataset key (`data-estate-map-id`) naming the registered instance.
const INSTANCE_KEY: &str = "estateMapId";
/// dataset key set once pointer listeners are bound to a popup element.
const WATCHED_KEY: &str = "estateWatched";
/// Property Leaflet stamps on a container it has initialised.
const LEAFLET_ID: &str = "_leaflet_id";

/// `window` object mapping instance id -> dispose function.
const INSTANCES_KEY: &str = "__estateMapInstances";
/// `window` counter for instance ids.
const NEXT_ID_KEY: &str = "__estateMapNextId";

type Handler = Closure<dyn FnMut(JsValue)>;
type Disposer = Closure<dyn Fn() -> Result<(), JsValue>>;

thread_local! {
    /// Disposers this evaluation published, kept alive until forgotten.
    static DISPOSERS: RefCell<HashMap<u64, Disposer>> = RefCell::new(HashMap::new());
}

// ---------------------------------------------------------------------------
// Instance registry
// ---------------------------------------------------------------------------

/// Instance table on `window`. Entries are plain JS functions, so a later
/// evaluation of the bundle can tear down a map an earlier one built.
pub struct WindowRegistry;

impl WindowRegistry {
    fn table() -> Option<js_sys::Object> {
        let win = web_sys::window()?;
        let key = JsValue::from_str(INSTANCES_KEY);
        if let Ok(table) = js_sys::Reflect::get(&win, &key).ok()?.dyn_into::<js_sys::Object>() {
            return Some(table);
        }
        let table = js_sys::Object::new();
        js_sys::Reflect::set(&win, &key, &table).ok()?;
        Some(table)
    }

    fn next_id() -> InstanceId {
        let Some(win) = web_sys::window() else {
            return InstanceId(1);
        };
        let key = JsValue::from_str(NEXT_ID_KEY);
        let last = js_sys::Reflect::get(&win, &key)
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as u64;
        let id = last + 1;
        if let Err(e) = js_sys::Reflect::set(&win, &key, &JsValue::from_f64(id as f64)) {
            log_warn!("[PropertyMap] could not advance instance counter: {e:?}");
        }
        InstanceId(id)
    }

    fn key(id: InstanceId) -> JsValue {
        JsValue::from_str(&id.0.to_string())
    }
}

/// A registered instance, possibly owned by another evaluation.
struct JsDisposer(js_sys::Function);

impl InstanceHandle for JsDisposer {
    fn dispose(&self) -> Result<(), String> {
        self.0
            .call0(&JsValue::NULL)
            .map(|_| ())
            .map_err(|e| format!("{e:?}"))
    }
}

impl InstanceRegistry for WindowRegistry {
    fn lookup(&self, id: InstanceId) -> Option<Rc<dyn InstanceHandle>> {
        let f = js_sys::Reflect::get(&Self::table()?, &Self::key(id))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()?;
        Some(Rc::new(JsDisposer(f)))
    }

    fn register(&self, handle: Rc<dyn InstanceHandle>) -> InstanceId {
        let id = Self::next_id();
        let disposer: Disposer =
            Closure::new(move || handle.dispose().map_err(|e| JsValue::from_str(&e)));

        match Self::table() {
            Some(table) => {
                if let Err(e) = js_sys::Reflect::set(&table, &Self::key(id), disposer.as_ref()) {
                    log_warn!("[PropertyMap] could not publish map instance: {e:?}");
                }
            }
            None => log_warn!("[PropertyMap] no instance table on window"),
        }
        DISPOSERS.with(|d| d.borrow_mut().insert(id.0, disposer));
        id
    }

    fn forget(&self, id: InstanceId) {
        if let Some(table) = Self::table() {
            let _ = js_sys::Reflect::delete_property(&table, &Self::key(id));
        }
        // Only present if this evaluation registered it.
        DISPOSERS.with(|d| d.borrow_mut().remove(&id.0));
    }
}

// ---------------------------------------------------------------------------
// Container + legend
// ---------------------------------------------------------------------------

pub struct DomContainer(pub HtmlElement);

impl MapContainer for DomContainer {
    fn instance_marker(&self) -> Option<InstanceId> {
        if let Some(id) = self.0.dataset().get(INSTANCE_KEY)
            && let Ok(id) = id.parse()
        {
            return Some(InstanceId(id));
        }
        // Leaflet's stamp without ours: construction died half-way. Id 0 is
        // never registered, so this only forces the reset.
        let stamped = js_sys::Reflect::get(&self.0, &JsValue::from_str(LEAFLET_ID))
            .is_ok_and(|v| !v.is_undefined() && !v.is_null());
        stamped.then_some(InstanceId(0))
    }

    fn set_instance_marker(&self, id: InstanceId) {
        if let Err(e) = self.0.dataset().set(INSTANCE_KEY, &id.0.to_string()) {
            log_warn!("[PropertyMap] could not tag map container: {e:?}");
        }
    }

    fn clear_instance_marker(&self) {
        self.0.dataset().delete(INSTANCE_KEY);
    }

    fn wipe(&self) {
        let _ = js_sys::Reflect::delete_property(&self.0, &JsValue::from_str(LEAFLET_ID));
        self.0.set_inner_html("");
    }
}

pub struct DomLegend(pub Element);

impl HtmlTarget for DomLegend {
    fn set_inner_html(&self, html: &str) {
        self.0.set_inner_html(html);
    }
}

// ---------------------------------------------------------------------------
// Leaflet
// ---------------------------------------------------------------------------

pub struct LeafletLibrary;

impl MapLibrary for LeafletLibrary {
    type Container = DomContainer;
    type Surface = LeafletSurface;

    fn is_ready(&self) -> bool {
        leaflet::is_loaded()
    }

    fn create_map(&self, container: &DomContainer) -> Result<LeafletSurface, String> {
        let map = leaflet::new_map(&container.0).map_err(|e| format!("L.map failed: {e:?}"))?;
        Ok(LeafletSurface {
            map,
            markers: RefCell::new(HashMap::new()),
            handlers: RefCell::new(Vec::new()),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions<'a> {
    attribution: &'a str,
    max_zoom: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IconOptions<'a> {
    class_name: &'a str,
    html: &'a str,
    icon_size: [u32; 2],
    icon_anchor: [u32; 2],
    popup_anchor: [i32; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupBindOptions<'a> {
    close_button: bool,
    auto_close: bool,
    close_on_click: bool,
    class_name: &'a str,
    min_width: u32,
    max_width: u32,
}

pub struct LeafletSurface {
    map: leaflet::Map,
    markers: RefCell<HashMap<MarkerId, leaflet::Marker>>,
    /// JS-side listeners call into these; they live as long as the map.
    handlers: RefCell<Vec<Handler>>,
}

impl LeafletSurface {
    fn handler(&self, sink: EventSink, ev: MapEvent) -> Handler {
        Closure::new(move |_: JsValue| sink(ev))
    }

    fn keep(&self, handler: Handler) {
        self.handlers.borrow_mut().push(handler);
    }

    fn marker(&self, id: MarkerId) -> Option<leaflet::Marker> {
        self.markers.borrow().get(&id).cloned()
    }
}

impl MapSurface for LeafletSurface {
    fn add_tile_layer(&self, tiles: &TileConfig) -> Result<(), String> {
        let opts = js_object(&TileOptions {
            attribution: &tiles.attribution,
            max_zoom: tiles.max_zoom,
        })?;
        leaflet::tile_layer(&tiles.url, &opts)
            .map_err(|e| format!("L.tileLayer failed: {e:?}"))?
            .add_to(&self.map);
        Ok(())
    }

    fn add_marker(&self, spec: &MarkerSpec, events: EventSink) -> Result<(), String> {
        let half = ICON_SIZE_PX / 2;
        let icon = leaflet::div_icon(&js_object(&IconOptions {
            class_name: ICON_CLASS,
            html: &spec.icon_html,
            icon_size: [ICON_SIZE_PX, ICON_SIZE_PX],
            icon_anchor: [half, half],
            popup_anchor: [0, -(half as i32)],
        })?);

        let opts = js_sys::Object::new();
        js_sys::Reflect::set(&opts, &JsValue::from_str("icon"), &icon)
            .map_err(|e| format!("marker options: {e:?}"))?;

        let marker = leaflet::new_marker(
            &leaflet::lat_lng(spec.position.lat, spec.position.lng),
            &opts,
        )
        .map_err(|e| format!("L.marker failed: {e:?}"))?;

        marker.bind_popup(
            &spec.popup_html,
            &js_object(&PopupBindOptions {
                close_button: false,
                auto_close: false,
                close_on_click: false,
                class_name: POPUP_OPTIONS.class_name,
                min_width: POPUP_OPTIONS.min_width,
                max_width: POPUP_OPTIONS.max_width,
            })?,
        );

        for (name, ev) in [
            ("mouseover", MapEvent::MarkerEnter(spec.id)),
            ("mouseout", MapEvent::MarkerLeave(spec.id)),
            ("popupopen", MapEvent::PopupOpened(spec.id)),
        ] {
            let h = self.handler(events.clone(), ev);
            marker.on(name, h.as_ref().unchecked_ref());
            self.keep(h);
        }

        marker.add_to(&self.map);
        self.markers.borrow_mut().insert(spec.id, marker);
        Ok(())
    }

    fn open_popup(&self, id: MarkerId) {
        // Leaflet fires `popupopen` synchronously from here; no borrow is held.
        if let Some(m) = self.marker(id) {
            m.open_popup();
        }
    }

    fn close_popup(&self, id: MarkerId) {
        if let Some(m) = self.marker(id) {
            m.close_popup();
        }
    }

    fn watch_popup(&self, id: MarkerId, events: EventSink) {
        let Some(el) = self
            .marker(id)
            .and_then(|m| m.get_popup())
            .and_then(|p| p.get_element())
        else {
            return;
        };

        // Leaflet reuses the popup element across openings.
        if el.dataset().get(WATCHED_KEY).is_some() {
            return;
        }
        if let Err(e) = el.dataset().set(WATCHED_KEY, "1") {
            log_warn!("[PropertyMap] could not tag popup: {e:?}");
        }

        for (name, ev) in [
            ("mouseenter", MapEvent::PopupEnter(id)),
            ("mouseleave", MapEvent::PopupLeave(id)),
        ] {
            let h = self.handler(events.clone(), ev);
            if let Err(e) = el.add_event_listener_with_callback(name, h.as_ref().unchecked_ref()) {
                log_warn!("[PropertyMap] popup {name} listener failed: {e:?}");
            }
            self.keep(h);
        }
    }

    fn on_background_click(&self, events: EventSink) {
        let h = self.handler(events, MapEvent::BackgroundClick);
        self.map.on("click", h.as_ref().unchecked_ref());
        self.keep(h);
    }

    fn size(&self) -> (f64, f64) {
        let p = self.map.get_size();
        (p.x(), p.y())
    }

    fn set_view(&self, center: LatLng, zoom: f64) {
        self.map.set_view(&leaflet::lat_lng(center.lat, center.lng), zoom);
    }

    fn invalidate_size(&self) {
        self.map.invalidate_size();
    }

    fn remove(&self) -> Result<(), String> {
        self.map
            .remove()
            .map(|_| ())
            .map_err(|e| format!("map.remove failed: {e:?}"))
    }
}

// ---------------------------------------------------------------------------
// Page wiring
// ---------------------------------------------------------------------------

/// Defaults, overridden by `data-map-config` on the map container if present.
/// Anchor ids are not part of the override.
pub fn page_config(doc: &Document) -> MapConfig {
    let raw = doc
        .get_element_by_id(&MapConfig::default().anchors.map)
        .and_then(|el| el.get_attribute("data-map-config"));
    MapConfig::with_override(raw.as_deref())
}

/// The three map-page elements, or `None` if this is not a map page.
pub fn page_anchors(doc: &Document, config: &MapConfig) -> Option<PageAnchors<DomContainer, DomLegend>> {
    let data = doc.get_element_by_id(&config.anchors.data)?;
    let legend = doc.get_element_by_id(&config.anchors.legend)?;
    let map = doc
        .get_element_by_id(&config.anchors.map)?
        .dyn_into::<HtmlElement>()
        .ok()?;

    Some(PageAnchors {
        listings_json: data.get_attribute("data-properties"),
        colors_json: legend.get_attribute("data-colors"),
        legend: DomLegend(legend),
        container: DomContainer(map),
    })
}

pub async fn init_property_map() {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let config = page_config(&doc);
    let anchors = page_anchors(&doc, &config);

    let lifecycle = MapLifecycle::new(
        LeafletLibrary,
        Rc::new(WindowRegistry),
        Rc::new(BrowserScheduler),
        config,
    );

    if let Some(session) = lifecycle.initialize(anchors).await {
        log!(
            "[PropertyMap] map ready: {} markers, {:?} view",
            session.markers().len(),
            session.viewport().mode
        );
    }
}
