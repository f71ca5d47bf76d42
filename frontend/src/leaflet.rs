// frontend/src/leaflet.rs
//
// The slice of Leaflet's API the map page uses. Leaflet itself is loaded by a
// <script> tag and lives on `window.L`.

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

#[wasm_bindgen]
extern "C" {
    pub type Map;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    pub fn new_map(container: &HtmlElement) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &Map, center: &JsValue, zoom: f64) -> Map;

    #[wasm_bindgen(method, js_name = invalidateSize)]
    pub fn invalidate_size(this: &Map) -> Map;

    #[wasm_bindgen(method, js_name = getSize)]
    pub fn get_size(this: &Map) -> Point;

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, handler: &Function) -> Map;

    #[wasm_bindgen(catch, method)]
    pub fn remove(this: &Map) -> Result<Map, JsValue>;

    pub type Point;

    #[wasm_bindgen(method, getter)]
    pub fn x(this: &Point) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn y(this: &Point) -> f64;

    pub type TileLayer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url: &str, options: &JsValue) -> Result<TileLayer, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &TileLayer, map: &Map) -> TileLayer;

    pub type DivIcon;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    pub fn div_icon(options: &JsValue) -> DivIcon;

    pub type Marker;

    #[wasm_bindgen(catch, js_namespace = L, js_name = marker)]
    pub fn new_marker(latlng: &JsValue, options: &JsValue) -> Result<Marker, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Marker, map: &Map) -> Marker;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &Marker, html: &str, options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = openPopup)]
    pub fn open_popup(this: &Marker) -> Marker;

    #[wasm_bindgen(method, js_name = closePopup)]
    pub fn close_popup(this: &Marker) -> Marker;

    #[wasm_bindgen(method, js_name = getPopup)]
    pub fn get_popup(this: &Marker) -> Option<Popup>;

    #[wasm_bindgen(method)]
    pub fn on(this: &Marker, event: &str, handler: &Function) -> Marker;

    pub type Popup;

    #[wasm_bindgen(method, js_name = getElement)]
    pub fn get_element(this: &Popup) -> Option<HtmlElement>;
}

/// `[lat, lng]` as Leaflet accepts it.
pub fn lat_lng(lat: f64, lng: f64) -> JsValue {
    let arr = js_sys::Array::new();
    arr.push(&JsValue::from_f64(lat));
    arr.push(&JsValue::from_f64(lng));
    arr.into()
}

/// `window.L` is loaded and exposes the map constructor.
pub fn is_loaded() -> bool {
    crate::js::js_window_value("L")
        .and_then(|l| js_sys::Reflect::get(&l, &JsValue::from_str("map")).ok())
        .is_some_and(|f| f.is_function())
}
