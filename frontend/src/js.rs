// frontend/src/js.rs
//
// Small bridge to page-level JavaScript: globals loaded by <script> tags
// (Leaflet, Chart.js) and one-off snippets.

use estate_map::{log_warn, BootFlag};
use wasm_bindgen::JsValue;

pub fn js_eval(js: &str) {
    if let Err(e) = js_sys::eval(js) {
        log_warn!("[PropertyMap] script evaluation failed: {e:?}");
    }
}

/// `window[key]`, if set.
pub fn js_window_value(key: &str) -> Option<JsValue> {
    let win = web_sys::window()?;
    let v = js_sys::Reflect::get(&win, &JsValue::from_str(key)).ok()?;
    (!v.is_undefined() && !v.is_null()).then_some(v)
}

/// Whether a page script has defined `window[key]`.
pub fn js_global_defined(key: &str) -> bool {
    js_window_value(key).is_some()
}

/// JSON text to a plain JS object, for option bags handed to libraries.
pub fn js_object<T: serde::Serialize>(value: &T) -> Result<JsValue, String> {
    let text = serde_json::to_string(value).map_err(|e| format!("serialize options: {e}"))?;
    js_sys::JSON::parse(&text).map_err(|e| format!("JSON.parse options: {e:?}"))
}

/// JS string literal for `s`, safe to splice into evaluated source.
pub fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Boolean property on `window`. Every evaluation of the bundle sees the same one.
pub struct WindowFlag(pub &'static str);

impl BootFlag for WindowFlag {
    fn is_set(&self) -> bool {
        js_window_value(self.0).is_some_and(|v| v.is_truthy())
    }

    fn set(&self) {
        let Some(win) = web_sys::window() else {
            return;
        };
        if let Err(e) = js_sys::Reflect::set(&win, &JsValue::from_str(self.0), &JsValue::TRUE) {
            log_warn!("[Boot] could not set window.{}: {e:?}", self.0);
        }
    }
}
