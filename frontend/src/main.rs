// frontend/src/main.rs
//
// Browser entry point for the property pages. Every page loads the same
// bundle; each feature checks for its own anchor elements and stays idle on
// pages that lack them.

#[cfg(target_arch = "wasm32")]
mod dashboard;
#[cfg(target_arch = "wasm32")]
mod http;
#[cfg(target_arch = "wasm32")]
mod js;
#[cfg(target_arch = "wasm32")]
mod leaflet;
#[cfg(target_arch = "wasm32")]
mod map_host;
#[cfg(target_arch = "wasm32")]
mod ticker;
#[cfg(target_arch = "wasm32")]
mod timers;

#[cfg(target_arch = "wasm32")]
use estate_map::log_warn;

/// `window` property marking that some evaluation of this bundle has started.
#[cfg(target_arch = "wasm32")]
const BOOT_FLAG: &str = "__estateMapBooted";

#[cfg(target_arch = "wasm32")]
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
fn start() {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    wasm_bindgen_futures::spawn_local(ticker::load_ticker());
    wasm_bindgen_futures::spawn_local(map_host::init_property_map());
    // Last: on the web the Dioxus launch hands control to its own loop.
    dashboard::mount_if_present(&doc);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    init_panic_hook();

    estate_map::BootGuard::new(js::WindowFlag(BOOT_FLAG)).run_once(|| {
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if doc.ready_state() != "loading" {
            start();
            return;
        }
        let on_ready = Closure::once(start);
        if let Err(e) = doc.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
        ) {
            log_warn!("[Boot] could not wait for DOMContentLoaded: {e:?}");
            return;
        }
        on_ready.forget();
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("estate_frontend targets wasm32; build it with `dx build --platform web`.");
}
