// map/src/lib.rs
//
// Host-agnostic core of the property map page. Everything that touches the
// browser (Leaflet, DOM, timers, fetch) is reached through the traits in
// `session`, `lifecycle` and `scheduler`, so the state machines here run the
// same under wasm32 and under `cargo test`.

#[macro_use]
pub mod diag;

pub mod boot;
pub mod config;
pub mod geo;
pub mod legend;
pub mod lifecycle;
pub mod marker;
pub mod popup;
pub mod readiness;
pub mod scheduler;
pub mod session;
pub mod ticker;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use boot::{BootFlag, BootGuard};
pub use config::MapConfig;
pub use geo::{LatLng, LatLngBounds};
pub use lifecycle::{
    HtmlTarget, InstanceHandle, InstanceId, InstanceRegistry, MapContainer, MapLibrary,
    MapLifecycle, PageAnchors,
};
pub use marker::{MarkerId, MarkerSpec};
pub use popup::{PopupCommand, PopupController, PopupState};
pub use scheduler::Scheduler;
pub use session::{EventSink, MapEvent, MapSession, MapSurface};
pub use viewport::{ViewMode, Viewport};
