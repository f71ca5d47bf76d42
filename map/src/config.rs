// map/src/config.rs

use crate::geo::LatLng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the map page can tune. A page may override any subset through
/// a `data-map-config` JSON attribute on the map container; missing fields
/// keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Fixed: the override is read from the map container, so it cannot
    /// rename the elements used to find it.
    #[serde(skip_deserializing)]
    pub anchors: AnchorIds,
    /// Poll interval while waiting for the map library to load. No timeout.
    pub library_poll_ms: u64,
    /// Delay before a hover-leave is allowed to close a popup.
    pub close_debounce_ms: u64,
    /// Delay of the one forced size recalculation after construction.
    pub relayout_delay_ms: u64,
    pub default_color: String,
    pub placeholder_image: String,
    pub tiles: TileConfig,
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorIds {
    pub data: String,
    pub legend: String,
    pub map: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub url: String,
    pub attribution: String,
    pub max_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub fallback_center: LatLng,
    pub fallback_zoom: f64,
    pub single_zoom: f64,
    /// Fitted zooms below this mean the points are too spread out to fit usefully.
    pub min_fit_zoom: f64,
    pub spread_zoom: f64,
    pub padding: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            anchors: AnchorIds::default(),
            library_poll_ms: 200,
            close_debounce_ms: 100,
            relayout_delay_ms: 300,
            default_color: "#4f46e5".to_string(),
            placeholder_image: "/web/static/img/placeholder.png".to_string(),
            tiles: TileConfig::default(),
            viewport: ViewportConfig::default(),
        }
    }
}

impl Default for AnchorIds {
    fn default() -> Self {
        Self {
            data: "property-data".to_string(),
            legend: "category-legend".to_string(),
            map: "propertyMap".to_string(),
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 19,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            // Geographic center of India: country-level overview.
            fallback_center: LatLng::new(20.5937, 78.9629),
            fallback_zoom: 5.0,
            single_zoom: 15.0,
            min_fit_zoom: 8.0,
            spread_zoom: 10.0,
            padding: 0.1,
        }
    }
}

impl MapConfig {
    /// Defaults, overlaid with the page's JSON override when it parses.
    pub fn with_override(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(cfg) => cfg,
            Err(e) => {
                log_warn!("[PropertyMap] ignoring bad map config: {e}");
                Self::default()
            }
        }
    }

    pub fn library_poll(&self) -> Duration {
        Duration::from_millis(self.library_poll_ms)
    }

    pub fn close_debounce(&self) -> Duration {
        Duration::from_millis(self.close_debounce_ms)
    }

    pub fn relayout_delay(&self) -> Duration {
        Duration::from_millis(self.relayout_delay_ms)
    }
}
