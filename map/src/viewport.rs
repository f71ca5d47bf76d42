// map/src/viewport.rs

use crate::config::ViewportConfig;
use crate::geo::{bounds_zoom, projected_center, LatLng, LatLngBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// No usable points: country-level overview.
    Fallback,
    /// Exactly one point.
    Single,
    /// Padded bounds of all points fit the viewport.
    Fitted,
    /// Points too far apart to fit at a useful zoom; centered on their bounds instead.
    Spread,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    pub mode: ViewMode,
}

/// Initial view for the marker positions on a `size` (width, height) pixel map.
pub fn fit_viewport(
    points: &[LatLng],
    size: (f64, f64),
    cfg: &ViewportConfig,
    max_zoom: u8,
) -> Viewport {
    let fallback = Viewport {
        center: cfg.fallback_center,
        zoom: cfg.fallback_zoom,
        mode: ViewMode::Fallback,
    };

    match points {
        [] => fallback,
        [only] => Viewport {
            center: *only,
            zoom: cfg.single_zoom,
            mode: ViewMode::Single,
        },
        _ => {
            let Some(bounds) = LatLngBounds::from_points(points).filter(LatLngBounds::is_valid)
            else {
                return fallback;
            };

            let padded = bounds.pad(cfg.padding);
            let zoom = bounds_zoom(&padded, size.0, size.1, max_zoom);
            if zoom < cfg.min_fit_zoom {
                return Viewport {
                    center: bounds.center(),
                    zoom: cfg.spread_zoom,
                    mode: ViewMode::Spread,
                };
            }

            Viewport {
                center: projected_center(&padded, zoom),
                zoom,
                mode: ViewMode::Fitted,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: (f64, f64) = (800.0, 600.0);

    fn fit(points: &[LatLng]) -> Viewport {
        fit_viewport(points, SIZE, &ViewportConfig::default(), 19)
    }

    #[test]
    fn no_points_shows_the_country() {
        let v = fit(&[]);
        assert_eq!(v.mode, ViewMode::Fallback);
        assert_eq!(v.center, LatLng::new(20.5937, 78.9629));
        assert_eq!(v.zoom, 5.0);
    }

    #[test]
    fn one_point_is_centered_exactly() {
        let v = fit(&[LatLng::new(19.07, 72.87)]);
        assert_eq!(v.mode, ViewMode::Single);
        assert_eq!(v.center, LatLng::new(19.07, 72.87));
        assert_eq!(v.zoom, 15.0);
    }

    #[test]
    fn nearby_points_are_fitted() {
        // A handful of Mumbai listings a few km apart.
        let pts = [
            LatLng::new(19.02, 72.82),
            LatLng::new(19.07, 72.87),
            LatLng::new(19.11, 72.90),
        ];
        let v = fit(&pts);
        assert_eq!(v.mode, ViewMode::Fitted);
        assert!(v.zoom >= 8.0 && v.zoom <= 19.0, "zoom {}", v.zoom);
        assert!((v.center.lat - 19.065).abs() < 0.01);
        assert!((v.center.lng - 72.86).abs() < 0.01);
    }

    #[test]
    fn country_wide_points_fall_back_to_bounds_center() {
        let pts = [
            LatLng::new(28.61, 77.20), // Delhi
            LatLng::new(19.07, 72.87), // Mumbai
            LatLng::new(13.08, 80.27), // Chennai
            LatLng::new(22.57, 88.36), // Kolkata
        ];
        let v = fit(&pts);
        assert_eq!(v.mode, ViewMode::Spread);
        assert_eq!(v.zoom, 10.0);
        let expected = LatLng::new((13.08 + 28.61) / 2.0, (72.87 + 88.36) / 2.0);
        assert!((v.center.lat - expected.lat).abs() < 1e-9);
        assert!((v.center.lng - expected.lng).abs() < 1e-9);
    }

    #[test]
    fn malformed_bounds_use_the_fallback() {
        let pts = [LatLng::new(f64::NAN, 72.0), LatLng::new(f64::NAN, 73.0)];
        assert_eq!(fit(&pts).mode, ViewMode::Fallback);
    }
}
