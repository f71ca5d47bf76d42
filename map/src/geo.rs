// map/src/geo.rs
//
// Coordinates, bounds, and the Web Mercator math the viewport fitter needs.
// Projection constants match the 256px slippy tile scheme Leaflet uses.

use estate_shared::Listing;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Position of a listing, or `None` when it cannot be placed on the map.
///
/// The catalog stores an unset coordinate as `0.0`, so zero counts as absent.
pub fn geo_point(listing: &Listing) -> Option<LatLng> {
    let lat = listing.latitude?;
    let lng = listing.longitude?;
    if lat == 0.0 || lng == 0.0 {
        return None;
    }
    let p = LatLng::new(lat, lng);
    p.is_valid().then_some(p)
}

/// Listings that can be placed on the map, paired with their position.
pub fn mappable(listings: &[Listing]) -> impl Iterator<Item = (&Listing, LatLng)> {
    listings
        .iter()
        .filter_map(|l| geo_point(l).map(|p| (l, p)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = *it.next()?;
        let mut b = Self {
            south_west: first,
            north_east: first,
        };
        for p in it {
            b.extend(*p);
        }
        Some(b)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn is_valid(&self) -> bool {
        self.south_west.lat.is_finite()
            && self.south_west.lng.is_finite()
            && self.north_east.lat.is_finite()
            && self.north_east.lng.is_finite()
            && self.south_west.lat <= self.north_east.lat
            && self.south_west.lng <= self.north_east.lng
    }

    /// Grows the bounds by `ratio` of their height/width on every side.
    pub fn pad(&self, ratio: f64) -> Self {
        let dh = (self.north_east.lat - self.south_west.lat).abs() * ratio;
        let dw = (self.north_east.lng - self.south_west.lng).abs() * ratio;
        Self {
            south_west: LatLng::new(self.south_west.lat - dh, self.south_west.lng - dw),
            north_east: LatLng::new(self.north_east.lat + dh, self.north_east.lng + dw),
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Pixel coordinates of `p` at `zoom`.
pub fn project(p: LatLng, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = scale * (p.lng + 180.0) / 360.0;
    let y = scale * (0.5 - (PI / 4.0 + lat / 2.0).tan().ln() / (2.0 * PI));
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lng = x / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / scale;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Largest integer zoom at which `bounds` fits inside a `width` x `height`
/// viewport, clamped to `0..=max_zoom`.
pub fn bounds_zoom(bounds: &LatLngBounds, width: f64, height: f64, max_zoom: u8) -> f64 {
    let (x0, y1) = project(bounds.south_west, 0.0);
    let (x1, y0) = project(bounds.north_east, 0.0);
    let span_x = (x1 - x0).abs();
    let span_y = (y1 - y0).abs();

    let scale_x = if span_x > 0.0 { width / span_x } else { f64::INFINITY };
    let scale_y = if span_y > 0.0 { height / span_y } else { f64::INFINITY };
    let scale = scale_x.min(scale_y);

    let zoom = scale.log2().floor();
    if zoom.is_nan() {
        return 0.0;
    }
    zoom.clamp(0.0, f64::from(max_zoom))
}

/// Center of `bounds` measured in projected space, which is where a fitted
/// viewport actually lands.
pub fn projected_center(bounds: &LatLngBounds, zoom: f64) -> LatLng {
    let (x0, y0) = project(bounds.south_west, zoom);
    let (x1, y1) = project(bounds.north_east, zoom);
    unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(lat: Option<f64>, lng: Option<f64>) -> Listing {
        Listing {
            id: 1,
            name: "x".into(),
            property_type: "Villa".into(),
            latitude: lat,
            longitude: lng,
            price: 0.0,
            full_address: String::new(),
            plot_area: None,
            image_url: None,
            contact_phone: None,
        }
    }

    #[test]
    fn only_listings_with_both_coordinates_are_mappable() {
        let ls = vec![
            listing(Some(19.07), Some(72.87)),
            listing(None, Some(72.87)),
            listing(Some(19.07), None),
            listing(None, None),
            listing(Some(0.0), Some(72.87)),
            listing(Some(f64::NAN), Some(72.87)),
            listing(Some(123.0), Some(72.87)),
        ];
        let got: Vec<LatLng> = mappable(&ls).map(|(_, p)| p).collect();
        assert_eq!(got, vec![LatLng::new(19.07, 72.87)]);
    }

    #[test]
    fn bounds_pad_and_center() {
        let pts = [LatLng::new(10.0, 20.0), LatLng::new(20.0, 40.0)];
        let b = LatLngBounds::from_points(&pts).unwrap();
        assert_eq!(b.center(), LatLng::new(15.0, 30.0));

        let p = b.pad(0.1);
        assert!((p.south_west.lat - 9.0).abs() < 1e-9);
        assert!((p.north_east.lng - 42.0).abs() < 1e-9);
    }

    #[test]
    fn projection_round_trips_near_origin() {
        let p = LatLng::new(19.07, 72.87);
        let (x, y) = project(p, 12.0);
        let back = unproject(x, y, 12.0);
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn identical_points_zoom_to_max() {
        let pts = [LatLng::new(19.0, 72.0), LatLng::new(19.0, 72.0)];
        let b = LatLngBounds::from_points(&pts).unwrap();
        assert_eq!(bounds_zoom(&b, 800.0, 600.0, 19), 19.0);
    }

    #[test]
    fn zero_sized_viewport_zooms_out_fully() {
        let pts = [LatLng::new(19.0, 72.0), LatLng::new(19.1, 72.1)];
        let b = LatLngBounds::from_points(&pts).unwrap();
        assert_eq!(bounds_zoom(&b, 0.0, 0.0, 19), 0.0);
    }
}
