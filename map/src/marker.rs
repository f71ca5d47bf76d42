// map/src/marker.rs
//
// Builds the visual marker (colored round icon + hover card) for each
// mappable listing. Listings without a position are skipped, not reported.

use crate::config::MapConfig;
use crate::geo::{mappable, LatLng};
use estate_shared::escape;
use estate_shared::{price_label, CategoryColors, Listing};

pub const ICON_SIZE_PX: u32 = 32;
pub const ICON_CLASS: &str = "custom-marker";

/// Popup options handed to the map library for every marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupOptions {
    pub class_name: &'static str,
    pub min_width: u32,
    pub max_width: u32,
}

/// Popups close only through the interaction controller, never by the
/// library's own click/auto-close handling.
pub const POPUP_OPTIONS: PopupOptions = PopupOptions {
    class_name: "custom-popup",
    min_width: 280,
    max_width: 320,
};

/// Index of a marker within its map session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub id: MarkerId,
    pub listing_id: i64,
    pub position: LatLng,
    pub color: String,
    pub icon_html: String,
    pub popup_html: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    pub markers: Vec<MarkerSpec>,
    /// Marker positions in creation order, for the viewport fitter.
    pub points: Vec<LatLng>,
}

pub fn resolve_color<'a>(colors: &'a CategoryColors, property_type: &str, default: &'a str) -> &'a str {
    colors
        .get(property_type)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(default)
}

pub fn icon_html(color: &str) -> String {
    format!(
        "<div style=\"width:{s}px;height:{s}px;border-radius:50%;background:{color};\
         border:3px solid white;box-shadow:0 3px 12px rgba(0,0,0,0.3);\
         display:flex;align-items:center;justify-content:center;\
         font-size:14px;color:white;cursor:pointer;\">📍</div>",
        s = ICON_SIZE_PX,
        color = escape(color),
    )
}

pub fn popup_html(listing: &Listing, placeholder_image: &str) -> String {
    let placeholder = escape(placeholder_image);
    let img = listing.image().map(escape).unwrap_or_else(|| placeholder.clone());

    let plot = listing
        .plot()
        .map(|a| format!("<div class=\"detail-item\">📐 {a} sqft</div>"))
        .unwrap_or_default();

    let call = listing
        .phone()
        .map(|p| {
            let p = escape(p);
            format!("<a href=\"tel:{p}\" class=\"btn-sm btn-outline\">📞 Call</a>")
        })
        .unwrap_or_default();

    format!(
        "<div class=\"property-hover-card\">\
           <img src=\"{img}\" class=\"property-image\" onerror=\"this.src='{placeholder}'\"/>\
           <div class=\"property-content\">\
             <h4 class=\"property-title\">{name}</h4>\
             <div class=\"property-category\">{category}</div>\
             <div class=\"property-location\">📍 {address}</div>\
             <div class=\"property-price\">{price}</div>\
             <div class=\"property-details\">{plot}</div>\
             <div class=\"action-buttons\">\
               <a href=\"/property/{id}\" class=\"btn-sm btn-primary\">View Details</a>{call}\
             </div>\
           </div>\
         </div>",
        name = escape(&listing.name),
        category = escape(&listing.property_type),
        address = escape(&listing.full_address),
        price = price_label(listing.price),
        id = listing.id,
    )
}

/// One marker per mappable listing, ids assigned in input order.
pub fn build_markers(listings: &[Listing], colors: &CategoryColors, cfg: &MapConfig) -> MarkerSet {
    let mut set = MarkerSet::default();
    for (idx, (listing, position)) in mappable(listings).enumerate() {
        let color = resolve_color(colors, &listing.property_type, &cfg.default_color).to_string();
        set.points.push(position);
        set.markers.push(MarkerSpec {
            id: MarkerId(idx),
            listing_id: listing.id,
            position,
            icon_html: icon_html(&color),
            popup_html: popup_html(listing, &cfg.placeholder_image),
            color,
        });
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: i64, ty: &str, coords: Option<(f64, f64)>) -> Listing {
        Listing {
            id,
            name: format!("Listing {id}"),
            property_type: ty.to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            price: 0.0,
            full_address: "MG Road, Pune".to_string(),
            plot_area: None,
            image_url: None,
            contact_phone: None,
        }
    }

    #[test]
    fn markers_only_for_geolocated_listings() {
        let ls = vec![
            listing(1, "Villa", Some((18.52, 73.85))),
            listing(2, "Villa", None),
            listing(3, "Plot", Some((18.60, 73.90))),
        ];
        let set = build_markers(&ls, &CategoryColors::new(), &MapConfig::default());
        let ids: Vec<i64> = set.markers.iter().map(|m| m.listing_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(set.markers[1].id, MarkerId(1));
        assert_eq!(set.points.len(), 2);
    }

    #[test]
    fn unknown_category_uses_default_color() {
        let mut colors = CategoryColors::new();
        colors.insert("Villa".into(), "#059669".into());

        let ls = vec![
            listing(1, "Villa", Some((18.52, 73.85))),
            listing(2, "Office", Some((18.53, 73.86))),
        ];
        let set = build_markers(&ls, &colors, &MapConfig::default());
        assert_eq!(set.markers[0].color, "#059669");
        assert_eq!(set.markers[1].color, "#4f46e5");
        assert!(set.markers[1].icon_html.contains("background:#4f46e5"));
    }

    #[test]
    fn popup_omits_absent_optional_fields() {
        let l = listing(9, "Plot", Some((18.5, 73.8)));
        let html = popup_html(&l, "/img/none.png");
        assert!(html.contains("Price on Request"));
        assert!(html.contains("src=\"/img/none.png\""));
        assert!(!html.contains("sqft"));
        assert!(!html.contains("tel:"));
        assert!(html.contains("href=\"/property/9\""));
    }

    #[test]
    fn popup_renders_present_optional_fields() {
        let mut l = listing(4, "Villa", Some((18.5, 73.8)));
        l.price = 4_500_000.0;
        l.plot_area = Some(1200.0);
        l.contact_phone = Some("+91 98200 00000".into());
        l.image_url = Some("data:image/png;base64,AAA".into());

        let html = popup_html(&l, "/img/none.png");
        assert!(html.contains("₹45,00,000"));
        assert!(html.contains("📐 1200 sqft"));
        assert!(html.contains("href=\"tel:+91 98200 00000\""));
        assert!(html.contains("src=\"data:image/png;base64,AAA\""));
    }

    #[test]
    fn popup_escapes_listing_text() {
        let mut l = listing(5, "<b>Villa</b>", Some((18.5, 73.8)));
        l.name = "Tom & Jerry's".into();
        let html = popup_html(&l, "/x.png");
        assert!(html.contains("Tom &amp; Jerry&#39;s"));
        assert!(html.contains("&lt;b&gt;Villa&lt;/b&gt;"));
    }
}
