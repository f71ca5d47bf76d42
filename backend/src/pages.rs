// backend/src/pages.rs
//
// Server-rendered pages. The map page embeds its listing payload in data
// attributes so the browser can draw markers without a second request. The
// detail and list pages are plain HTML and load no bundle.

use crate::catalog::{ListingFilter, PropertyRecord};
use estate_shared::{ListingsPayload, escape, format_compact_inr, price_label};
use std::fmt::Write;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";
const BUNDLE_JS: &str = "/wasm/estate_frontend.js";

fn page(title: &str, head_extra: &str, body: &str) -> String {
    let script = format!("<script type=\"module\">import init from \"{BUNDLE_JS}\"; init();</script>\n");
    document(title, head_extra, body, &script)
}

fn static_page(title: &str, body: &str) -> String {
    document(title, "", body, "")
}

fn document(title: &str, head_extra: &str, body: &str, script: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n{head_extra}</head>\n<body>\n{body}\n\
         {script}</body>\n</html>\n",
        title = escape(title),
    )
}

fn city_selector(cities: &[String], selected: Option<&str>) -> String {
    let mut out = String::from(
        "<form id=\"city-select\" method=\"get\" action=\"/\">\
         <select name=\"city\" onchange=\"this.form.submit()\">\
         <option value=\"\">All cities</option>",
    );
    for city in cities {
        let mark = if selected == Some(city.as_str()) { " selected" } else { "" };
        let city = escape(city);
        let _ = write!(out, "<option value=\"{city}\"{mark}>{city}</option>");
    }
    out.push_str("</select><noscript><button type=\"submit\">Go</button></noscript></form>");
    out
}

fn property_card(p: &PropertyRecord) -> String {
    let mut card = format!(
        "<a class=\"property-card\" href=\"/property/{id}\"><strong>{name}</strong>",
        id = p.id,
        name = escape(&p.name),
    );
    if let Some(city) = p.city_name() {
        let _ = write!(card, "<span class=\"city\">{}</span>", escape(city));
    }
    let _ = write!(
        card,
        "<span class=\"price\">{}</span><span class=\"status\">{}</span></a>",
        escape(&price_label(p.price)),
        p.status.as_str(),
    );
    card
}

fn featured_block(featured: &[&PropertyRecord]) -> String {
    if featured.is_empty() {
        return String::new();
    }
    let cards: String = featured.iter().map(|p| property_card(p)).collect();
    format!("<section id=\"featured-properties\"><h2>Featured</h2>{cards}</section>\n")
}

/// Map page. `payload` and `featured` must already be filtered to `city`;
/// `cities` feeds the selector.
pub fn map_page(
    payload: &ListingsPayload,
    city: Option<&str>,
    cities: &[String],
    featured: &[&PropertyRecord],
) -> String {
    let city = city.map(str::trim).filter(|c| !c.is_empty());
    let title = match city {
        Some(city) => format!("Properties in {city}"),
        None => "Property Map".to_string(),
    };

    // Serializing plain structs and string maps cannot fail.
    let listings = serde_json::to_string(&payload.listings).unwrap_or_else(|_| "[]".into());
    let colors = serde_json::to_string(&payload.colors).unwrap_or_else(|_| "{}".into());

    let head = format!(
        "<link rel=\"stylesheet\" href=\"{LEAFLET_CSS}\">\n\
         <script src=\"{LEAFLET_JS}\" defer></script>\n\
         <style>#propertyMap{{height:600px;border-radius:12px;}}</style>\n"
    );
    let body = format!(
        "<div id=\"wrap\">\n\
         <div id=\"top-bar\"><h1>{heading}</h1><span>{count} properties</span>{selector}\
         <a href=\"/properties\">Browse all</a></div>\n\
         <div id=\"ai-ticker-anchor\"></div>\n\
         <div id=\"map-display\">\n\
         <div id=\"property-data\" data-properties=\"{listings}\" hidden></div>\n\
         <div id=\"category-legend\" data-colors=\"{colors}\"></div>\n\
         <div id=\"propertyMap\"></div>\n\
         </div>\n{featured}</div>",
        heading = escape(&title),
        count = payload.listings.len(),
        selector = city_selector(cities, city),
        featured = featured_block(featured),
        listings = escape(&listings),
        colors = escape(&colors),
    );
    page(&title, &head, &body)
}

pub fn dashboard_page() -> String {
    let head = format!("<script src=\"{CHART_JS}\" defer></script>\n");
    page(
        "Property Dashboard",
        &head,
        "<div id=\"property-dashboard\"></div>",
    )
}

/// Read-only detail page for one published property.
pub fn property_page(p: &PropertyRecord) -> String {
    let mut body = format!(
        "<div id=\"property-detail\">\n<a href=\"/\">Back to map</a>\n\
         <h1>{name}</h1>\n<p class=\"price\">{price}</p>\n<dl>\n",
        name = escape(&p.name),
        price = escape(&price_label(p.price)),
    );
    let address = p.full_address();
    let plot = p.plot_area.filter(|a| a.is_finite() && *a > 0.0);
    let rows = [
        ("Type", p.category_name().map(str::to_string)),
        ("Status", Some(p.status.as_str().to_string())),
        ("Address", Some(address).filter(|a| !a.is_empty())),
        ("Plot area", plot.map(|a| format!("{a} sq ft"))),
        ("Contact", p.contact_phone.clone().filter(|c| !c.trim().is_empty())),
        ("Listed", Some(p.created_at.format("%d %b %Y").to_string())),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            let _ = writeln!(body, "<dt>{label}</dt><dd>{}</dd>", escape(&value));
        }
    }
    body.push_str("</dl>\n");
    if let Some(img) = p.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
        let _ = writeln!(body, "<img src=\"{}\" alt=\"{}\">", escape(img), escape(&p.name));
    }
    if p.is_geocoded()
        && let (Some(lat), Some(lng)) = (p.latitude, p.longitude)
    {
        let _ = writeln!(body, "<p class=\"coords\">{lat:.5}, {lng:.5}</p>");
    }
    body.push_str("</div>");
    static_page(&p.name, &body)
}

/// Property list with the search form pre-filled from `filter`.
pub fn listing_page(results: &[&PropertyRecord], filter: &ListingFilter) -> String {
    let value = |v: Option<&str>| escape(v.unwrap_or("")).into_owned();
    let status = filter.status.map(|s| s.as_str()).unwrap_or("");
    let mut options = String::from("<option value=\"\">Available and rented</option>");
    for s in ["available", "rented", "sold"] {
        let mark = if s == status { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{s}\"{mark}>{s}</option>");
    }

    let total: f64 = results.iter().map(|p| p.price).filter(|p| p.is_finite()).sum();
    let mut body = format!(
        "<div id=\"property-list\">\n<a href=\"/\">Back to map</a>\n<h1>Properties</h1>\n\
         <form method=\"get\" action=\"/properties\">\
         <input name=\"search\" placeholder=\"Name, city or zip\" value=\"{search}\">\
         <input name=\"city\" placeholder=\"City\" value=\"{city}\">\
         <input name=\"zip_code\" placeholder=\"Zip\" value=\"{zip}\">\
         <select name=\"status\">{options}</select>\
         <button type=\"submit\">Search</button></form>\n\
         <p class=\"summary\">{count} results, {total} total</p>\n",
        search = value(filter.text()),
        city = value(filter.city()),
        zip = value(filter.zip_code()),
        count = results.len(),
        total = format_compact_inr(total),
    );
    if results.is_empty() {
        body.push_str("<p class=\"empty\">No properties match.</p>\n");
    }
    for p in results {
        body.push_str(&property_card(p));
        body.push('\n');
    }
    body.push_str("</div>");
    static_page("Properties", &body)
}

pub fn not_found_page() -> String {
    static_page(
        "Not found",
        "<div id=\"not-found\"><h1>Property not found</h1><a href=\"/\">Back to map</a></div>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture;

    fn attr<'a>(html: &'a str, name: &str) -> &'a str {
        let start = html.find(&format!("{name}=\"")).unwrap() + name.len() + 2;
        let len = html[start..].find('"').unwrap();
        &html[start..start + len]
    }

    fn unescape(s: &str) -> String {
        s.replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    #[test]
    fn map_page_embeds_payload_in_anchors() {
        let payload = fixture().listings(None);
        let html = map_page(&payload, None, &[], &[]);

        for id in ["propertyMap", "property-data", "category-legend", "ai-ticker-anchor"] {
            assert!(html.contains(&format!("id=\"{id}\"")), "missing #{id}");
        }
        assert!(html.contains(LEAFLET_JS));

        let listings: Vec<estate_shared::Listing> =
            serde_json::from_str(&unescape(attr(&html, "data-properties"))).unwrap();
        assert_eq!(listings, payload.listings);

        let colors: estate_shared::CategoryColors =
            serde_json::from_str(&unescape(attr(&html, "data-colors"))).unwrap();
        assert_eq!(colors, payload.colors);
    }

    #[test]
    fn names_cannot_break_out_of_attributes() {
        let mut catalog = fixture();
        catalog.properties[0].name = "\"><script>alert(1)</script>".to_string();
        let html = map_page(&catalog.listings(None), None, &[], &catalog.featured(None));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn city_shows_in_title() {
        let catalog = fixture();
        let html = map_page(
            &catalog.listings(Some("Pune")),
            Some(" Pune "),
            &catalog.city_list(),
            &catalog.featured(Some("Pune")),
        );
        assert!(html.contains("<title>Properties in Pune</title>"));
        assert!(html.contains("1 properties"));
        assert!(html.contains("<option value=\"Pune\" selected>Pune</option>"));
        assert!(html.contains("<option value=\"Mumbai\">Mumbai</option>"));
        assert!(!html.contains("featured-properties"));
    }

    #[test]
    fn featured_cards_link_to_detail() {
        let catalog = fixture();
        let html = map_page(
            &catalog.listings(None),
            None,
            &catalog.city_list(),
            &catalog.featured(None),
        );
        assert!(html.contains("id=\"featured-properties\""));
        assert!(html.contains("href=\"/property/1\""));
        assert!(html.contains("<option value=\"\">All cities</option><option value=\"Mumbai\">"));
    }

    #[test]
    fn property_page_skips_blank_fields() {
        let catalog = fixture();
        let html = property_page(&catalog.properties[4]);
        assert!(html.contains("<h1>Loft</h1>"));
        assert!(html.contains("<dd>Mumbai</dd>"));
        assert!(html.contains("<dd>05 Dec 2025</dd>"));
        assert!(!html.contains("<dt>Type</dt>"));
        assert!(!html.contains("<dt>Contact</dt>"));
        assert!(!html.contains(BUNDLE_JS));

        let html = property_page(&catalog.properties[3]);
        assert!(html.contains("Price on Request"));
        assert!(!html.contains("class=\"coords\""));
    }

    #[test]
    fn listing_page_keeps_filter_values() {
        let catalog = fixture();
        let filter = ListingFilter {
            search: Some("\"sea".into()),
            status: Some(estate_shared::PropertyStatus::Sold),
            ..Default::default()
        };
        let html = listing_page(&catalog.search(&filter), &filter);
        assert!(html.contains("value=\"&quot;sea\""));
        assert!(html.contains("<option value=\"sold\" selected>"));
        assert!(html.contains("No properties match."));
        assert!(html.contains("0 results"));
    }

    #[test]
    fn dashboard_page_has_mount_point() {
        let html = dashboard_page();
        assert!(html.contains("id=\"property-dashboard\""));
        assert!(html.contains(CHART_JS));
        assert!(html.contains(BUNDLE_JS));
    }
}
