// backend/src/catalog.rs
//
// In-memory property catalog, loaded once at startup from a JSON file.

use anyhow::Context;
use chrono::NaiveDate;
use estate_shared::{CategoryColors, Listing, ListingsPayload, PropertyStatus, TickerNews};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";

/// Marker colors, handed out to categories in first-seen order.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#059669", "#dc2626", "#7c3aed", "#ea580c", "#2563eb", "#d97706", "#0891b2", "#9333ea",
];

/// Category name for properties filed under none.
pub const UNCATEGORIZED: &str = "Property";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
    #[serde(default)]
    pub agents: Vec<AgentRecord>,
    #[serde(default)]
    pub news: NewsFeed,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_currency() -> String {
    "₹".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub plot_area: Option<f64>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: PropertyStatus,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    /// Day the listing was added.
    pub created_at: NaiveDate,
}

impl PropertyRecord {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn city_name(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Street, city and zip, skipping blanks.
    pub fn full_address(&self) -> String {
        [&self.street, &self.city, &self.zip_code]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Both coordinates set and non-zero; a zero coordinate means "not geocoded".
    pub fn is_geocoded(&self) -> bool {
        matches!(
            (self.latitude, self.longitude),
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub total_deals: u32,
    #[serde(default)]
    pub total_sales_volume: f64,
    #[serde(default)]
    pub active_property_count: u32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFeed {
    #[serde(default)]
    pub trending: String,
    /// city -> news text
    #[serde(default)]
    pub cities: BTreeMap<String, String>,
}

/// `/properties` query. Blank strings mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "status_param")]
    pub status: Option<PropertyStatus>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListingFilter {
    pub fn text(&self) -> Option<&str> {
        non_blank(&self.search)
    }

    pub fn city(&self) -> Option<&str> {
        non_blank(&self.city)
    }

    pub fn zip_code(&self) -> Option<&str> {
        non_blank(&self.zip_code)
    }
}

/// Unknown or empty status values are ignored instead of rejecting the request.
fn status_param<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<PropertyStatus>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|v| {
        let v = v.trim().to_ascii_lowercase();
        [PropertyStatus::Available, PropertyStatus::Sold, PropertyStatus::Rented]
            .into_iter()
            .find(|s| s.as_str() == v)
    }))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn catalog_path() -> PathBuf {
    if let Ok(path) = std::env::var("ESTATE_CATALOG_PATH") {
        return PathBuf::from(path);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CATALOG_PATH)
}

pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid catalog JSON in {path:?}"))
}

impl Catalog {
    /// Map page payload: published, geocoded properties, optionally limited to
    /// one city, plus a color per category that appears.
    pub fn listings(&self, city: Option<&str>) -> ListingsPayload {
        let city = city.map(str::trim).filter(|c| !c.is_empty());

        let mut colors = CategoryColors::new();
        let mut listings = Vec::new();

        for p in &self.properties {
            if !p.is_published || !p.is_geocoded() {
                continue;
            }
            if let Some(city) = city
                && p.city_name() != Some(city)
            {
                continue;
            }

            let category = p.category_name().unwrap_or(UNCATEGORIZED).to_string();
            if !colors.contains_key(&category) {
                let color = CATEGORY_PALETTE[colors.len() % CATEGORY_PALETTE.len()];
                colors.insert(category.clone(), color.to_string());
            }

            listings.push(Listing {
                id: p.id,
                name: p.name.clone(),
                property_type: category,
                latitude: p.latitude,
                longitude: p.longitude,
                price: if p.price.is_finite() { p.price } else { 0.0 },
                full_address: p.full_address(),
                plot_area: p.plot_area,
                image_url: p.image_url.clone(),
                contact_phone: p.contact_phone.clone(),
            });
        }

        ListingsPayload { listings, colors }
    }

    /// Distinct cities with a published property, sorted.
    pub fn city_list(&self) -> Vec<String> {
        let cities: BTreeSet<&str> = self
            .properties
            .iter()
            .filter(|p| p.is_published)
            .filter_map(PropertyRecord::city_name)
            .collect();
        cities.into_iter().map(str::to_string).collect()
    }

    /// Published, featured properties, optionally in one city.
    pub fn featured(&self, city: Option<&str>) -> Vec<&PropertyRecord> {
        let city = city.map(str::trim).filter(|c| !c.is_empty());
        self.properties
            .iter()
            .filter(|p| p.is_published && p.is_featured)
            .filter(|p| city.is_none() || p.city_name() == city)
            .collect()
    }

    /// A property visitors may see; drafts are hidden.
    pub fn published(&self, id: i64) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.id == id && p.is_published)
    }

    /// Listing page search. Without a status filter sold properties are left out.
    pub fn search(&self, filter: &ListingFilter) -> Vec<&PropertyRecord> {
        self.properties
            .iter()
            .filter(|p| p.is_published)
            .filter(|p| match filter.status {
                Some(status) => p.status == status,
                None => p.status != PropertyStatus::Sold,
            })
            .filter(|p| match filter.text() {
                Some(text) => {
                    contains_ci(&p.name, text)
                        || p.city.as_deref().is_some_and(|c| contains_ci(c, text))
                        || p.zip_code.as_deref().is_some_and(|z| contains_ci(z, text))
                }
                None => true,
            })
            .filter(|p| match filter.city() {
                Some(city) => p.city.as_deref().is_some_and(|c| contains_ci(c, city)),
                None => true,
            })
            .filter(|p| match filter.zip_code() {
                Some(zip) => p.zip_code.as_deref().is_some_and(|z| contains_ci(z, zip)),
                None => true,
            })
            .collect()
    }

    /// Ticker text: the city's news when a city is given, trending news otherwise.
    /// Unknown cities get empty news.
    pub fn news(&self, city: Option<&str>) -> TickerNews {
        let city = city.map(str::trim).filter(|c| !c.is_empty());
        let news = match city {
            Some(city) => self
                .news
                .cities
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(city))
                .map(|(_, text)| text.clone())
                .unwrap_or_default(),
            None => self.news.trending.clone(),
        };
        TickerNews {
            news,
            city: city.map(str::to_string),
        }
    }
}
