// shared/src/lib.rs

use serde::{Deserialize, Deserializer, Serialize};

mod colors;
mod html;
mod money;

pub use colors::CategoryColors;
pub use html::escape;
pub use money::{format_compact_inr, format_inr, price_label};

/// One geolocated property as the map page receives it.
/// Field names follow the page payload (snake_case) so server and browser agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub property_type: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_address: String,
    #[serde(default)]
    pub plot_area: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Page payloads write `null` for blank fields; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Listing {
    /// Image URL, treating an empty string as absent.
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Contact phone, treating an empty string as absent.
    pub fn phone(&self) -> Option<&str> {
        self.contact_phone.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Plot area, treating zero/negative as absent.
    pub fn plot(&self) -> Option<f64> {
        self.plot_area.filter(|a| a.is_finite() && *a > 0.0)
    }
}

/// `/api/listings` response; the same data the map page embeds in its anchors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingsPayload {
    pub listings: Vec<Listing>,
    pub colors: CategoryColors,
}

/// `/api/investment-news` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerNews {
    #[serde(default)]
    pub news: String,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Sold,
    Rented,
}

impl PropertyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Rented => "rented",
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard payload (`/api/dashboard`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub charts: DashboardCharts,
    pub top_agents: Vec<AgentSummary>,
    pub recent_properties: Vec<RecentProperty>,
    #[serde(default)]
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_properties: u64,
    pub available: u64,
    pub sold: u64,
    pub rented: u64,
    pub featured: u64,
    pub published: u64,
    pub total_value: f64,
    pub available_value: f64,
    pub sold_value: f64,
    pub avg_price: f64,
    pub total_agents: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
    pub category_data: Vec<CategoryCount>,
    pub city_data: Vec<CityCount>,
    pub monthly_data: Vec<MonthlyCount>,
    pub price_distribution: Vec<PriceBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCount {
    pub city: String,
    pub count: u64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: i64,
    pub name: String,
    pub deals: u32,
    pub sales_volume: f64,
    pub active_properties: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentProperty {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub price: f64,
    pub status: PropertyStatus,
    pub category: String,
}
