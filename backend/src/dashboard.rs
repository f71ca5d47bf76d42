// backend/src/dashboard.rs
//
// Aggregates behind `/api/dashboard`.

use crate::catalog::{Catalog, PropertyRecord};
use chrono::{Datelike, Months, NaiveDate};
use estate_shared::{
    AgentSummary, CategoryCount, CityCount, DashboardCharts, DashboardData, DashboardStats,
    MonthlyCount, PriceBucket, PropertyStatus, RecentProperty,
};
use std::collections::BTreeMap;

const TOP_CITIES: usize = 10;
const TOP_AGENTS: usize = 5;
const RECENT_PROPERTIES: usize = 5;
const MONTHS_SHOWN: u32 = 6;

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Price buckets as `[min, max)`.
const PRICE_RANGES: [(&str, f64, f64); 5] = [
    ("Below 50L", 0.0, 50.0 * LAKH),
    ("50L - 1Cr", 50.0 * LAKH, CRORE),
    ("1Cr - 2Cr", CRORE, 2.0 * CRORE),
    ("2Cr - 5Cr", 2.0 * CRORE, 5.0 * CRORE),
    ("Above 5Cr", 5.0 * CRORE, f64::INFINITY),
];

/// Aggregates as of `today`, which bounds the monthly chart.
pub fn dashboard(catalog: &Catalog, today: NaiveDate) -> DashboardData {
    DashboardData {
        stats: stats(catalog),
        charts: DashboardCharts {
            category_data: category_data(&catalog.properties),
            city_data: city_data(&catalog.properties),
            monthly_data: monthly_data(&catalog.properties, today),
            price_distribution: price_distribution(&catalog.properties),
        },
        top_agents: top_agents(catalog),
        recent_properties: recent_properties(&catalog.properties),
        currency_symbol: catalog.currency_symbol.clone(),
    }
}

fn price(p: &PropertyRecord) -> f64 {
    if p.price.is_finite() { p.price } else { 0.0 }
}

fn count(props: &[PropertyRecord], pred: impl Fn(&PropertyRecord) -> bool) -> u64 {
    props.iter().filter(|&p| pred(p)).count() as u64
}

pub fn stats(catalog: &Catalog) -> DashboardStats {
    let props = &catalog.properties;
    let value_of = |status: PropertyStatus| -> f64 {
        props.iter().filter(|p| p.status == status).map(price).sum()
    };

    let total_properties = props.len() as u64;
    let total_value: f64 = props.iter().map(price).sum();

    DashboardStats {
        total_properties,
        available: count(props, |p| p.status == PropertyStatus::Available),
        sold: count(props, |p| p.status == PropertyStatus::Sold),
        rented: count(props, |p| p.status == PropertyStatus::Rented),
        featured: count(props, |p| p.is_featured),
        published: count(props, |p| p.is_published),
        total_value,
        available_value: value_of(PropertyStatus::Available),
        sold_value: value_of(PropertyStatus::Sold),
        avg_price: if total_properties > 0 {
            total_value / total_properties as f64
        } else {
            0.0
        },
        total_agents: catalog.agents.iter().filter(|a| a.is_active).count() as u64,
    }
}

/// Categories with at least one property, by name.
pub fn category_data(props: &[PropertyRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for name in props.iter().filter_map(PropertyRecord::category_name) {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect()
}

/// Busiest cities first, ties by name.
pub fn city_data(props: &[PropertyRecord]) -> Vec<CityCount> {
    let mut by_city: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for p in props {
        if let Some(city) = p.city_name() {
            let entry = by_city.entry(city).or_default();
            entry.0 += 1;
            entry.1 += price(p);
        }
    }

    let mut cities: Vec<CityCount> = by_city
        .into_iter()
        .map(|(city, (count, total_value))| CityCount {
            city: city.to_string(),
            count,
            total_value,
        })
        .collect();
    // BTreeMap order is by name, so a stable sort keeps ties alphabetical.
    cities.sort_by(|a, b| b.count.cmp(&a.count));
    cities.truncate(TOP_CITIES);
    cities
}

/// Additions per calendar month over the last six months, oldest first.
/// Months without additions are left out.
pub fn monthly_data(props: &[PropertyRecord], today: NaiveDate) -> Vec<MonthlyCount> {
    let since = today
        .checked_sub_months(Months::new(MONTHS_SHOWN))
        .unwrap_or(NaiveDate::MIN);

    let mut by_month: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for p in props.iter().filter(|p| p.created_at >= since) {
        let month = p.created_at.with_day(1).unwrap_or(p.created_at);
        *by_month.entry(month).or_default() += 1;
    }

    by_month
        .into_iter()
        .map(|(month, count)| MonthlyCount {
            month: month.format("%b %Y").to_string(),
            count,
        })
        .collect()
}

pub fn price_distribution(props: &[PropertyRecord]) -> Vec<PriceBucket> {
    PRICE_RANGES
        .iter()
        .map(|&(label, min, max)| PriceBucket {
            label: label.to_string(),
            count: props
                .iter()
                .filter(|p| p.price >= min && p.price < max)
                .count() as u64,
        })
        .collect()
}

/// Most deals first, ties by id.
pub fn top_agents(catalog: &Catalog) -> Vec<AgentSummary> {
    let mut agents: Vec<_> = catalog.agents.iter().collect();
    agents.sort_by(|a, b| b.total_deals.cmp(&a.total_deals).then(a.id.cmp(&b.id)));
    agents
        .into_iter()
        .take(TOP_AGENTS)
        .map(|a| AgentSummary {
            id: a.id,
            name: a.name.clone(),
            deals: a.total_deals,
            sales_volume: a.total_sales_volume,
            active_properties: a.active_property_count,
        })
        .collect()
}

/// Newest first; on the same day, higher ids are newer.
pub fn recent_properties(props: &[PropertyRecord]) -> Vec<RecentProperty> {
    let mut recent: Vec<&PropertyRecord> = props.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    recent
        .into_iter()
        .take(RECENT_PROPERTIES)
        .map(|p| RecentProperty {
            id: p.id,
            name: p.name.clone(),
            city: p.city_name().unwrap_or_default().to_string(),
            price: price(p),
            status: p.status,
            category: p.category_name().unwrap_or("N/A").to_string(),
        })
        .collect()
}
