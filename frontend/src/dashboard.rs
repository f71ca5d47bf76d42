// frontend/src/dashboard.rs
//
// Portfolio dashboard: stat cards, top agents, recent listings and four
// Chart.js charts. Mounted only on pages that carry #property-dashboard.

use crate::http::http_get_json;
use crate::js::{js_eval, js_global_defined, js_string};
use dioxus::prelude::*;
use dioxus_signals::{ReadableExt, Signal, WritableExt};
use estate_map::readiness::wait_until_ready;
use estate_map::{log, log_error};
use estate_shared::{
    format_compact_inr, CategoryCount, CityCount, DashboardCharts, DashboardData, MonthlyCount,
    PriceBucket, PropertyStatus,
};
use gloo_timers::future::TimeoutFuture;
use serde_json::{json, Value};
use std::time::Duration;
use web_sys::Document;

pub const ROOT_ID: &str = "property-dashboard";
const DATA_PATH: &str = "/api/dashboard";
const CHART_POLL_MS: u64 = 200;

const CATEGORY_PALETTE: [&str; 6] = ["#3498db", "#2ecc71", "#f39c12", "#e74c3c", "#9b59b6", "#1abc9c"];
const BAR_COLOR: &str = "#3498db";

/// Launches the dashboard app into #property-dashboard if the page has one.
pub fn mount_if_present(doc: &Document) {
    if doc.get_element_by_id(ROOT_ID).is_none() {
        return;
    }
    log!("[Dashboard] mounting");
    dioxus::LaunchBuilder::web()
        .with_cfg(dioxus::web::Config::new().rootname(ROOT_ID))
        .launch(PropertyDashboard);
}

fn open_property_list(status: PropertyStatus) {
    let Some(w) = web_sys::window() else {
        return;
    };
    let href = format!("/properties?status={}", status.as_str());
    if let Err(e) = w.location().set_href(&href) {
        log_error!("[Dashboard] navigation to {href} failed: {e:?}");
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn category_chart(data: &[CategoryCount]) -> Option<Value> {
    if data.is_empty() {
        return None;
    }
    let labels: Vec<&str> = data.iter().map(|c| c.name.as_str()).collect();
    let counts: Vec<u64> = data.iter().map(|c| c.count).collect();
    Some(json!({
        "type": "doughnut",
        "data": {
            "labels": labels,
            "datasets": [{ "data": counts, "backgroundColor": CATEGORY_PALETTE }],
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "position": "bottom" } },
        },
    }))
}

fn bar_chart(label: &str, labels: Vec<&str>, counts: Vec<u64>) -> Option<Value> {
    if labels.is_empty() {
        return None;
    }
    Some(json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [{ "label": label, "data": counts, "backgroundColor": BAR_COLOR }],
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "display": false } },
            "scales": { "y": { "beginAtZero": true } },
        },
    }))
}

fn city_chart(data: &[CityCount]) -> Option<Value> {
    bar_chart(
        "Properties",
        data.iter().map(|c| c.city.as_str()).collect(),
        data.iter().map(|c| c.count).collect(),
    )
}

fn price_chart(data: &[PriceBucket]) -> Option<Value> {
    // All-zero buckets draw as an empty axis; skip them like an empty series.
    if data.iter().all(|b| b.count == 0) {
        return None;
    }
    bar_chart(
        "Properties",
        data.iter().map(|b| b.label.as_str()).collect(),
        data.iter().map(|b| b.count).collect(),
    )
}

fn monthly_chart(data: &[MonthlyCount]) -> Option<Value> {
    if data.is_empty() {
        return None;
    }
    let labels: Vec<&str> = data.iter().map(|m| m.month.as_str()).collect();
    let counts: Vec<u64> = data.iter().map(|m| m.count).collect();
    Some(json!({
        "type": "line",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "New listings",
                "data": counts,
                "borderColor": BAR_COLOR,
                "tension": 0.3,
                "fill": false,
            }],
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "display": false } },
            "scales": { "y": { "beginAtZero": true } },
        },
    }))
}

/// Replaces any chart already drawn on the canvas (refresh redraws).
fn draw_chart(canvas_id: &str, config: &Value) {
    js_eval(&format!(
        r#"
        (function() {{
          try {{
            const el = document.getElementById({id});
            if (!el) return;
            const old = Chart.getChart(el);
            if (old) old.destroy();
            new Chart(el, {config});
          }} catch (e) {{
            console.error("[Dashboard] chart failed", e);
          }}
        }})();
        "#,
        id = js_string(canvas_id),
    ));
}

fn draw_charts(charts: &DashboardCharts) {
    let all = [
        ("categoryChart", category_chart(&charts.category_data)),
        ("cityChart", city_chart(&charts.city_data)),
        ("priceChart", price_chart(&charts.price_distribution)),
        ("monthlyChart", monthly_chart(&charts.monthly_data)),
    ];
    for (id, config) in all {
        if let Some(config) = config {
            draw_chart(id, &config);
        }
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

struct StatCard {
    label: &'static str,
    value: String,
    /// Clicking opens the listing page filtered to this status.
    status: Option<PropertyStatus>,
}

fn stat_cards(d: &DashboardData) -> Vec<StatCard> {
    let s = &d.stats;
    let money = |v: f64| format!("{}{}", d.currency_symbol, format_compact_inr(v));
    let count = |label, n: u64, status| StatCard {
        label,
        value: n.to_string(),
        status,
    };
    let value = |label, v: f64| StatCard {
        label,
        value: money(v),
        status: None,
    };

    vec![
        count("Total Properties", s.total_properties, None),
        count("Available", s.available, Some(PropertyStatus::Available)),
        count("Sold", s.sold, Some(PropertyStatus::Sold)),
        count("Rented", s.rented, Some(PropertyStatus::Rented)),
        count("Featured", s.featured, None),
        count("Agents", s.total_agents, None),
        value("Portfolio Value", s.total_value),
        value("Available Value", s.available_value),
        value("Sold Value", s.sold_value),
        value("Average Price", s.avg_price),
    ]
}

fn card_style(clickable: bool) -> String {
    format!(
        "padding:14px 16px; border-radius:12px; background:#ffffff; \
         border:1px solid #e5e7eb; box-shadow:0 4px 14px rgba(15,23,42,0.08); \
         cursor:{};",
        if clickable { "pointer" } else { "default" }
    )
}

const PANEL_STYLE: &str = "padding:16px; border-radius:12px; background:#ffffff; border:1px solid #e5e7eb;";
const CHART_BOX_STYLE: &str = "position:relative; height:280px;";

#[component]
pub fn PropertyDashboard() -> Element {
    let data: Signal<Option<DashboardData>> = use_signal(|| None);
    let loading = use_signal(|| true);
    let mut generation = use_signal(|| 0u64);

    // Fetch on mount and after every refresh.
    {
        let mut data = data;
        let mut loading = loading;
        use_effect(move || {
            let _ = *generation.read();
            spawn(async move {
                loading.set(true);
                match http_get_json::<DashboardData>(DATA_PATH).await {
                    Ok(d) => data.set(Some(d)),
                    Err(e) => log_error!("[Dashboard] Error loading dashboard data: {e}"),
                }
                loading.set(false);
            });
        });
    }

    // Redraw charts whenever new data lands. Chart.js may still be loading.
    use_effect(move || {
        let Some(charts) = data.read().as_ref().map(|d| d.charts.clone()) else {
            return;
        };
        spawn(async move {
            wait_until_ready(
                || js_global_defined("Chart"),
                Duration::from_millis(CHART_POLL_MS),
                |d| TimeoutFuture::new(u32::try_from(d.as_millis()).unwrap_or(u32::MAX)),
            )
            .await;
            draw_charts(&charts);
        });
    });

    let snapshot = data.read().clone();
    let Some(d) = snapshot else {
        if *loading.read() {
            return rsx! {
                div { style: "padding:24px; color:#64748b;", "Loading dashboard…" }
            };
        }
        return rsx! {};
    };

    let cards = stat_cards(&d);
    let symbol = d.currency_symbol.clone();

    rsx! {
        div {
            style: "display:flex; flex-direction:column; gap:16px; padding:16px; background:#f8fafc;",

            div { style: "display:flex; align-items:center; justify-content:space-between;",
                h2 { style: "margin:0; color:#0f172a;", "Property Dashboard" }
                button {
                    style: "padding:8px 14px; border-radius:8px; border:1px solid #cbd5e1; background:#fff; cursor:pointer;",
                    disabled: *loading.read(),
                    onclick: move |_| *generation.write() += 1,
                    if *loading.read() { "Refreshing…" } else { "Refresh" }
                }
            }

            div {
                style: "display:grid; grid-template-columns:repeat(auto-fit, minmax(180px, 1fr)); gap:12px;",
                for card in cards {
                    div {
                        key: "{card.label}",
                        style: "{card_style(card.status.is_some())}",
                        onclick: move |_| {
                            if let Some(status) = card.status {
                                open_property_list(status);
                            }
                        },
                        div { style: "font-size:12px; color:#64748b; text-transform:uppercase;", "{card.label}" }
                        div { style: "font-size:22px; font-weight:700; color:#0f172a;", "{card.value}" }
                    }
                }
            }

            div {
                style: "display:grid; grid-template-columns:repeat(auto-fit, minmax(320px, 1fr)); gap:12px;",
                div { style: PANEL_STYLE,
                    h3 { style: "margin:0 0 8px 0;", "By Category" }
                    div { style: CHART_BOX_STYLE, canvas { id: "categoryChart" } }
                }
                div { style: PANEL_STYLE,
                    h3 { style: "margin:0 0 8px 0;", "Top Cities" }
                    div { style: CHART_BOX_STYLE, canvas { id: "cityChart" } }
                }
                div { style: PANEL_STYLE,
                    h3 { style: "margin:0 0 8px 0;", "Price Ranges" }
                    div { style: CHART_BOX_STYLE, canvas { id: "priceChart" } }
                }
                div { style: PANEL_STYLE,
                    h3 { style: "margin:0 0 8px 0;", "Monthly Additions" }
                    div { style: CHART_BOX_STYLE, canvas { id: "monthlyChart" } }
                }
            }

            div {
                style: "display:grid; grid-template-columns:repeat(auto-fit, minmax(320px, 1fr)); gap:12px;",

                div { style: PANEL_STYLE,
                    h3 { style: "margin:0 0 8px 0;", "Top Agents" }
                    for agent in d.top_agents.iter() {
                        div {
                            key: "{agent.id}",
                            style: "display:flex; justify-content:space-between; padding:6px 0; border-bottom:1px solid #f1f5f9;",
                            span { "{agent.name}" }
                            span { style: "color:#64748b;",
                                "{agent.deals} deals · {symbol}{format_compact_inr(agent.sales_volume)} · {agent.active_properties} active"
                            }
                        }
                    }
                    if d.top_agents.is_empty() {
                        div { style: "color:#94a3b8;", "No agents yet." }
                    }
                }

                div { style: PANEL_STYLE,
                    h3 { style: "margin:0 0 8px 0;", "Recent Properties" }
                    for p in d.recent_properties.iter() {
                        a {
                            key: "{p.id}",
                            href: "/property/{p.id}",
                            style: "display:flex; justify-content:space-between; padding:6px 0; border-bottom:1px solid #f1f5f9; color:inherit; text-decoration:none;",
                            span { "{p.name} ({p.category}, {p.city})" }
                            span { style: "color:#64748b;",
                                "{symbol}{format_compact_inr(p.price)} · {p.status.as_str()}"
                            }
                        }
                    }
                    if d.recent_properties.is_empty() {
                        div { style: "color:#94a3b8;", "No properties yet." }
                    }
                }
            }
        }
    }
}
