// backend/src/web.rs

use crate::catalog::ListingFilter;
use crate::dashboard::dashboard;
use crate::pages::{dashboard_page, listing_page, map_page, not_found_page, property_page};
use crate::state::AppState;
use axum::http::{StatusCode, header};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Local;
use estate_shared::{DashboardData, ListingsPayload};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

const STATIC_DIR: &str = "./frontend/dist/public";

/// Public router constructor
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(STATIC_DIR)
        .precompressed_br()
        .precompressed_gzip();

    Router::new()
        .route("/", get(get_map_page))
        .route("/dashboard", get(get_dashboard_page))
        .route("/properties", get(get_listing_page))
        .route("/property/{id}", get(get_property_page))
        .route("/api/listings", get(get_listings))
        .route("/api/investment-news", get(get_investment_news))
        .route("/api/dashboard", get(get_dashboard))
        // anything that doesn't match the above routes goes to the static files
        .fallback_service(static_dir)
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct CityQuery {
    #[serde(default)]
    pub city: Option<String>,
}

async fn get_map_page(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CityQuery>,
) -> Html<String> {
    let payload = state.catalog.listings(q.city.as_deref());
    println!(
        "[PAGE] map city={:?}: {} properties",
        q.city.as_deref().unwrap_or(""),
        payload.listings.len()
    );
    let cities = state.catalog.city_list();
    let featured = state.catalog.featured(q.city.as_deref());
    Html(map_page(&payload, q.city.as_deref(), &cities, &featured))
}

async fn get_property_page(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.catalog.published(id) {
        Some(p) => Html(property_page(p)).into_response(),
        None => {
            println!("[PAGE] property {id}: not found");
            (StatusCode::NOT_FOUND, Html(not_found_page())).into_response()
        }
    }
}

async fn get_listing_page(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ListingFilter>,
) -> Html<String> {
    let results = state.catalog.search(&filter);
    println!("[PAGE] properties {filter:?}: {} results", results.len());
    Html(listing_page(&results, &filter))
}

async fn get_dashboard_page() -> Html<String> {
    Html(dashboard_page())
}

async fn get_listings(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CityQuery>,
) -> Json<ListingsPayload> {
    let payload = state.catalog.listings(q.city.as_deref());
    println!(
        "[API] listings city={:?}: {} properties, {} categories",
        q.city.as_deref().unwrap_or(""),
        payload.listings.len(),
        payload.colors.len()
    );
    Json(payload)
}

async fn get_investment_news(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CityQuery>,
) -> impl IntoResponse {
    let news = state.catalog.news(q.city.as_deref());
    match &news.city {
        Some(city) => println!("[API] City news for {city:?}: {} chars", news.news.len()),
        None => println!("[API] Trending news: {} chars", news.news.len()),
    }
    ([(header::CACHE_CONTROL, "no-cache, no-store")], Json(news))
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardData> {
    Json(dashboard(&state.catalog, Local::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture;

    fn state() -> Arc<AppState> {
        Arc::new(AppState { catalog: fixture() })
    }

    fn city(c: &str) -> Query<CityQuery> {
        Query(CityQuery {
            city: Some(c.to_string()),
        })
    }

    #[tokio::test]
    async fn news_is_never_cached() {
        let resp = get_investment_news(State(state()), city("Mumbai"))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache, no-store"
        );
    }

    #[tokio::test]
    async fn listings_respect_city_filter() {
        let Json(all) = get_listings(State(state()), Query(CityQuery::default())).await;
        let Json(pune) = get_listings(State(state()), city("Pune")).await;
        assert_eq!(all.listings.len(), 3);
        assert_eq!(pune.listings.len(), 1);
        assert_eq!(pune.colors.len(), 1);
    }

    #[tokio::test]
    async fn map_page_uses_city_filter() {
        let Html(page) = get_map_page(State(state()), city("Pune")).await;
        assert!(page.contains("Palm Villa"));
        assert!(!page.contains("Sea Breeze"));
    }

    #[tokio::test]
    async fn map_page_lists_cities_and_featured() {
        let Html(page) = get_map_page(State(state()), Query(CityQuery::default())).await;
        assert!(page.contains("<option value=\"Pune\">Pune</option>"));
        assert!(page.contains("href=\"/property/1\""));
    }

    #[tokio::test]
    async fn property_page_hides_drafts() {
        let ok = get_property_page(State(state()), Path(1)).await;
        assert_eq!(ok.status(), StatusCode::OK);

        let draft = get_property_page(State(state()), Path(3)).await;
        assert_eq!(draft.status(), StatusCode::NOT_FOUND);

        let missing = get_property_page(State(state()), Path(404)).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn property_route_is_mounted() {
        use tower::ServiceExt;

        let resp = router(state())
            .oneshot(
                axum::http::Request::get("/property/3")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_page_filters_by_status() {
        let filter = ListingFilter {
            status: Some(estate_shared::PropertyStatus::Sold),
            ..Default::default()
        };
        let Html(page) = get_listing_page(State(state()), Query(filter)).await;
        assert!(page.contains("Palm Villa"));
        assert!(!page.contains("Sea Breeze"));

        let Html(page) = get_listing_page(State(state()), Query(ListingFilter::default())).await;
        assert!(!page.contains("Palm Villa"));
        assert!(page.contains("3 results"));
    }

    #[tokio::test]
    async fn dashboard_carries_currency() {
        let Json(d) = get_dashboard(State(state())).await;
        assert_eq!(d.currency_symbol, "₹");
        assert_eq!(d.charts.price_distribution.len(), 5);
        assert!(d.top_agents.len() <= 5);
    }
}
