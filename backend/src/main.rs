// backend/src/main.rs

mod catalog;
mod dashboard;
mod pages;
mod state;
mod web;

use crate::catalog::{catalog_path, load_catalog};
use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Catalog ---
    let path = catalog_path();
    let catalog = load_catalog(&path)?;
    println!(
        "Loaded catalog {}: {} properties, {} agents",
        path.display(),
        catalog.properties.len(),
        catalog.agents.len()
    );

    // --- Shared state ---
    let state = Arc::new(AppState { catalog });

    // --- Webserver ---
    let app: Router = web::router(state);

    let addr = std::env::var("ESTATE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("Serving on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
