use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod store;

use crate::config::Config;
use crate::metrics::MetricsStore;
use crate::models::{Factura, Product};
use crate::store::JsonStore;

/// Shared application state; clones share the same stores.
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<JsonStore<Product>>,
    pub facturas: Arc<JsonStore<Factura>>,
    pub metrics: Arc<RwLock<MetricsStore>>,
}

impl AppState {
    pub fn new(inventory_path: impl Into<PathBuf>, facturas_path: impl Into<PathBuf>) -> Self {
        Self {
            inventory: Arc::new(JsonStore::new(inventory_path)),
            facturas: Arc::new(JsonStore::new(facturas_path)),
            metrics: Arc::new(RwLock::new(MetricsStore::new())),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env for local runs
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,inventario_facturas=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    tokio::fs::create_dir_all(&config.data_dir).await?;

    let state = AppState::new(config.inventory_path(), config.facturas_path());
    info!(path = %state.inventory.path().display(), "Inventory collection");
    info!(path = %state.facturas.path().display(), "Facturas collection");

    let static_dir = if config.static_dir.is_dir() {
        info!(dir = %config.static_dir.display(), "Serving frontend");
        Some(config.static_dir.as_path())
    } else {
        warn!(dir = %config.static_dir.display(), "Frontend directory not found; static files disabled");
        None
    };

    let app = build_router(state, static_dir);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Servidor corriendo en http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Inventory ───────────────────────────────────────────────────────
        .route(
            "/api/inventory",
            get(handlers::inventory::list_inventory).post(handlers::inventory::create_product),
        )
        .route(
            "/api/inventory/:id",
            put(handlers::inventory::update_product).delete(handlers::inventory::delete_product),
        )

        // ── Facturas ────────────────────────────────────────────────────────
        .route(
            "/api/facturas",
            get(handlers::facturas::list_facturas).post(handlers::facturas::create_factura),
        )

        // ── Metrics ─────────────────────────────────────────────────────────
        .route(
            "/api/metrics",
            get(handlers::metrics::get_metrics).delete(handlers::metrics::reset_metrics),
        )
        .route("/api/metrics/export/csv", get(handlers::metrics::export_csv));

    // ── Frontend ────────────────────────────────────────────────────────────
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
