//! Catalog Server - mirrors a WooCommerce catalog into PostgreSQL.
//!
//! This server runs sync passes from the WooCommerce REST API into a local
//! products table, on a schedule and on demand, and serves the mirrored
//! catalog together with segment evaluation over HTTP.

mod config;
mod db;
mod error;
mod handlers;
mod routes;
mod scheduler;
mod woocommerce;

use crate::config::Config;
use crate::db::{PgProductStore, Pool};
use crate::woocommerce::WooCommerceClient;
use axum::Router;
use catalog_engine::{ProductStore, Reconciler};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub store: Arc<dyn ProductStore>,
    pub reconciler: Arc<Reconciler>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "catalog_server=debug,catalog_engine=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Catalog Server on {}:{}", config.host, config.port);

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    // Wire the remote catalog into the local store
    let store: Arc<dyn ProductStore> = Arc::new(PgProductStore::new(pool.clone()));
    let source = Arc::new(WooCommerceClient::new(&config.woocommerce)?);
    tracing::info!(url = source.products_url(), "Using WooCommerce catalog");

    let reconciler =
        Arc::new(Reconciler::new(source, store.clone()).with_policy(config.sync.policy));
    let _scheduler = scheduler::spawn(reconciler.clone(), config.sync);

    // Build application state
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        reconciler,
    };

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
