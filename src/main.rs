//! Community Match Backend
//!
//! REST backend that pairs members of a community by compatibility, tracks
//! their like/pass decisions and reports match analytics, persisted in SQLite.

mod analytics;
mod api;
mod auth;
mod clock;
mod config;
mod db;
mod errors;
mod matching;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clock::{Clock, SystemClock};
use config::Config;
use db::Repository;
use matching::PairLocks;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub pair_locks: Arc<PairLocks>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Community Match Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Request timeout: {:?}", config.request_timeout);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (MATCH_API_PSK). Authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path, config.request_timeout).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
        clock: Arc::new(SystemClock),
        pair_locks: Arc::new(PairLocks::new()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();
    let request_timeout = state.config.request_timeout;

    let api_routes = Router::new()
        // Users
        .route("/users/sync", post(api::sync_user))
        .route("/users/me", get(api::get_me))
        .route("/users/profile", put(api::update_profile))
        // Matching
        .route("/matches/potential", get(api::potential_matches))
        .route("/matches/connect", post(api::connect))
        // Analytics
        .route("/analytics/user", get(api::user_analytics))
        .route("/analytics/community", get(api::community_analytics))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(move |req, next| {
                    api::enforce_timeout(request_timeout, req, next)
                })),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod testing;
