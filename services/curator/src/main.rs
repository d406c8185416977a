mod config;
mod error;
mod state;
mod routes_entries;
mod routes_export;

use std::path::Path;

use axum::{routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;

    let state = AppState::open(cfg.data_file.clone())
        .with_context(|| format!("Failed to open data file {}", cfg.data_file.display()))?;
    let loaded = state.curation.read().await.list().len();
    info!(data_file = %cfg.data_file.display(), entries = loaded, "collection loaded");

    let app = build_router(std::sync::Arc::new(state), cfg.static_dir.as_deref());

    let addr = &cfg.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("curator listening on http://{addr}");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_router(state: SharedState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/api", get(routes_entries::root))
        .route(
            "/api/entries",
            get(routes_entries::list_entries)
                .post(routes_entries::create_entry)
                .delete(routes_entries::delete_all_entries),
        )
        .route(
            "/api/entries/:id",
            get(routes_entries::get_entry).delete(routes_entries::delete_entry),
        )
        .route("/api/validate", post(routes_entries::validate_entry))
        .route("/api/stats", get(routes_export::get_stats))
        .route("/api/download", get(routes_export::download_json))
        .route("/api/download/jsonl", get(routes_export::download_jsonl))
        .with_state(state);

    // API routes win; everything else falls through to the static site
    let app = match static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving static files");
            api.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => api,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
