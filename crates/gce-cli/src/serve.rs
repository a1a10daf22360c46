//! `GET /graph?refresh&threshold=` — the one in-scope API route (§6.2).

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use gce_core::{GceConfig, GraphCache, Sanitize};

struct AppState {
    cache: GraphCache,
    base_config: GceConfig,
}

#[derive(Debug, Deserialize)]
struct GraphQuery {
    refresh: Option<bool>,
    threshold: Option<f32>,
}

async fn graph_handler(State(state): State<Arc<AppState>>, Query(query): Query<GraphQuery>) -> impl IntoResponse {
    let mut config = state.base_config.clone();
    if let Some(t) = query.threshold {
        config.similarity_threshold = t;
    }
    if query.refresh.unwrap_or(false) {
        state.cache.invalidate();
    }

    match state.cache.get_or_build(&config) {
        Ok(response) => {
            let value = serde_json::to_value(&*response).expect("GraphResponse always serializes");
            Json(value.sanitize()).into_response()
        }
        Err(e) => {
            warn!("graph build failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("graph build failed: {e}")).into_response()
        }
    }
}

pub async fn run(store: PathBuf, config: GceConfig, addr: &str) -> std::io::Result<()> {
    let state = Arc::new(AppState { cache: GraphCache::new(store), base_config: config });

    let app = Router::new()
        .route("/graph", get(graph_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
