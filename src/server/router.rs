//! Axum router: maps URL paths to handlers.

use crate::server::handlers::{
    analyze, anomalies, balloon_data, insights, launch_recommendations, stats, trajectory_data,
};
use crate::server::state::{AppState, SharedState};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the full router. Anything that is not an API route is served from
/// the static directory (`/` maps to its `index.html`).
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/balloon-data", get(balloon_data))
        .route("/api/trajectory-data", get(trajectory_data))
        .route("/api/stats", get(stats))
        .route("/api/analyze", post(analyze))
        .route("/api/insights", post(insights))
        .route("/api/anomalies", post(anomalies))
        .route("/api/launch-recommendations", post(launch_recommendations))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
