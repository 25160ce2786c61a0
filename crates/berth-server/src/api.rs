//! HTTP router.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::daemon::RuntimeDaemon;
use crate::handlers;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    daemon: Arc<dyn RuntimeDaemon>,
}

impl AppState {
    #[must_use]
    pub fn new(daemon: Arc<dyn RuntimeDaemon>) -> Self {
        Self { daemon }
    }

    /// The daemon handle every operation runs against.
    #[must_use]
    pub fn daemon(&self) -> &dyn RuntimeDaemon {
        self.daemon.as_ref()
    }
}

/// Creates the API router with all endpoints.
#[must_use]
pub fn create_router(daemon: Arc<dyn RuntimeDaemon>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Images
        .route("/images", get(handlers::list_images))
        .route(
            "/images/{id}",
            get(handlers::inspect_image).delete(handlers::delete_image),
        )
        .route("/images/{id}/run", post(handlers::run_image))
        // Containers
        .route("/containers", get(handlers::list_containers))
        .route(
            "/containers/{id}",
            get(handlers::inspect_container).delete(handlers::delete_container),
        )
        .route("/containers/{id}/start", post(handlers::start_container))
        .route("/containers/{id}/stop", post(handlers::stop_container))
        // Volumes
        .route(
            "/volumes",
            get(handlers::list_volumes).post(handlers::create_volume),
        )
        .route(
            "/volumes/{name}",
            get(handlers::inspect_volume).delete(handlers::delete_volume),
        )
        // Networks & system
        .route("/networks", get(handlers::list_networks))
        .route("/info", get(handlers::get_info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(daemon))
}
