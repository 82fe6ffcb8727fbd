pub mod auth;
pub mod files;
pub mod health;
pub mod meetings;
pub mod schemas;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use huddle_blob::BlobStore;
use huddle_store::DocumentStore;

use crate::auth::AuthProvider;
use crate::auth::middleware::AuthLayer;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The meeting document store.
    pub store: Arc<DocumentStore>,
    /// The blob area (used directly by the upload and view paths).
    pub blobs: Arc<dyn BlobStore>,
    /// The access gate.
    pub auth: Arc<AuthProvider>,
}

/// Build the Axum router with all routes and middleware.
///
/// `ui_path` is the static UI directory; when present, unmatched paths fall
/// back to it so shared meeting links (`/meeting/{id}`) open the viewer.
pub fn router(state: AppState, ui_path: Option<PathBuf>, max_upload_bytes: usize) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        // Login must be public; logout/auth-check tolerate dead sessions.
        .route("/api/login", post(auth::login))
        .route("/api/logout", get(auth::logout))
        .route("/api/auth-check", get(auth::auth_check))
        // Shared meeting links are readable without admin rights.
        .route("/api/data/{id}", get(meetings::get_meeting))
        // Inline document viewing, decoupled from meeting metadata.
        .route("/view/{blob_name}", get(files::view_blob));

    let protected = Router::new()
        .route("/api/create-meeting", post(meetings::create_meeting))
        .route("/api/update-info/{id}", post(meetings::update_info))
        .route("/api/meetings", get(meetings::list_meetings))
        .route("/api/meeting/{id}", delete(meetings::delete_meeting))
        .route(
            "/api/upload/{id}",
            post(files::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/delete-file/{id}", post(files::delete_file))
        .route("/api/orphans", get(files::list_orphans))
        .layer(AuthLayer::new(state.auth.clone()));

    let mut router = Router::new().merge(public).merge(protected);

    if let Some(path) = ui_path {
        let index_path = path.join("index.html");
        router = router
            .fallback_service(ServeDir::new(path).fallback(ServeFile::new(index_path)));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
