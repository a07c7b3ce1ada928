pub mod routes;

use crate::state::FaceServiceState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn router(state: FaceServiceState) -> Router {
    Router::new()
        // Health and metrics endpoints
        .route("/healthz", get(routes::healthz))
        .route("/readyz", get(routes::readyz))
        .route("/metrics", get(routes::metrics))
        // Face indexing endpoints
        .route("/v1/images/:image_id/index", post(routes::index_image))
        .route("/v1/images/:image_id/faces", get(routes::image_faces))
        .route("/v1/faces/:face_id/label", post(routes::label_face))
        // People endpoints
        .route("/v1/people", get(routes::list_people))
        .route("/v1/people/:person_id/faces", get(routes::person_faces))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
