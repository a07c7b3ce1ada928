use crate::error::ApiError;
use crate::state::FaceServiceState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use common::faces::{Face, Person};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Request to index the faces of an archived image
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexImageRequest {
    /// Filesystem path of the stored image, as recorded by the archive
    pub image_path: String,
}

/// Result of one indexing pass
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexImageResponse {
    pub image_id: Uuid,
    /// Faces persisted during this pass, matched or not
    pub faces_indexed: u64,
}

/// Request to manually label a face
#[derive(Debug, Serialize, Deserialize)]
pub struct LabelFaceRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FacesResponse {
    pub faces: Vec<Face>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeopleResponse {
    pub people: Vec<Person>,
    pub count: usize,
}

/// Run the face indexing pipeline for one image. Indexing is
/// best-effort: the response always carries a count, a degraded run
/// simply reports fewer faces.
pub async fn index_image(
    State(state): State<FaceServiceState>,
    Path(image_id): Path<Uuid>,
    Json(request): Json<IndexImageRequest>,
) -> Json<IndexImageResponse> {
    let faces_indexed = state
        .indexer()
        .index_image(image_id, &request.image_path)
        .await;
    Json(IndexImageResponse {
        image_id,
        faces_indexed,
    })
}

/// List the faces detected in one image
pub async fn image_faces(
    State(state): State<FaceServiceState>,
    Path(image_id): Path<Uuid>,
) -> Result<Json<FacesResponse>, ApiError> {
    let faces = state.store().faces_of_image(image_id).await?;
    let count = faces.len();
    Ok(Json(FacesResponse { faces, count }))
}

/// Manually label a face with a person name, creating the person on
/// first use
pub async fn label_face(
    State(state): State<FaceServiceState>,
    Path(face_id): Path<Uuid>,
    Json(request): Json<LabelFaceRequest>,
) -> Result<Json<Person>, ApiError> {
    let person = state.indexer().label_face(face_id, &request.name).await?;
    Ok(Json(person))
}

/// List all known people
pub async fn list_people(
    State(state): State<FaceServiceState>,
) -> Result<Json<PeopleResponse>, ApiError> {
    let people = state.store().list_people().await?;
    let count = people.len();
    Ok(Json(PeopleResponse { people, count }))
}

/// List the labeled faces of one person
pub async fn person_faces(
    State(state): State<FaceServiceState>,
    Path(person_id): Path<Uuid>,
) -> Result<Json<FacesResponse>, ApiError> {
    state
        .store()
        .get_person(person_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("person {person_id} not found")))?;

    let faces = state.store().faces_of_person(person_id).await?;
    let count = faces.len();
    Ok(Json(FacesResponse { faces, count }))
}

/// Health check endpoint
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "face-service"
        })),
    )
}

/// Readiness check endpoint
pub async fn readyz(State(state): State<FaceServiceState>) -> impl IntoResponse {
    match state.store().health_check().await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready"
            })),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not ready"
            })),
        ),
    }
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics() -> impl IntoResponse {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = telemetry::metrics::REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response();
    }

    match String::from_utf8(buffer) {
        Ok(s) => s.into_response(),
        Err(e) => {
            tracing::error!("Failed to convert metrics to UTF-8: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to convert metrics",
            )
                .into_response()
        }
    }
}
