//! Persistence contract for faces and people.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::faces::{BoundingBox, Embedding, Face, Person};

/// Errors surfaced by [`FaceStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("face {0} not found")]
    FaceNotFound(Uuid),

    #[error("person {0} not found")]
    PersonNotFound(Uuid),

    /// Uniqueness violation, typically a concurrent create of the same
    /// person name. Callers resolve by re-reading the existing row.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Trait for durable face/person storage.
///
/// Single-row reads and writes are atomic: a reader never observes a
/// partially written face. `list_people` returns creation order, which
/// downstream matching relies on for deterministic tie-breaking.
#[async_trait]
pub trait FaceStore: Send + Sync {
    /// Append a new face row. Never overwrites an existing one.
    async fn record_face(
        &self,
        image_id: Uuid,
        bbox: BoundingBox,
        embedding: Option<Embedding>,
    ) -> Result<Face, StoreError>;

    async fn get_face(&self, face_id: Uuid) -> Result<Option<Face>, StoreError>;

    /// Faces of one image, in the order they were recorded.
    async fn faces_of_image(&self, image_id: Uuid) -> Result<Vec<Face>, StoreError>;

    /// Idempotent point update of a face's person reference.
    /// Fails with [`StoreError::FaceNotFound`] for an unknown face.
    async fn set_person(&self, face_id: Uuid, person_id: Option<Uuid>) -> Result<(), StoreError>;

    async fn find_person_by_name(&self, name: &str) -> Result<Option<Person>, StoreError>;

    /// Create a person with a unique name. Fails with
    /// [`StoreError::Conflict`] when the name is already taken.
    async fn create_person(&self, name: &str) -> Result<Person, StoreError>;

    async fn get_person(&self, person_id: Uuid) -> Result<Option<Person>, StoreError>;

    /// All known people in creation order.
    async fn list_people(&self) -> Result<Vec<Person>, StoreError>;

    /// Labeled faces of one person. Empty for an unknown person or a
    /// person with no labeled faces; never an error.
    async fn faces_of_person(&self, person_id: Uuid) -> Result<Vec<Face>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
