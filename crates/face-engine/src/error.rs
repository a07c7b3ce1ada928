use common::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

use crate::detector::DetectorError;

/// Errors surfaced by the face engine.
///
/// `ProviderUnavailable` and `InvalidEmbedding` are recovered inside the
/// indexing pass (degrade to zero detections, exclude the offending
/// vector); they reach callers only through direct component use.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("face {0} not found")]
    FaceNotFound(Uuid),

    #[error("person {0} not found")]
    PersonNotFound(Uuid),

    #[error("person name must not be empty")]
    EmptyPersonName,

    #[error("face detector unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("invalid embedding: {0}")]
    InvalidEmbedding(String),

    #[error("persistence conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::FaceNotFound(id) => Self::FaceNotFound(id),
            StoreError::PersonNotFound(id) => Self::PersonNotFound(id),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<DetectorError> for EngineError {
    fn from(err: DetectorError) -> Self {
        match err {
            DetectorError::Unavailable(reason) => Self::ProviderUnavailable(reason),
        }
    }
}
