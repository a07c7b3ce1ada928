//! Face identity contracts shared across the archive services.
//!
//! This module defines the entities the face matching engine operates on:
//! detected face regions, tagged embedding vectors, and person identity
//! buckets. The engine never compares embeddings produced by different
//! models; the tag on [`Embedding`] is what makes that rule enforceable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bounding box in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// A detection region must have positive extent. Upstream callers
    /// validate before persisting; the store itself does not.
    pub fn has_positive_extent(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A face embedding vector tagged with the model that produced it.
///
/// Vectors from different models live in different spaces, so a tag
/// mismatch makes a vector unusable for matching, exactly as if the
/// face carried no embedding at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Producing model identifier (e.g., "arcface")
    pub model_tag: String,

    /// Fixed-length vector summarizing the face's visual identity
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(model_tag: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model_tag: model_tag.into(),
            vector,
        }
    }

    /// Whether this embedding can participate in matching against a
    /// population tagged with `model_tag`.
    pub fn is_usable_with(&self, model_tag: &str) -> bool {
        self.model_tag == model_tag && !self.vector.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// One detected face region as reported by the external detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Region within the source image
    pub bbox: BoundingBox,

    /// Embedding, absent when the provider could not produce one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
}

/// A persisted face row. Created once per detection; only the person
/// reference is ever mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    /// Unique face identifier
    pub face_id: Uuid,

    /// Owning archive image (immutable after creation)
    pub image_id: Uuid,

    /// Region within the source image
    pub bbox: BoundingBox,

    /// Embedding, absent when the provider could not produce one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,

    /// Assigned person, set by the matcher or by manual labeling.
    /// No provenance is stored distinguishing the two paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<Uuid>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Face {
    /// Embedding usable for matching against `model_tag`, or `None`.
    pub fn usable_embedding(&self, model_tag: &str) -> Option<&Embedding> {
        self.embedding
            .as_ref()
            .filter(|e| e.is_usable_with(model_tag))
    }
}

/// A named identity bucket. People never store a face list; membership
/// is always recomputed by querying faces that reference them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Unique person identifier
    pub person_id: Uuid,

    /// Human-assigned name, unique and non-empty
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
