//! Boundary to the external face detection and embedding provider.
//!
//! The provider is a black box that returns zero or more detections per
//! image; "no face found" is an empty list, never an error. Any transport
//! or protocol failure collapses to [`DetectorError::Unavailable`] so the
//! orchestrator can degrade to zero detections instead of failing the
//! ingestion of the image itself.

use async_trait::async_trait;
use common::faces::{BoundingBox, Embedding, FaceDetection};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout against the detector sidecar.
pub const DEFAULT_DETECTOR_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("face detector unavailable: {0}")]
    Unavailable(String),
}

/// External face detection and embedding provider.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in the image at `image_path`. An image without faces
    /// yields an empty list.
    async fn detect(&self, image_path: &str) -> Result<Vec<FaceDetection>, DetectorError>;
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    image_path: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    faces: Vec<DetectedFaceDto>,
}

#[derive(Debug, Deserialize)]
struct DetectedFaceDto {
    bbox: BoundingBox,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    model_tag: Option<String>,
}

/// HTTP client for a detection/embedding sidecar.
///
/// Protocol: `POST {base}/v1/detect` with `{"image_path": ...}`, response
/// `{"faces": [{"bbox": {...}, "embedding": [...], "model_tag": "..."}]}`
/// where `embedding` and `model_tag` may be absent per face.
pub struct HttpFaceDetector {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpFaceDetector {
    pub fn new(base_url: Url) -> Result<Self, DetectorError> {
        Self::with_timeout(base_url, DEFAULT_DETECTOR_TIMEOUT)
    }

    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, DetectorError> {
        let endpoint = base_url
            .join("v1/detect")
            .map_err(|e| DetectorError::Unavailable(format!("invalid detector URL: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DetectorError::Unavailable(format!("failed to build client: {e}")))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl FaceDetector for HttpFaceDetector {
    async fn detect(&self, image_path: &str) -> Result<Vec<FaceDetection>, DetectorError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&DetectRequest { image_path })
            .send()
            .await
            .map_err(|e| DetectorError::Unavailable(format!("detector request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectorError::Unavailable(format!(
                "detector returned status {status}"
            )));
        }

        let body: DetectResponse = response
            .json()
            .await
            .map_err(|e| DetectorError::Unavailable(format!("invalid detector response: {e}")))?;

        let mut detections = Vec::with_capacity(body.faces.len());
        for face in body.faces {
            if !face.bbox.has_positive_extent() {
                tracing::warn!(?face.bbox, "detector returned degenerate bounding box, skipping");
                continue;
            }
            let embedding = match (face.embedding, face.model_tag) {
                (Some(vector), Some(model_tag)) if !vector.is_empty() => {
                    Some(Embedding::new(model_tag, vector))
                }
                _ => None,
            };
            detections.push(FaceDetection {
                bbox: face.bbox,
                embedding,
            });
        }
        Ok(detections)
    }
}

/// Canned detector for tests and demos.
///
/// Returns preloaded detections per image path, an empty list for unknown
/// paths, or `Unavailable` for every call when constructed as failing.
#[derive(Default)]
pub struct StaticFaceDetector {
    responses: RwLock<HashMap<String, Vec<FaceDetection>>>,
    failing: bool,
}

impl StaticFaceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A detector that rejects every call, simulating an unreachable
    /// provider.
    pub fn failing() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            failing: true,
        }
    }

    pub fn insert(&self, image_path: impl Into<String>, detections: Vec<FaceDetection>) {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(image_path.into(), detections);
        }
    }
}

#[async_trait]
impl FaceDetector for StaticFaceDetector {
    async fn detect(&self, image_path: &str) -> Result<Vec<FaceDetection>, DetectorError> {
        if self.failing {
            return Err(DetectorError::Unavailable(
                "static detector configured to fail".to_string(),
            ));
        }
        let responses = self
            .responses
            .read()
            .map_err(|e| DetectorError::Unavailable(format!("detector lock poisoned: {e}")))?;
        Ok(responses.get(image_path).cloned().unwrap_or_default())
    }
}
