//! Assignment orchestrator: the per-image indexing pipeline and the
//! manual labeling path.

use common::faces::{Face, FaceDetection, Person};
use common::store::{FaceStore, StoreError};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::IndexerConfig;
use crate::detector::FaceDetector;
use crate::error::EngineError;
use crate::matcher::best_match;
use crate::prototype::person_prototypes;

/// Drives the per-image pipeline: detect, persist, match, commit.
///
/// `index_image` is best-effort end to end. Detector failure degrades to
/// zero detections, and a failure on one face never blocks the rest of
/// the same image; the caller always gets back a count, never an error.
pub struct FaceIndexer {
    store: Arc<dyn FaceStore>,
    detector: Arc<dyn FaceDetector>,
    config: IndexerConfig,
}

impl FaceIndexer {
    pub fn new(
        store: Arc<dyn FaceStore>,
        detector: Arc<dyn FaceDetector>,
        config: IndexerConfig,
    ) -> Self {
        Self {
            store,
            detector,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn FaceStore> {
        &self.store
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Index all faces the detector finds in one archive image. Returns
    /// the number of faces persisted, matched or not. Never fails:
    /// archiving the image must not be blocked by face indexing.
    pub async fn index_image(&self, image_id: Uuid, image_path: &str) -> u64 {
        if !self.config.enabled {
            tracing::debug!(%image_id, "face pipeline disabled, skipping detection");
            return 0;
        }

        let detections = match self.detector.detect(image_path).await {
            Ok(detections) => {
                telemetry::metrics::DETECTOR_REQUESTS
                    .with_label_values(&["ok"])
                    .inc();
                detections
            }
            Err(e) => {
                telemetry::metrics::DETECTOR_REQUESTS
                    .with_label_values(&["unavailable"])
                    .inc();
                tracing::warn!(
                    %image_id,
                    error = %e,
                    "face detector unavailable, image archived without face indexing"
                );
                Vec::new()
            }
        };

        let mut indexed: u64 = 0;
        for detection in detections {
            match self.index_detection(image_id, detection).await {
                Ok(()) => indexed += 1,
                Err(e) => {
                    telemetry::metrics::FACES_INDEXED
                        .with_label_values(&["persist_failed"])
                        .inc();
                    tracing::warn!(%image_id, error = %e, "failed to persist face, skipping");
                }
            }
        }

        tracing::debug!(%image_id, indexed, "face indexing pass complete");
        indexed
    }

    /// Persist one detection and attempt auto-assignment. The face counts
    /// as indexed once persisted; a matching failure only leaves it
    /// unassigned.
    async fn index_detection(
        &self,
        image_id: Uuid,
        detection: FaceDetection,
    ) -> Result<(), EngineError> {
        let face = self
            .store
            .record_face(image_id, detection.bbox, detection.embedding)
            .await?;

        if let Err(e) = self.try_auto_assign(&face).await {
            tracing::warn!(
                face_id = %face.face_id,
                error = %e,
                "auto-assignment failed, face left unassigned"
            );
        }
        Ok(())
    }

    async fn try_auto_assign(&self, face: &Face) -> Result<(), EngineError> {
        let Some(embedding) = face.usable_embedding(&self.config.model_tag) else {
            telemetry::metrics::FACES_INDEXED
                .with_label_values(&["no_embedding"])
                .inc();
            return Ok(());
        };

        // Point-in-time read over the whole person population; may be
        // stale, never partial.
        let prototypes = person_prototypes(self.store.as_ref(), &self.config.model_tag).await?;

        match best_match(&embedding.vector, &prototypes, self.config.match_threshold) {
            Some(m) => {
                telemetry::metrics::MATCH_SCORE.observe(f64::from(m.score));
                self.store.set_person(face.face_id, Some(m.person_id)).await?;
                telemetry::metrics::FACES_INDEXED
                    .with_label_values(&["matched"])
                    .inc();
                tracing::debug!(
                    face_id = %face.face_id,
                    person_id = %m.person_id,
                    score = m.score,
                    "face auto-assigned"
                );
            }
            None => {
                telemetry::metrics::FACES_INDEXED
                    .with_label_values(&["below_threshold"])
                    .inc();
            }
        }
        Ok(())
    }

    /// Manually label a face with a person name, creating the person on
    /// first use. Never consults the matcher. Fails with `FaceNotFound`
    /// for an unknown face and is idempotent for a fixed name.
    pub async fn label_face(
        &self,
        face_id: Uuid,
        person_name: &str,
    ) -> Result<Person, EngineError> {
        let name = person_name.trim();
        if name.is_empty() {
            telemetry::metrics::LABEL_OPERATIONS
                .with_label_values(&["invalid"])
                .inc();
            return Err(EngineError::EmptyPersonName);
        }

        let face = self
            .store
            .get_face(face_id)
            .await?
            .ok_or(EngineError::FaceNotFound(face_id))
            .inspect_err(|_| {
                telemetry::metrics::LABEL_OPERATIONS
                    .with_label_values(&["not_found"])
                    .inc();
            })?;

        let person = self.get_or_create_person(name).await?;
        self.store
            .set_person(face.face_id, Some(person.person_id))
            .await?;

        telemetry::metrics::LABEL_OPERATIONS
            .with_label_values(&["ok"])
            .inc();
        tracing::info!(
            face_id = %face.face_id,
            person_id = %person.person_id,
            person_name = %person.name,
            "face labeled"
        );
        Ok(person)
    }

    /// Resolve a person by exact name, creating on first use. A create
    /// that loses a uniqueness race re-resolves to the winner's row;
    /// retried once, then surfaced.
    async fn get_or_create_person(&self, name: &str) -> Result<Person, EngineError> {
        if let Some(person) = self.store.find_person_by_name(name).await? {
            return Ok(person);
        }

        match self.store.create_person(name).await {
            Ok(person) => {
                telemetry::metrics::PEOPLE_CREATED.inc();
                Ok(person)
            }
            Err(StoreError::Conflict(_)) => match self.store.find_person_by_name(name).await? {
                Some(person) => Ok(person),
                None => {
                    telemetry::metrics::LABEL_OPERATIONS
                        .with_label_values(&["conflict"])
                        .inc();
                    Err(EngineError::Conflict(format!(
                        "person '{name}' lost a create race and cannot be re-resolved"
                    )))
                }
            },
            Err(e) => Err(e.into()),
        }
    }
}
