//! Per-person prototype aggregation.
//!
//! A prototype is the element-wise arithmetic mean of a person's usable
//! embedding vectors. Usable means tagged with the engine's configured
//! model and dimensionally consistent with the rest of that person's
//! vectors; everything else is excluded, never fatal. The computation is
//! a pure read recomputed from scratch on every call.

use common::faces::Embedding;
use common::store::{FaceStore, StoreError};
use uuid::Uuid;

use crate::error::EngineError;

/// Mean embedding representing one person's currently labeled faces.
#[derive(Debug, Clone)]
pub struct PersonPrototype {
    pub person_id: Uuid,
    pub vector: Vec<f32>,
    /// Number of embeddings that contributed to the mean.
    pub face_count: usize,
}

/// Compute prototypes for every person with at least one usable
/// embedding, in person creation order. People without usable embeddings
/// are omitted; no zero-vector placeholders.
pub async fn person_prototypes(
    store: &dyn FaceStore,
    model_tag: &str,
) -> Result<Vec<PersonPrototype>, StoreError> {
    let mut prototypes = Vec::new();

    for person in store.list_people().await? {
        let faces = store.faces_of_person(person.person_id).await?;

        let mut sum: Vec<f32> = Vec::new();
        let mut count = 0usize;
        for face in &faces {
            let Some(embedding) = face.usable_embedding(model_tag) else {
                continue;
            };
            if let Err(e) = accumulate(&mut sum, &mut count, embedding) {
                tracing::warn!(
                    person_id = %person.person_id,
                    face_id = %face.face_id,
                    error = %e,
                    "excluding embedding from prototype"
                );
            }
        }

        if count > 0 {
            let n = count as f32;
            for v in &mut sum {
                *v /= n;
            }
            prototypes.push(PersonPrototype {
                person_id: person.person_id,
                vector: sum,
                face_count: count,
            });
        }
    }

    Ok(prototypes)
}

/// Add one embedding into the running sum. The first vector fixes the
/// dimensionality for this person; later vectors must agree.
fn accumulate(
    sum: &mut Vec<f32>,
    count: &mut usize,
    embedding: &Embedding,
) -> Result<(), EngineError> {
    if sum.is_empty() {
        sum.extend_from_slice(&embedding.vector);
        *count = 1;
        return Ok(());
    }
    if embedding.dimension() != sum.len() {
        return Err(EngineError::InvalidEmbedding(format!(
            "dimension {} does not match population dimension {}",
            embedding.dimension(),
            sum.len()
        )));
    }
    for (acc, v) in sum.iter_mut().zip(&embedding.vector) {
        *acc += v;
    }
    *count += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryFaceStore;
    use common::faces::BoundingBox;

    fn bbox() -> BoundingBox {
        BoundingBox {
            x: 0,
            y: 0,
            width: 32,
            height: 32,
        }
    }

    fn emb(tag: &str, vector: Vec<f32>) -> Option<Embedding> {
        Some(Embedding::new(tag, vector))
    }

    async fn labeled_face(
        store: &MemoryFaceStore,
        person_id: Uuid,
        embedding: Option<Embedding>,
    ) {
        let face = store
            .record_face(Uuid::new_v4(), bbox(), embedding)
            .await
            .unwrap();
        store.set_person(face.face_id, Some(person_id)).await.unwrap();
    }

    #[tokio::test]
    async fn prototype_is_elementwise_mean() {
        let store = MemoryFaceStore::new();
        let bob = store.create_person("Bob").await.unwrap();
        labeled_face(&store, bob.person_id, emb("arcface", vec![1.0, 0.0])).await;
        labeled_face(&store, bob.person_id, emb("arcface", vec![0.0, 1.0])).await;

        let prototypes = person_prototypes(&store, "arcface").await.unwrap();
        assert_eq!(prototypes.len(), 1);
        assert_eq!(prototypes[0].vector, vec![0.5, 0.5]);
        assert_eq!(prototypes[0].face_count, 2);
    }

    #[tokio::test]
    async fn person_without_usable_embeddings_is_omitted() {
        let store = MemoryFaceStore::new();
        let alice = store.create_person("Alice").await.unwrap();
        labeled_face(&store, alice.person_id, None).await;
        labeled_face(&store, alice.person_id, emb("facenet", vec![1.0, 0.0])).await;

        let prototypes = person_prototypes(&store, "arcface").await.unwrap();
        assert!(prototypes.is_empty());
    }

    #[tokio::test]
    async fn foreign_model_tags_are_excluded_from_mean() {
        let store = MemoryFaceStore::new();
        let alice = store.create_person("Alice").await.unwrap();
        labeled_face(&store, alice.person_id, emb("arcface", vec![1.0, 0.0])).await;
        labeled_face(&store, alice.person_id, emb("facenet", vec![0.0, 1.0])).await;

        let prototypes = person_prototypes(&store, "arcface").await.unwrap();
        assert_eq!(prototypes.len(), 1);
        assert_eq!(prototypes[0].vector, vec![1.0, 0.0]);
        assert_eq!(prototypes[0].face_count, 1);
    }

    #[tokio::test]
    async fn mismatched_dimension_is_excluded_not_fatal() {
        let store = MemoryFaceStore::new();
        let alice = store.create_person("Alice").await.unwrap();
        labeled_face(&store, alice.person_id, emb("arcface", vec![1.0, 0.0])).await;
        labeled_face(&store, alice.person_id, emb("arcface", vec![1.0, 0.0, 0.0])).await;

        let prototypes = person_prototypes(&store, "arcface").await.unwrap();
        assert_eq!(prototypes.len(), 1);
        assert_eq!(prototypes[0].vector, vec![1.0, 0.0]);
        assert_eq!(prototypes[0].face_count, 1);
    }

    #[tokio::test]
    async fn prototypes_follow_person_creation_order() {
        let store = MemoryFaceStore::new();
        let first = store.create_person("First").await.unwrap();
        let second = store.create_person("Second").await.unwrap();
        labeled_face(&store, second.person_id, emb("arcface", vec![0.0, 1.0])).await;
        labeled_face(&store, first.person_id, emb("arcface", vec![1.0, 0.0])).await;

        let prototypes = person_prototypes(&store, "arcface").await.unwrap();
        assert_eq!(prototypes.len(), 2);
        assert_eq!(prototypes[0].person_id, first.person_id);
        assert_eq!(prototypes[1].person_id, second.person_id);
    }
}
