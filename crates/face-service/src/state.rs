use common::store::FaceStore;
use face_engine::FaceIndexer;
use std::sync::Arc;

/// Shared state for the face service HTTP surface.
#[derive(Clone)]
pub struct FaceServiceState {
    indexer: Arc<FaceIndexer>,
    store: Arc<dyn FaceStore>,
}

impl FaceServiceState {
    pub fn new(indexer: Arc<FaceIndexer>, store: Arc<dyn FaceStore>) -> Self {
        Self { indexer, store }
    }

    pub fn indexer(&self) -> &FaceIndexer {
        &self.indexer
    }

    pub fn store(&self) -> &Arc<dyn FaceStore> {
        &self.store
    }
}
