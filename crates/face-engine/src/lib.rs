//! Face identity matching engine for the photo archive.
//!
//! Given detected faces (bounding box plus optional tagged embedding),
//! the engine decides which faces belong to the same real-world person:
//! it maintains one mean-embedding prototype per known person, scores new
//! faces against every prototype with cosine similarity, and commits an
//! automatic assignment only when the best score clears a configurable
//! acceptance threshold. Faces below the threshold stay unassigned for
//! human review; humans can always label directly, which is also the only
//! way a new person ever comes into existence.

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod memory_store;
pub mod pg_store;
pub mod prototype;

pub use config::IndexerConfig;
pub use detector::{DetectorError, FaceDetector, HttpFaceDetector, StaticFaceDetector};
pub use engine::FaceIndexer;
pub use error::EngineError;
pub use matcher::{best_match, cosine_similarity, FaceMatch};
pub use memory_store::MemoryFaceStore;
pub use pg_store::PgFaceStore;
pub use prototype::{person_prototypes, PersonPrototype};
