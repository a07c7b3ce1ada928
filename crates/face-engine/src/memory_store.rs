//! In-memory [`FaceStore`] used by tests and by deployments without a
//! configured database.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use common::faces::{BoundingBox, Embedding, Face, Person};
use common::store::{FaceStore, StoreError};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    faces: HashMap<Uuid, Face>,
    /// Insertion order of faces, for stable per-image listings.
    face_order: Vec<Uuid>,
    /// People in creation order; names are unique.
    people: Vec<Person>,
}

#[derive(Default)]
pub struct MemoryFaceStore {
    inner: RwLock<Inner>,
}

impl MemoryFaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|e| StoreError::Backend(anyhow!("face store lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|e| StoreError::Backend(anyhow!("face store lock poisoned: {e}")))
    }
}

#[async_trait]
impl FaceStore for MemoryFaceStore {
    async fn record_face(
        &self,
        image_id: Uuid,
        bbox: BoundingBox,
        embedding: Option<Embedding>,
    ) -> Result<Face, StoreError> {
        let face = Face {
            face_id: Uuid::new_v4(),
            image_id,
            bbox,
            embedding,
            person_id: None,
            created_at: Utc::now(),
        };
        let mut inner = self.write()?;
        inner.face_order.push(face.face_id);
        inner.faces.insert(face.face_id, face.clone());
        Ok(face)
    }

    async fn get_face(&self, face_id: Uuid) -> Result<Option<Face>, StoreError> {
        Ok(self.read()?.faces.get(&face_id).cloned())
    }

    async fn faces_of_image(&self, image_id: Uuid) -> Result<Vec<Face>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .face_order
            .iter()
            .filter_map(|id| inner.faces.get(id))
            .filter(|f| f.image_id == image_id)
            .cloned()
            .collect())
    }

    async fn set_person(&self, face_id: Uuid, person_id: Option<Uuid>) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        match inner.faces.get_mut(&face_id) {
            Some(face) => {
                face.person_id = person_id;
                Ok(())
            }
            None => Err(StoreError::FaceNotFound(face_id)),
        }
    }

    async fn find_person_by_name(&self, name: &str) -> Result<Option<Person>, StoreError> {
        Ok(self
            .read()?
            .people
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn create_person(&self, name: &str) -> Result<Person, StoreError> {
        let mut inner = self.write()?;
        if inner.people.iter().any(|p| p.name == name) {
            return Err(StoreError::Conflict(format!(
                "person name '{name}' already exists"
            )));
        }
        let person = Person {
            person_id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.people.push(person.clone());
        Ok(person)
    }

    async fn get_person(&self, person_id: Uuid) -> Result<Option<Person>, StoreError> {
        Ok(self
            .read()?
            .people
            .iter()
            .find(|p| p.person_id == person_id)
            .cloned())
    }

    async fn list_people(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.read()?.people.clone())
    }

    async fn faces_of_person(&self, person_id: Uuid) -> Result<Vec<Face>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .face_order
            .iter()
            .filter_map(|id| inner.faces.get(id))
            .filter(|f| f.person_id == Some(person_id))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
