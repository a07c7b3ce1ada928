//! Postgres-backed [`FaceStore`].
//!
//! Embeddings are stored as JSONB next to their model tag, matching the
//! portable representation the archive has always used. Person name
//! uniqueness is a database constraint; a concurrent create of the same
//! name surfaces as [`StoreError::Conflict`] for the caller to re-resolve.
//! `person_id` carries `ON DELETE SET NULL`, so an administrative person
//! deletion can never leave a dangling reference; a row that somehow has
//! one anyway reads back as unassigned.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::faces::{BoundingBox, Embedding, Face, Person};
use common::store::{FaceStore, StoreError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgFaceStore {
    pool: PgPool,
}

impl PgFaceStore {
    /// Connect and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .context("failed to connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const FACE_COLUMNS: &str =
    "face_id, image_id, bbox_x, bbox_y, bbox_w, bbox_h, embedding_model, embedding, person_id, created_at";

fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(db_err.to_string())
        }
        _ => StoreError::Backend(anyhow!("database error: {err}")),
    }
}

fn coordinate(value: i32, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::Backend(anyhow!("negative value in column {column}: {value}")))
}

fn face_from_row(row: &PgRow) -> Result<Face, StoreError> {
    let bbox = BoundingBox {
        x: coordinate(row.try_get("bbox_x").map_err(map_sqlx)?, "bbox_x")?,
        y: coordinate(row.try_get("bbox_y").map_err(map_sqlx)?, "bbox_y")?,
        width: coordinate(row.try_get("bbox_w").map_err(map_sqlx)?, "bbox_w")?,
        height: coordinate(row.try_get("bbox_h").map_err(map_sqlx)?, "bbox_h")?,
    };

    let model: Option<String> = row.try_get("embedding_model").map_err(map_sqlx)?;
    let vector: Option<serde_json::Value> = row.try_get("embedding").map_err(map_sqlx)?;
    let embedding = match (model, vector) {
        (Some(model_tag), Some(value)) => {
            let vector: Vec<f32> = serde_json::from_value(value)
                .map_err(|e| StoreError::Backend(anyhow!("malformed stored embedding: {e}")))?;
            Some(Embedding { model_tag, vector })
        }
        _ => None,
    };

    Ok(Face {
        face_id: row.try_get("face_id").map_err(map_sqlx)?,
        image_id: row.try_get("image_id").map_err(map_sqlx)?,
        bbox,
        embedding,
        person_id: row.try_get("person_id").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

fn person_from_row(row: &PgRow) -> Result<Person, StoreError> {
    Ok(Person {
        person_id: row.try_get("person_id").map_err(map_sqlx)?,
        name: row.try_get("name").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

fn signed(value: u32, column: &str) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::Backend(anyhow!("value too large for column {column}: {value}")))
}

#[async_trait]
impl FaceStore for PgFaceStore {
    async fn record_face(
        &self,
        image_id: Uuid,
        bbox: BoundingBox,
        embedding: Option<Embedding>,
    ) -> Result<Face, StoreError> {
        let face_id = Uuid::new_v4();
        let now: DateTime<Utc> = Utc::now();

        let (model, vector) = match &embedding {
            Some(e) => (
                Some(e.model_tag.clone()),
                Some(
                    serde_json::to_value(&e.vector)
                        .map_err(|e| StoreError::Backend(anyhow!("embedding encode: {e}")))?,
                ),
            ),
            None => (None, None),
        };

        let sql = format!(
            "INSERT INTO faces (face_id, image_id, bbox_x, bbox_y, bbox_w, bbox_h, \
             embedding_model, embedding, person_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, $9) \
             RETURNING {FACE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(face_id)
            .bind(image_id)
            .bind(signed(bbox.x, "bbox_x")?)
            .bind(signed(bbox.y, "bbox_y")?)
            .bind(signed(bbox.width, "bbox_w")?)
            .bind(signed(bbox.height, "bbox_h")?)
            .bind(model)
            .bind(vector)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;

        face_from_row(&row)
    }

    async fn get_face(&self, face_id: Uuid) -> Result<Option<Face>, StoreError> {
        let sql = format!("SELECT {FACE_COLUMNS} FROM faces WHERE face_id = $1");
        let row = sqlx::query(&sql)
            .bind(face_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(face_from_row).transpose()
    }

    async fn faces_of_image(&self, image_id: Uuid) -> Result<Vec<Face>, StoreError> {
        let sql = format!("SELECT {FACE_COLUMNS} FROM faces WHERE image_id = $1 ORDER BY seq");
        let rows = sqlx::query(&sql)
            .bind(image_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(face_from_row).collect()
    }

    async fn set_person(&self, face_id: Uuid, person_id: Option<Uuid>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE faces SET person_id = $2 WHERE face_id = $1")
            .bind(face_id)
            .bind(person_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::FaceNotFound(face_id));
        }
        Ok(())
    }

    async fn find_person_by_name(&self, name: &str) -> Result<Option<Person>, StoreError> {
        let row = sqlx::query("SELECT person_id, name, created_at FROM people WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(person_from_row).transpose()
    }

    async fn create_person(&self, name: &str) -> Result<Person, StoreError> {
        let row = sqlx::query(
            "INSERT INTO people (person_id, name, created_at) VALUES ($1, $2, $3) \
             RETURNING person_id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        person_from_row(&row)
    }

    async fn get_person(&self, person_id: Uuid) -> Result<Option<Person>, StoreError> {
        let row =
            sqlx::query("SELECT person_id, name, created_at FROM people WHERE person_id = $1")
                .bind(person_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        row.as_ref().map(person_from_row).transpose()
    }

    async fn list_people(&self) -> Result<Vec<Person>, StoreError> {
        let rows = sqlx::query(
            "SELECT person_id, name, created_at FROM people ORDER BY created_at, person_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(person_from_row).collect()
    }

    async fn faces_of_person(&self, person_id: Uuid) -> Result<Vec<Face>, StoreError> {
        let sql = format!("SELECT {FACE_COLUMNS} FROM faces WHERE person_id = $1 ORDER BY seq");
        let rows = sqlx::query(&sql)
            .bind(person_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(face_from_row).collect()
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(true)
    }
}
