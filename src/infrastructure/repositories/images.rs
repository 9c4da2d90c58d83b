use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::ImageId;
use crate::domain::images::{ImageSummary, NewImage, StoredImage};
use crate::domain::repositories::ImageRepository;
use crate::infrastructure::database::DatabasePool;

/// Keeps the image bytes inline in the `images` record.
#[derive(Clone)]
pub struct SqlImageRepository {
    pool: DatabasePool,
}

impl SqlImageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: ImageRecord) -> Result<StoredImage, RepositoryError> {
        Ok(StoredImage {
            id: parse_id(&record.id)?,
            prompt: record.prompt,
            content_type: record.content_type,
            image_data: record.image_data.unwrap_or_default(),
            created_at: record.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ImageRecord {
    id: String,
    prompt: String,
    content_type: String,
    image_data: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct SummaryRecord {
    id: String,
    prompt: String,
    created_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub(crate) fn into_domain(self) -> Result<ImageSummary, RepositoryError> {
        Ok(ImageSummary {
            id: parse_id(&self.id)?,
            prompt: self.prompt,
            created_at: self.created_at,
        })
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<ImageId, RepositoryError> {
    raw.parse()
        .map_err(|err| RepositoryError::unexpected(format!("corrupt image id {raw:?}: {err}")))
}

/// Which half of the `images` table a repository owns. Rows written by the
/// other backend are invisible to it, so `list` never offers an id that `get`
/// cannot serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backing {
    Inline,
    File,
}

impl Backing {
    fn list_query(self) -> &'static str {
        match self {
            Backing::Inline => {
                r"SELECT id, prompt, created_at
                   FROM images
                   WHERE image_data IS NOT NULL
                   ORDER BY rowid ASC"
            }
            Backing::File => {
                r"SELECT id, prompt, created_at
                   FROM images
                   WHERE filename IS NOT NULL
                   ORDER BY rowid ASC"
            }
        }
    }
}

pub(crate) async fn list_summaries(
    pool: &DatabasePool,
    backing: Backing,
) -> Result<Vec<ImageSummary>, RepositoryError> {
    let records = query_as::<_, SummaryRecord>(backing.list_query())
        .fetch_all(pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

    records.into_iter().map(SummaryRecord::into_domain).collect()
}

#[async_trait]
impl ImageRepository for SqlImageRepository {
    async fn insert(&self, image: NewImage) -> Result<ImageSummary, RepositoryError> {
        let id = ImageId::generate();
        let created_at = Utc::now();

        query(
            r"INSERT INTO images (id, prompt, content_type, image_data, created_at)
               VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&image.prompt)
        .bind(&image.content_type)
        .bind(&image.image_data)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict(format!("image {id} already exists"));
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(ImageSummary {
            id,
            prompt: image.prompt,
            created_at,
        })
    }

    async fn get(&self, id: ImageId) -> Result<StoredImage, RepositoryError> {
        let record = query_as::<_, ImageRecord>(
            r"SELECT id, prompt, content_type, image_data, created_at
               FROM images
               WHERE id = ? AND image_data IS NOT NULL",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Self::into_domain(record)
    }

    async fn list(&self) -> Result<Vec<ImageSummary>, RepositoryError> {
        list_summaries(&self.pool, Backing::Inline).await
    }
}
