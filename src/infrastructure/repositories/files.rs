use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};
use tracing::warn;

use crate::domain::RepositoryError;
use crate::domain::ids::ImageId;
use crate::domain::images::{ImageSummary, NewImage, StoredImage};
use crate::domain::repositories::ImageRepository;
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::repositories::images::{Backing, list_summaries, parse_id};

/// Writes image bytes to a content directory and keeps only the filename in
/// the `images` record.
#[derive(Clone)]
pub struct FileImageRepository {
    pool: DatabasePool,
    images_dir: PathBuf,
}

impl FileImageRepository {
    pub fn new(pool: DatabasePool, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            images_dir: images_dir.into(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Create the content directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), RepositoryError> {
        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|err| {
                RepositoryError::unexpected(format!(
                    "failed to create image directory {}: {err}",
                    self.images_dir.display()
                ))
            })
    }

    /// Write to a temporary name first so a reader never sees a partial file.
    async fn write_file(&self, filename: &str, data: &[u8]) -> Result<PathBuf, RepositoryError> {
        self.ensure_dir().await?;

        let path = self.images_dir.join(filename);
        let partial = self.images_dir.join(format!("{filename}.partial"));

        tokio::fs::write(&partial, data).await.map_err(|err| {
            RepositoryError::unexpected(format!("failed to write {}: {err}", partial.display()))
        })?;

        if let Err(err) = tokio::fs::rename(&partial, &path).await {
            remove_quietly(&partial).await;
            return Err(RepositoryError::unexpected(format!(
                "failed to move image into place at {}: {err}",
                path.display()
            )));
        }

        Ok(path)
    }
}

#[derive(sqlx::FromRow)]
struct FileRecord {
    id: String,
    prompt: String,
    content_type: String,
    filename: Option<String>,
    created_at: DateTime<Utc>,
}

async fn remove_quietly(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await
        && err.kind() != ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %err, "failed to remove image file");
    }
}

#[async_trait]
impl ImageRepository for FileImageRepository {
    async fn insert(&self, image: NewImage) -> Result<ImageSummary, RepositoryError> {
        let id = ImageId::generate();
        let created_at = Utc::now();
        let filename = format!("image-{id}.{}", image.file_extension());

        let path = self.write_file(&filename, &image.image_data).await?;

        let inserted = query(
            r"INSERT INTO images (id, prompt, content_type, filename, created_at)
               VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&image.prompt)
        .bind(&image.content_type)
        .bind(&filename)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        if let Err(err) = inserted {
            // No metadata means nobody can reach the file; don't leave it behind.
            remove_quietly(&path).await;
            return Err(RepositoryError::unexpected(err.to_string()));
        }

        Ok(ImageSummary {
            id,
            prompt: image.prompt,
            created_at,
        })
    }

    async fn get(&self, id: ImageId) -> Result<StoredImage, RepositoryError> {
        let record = query_as::<_, FileRecord>(
            r"SELECT id, prompt, content_type, filename, created_at
               FROM images
               WHERE id = ? AND filename IS NOT NULL",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        let filename = record.filename.ok_or(RepositoryError::NotFound)?;
        let path = self.images_dir.join(&filename);

        let image_data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(image_id = %id, path = %path.display(), "image file missing from content directory");
                return Err(RepositoryError::NotFound);
            }
            Err(err) => {
                return Err(RepositoryError::unexpected(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };

        Ok(StoredImage {
            id: parse_id(&record.id)?,
            prompt: record.prompt,
            content_type: record.content_type,
            image_data,
            created_at: record.created_at,
        })
    }

    async fn list(&self) -> Result<Vec<ImageSummary>, RepositoryError> {
        list_summaries(&self.pool, Backing::File).await
    }
}
