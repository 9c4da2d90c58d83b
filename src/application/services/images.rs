use std::sync::Arc;

use tracing::info;

use crate::application::errors::AppError;
use crate::domain::ids::ImageId;
use crate::domain::images::{DEFAULT_CONTENT_TYPE, ImageSummary, NewImage, StoredImage};
use crate::domain::repositories::ImageRepository;
use crate::infrastructure::image_fetch::{DownloadedImage, detect_content_type, download_image};
use crate::infrastructure::openai::{GeneratedImage, OpenAiClient};

/// Generates images from prompts and keeps them in the configured store.
#[derive(Clone)]
pub struct ImageService {
    repo: Arc<dyn ImageRepository>,
    openai: OpenAiClient,
    http_client: reqwest::Client,
}

impl ImageService {
    pub fn new(
        repo: Arc<dyn ImageRepository>,
        openai: OpenAiClient,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            repo,
            openai,
            http_client,
        }
    }

    /// Generate one image for `prompt`, download it and persist it.
    ///
    /// Returns only once the record is stored. Nothing is persisted if any
    /// step fails, and no step is retried.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, prompt: &str) -> Result<ImageSummary, AppError> {
        let generated = self.openai.generate_image(prompt).await?;

        let downloaded = match generated {
            GeneratedImage::Url(url) => download_image(&self.http_client, &url).await?,
            GeneratedImage::Inline(data) => {
                let content_type = detect_content_type(&data, None)
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                DownloadedImage { content_type, data }
            }
        };

        let summary = self
            .repo
            .insert(NewImage::new(
                prompt,
                downloaded.content_type,
                downloaded.data,
            ))
            .await?;

        info!(image_id = %summary.id, "image stored");
        Ok(summary)
    }

    pub async fn get(&self, id: ImageId) -> Result<StoredImage, AppError> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<ImageSummary>, AppError> {
        Ok(self.repo.list().await?)
    }
}
