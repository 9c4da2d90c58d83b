use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;

use crate::application::services::{ImageService, SuggestionService};
use crate::domain::repositories::ImageRepository;
use crate::infrastructure::database::Database;
use crate::infrastructure::openai::{OpenAiClient, OpenAiConfig};
use crate::infrastructure::repositories::{FileImageRepository, SqlImageRepository};

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(120);

/// Where image bytes live. Metadata always goes to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Bytes stored inline in the database record.
    Database,
    /// Bytes written to `images_dir`, record keeps the filename.
    Filesystem { images_dir: PathBuf },
}

/// Configuration for external services: everything that varies between
/// production and test environments. Repos and services are created from the
/// database pool.
pub struct AppStateConfig {
    pub openai: OpenAiConfig,
    pub storage: StorageConfig,
    pub upstream_timeout: Duration,
    pub cors_origin: Option<String>,
}

impl Default for AppStateConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            storage: StorageConfig::Database,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            cors_origin: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub image_repo: Arc<dyn ImageRepository>,
    pub image_service: ImageService,
    pub suggestion_service: SuggestionService,
    pub cors_origin: Option<HeaderValue>,
}

impl AppState {
    /// Build the full application state from a database connection and config.
    pub fn from_database(database: &Database, config: AppStateConfig) -> anyhow::Result<Self> {
        let pool = database.clone_pool();

        let image_repo: Arc<dyn ImageRepository> = match config.storage {
            StorageConfig::Database => Arc::new(SqlImageRepository::new(pool)),
            StorageConfig::Filesystem { images_dir } => {
                Arc::new(FileImageRepository::new(pool, images_dir))
            }
        };

        let http_client = reqwest::ClientBuilder::new()
            .timeout(config.upstream_timeout)
            .build()
            .context("failed to build HTTP client")?;

        let openai = OpenAiClient::new(http_client.clone(), config.openai)
            .context("invalid OpenAI base url")?;

        let cors_origin = config
            .cors_origin
            .map(|origin| HeaderValue::from_str(&origin))
            .transpose()
            .context("invalid CORS origin")?;

        let image_service =
            ImageService::new(Arc::clone(&image_repo), openai.clone(), http_client);
        let suggestion_service = SuggestionService::new(openai);

        Ok(Self {
            image_repo,
            image_service,
            suggestion_service,
            cors_origin,
        })
    }
}
