use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::ids::ImageId;
use crate::domain::images::{ImageSummary, NewImage, StoredImage};

/// Durable store for generated images.
///
/// Implementations assign the identifier on insert and persist the bytes and
/// metadata as a single record: either both are retrievable afterwards or
/// neither is. Records are never updated or removed.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn insert(&self, image: NewImage) -> Result<ImageSummary, RepositoryError>;
    async fn get(&self, id: ImageId) -> Result<StoredImage, RepositoryError>;
    /// Metadata for every stored image, in insertion order.
    async fn list(&self) -> Result<Vec<ImageSummary>, RepositoryError>;
}
