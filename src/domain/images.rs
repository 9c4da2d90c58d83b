use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::ImageId;

/// Recorded when neither the bytes nor the source say what the image is.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// A generated image that has been downloaded but not yet persisted.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub prompt: String,
    pub content_type: String,
    pub image_data: Vec<u8>,
}

impl NewImage {
    pub fn new(prompt: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            prompt: prompt.into(),
            content_type: content_type.into(),
            image_data: data,
        }
    }

    /// File extension used when the bytes are written to a content directory.
    pub fn file_extension(&self) -> &'static str {
        extension_for(&self.content_type)
    }
}

/// A persisted image, bytes included.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub id: ImageId,
    pub prompt: String,
    pub content_type: String,
    pub image_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Metadata of a persisted image. Never carries the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: ImageId,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredImage> for ImageSummary {
    fn from(image: StoredImage) -> Self {
        Self {
            id: image.id,
            prompt: image.prompt,
            created_at: image.created_at,
        }
    }
}

/// Body of `POST /generate-image`. A missing or null prompt is forwarded
/// upstream as an empty string rather than rejected here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerateImageRequest {
    /// Lenient parse of a raw request body. Anything that isn't a JSON
    /// object with a string `prompt` yields an empty prompt.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    #[serde(rename = "imageId")]
    pub image_id: ImageId,
}

fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "jpg",
    }
}
