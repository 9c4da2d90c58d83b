use anyhow::{Context, Result};

use super::PromptshotClient;
use crate::domain::ids::ImageId;
use crate::domain::images::{GenerateImageRequest, GenerateImageResponse, ImageSummary};

/// Raw image as served by `GET /images/{id}`.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

pub struct ImagesClient<'a> {
    client: &'a PromptshotClient,
}

impl<'a> ImagesClient<'a> {
    pub fn new(client: &'a PromptshotClient) -> Self {
        Self { client }
    }

    pub async fn generate(&self, prompt: &str) -> Result<ImageId> {
        let url = self.client.endpoint("generate-image")?;
        let payload = GenerateImageRequest {
            prompt: Some(prompt.to_string()),
        };
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .json(&payload)
            .send()
            .await?;
        let created: GenerateImageResponse = self.client.handle_response(response).await?;
        Ok(created.image_id)
    }

    pub async fn list(&self) -> Result<Vec<ImageSummary>> {
        let url = self.client.endpoint("images")?;
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .send()
            .await?;
        self.client.handle_response(response).await
    }

    pub async fn fetch(&self, id: ImageId) -> Result<FetchedImage> {
        let url = self.client.endpoint(&format!("images/{id}"))?;
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.client.response_error(response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response
            .bytes()
            .await
            .context("failed to read image body")?
            .to_vec();

        Ok(FetchedImage { content_type, data })
    }
}
