pub mod images;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};

/// Typed HTTP client for a running promptshot server.
pub struct PromptshotClient {
    base_url: Url,
    http: Client,
}

impl PromptshotClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let mut normalized = base_url;
        if !normalized.path().ends_with('/') {
            normalized.set_path(&format!("{}/", normalized.path().trim_end_matches('/')));
        }

        let http = Client::builder()
            .user_agent("promptshot-cli/1.0")
            .build()
            .context("failed to configure HTTP client")?;

        Ok(Self {
            base_url: normalized,
            http,
        })
    }

    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).with_context(|| format!("invalid API url: {base_url}"))?;
        Self::new(url)
    }

    pub fn images(&self) -> images::ImagesClient<'_> {
        images::ImagesClient::new(self)
    }

    /// Fetch a fresh prompt suggestion.
    pub async fn suggestion(&self) -> Result<String> {
        let url = self.endpoint("suggestion")?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        if response.status().is_success() {
            response
                .text()
                .await
                .context("failed to read suggestion body")
        } else {
            Err(self.response_error(response).await)
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid API path: {path}"))
    }

    pub(crate) fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http.request(method, url)
    }

    pub(crate) async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .context("failed to deserialize response body")
        } else {
            Err(self.response_error(response).await)
        }
    }

    pub(crate) async fn response_error(&self, response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();
        let message = String::from_utf8_lossy(&bytes);
        anyhow!("request failed ({status}): {message}")
    }
}
