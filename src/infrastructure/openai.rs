use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::application::errors::AppError;

pub const OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-2";
pub const DEFAULT_IMAGE_SIZE: &str = "256x256";

const USER_AGENT: &str = "Promptshot/1.0";
const COMPLETIONS_PATH: &str = "v1/completions";
const IMAGE_GENERATIONS_PATH: &str = "v1/images/generations";
const COMPLETION_MAX_TOKENS: u32 = 256;

/// Everything needed to talk to an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub completion_model: String,
    pub image_model: String,
    pub image_size: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_URL.to_string(),
            api_key: String::new(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
        }
    }
}

/// Where the generated image can be obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    Url(String),
    Inline(Vec<u8>),
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    completion_model: String,
    image_model: String,
    image_size: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, config: OpenAiConfig) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path().trim_end_matches('/'));
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key,
            completion_model: config.completion_model,
            image_model: config.image_model,
            image_size: config.image_size,
        })
    }

    /// Send `prompt` to the completions endpoint and return the first choice's
    /// text exactly as received.
    pub async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: &self.completion_model,
            prompt,
            max_tokens: COMPLETION_MAX_TOKENS,
        };

        let response: CompletionResponse = self.post(COMPLETIONS_PATH, &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| AppError::upstream("completion response contained no choices"))
    }

    /// Ask for exactly one image at the configured size.
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, AppError> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
            size: &self.image_size,
        };

        let response: ImageResponse = self.post(IMAGE_GENERATIONS_PATH, &request).await?;

        let data = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::upstream("image response contained no images"))?;

        if let Some(url) = data.url.filter(|u| !u.trim().is_empty()) {
            return Ok(GeneratedImage::Url(url));
        }

        if let Some(b64) = data.b64_json {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(b64.trim())
                .map_err(|e| AppError::upstream(format!("invalid base64 image payload: {e}")))?;
            return Ok(GeneratedImage::Inline(bytes));
        }

        Err(AppError::upstream(
            "image response carried neither a url nor b64_json",
        ))
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, AppError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| AppError::upstream(format!("invalid OpenAI path {path}: {e}")))?;

        debug!(%url, "calling OpenAI");

        let response = self
            .http
            .post(url)
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            return Err(AppError::upstream(format!(
                "OpenAI returned status {status}: {body}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::upstream(format!("failed to read OpenAI response body: {e}"))
        })?;

        serde_json::from_str(&body)
            .map_err(|e| AppError::upstream(format!("failed to parse OpenAI response: {e}")))
    }
}

// --- OpenAI API types ---

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}
