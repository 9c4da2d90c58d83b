use tracing::{debug, warn};

use crate::application::errors::AppError;
use crate::domain::images::DEFAULT_CONTENT_TYPE;

/// Bytes fetched from a generated image's source URL along with the content
/// type that should be recorded for them.
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Download the image at `url`. Waits for the whole body; nothing is
/// returned until the bytes are in memory.
pub async fn download_image(client: &reqwest::Client, url: &str) -> Result<DownloadedImage, AppError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::download(format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::download(format!(
            "{url} returned status {}",
            response.status()
        )));
    }

    let declared = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::download(format!("failed to read body from {url}: {e}")))?;

    if bytes.is_empty() {
        return Err(AppError::download(format!("{url} returned an empty body")));
    }

    let content_type = detect_content_type(&bytes, declared.as_deref()).unwrap_or_else(|| {
        warn!(
            url,
            declared = ?declared,
            fallback = DEFAULT_CONTENT_TYPE,
            "unrecognised image format"
        );
        DEFAULT_CONTENT_TYPE.to_string()
    });

    debug!(url, content_type, size = bytes.len(), "downloaded generated image");

    Ok(DownloadedImage {
        content_type,
        data: bytes.to_vec(),
    })
}

/// Work out the MIME type of `data`: the magic bytes win, then a declared
/// `image/*` header. `None` when neither says.
pub fn detect_content_type(data: &[u8], declared: Option<&str>) -> Option<String> {
    if let Ok(format) = image::guess_format(data) {
        return Some(format.to_mime_type().to_string());
    }

    declared
        .map(|value| value.split(';').next().unwrap_or_default().trim())
        .filter(|essence| {
            essence
                .get(..6)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        })
        .map(str::to_ascii_lowercase)
}
