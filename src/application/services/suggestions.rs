use crate::application::errors::AppError;
use crate::infrastructure::openai::OpenAiClient;

pub const SUGGESTION_PROMPT: &str = "Write a random text prompt for DALL·E to generate an image, this prompt will be shown to the user, include details such as the genre and what type of painting it should be, options can include: oil painting, watercolor, photo-realistic, 4k, abstract, modern, black and white etc. Do not wrap the answer in quotes.";

/// Asks the completion API for an image prompt the user could try.
#[derive(Clone)]
pub struct SuggestionService {
    openai: OpenAiClient,
}

impl SuggestionService {
    pub fn new(openai: OpenAiClient) -> Self {
        Self { openai }
    }

    /// One attempt, text returned untouched.
    pub async fn suggest(&self) -> Result<String, AppError> {
        self.openai.complete(SUGGESTION_PROMPT).await
    }
}
