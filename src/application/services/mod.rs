mod images;
mod suggestions;

pub use images::ImageService;
pub use suggestions::{SUGGESTION_PROMPT, SuggestionService};
