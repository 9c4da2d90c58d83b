pub mod client;
pub mod database;
pub mod image_fetch;
pub mod openai;
pub mod repositories;
