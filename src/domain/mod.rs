pub mod errors;
pub mod ids;
pub mod images;
pub mod repositories;

// Re-exports
pub use errors::RepositoryError;
