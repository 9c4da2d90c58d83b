pub mod files;
pub mod images;

pub use files::FileImageRepository;
pub use images::SqlImageRepository;
