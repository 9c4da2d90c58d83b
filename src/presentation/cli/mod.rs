pub mod images;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::application::state::StorageConfig;
use crate::infrastructure::openai::{
    DEFAULT_COMPLETION_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE, OPENAI_URL,
};
use self::images::{FetchCommand, GenerateCommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate images from prompts and keep them", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "PROMPTSHOT_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Print a random image prompt suggestion
    Suggest,

    /// Generate and store an image for a prompt
    Generate(GenerateCommand),

    /// List stored images
    List,

    /// Download a stored image
    Fetch(FetchCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// Keep image bytes inside the database record
    Database,
    /// Write image bytes to a directory, keep the filename in the database
    Filesystem,
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "PROMPTSHOT_DATABASE_URL",
        default_value = "sqlite://promptshot.db"
    )]
    pub database_url: String,

    #[arg(long, env = "PROMPTSHOT_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "PROMPTSHOT_OPENAI_URL", default_value = OPENAI_URL)]
    pub openai_url: String,

    #[arg(
        long,
        env = "PROMPTSHOT_COMPLETION_MODEL",
        default_value = DEFAULT_COMPLETION_MODEL
    )]
    pub completion_model: String,

    #[arg(long, env = "PROMPTSHOT_IMAGE_MODEL", default_value = DEFAULT_IMAGE_MODEL)]
    pub image_model: String,

    /// Resolution requested for every generated image, e.g. 256x256
    #[arg(long, env = "PROMPTSHOT_IMAGE_SIZE", default_value = DEFAULT_IMAGE_SIZE)]
    pub image_size: String,

    #[arg(long, value_enum, env = "PROMPTSHOT_STORAGE", default_value_t = StorageKind::Database)]
    pub storage: StorageKind,

    /// Content directory used by the filesystem storage backend
    #[arg(long, env = "PROMPTSHOT_IMAGES_DIR", default_value = "public/images")]
    pub images_dir: PathBuf,

    /// Front-end origin allowed to call the API cross-origin
    #[arg(long, env = "PROMPTSHOT_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    #[arg(long, env = "PROMPTSHOT_UPSTREAM_TIMEOUT_SECS", default_value_t = 120)]
    pub upstream_timeout_secs: u64,
}

impl ServeCommand {
    pub fn storage_config(&self) -> StorageConfig {
        match self.storage {
            StorageKind::Database => StorageConfig::Database,
            StorageKind::Filesystem => StorageConfig::Filesystem {
                images_dir: self.images_dir.clone(),
            },
        }
    }
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
