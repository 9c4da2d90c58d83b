use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::print_json;
use crate::domain::ids::ImageId;
use crate::domain::images::GenerateImageResponse;
use crate::infrastructure::client::PromptshotClient;

#[derive(Debug, Args)]
pub struct GenerateCommand {
    #[arg(long)]
    pub prompt: String,
}

#[derive(Debug, Args)]
pub struct FetchCommand {
    #[arg(long)]
    pub id: ImageId,
    /// File to write the image to
    #[arg(long, short)]
    pub output: PathBuf,
}

pub async fn suggest(client: &PromptshotClient) -> Result<()> {
    let suggestion = client.suggestion().await?;
    println!("{suggestion}");
    Ok(())
}

pub async fn generate(client: &PromptshotClient, command: GenerateCommand) -> Result<()> {
    let image_id = client.images().generate(&command.prompt).await?;
    print_json(&GenerateImageResponse { image_id })
}

pub async fn list(client: &PromptshotClient) -> Result<()> {
    let images = client.images().list().await?;
    print_json(&images)
}

pub async fn fetch(client: &PromptshotClient, command: FetchCommand) -> Result<()> {
    let image = client.images().fetch(command.id).await?;
    tokio::fs::write(&command.output, &image.data)
        .await
        .with_context(|| format!("failed to write {}", command.output.display()))?;
    eprintln!(
        "Wrote {} bytes ({}) to {}",
        image.data.len(),
        image.content_type.as_deref().unwrap_or("unknown type"),
        command.output.display()
    );
    Ok(())
}
