//! CLI command definitions

use crate::core::Brief;
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;
use uuid::Uuid;

/// Generate an article
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Subject to research
    #[arg(short, long)]
    pub topic: String,

    /// Angle or thesis for the piece
    #[arg(long, default_value = "")]
    pub angle: String,

    /// Intended readership
    #[arg(long, default_value = "general readers")]
    pub audience: String,

    /// Voice of the piece
    #[arg(long, default_value = "neutral")]
    pub tone: String,

    /// Target length
    #[arg(long, default_value = "800")]
    pub word_count: String,

    /// Save the result as a draft
    #[arg(long)]
    pub save: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Also write the article HTML to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenerateCommand {
    pub fn brief(&self) -> Brief {
        Brief::new(&self.topic)
            .with_angle(&self.angle)
            .with_audience(&self.audience)
            .with_tone(&self.tone)
            .with_word_count(&self.word_count)
    }
}

/// Run the HTTP server
#[derive(Debug, Args, Clone)]
pub struct ServeCommand {
    /// Address to listen on (overrides config)
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

/// List saved articles
#[derive(Debug, Args, Clone)]
pub struct ArticlesCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show article versions
#[derive(Debug, Args, Clone)]
pub struct VersionsCommand {
    /// Article ID
    #[arg(long)]
    pub article_id: Uuid,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Caption an image
#[derive(Debug, Args, Clone)]
pub struct AnalyzeImageCommand {
    /// Public URL of the image
    #[arg(short, long)]
    pub url: String,
}
