//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{AnalyzeImageCommand, ArticlesCommand, GenerateCommand, ServeCommand, VersionsCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Research-and-write article generator
#[derive(Debug, Parser, Clone)]
#[command(name = "newsroom")]
#[command(version = "0.1.0")]
#[command(about = "Researches a topic and drafts a cited HTML article", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to newsroom configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate an article from a brief
    Generate(GenerateCommand),

    /// Run the HTTP API
    Serve(ServeCommand),

    /// List saved articles
    Articles(ArticlesCommand),

    /// Show the version history of a saved article
    Versions(VersionsCommand),

    /// Suggest a caption for an image
    AnalyzeImage(AnalyzeImageCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
