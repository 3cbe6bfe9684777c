//! Newsroom configuration from YAML and the environment
//!
//! Tunables live in an optional YAML file; API credentials are only ever
//! read from the environment.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the search API key
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

/// Environment variable holding the language model API key
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";

/// Configuration errors; any of these prevents the pipeline from being built
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is missing. Set it in the environment or a .env file")]
    MissingCredential(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsroomConfig {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub image: ImageConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// Search capability settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,

    /// Results requested per query; bounds prompt size downstream
    pub max_results: usize,

    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_backoff_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            max_results: 4,
            timeout_secs: 30,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

/// Language model settings (OpenAI-compatible chat API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,

    /// Model used for image captioning
    pub vision_model: String,

    pub temperature: Option<f32>,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            vision_model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            temperature: None,
            timeout_secs: 120,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

/// Image URL template settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub base_url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://image.pollinations.ai/prompt/".to_string(),
            width: 1024,
            height: 512,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub allowed_origins: Vec<String>,

    /// Deadline for a single request, generation included
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8000)),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            request_timeout_secs: 300,
        }
    }
}

/// Article database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to the user's local data directory
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file path
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("newsroom")
                .join("articles.db"),
        }
    }
}

impl NewsroomConfig {
    /// Load from a YAML file, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: NewsroomConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_results == 0 {
            return Err(ConfigError::Invalid(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.search.endpoint.trim().is_empty() || self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoints must not be empty".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        if self.image.width == 0 || self.image.height == 0 {
            return Err(ConfigError::Invalid(
                "image dimensions must be non-zero".to_string(),
            ));
        }
        match reqwest::Url::parse(&self.image.base_url) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "image.base_url is not a usable URL: {}",
                    self.image.base_url
                )))
            }
        }
        Ok(())
    }
}

/// API keys for the external capabilities
#[derive(Clone)]
pub struct Credentials {
    pub search_api_key: String,
    pub llm_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both keys from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both keys through a lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingCredential(name.to_string()))
        };

        Ok(Self {
            llm_api_key: read(GROQ_API_KEY)?,
            search_api_key: read(TAVILY_API_KEY)?,
        })
    }
}
