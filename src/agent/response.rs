//! Capability response and error types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error types for external capability calls
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Search returned no results")]
    EmptyResults,
}

impl CapabilityError {
    /// Whether a second attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            CapabilityError::Http(_) | CapabilityError::Timeout(_) => true,
            CapabilityError::Api { status, .. } => *status == 429 || *status >= 500,
            CapabilityError::Parse(_) | CapabilityError::EmptyResults => false,
        }
    }
}

/// One record returned by a search capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,

    /// Snippet text used as research material
    pub content: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CapabilityError::Http("connection reset".to_string()).is_retryable());
        assert!(CapabilityError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(CapabilityError::Api {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(CapabilityError::Api {
            status: 429,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!CapabilityError::Api {
            status: 401,
            body: "bad key".to_string()
        }
        .is_retryable());
        assert!(!CapabilityError::Parse("eof".to_string()).is_retryable());
        assert!(!CapabilityError::EmptyResults.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = CapabilityError::Api {
            status: 500,
            body: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): upstream down");
        assert_eq!(
            CapabilityError::Timeout(Duration::from_secs(12)).to_string(),
            "Timeout after 12s"
        );
        assert_eq!(
            CapabilityError::Timeout(Duration::from_millis(250)).to_string(),
            "Timeout after 250ms"
        );
    }
}
