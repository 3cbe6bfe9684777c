//! Pipeline error types

use crate::agent::CapabilityError;
use crate::core::{ConfigError, Stage};
use thiserror::Error;

/// Why a pipeline run (or its construction) failed
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid brief: {0}")]
    InvalidBrief(String),

    #[error("Research failed: {source}")]
    ResearchFailed {
        #[source]
        source: CapabilityError,
    },

    #[error("Generation failed: {source}")]
    GenerationFailed {
        #[source]
        source: CapabilityError,
    },
}

impl PipelineError {
    /// The stage that failed, if the failure came from a stage
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::ResearchFailed { .. } => Some(Stage::Research),
            PipelineError::GenerationFailed { .. } => Some(Stage::Write),
            PipelineError::Configuration(_) | PipelineError::InvalidBrief(_) => None,
        }
    }

    /// The upstream capability error behind a stage failure
    pub fn capability_error(&self) -> Option<&CapabilityError> {
        match self {
            PipelineError::ResearchFailed { source } | PipelineError::GenerationFailed { source } => {
                Some(source)
            }
            _ => None,
        }
    }
}
