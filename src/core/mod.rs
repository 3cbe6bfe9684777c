//! Core domain models
//!
//! This module defines the brief, the staged run state, configuration
//! and the citation audit.

pub mod brief;
pub mod citation;
pub mod config;
pub mod state;

pub use brief::*;
pub use citation::{audit as audit_citations, CitationAudit};
pub use config::{ConfigError, Credentials, NewsroomConfig};
pub use state::*;
