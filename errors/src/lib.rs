//! # Agent Platform Errors
//!
//! Structured errors raised while resolving platform configuration.
//!
//! None of these are fatal to the owning process: the loader converts every
//! source error into the environment fallback, and invalid environment
//! values are skipped in favour of the next precedence tier. The typed
//! variants exist so that the reason for a degraded configuration can be
//! reported to operators instead of a bare log line.

use thiserror::Error;

/// Errors raised while reading declarative sources or environment values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read {source_name}: {reason}")]
    SourceRead { source_name: String, reason: String },

    #[error("Failed to parse {source_name}: {reason}")]
    SourceParse { source_name: String, reason: String },

    #[error("Source {source_name} is empty")]
    EmptySource { source_name: String },

    #[error("Invalid entry in {source_name}: {reason}")]
    SourceInvalid { source_name: String, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidEnvValue { key: String, reason: String }
}

impl ConfigError {
    /// Name of the declarative source this error refers to, if any.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            ConfigError::SourceRead { source_name, .. }
            | ConfigError::SourceParse { source_name, .. }
            | ConfigError::EmptySource { source_name }
            | ConfigError::SourceInvalid { source_name, .. } => Some(source_name),
            ConfigError::InvalidEnvValue { .. } => None
        }
    }
}
