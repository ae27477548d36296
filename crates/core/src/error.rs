//! Error types for askdocs.
//!
//! This module defines a unified error enum covering all error categories
//! in the workspace: configuration, I/O, LLM calls, retrieval, enrichment,
//! and serialization.

use thiserror::Error;

/// Unified error type for askdocs.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic in library code; errors are represented and propagated.
///
/// Note that on the query path most of these never escape to the caller:
/// the pipeline converts collaborator failures into degraded answers
/// (confidence 0, explanatory reasoning summary) instead of erroring.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector store and retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// External web-search enrichment errors
    #[error("Enrichment error: {0}")]
    Enrichment(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
