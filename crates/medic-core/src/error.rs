//! Unified error types for Medic

use thiserror::Error;

/// Unified error type for all Medic operations
#[derive(Error, Debug)]
pub enum MedicError {
    /// No locator, original or suggested, matched an element.
    /// Carries the element description, not the raw locator.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    // Model backend errors (absorbed inside the client, never surfaced by resolution)
    #[error("Model backend error: {0}")]
    Backend(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Element-lookup collaborator errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl MedicError {
    /// Whether this is the terminal not-found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, MedicError::ElementNotFound(_))
    }
}

/// Result type alias using MedicError
pub type Result<T> = std::result::Result<T, MedicError>;
