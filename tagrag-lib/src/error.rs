//! Error types for tagrag

use thiserror::Error;

/// Result type alias for tagrag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tagrag operations
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The text generation service failed or returned nothing usable
    #[error("generation error: {0}")]
    Generation(String),

    /// Failed to read the corpus source
    #[error("corpus error: {0}")]
    Corpus(String),

    /// Invalid or unreadable configuration
    #[error("config error: {0}")]
    Config(String),
}
