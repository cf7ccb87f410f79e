// src/utils/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Element query '{selector}' failed: {reason}")]
    Query { selector: String, reason: String },

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Browser session is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser session failed: {0}")]
    Session(#[from] SessionError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication required: {0}")]
    AuthRequired(String),
}
