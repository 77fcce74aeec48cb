//! Error types for FocusTube.

use thiserror::Error;

/// Library-level error type for FocusTube operations.
#[derive(Error, Debug)]
pub enum FocusTubeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("YouTube API error: {0}")]
    YouTube(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("AI service error: {0}")]
    Ai(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

/// Result type alias for FocusTube operations.
pub type Result<T> = std::result::Result<T, FocusTubeError>;
