//! Error types

use thiserror::Error;

/// Main error type for Repo Pulse
#[derive(Error, Debug)]
pub enum Error {
    #[error("Search backend error: {0}")]
    Backend(String),

    #[error("Record identity error: {0}")]
    Hashing(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
