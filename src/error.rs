//! Error types for the emoji booth library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding, resizing or encoding failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// HTTP transport error while publishing
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed JSON in a detection script or publish response
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A command was issued in a state that does not accept it
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Asset could not be loaded
    #[error("Asset error: {0}")]
    Asset(String),

    /// Remote publishing failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Camera acquisition or release failed
    #[error("Camera error: {0}")]
    Camera(String),

    /// Filter initialization error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(feature = "camera")]
impl From<opencv::Error> for Error {
    fn from(err: opencv::Error) -> Self {
        Self::Camera(err.to_string())
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
