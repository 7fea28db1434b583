//! Error types for capture configuration and rendering

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a capture
#[derive(Error, Debug)]
pub enum Error {
    /// A setter argument, the target path or the configured URL was rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The configured renderer binary does not exist on disk
    #[error("Renderer binary not found at {}", .0.display())]
    BinaryNotFound(PathBuf),

    /// The renderer exited but left no usable output behind
    #[error("Could not render `{}`. Renderer error output: `{stderr}`", path.display())]
    RenderFailed { path: PathBuf, stderr: String },

    /// A configuration file could not be read or parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Filesystem or process spawn failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failure reported by the image post-processor
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
