// Error type shared by the collaborators and operations

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiskError {
    /// The path has fewer than two slash-separated segments
    #[error("Invalid pathname of {0} received")]
    InvalidPath(String),

    #[error("Device path not found: {0}")]
    NotFound(String),

    /// No enclosure services for this disk, so its LEDs cannot be driven
    #[error("LED control not supported for {0}")]
    LedUnsupported(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DiskError>;
