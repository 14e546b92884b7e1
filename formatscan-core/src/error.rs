//! Error types for the formatscan core crate.

use thiserror::Error;

/// Error type for core validation and parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Resolution failed validation.
    #[error("Invalid resolution {width}x{height}: {reason}")]
    InvalidResolution {
        width: u32,
        height: u32,
        reason: &'static str,
    },

    /// Resolution string could not be parsed.
    #[error("Malformed resolution string: {0:?} (expected WIDTHxHEIGHT)")]
    MalformedResolution(String),

    /// Framerate is outside the supported range or malformed.
    #[error("Invalid framerate: {0}")]
    InvalidFramerate(String),

    /// Pixel format name is not recognized.
    #[error("Unknown pixel format: {0:?}")]
    UnknownFormat(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an invalid resolution error.
    pub fn invalid_resolution(width: u32, height: u32, reason: &'static str) -> Self {
        Self::InvalidResolution {
            width,
            height,
            reason,
        }
    }

    /// Create an invalid framerate error.
    pub fn invalid_framerate(message: impl Into<String>) -> Self {
        Self::InvalidFramerate(message.into())
    }
}
