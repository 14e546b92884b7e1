//! Error types for the detection engine.

use thiserror::Error;

/// Error type for detection operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    /// Resolution failed core validation.
    #[error(transparent)]
    Resolution(#[from] formatscan_core::CoreError),

    /// Frame is too small for the requested analysis.
    #[error("Frame too small for analysis: {width}x{height} (minimum {min_width}x{min_height})")]
    FrameTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    /// Luma buffer is shorter than the resolution requires.
    #[error("Luma buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Not enough frames were fed to resolve a result.
    #[error("Insufficient frames: need {needed}, have {available}")]
    InsufficientFrames { needed: u64, available: u64 },
}

/// Result type for detection operations.
pub type Result<T> = std::result::Result<T, DetectError>;

impl DetectError {
    /// Create a frame-too-small error.
    pub fn frame_too_small(width: u32, height: u32, min_width: u32, min_height: u32) -> Self {
        Self::FrameTooSmall {
            width,
            height,
            min_width,
            min_height,
        }
    }

    /// Create a buffer-too-small error.
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create an insufficient-frames error.
    pub fn insufficient_frames(needed: u64, available: u64) -> Self {
        Self::InsufficientFrames { needed, available }
    }
}
