//! Frame geometry and validation.

use crate::error::{CoreError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Maximum supported frame width in pixels.
pub const MAX_WIDTH: u32 = 8192;

/// Maximum supported frame height in pixels.
pub const MAX_HEIGHT: u32 = 8192;

/// Video frame resolution.
///
/// Heights must be even: the field analyses split every frame into
/// even-row and odd-row fields of equal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Resolution {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let res = Self { width, height };
        res.validate()?;
        Ok(res)
    }

    /// Check the resolution against the supported bounds.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::invalid_resolution(
                self.width,
                self.height,
                "dimensions must be non-zero",
            ));
        }
        if self.width > MAX_WIDTH {
            return Err(CoreError::invalid_resolution(
                self.width,
                self.height,
                "width exceeds maximum",
            ));
        }
        if self.height > MAX_HEIGHT {
            return Err(CoreError::invalid_resolution(
                self.width,
                self.height,
                "height exceeds maximum",
            ));
        }
        if self.height % 2 != 0 {
            return Err(CoreError::invalid_resolution(
                self.width,
                self.height,
                "height must be even",
            ));
        }
        Ok(())
    }

    /// Number of luma samples in one frame.
    pub fn luma_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of rows in one field (half the frame height).
    pub fn field_height(&self) -> u32 {
        self.height / 2
    }

    /// Number of luma samples in one field.
    pub fn field_pixels(&self) -> usize {
        self.width as usize * self.field_height() as usize
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = CoreError;

    /// Parse a `WIDTHxHEIGHT` (or `WIDTH:HEIGHT`) string.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(2, ['x', 'X', ':']);
        let width = parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .ok_or_else(|| CoreError::MalformedResolution(s.into()))?;
        let height = parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .ok_or_else(|| CoreError::MalformedResolution(s.into()))?;
        Self::new(width, height)
    }
}
