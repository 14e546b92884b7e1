//! Pixel format descriptions and frame sizing.

use crate::error::{CoreError, Result};
use crate::resolution::Resolution;
use serde::Serialize;
use std::fmt;

/// Pixel format of an uncompressed video frame.
///
/// Only planar YUV layouts are supported: the analyses read the luma plane,
/// which is stored first in every supported format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 8-bit.
    Yuv420p,
    /// Planar YUV 4:2:2, 8-bit.
    Yuv422p,
    /// Planar YUV 4:4:4, 8-bit.
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit little-endian.
    Yuv420p10le,
    /// Planar YUV 4:2:2, 10-bit little-endian.
    Yuv422p10le,
    /// Planar YUV 4:4:4, 10-bit little-endian.
    Yuv444p10le,
}

impl PixelFormat {
    /// Look up a format by name.
    ///
    /// Accepts the common aliases used by raw-video tooling
    /// (`i420`, `iyuv`, `yv12`, `nv12` all map to 4:2:0).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "yuv420p" | "i420" | "iyuv" | "yv12" | "nv12" => Ok(Self::Yuv420p),
            "yuv422p" | "i422" => Ok(Self::Yuv422p),
            "yuv444p" | "i444" => Ok(Self::Yuv444p),
            "yuv420p10le" => Ok(Self::Yuv420p10le),
            "yuv422p10le" => Ok(Self::Yuv422p10le),
            "yuv444p10le" => Ok(Self::Yuv444p10le),
            _ => Err(CoreError::UnknownFormat(name.into())),
        }
    }

    /// Bit depth of each sample.
    pub fn bit_depth(&self) -> u32 {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p => 8,
            Self::Yuv420p10le | Self::Yuv422p10le | Self::Yuv444p10le => 10,
        }
    }

    /// Check if samples are wider than one byte.
    pub fn is_high_depth(&self) -> bool {
        self.bit_depth() > 8
    }

    /// Chroma subsampling factors (horizontal, vertical).
    pub fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Yuv420p10le => (2, 2),
            Self::Yuv422p | Self::Yuv422p10le => (2, 1),
            Self::Yuv444p | Self::Yuv444p10le => (1, 1),
        }
    }

    /// Bytes per stored sample (1 for 8-bit, 2 for deeper formats).
    pub fn bytes_per_sample(&self) -> usize {
        if self.is_high_depth() {
            2
        } else {
            1
        }
    }

    /// Size in bytes of one complete frame at the given resolution.
    pub fn frame_size(&self, res: Resolution) -> usize {
        let luma = res.luma_pixels();
        let (hsub, vsub) = self.chroma_subsampling();
        let chroma = 2 * (luma / (hsub as usize * vsub as usize));
        (luma + chroma) * self.bytes_per_sample()
    }

    /// Size in bytes of the luma plane at the given resolution.
    pub fn luma_size(&self, res: Resolution) -> usize {
        res.luma_pixels() * self.bytes_per_sample()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuv420p10le => "yuv420p10le",
            Self::Yuv422p10le => "yuv422p10le",
            Self::Yuv444p10le => "yuv444p10le",
        };
        write!(f, "{name}")
    }
}
