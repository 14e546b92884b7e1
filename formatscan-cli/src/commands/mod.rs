//! CLI subcommand implementations.

pub mod deltas;
pub mod interlace;
pub mod telecine;

pub use deltas::CmdDeltas;
pub use interlace::CmdInterlace;
pub use telecine::CmdTelecine;

use anyhow::{bail, Context};
use clap::Args;
use formatscan_core::{Fps, PixelFormat, Resolution};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Input options shared by all subcommands.
#[derive(Args, Debug)]
pub struct InputOpts {
    /// Raw uncompressed video file to analyze (.yuv).
    pub input: PathBuf,

    /// Video resolution in pixels (width x height, e.g. 1920x1080).
    #[arg(short = 'r', long)]
    pub resolution: String,

    /// Framerate in fps (float or fraction, e.g. 29.97 or 30000/1001).
    #[arg(short = 'f', long)]
    pub framerate: Option<String>,

    /// Chroma sub-sampling format (e.g. "yuv420p", "yuv422p").
    #[arg(short = 'c', long, default_value = "yuv420p")]
    pub csp: String,
}

impl InputOpts {
    /// Parse and validate the video parameters.
    pub fn video_params(&self) -> anyhow::Result<(Resolution, PixelFormat, Option<Fps>)> {
        let res: Resolution = self
            .resolution
            .parse()
            .with_context(|| format!("invalid --resolution {:?}", self.resolution))?;

        let format = PixelFormat::from_name(&self.csp)
            .with_context(|| format!("invalid --csp {:?}", self.csp))?;
        if format.is_high_depth() {
            bail!("{format} is not supported: analysis reads 8-bit luma only");
        }

        let fps = match &self.framerate {
            Some(s) => Some(
                s.parse::<Fps>()
                    .with_context(|| format!("invalid --framerate {s:?}"))?,
            ),
            None => None,
        };

        Ok((res, format, fps))
    }

    /// Open the input file as a frame stream.
    pub fn open(&self) -> anyhow::Result<FrameStream> {
        let (res, format, _) = self.video_params()?;
        tracing::debug!(%res, %format, input = ?self.input, "opening frame stream");
        let file = File::open(&self.input)
            .with_context(|| format!("cannot open file {:?}", self.input))?;
        Ok(FrameStream {
            reader: BufReader::new(file),
            res,
            frame_size: format.frame_size(res),
            luma_size: format.luma_size(res),
        })
    }

    /// Input filename without directory or extension, for log naming.
    pub fn input_stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_owned())
    }
}

/// Sequential reader over fixed-size raw frames.
pub struct FrameStream {
    reader: BufReader<File>,
    res: Resolution,
    frame_size: usize,
    luma_size: usize,
}

impl FrameStream {
    /// Resolution of every frame in the stream.
    pub fn res(&self) -> Resolution {
        self.res
    }

    /// Size in bytes of one complete frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Size in bytes of the luma plane (stored first in every frame).
    pub fn luma_size(&self) -> usize {
        self.luma_size
    }

    /// Read the next frame into `buf` (which must hold `frame_size` bytes).
    ///
    /// Returns `false` at end of stream. A truncated trailing frame counts
    /// as end of stream, matching raw-video tooling convention.
    pub fn read_frame(&mut self, buf: &mut [u8]) -> anyhow::Result<bool> {
        debug_assert_eq!(buf.len(), self.frame_size);
        match self.reader.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e).context("read error on input stream"),
        }
    }
}

/// Where the CSV logs of a run end up.
pub enum LogDir {
    /// Caller-chosen directory, left in place.
    Explicit(PathBuf),
    /// Temporary directory, deleted on drop unless kept.
    Temp(tempfile::TempDir),
}

impl LogDir {
    /// Create the log directory: explicit if given, temporary otherwise.
    pub fn create(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("cannot create log directory {dir:?}"))?;
                Ok(Self::Explicit(dir.to_owned()))
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("formatscan-")
                    .tempdir()
                    .context("cannot create temp directory")?;
                Ok(Self::Temp(dir))
            }
        }
    }

    /// Path of the directory.
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) => p,
            Self::Temp(t) => t.path(),
        }
    }

    /// Persist the directory (only meaningful for temporary directories).
    pub fn keep(self) -> PathBuf {
        match self {
            Self::Explicit(p) => p,
            Self::Temp(t) => t.keep(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(resolution: &str, csp: &str) -> InputOpts {
        InputOpts {
            input: PathBuf::from("clip.yuv"),
            resolution: resolution.to_owned(),
            framerate: Some("29.97".to_owned()),
            csp: csp.to_owned(),
        }
    }

    #[test]
    fn test_video_params() {
        let (res, format, fps) = opts("1920x1080", "yuv420p").video_params().unwrap();
        assert_eq!(res, Resolution::new(1920, 1080).unwrap());
        assert_eq!(format, PixelFormat::Yuv420p);
        assert_eq!(fps.unwrap(), Fps { num: 30_000, den: 1001 });
    }

    #[test]
    fn test_rejects_bad_params() {
        assert!(opts("1920x1081", "yuv420p").video_params().is_err());
        assert!(opts("1920x1080", "rgb24").video_params().is_err());
        assert!(opts("1920x1080", "yuv420p10le").video_params().is_err());
    }

    #[test]
    fn test_input_stem() {
        assert_eq!(opts("16x16", "yuv420p").input_stem(), "clip");
    }
}
