//! # formatscan-detect
//!
//! Interlace and telecine detection for raw video frame sequences.
//!
//! This crate is the analysis engine of the formatscan library. It consumes
//! caller-owned luma buffers plus a validated [`Resolution`] and produces
//! statistical verdicts and diagnostic distributions; file I/O, CLI flags,
//! and log formats belong to the callers.
//!
//! ## Layers
//!
//! | Layer | Module | Description |
//! |-------|--------|-------------|
//! | Kernels | [`simd`] | SAD/SSD over 8/16-byte windows, scalar + AVX2 |
//! | Deltas | [`delta`] | Frame and field vertical gradient energy, gamma |
//! | Interlace | [`interlace`] | Sliding-window field-difference histogram |
//! | Telecine | [`telecine`] | Five-frame cadence energy tables and verdict |
//!
//! The kernel paths are selected once per process from a cached CPU probe
//! and produce bit-identical results, so every analysis is reproducible
//! across machines with and without SIMD support.
//!
//! ## Quick start
//!
//! ```
//! use formatscan_core::Resolution;
//! use formatscan_detect::{DeltaEngine, InterlaceDetector};
//!
//! let res = Resolution::new(64, 64)?;
//! let luma = vec![128u8; res.luma_pixels()];
//!
//! let engine = DeltaEngine::new();
//! let report = engine.deltas(&luma, res)?;
//! assert_eq!(report.gamma, 0.0);
//!
//! let detector = InterlaceDetector::new();
//! let analysis = detector.analyze(&luma, res)?;
//! assert_eq!(analysis.histogram.mean(), 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod delta;
pub mod error;
pub mod interlace;
pub mod simd;
pub mod telecine;

pub use delta::{DeltaEngine, DeltaReport, GAMMA_EPSILON};
pub use error::{DetectError, Result};
pub use interlace::{
    build_histogram, FieldDiffHistogram, FrameAnalysis, HistogramRow, InterlaceDetector, BINS,
    MAX_FIELD_DIFF, MIN_FIELD_DIFF, WINSIZE_HEIGHT, WINSIZE_WIDTH,
};
pub use simd::{cpu_capabilities, detect_simd, DiffKernels, KernelPath, Pitch, SimdCapabilities};
pub use telecine::{
    FieldSsd, TelecineDetector, TelecineReport, TelecineVerdict, CADENCE_SSD_THRESHOLD,
    PATTERN_LENGTH,
};
