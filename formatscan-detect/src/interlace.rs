//! Interlace detection via a sliding-window field-difference histogram.
//!
//! A window of [`WINSIZE_HEIGHT`] rows by [`WINSIZE_WIDTH`] columns slides
//! across the frame one column at a time, for every vertical band. Within
//! the window, pixels split into even-row and odd-row sub-windows; the ratio
//! of squared field difference to total field energy is one histogram sample.
//! Interlaced content concentrates samples in the high bins, progressive
//! content near zero.
//!
//! All window statistics are maintained incrementally: when the window
//! slides right, the leaving column's contribution is subtracted from each
//! accumulator before its ring slot is overwritten. Recomputing per position
//! would cost `WINSIZE_HEIGHT × WINSIZE_WIDTH` reads per step instead of
//! `WINSIZE_HEIGHT`.

use crate::delta::{DeltaEngine, DeltaReport};
use crate::error::{DetectError, Result};
use crate::simd::DiffKernels;
use formatscan_core::Resolution;
use serde::Serialize;

/// Sliding window height in rows (each field sees half of these).
pub const WINSIZE_HEIGHT: usize = 20;

/// Sliding window width in columns.
pub const WINSIZE_WIDTH: usize = 10;

/// Number of histogram bins.
pub const BINS: usize = 100;

/// Lower clamp bound for a window's field difference.
pub const MIN_FIELD_DIFF: f32 = 0.0;

/// Upper clamp bound for a window's field difference.
pub const MAX_FIELD_DIFF: f32 = 0.5;

const HALF_WIN: usize = WINSIZE_HEIGHT / 2;

/// Map a clamped field difference onto a histogram bin.
///
/// The value is normalized into `[0, 1]` and rounded onto `BINS - 1` steps;
/// the final clamp absorbs floating rounding at the top edge so a difference
/// of exactly [`MAX_FIELD_DIFF`] lands in the last bin.
fn bin_index(field_diff: f32) -> usize {
    let norm = (field_diff - MIN_FIELD_DIFF) / (MAX_FIELD_DIFF - MIN_FIELD_DIFF);
    let bin = (norm * (BINS - 1) as f32 + 0.5).floor() as usize;
    bin.min(BINS - 1)
}

/// Serialize a fixed-size array as a sequence.
///
/// serde's built-in `Serialize` impls only cover arrays up to length 32, so
/// the [`BINS`]-length histogram arrays need an explicit adapter. Emitting the
/// elements as a sequence yields the same JSON a native array impl would.
fn serialize_array<S, T>(array: &[T], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: Serialize,
{
    serializer.collect_seq(array.iter())
}

/// Histogram of field-difference energy across one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDiffHistogram {
    #[serde(serialize_with = "serialize_array")]
    counts: [u32; BINS],
    #[serde(serialize_with = "serialize_array")]
    representative: [f32; BINS],
    samples: u32,
    total: f64,
}

impl FieldDiffHistogram {
    fn new() -> Self {
        Self {
            counts: [0; BINS],
            representative: [0.0; BINS],
            samples: 0,
            total: 0.0,
        }
    }

    fn record(&mut self, field_diff: f32) {
        let bin = bin_index(field_diff);
        self.counts[bin] += 1;
        self.samples += 1;
        self.total += field_diff as f64;
        // Last write wins: later window positions overwrite earlier
        // representatives landing in the same bin.
        self.representative[bin] = field_diff;
    }

    /// Per-bin sample counts.
    pub fn counts(&self) -> &[u32; BINS] {
        &self.counts
    }

    /// Per-bin representative (un-quantized) field-difference values.
    pub fn representative(&self) -> &[f32; BINS] {
        &self.representative
    }

    /// Total number of window positions sampled.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Mean field difference across all samples.
    pub fn mean(&self) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            (self.total / self.samples as f64) as f32
        }
    }

    /// Percentage of samples landing in the given bin.
    pub fn distribution(&self, bin: usize) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            self.counts[bin] as f32 / self.samples as f32 * 100.0
        }
    }

    /// Iterate over all bins in tabular form.
    pub fn rows(&self) -> impl Iterator<Item = HistogramRow> + '_ {
        (0..BINS).map(move |bin| HistogramRow {
            field_diff: self.representative[bin],
            bin,
            percent: self.distribution(bin),
            count: self.counts[bin],
        })
    }
}

/// One row of the histogram table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HistogramRow {
    /// Representative field difference for this bin.
    pub field_diff: f32,
    /// Bin index.
    pub bin: usize,
    /// Share of all samples in this bin, in percent.
    pub percent: f32,
    /// Sample count.
    pub count: u32,
}

/// Ring-buffered column state for the sliding window.
///
/// Invariant: the running accumulators always equal the sums over the
/// columns currently resident in the ring buffers. A column's old
/// contribution is subtracted before its slot is overwritten; breaking that
/// order silently corrupts every subsequent sample.
struct WindowState {
    even: [[i32; WINSIZE_WIDTH]; HALF_WIN],
    odd: [[i32; WINSIZE_WIDTH]; HALF_WIN],
    diff: [[i32; WINSIZE_WIDTH]; HALF_WIN],
    energy_even: i64,
    energy_odd: i64,
    delta: i64,
}

impl WindowState {
    fn new() -> Self {
        Self {
            even: [[0; WINSIZE_WIDTH]; HALF_WIN],
            odd: [[0; WINSIZE_WIDTH]; HALF_WIN],
            diff: [[0; WINSIZE_WIDTH]; HALF_WIN],
            energy_even: 0,
            energy_odd: 0,
            delta: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Slide in one column at `(top_row, col)`, displacing whatever occupied
    /// its ring slot.
    fn push_column(&mut self, luma: &[u8], width: usize, top_row: usize, col: usize) {
        let slot = col % WINSIZE_WIDTH;
        for m in 0..WINSIZE_HEIGHT {
            let r = m / 2;
            let px = luma[(top_row + m) * width + col] as i32;
            if m % 2 == 1 {
                let old = self.odd[r][slot] as i64;
                self.energy_odd -= old * old;
                self.odd[r][slot] = px;
                self.energy_odd += (px as i64) * (px as i64);

                let old_d = self.diff[r][slot] as i64;
                self.delta -= old_d * old_d;
                let d = px - self.even[r][slot];
                self.diff[r][slot] = d;
                self.delta += (d as i64) * (d as i64);
            } else {
                let old = self.even[r][slot] as i64;
                self.energy_even -= old * old;
                self.even[r][slot] = px;
                self.energy_even += (px as i64) * (px as i64);
            }
        }
    }

    /// Field difference of the resident window, clamped to the mappable
    /// range. A completely flat (zero-energy) window reads as zero
    /// difference rather than dividing by zero.
    fn field_diff(&self) -> f32 {
        let energy = self.energy_even + self.energy_odd;
        if energy == 0 {
            return MIN_FIELD_DIFF;
        }
        let raw = self.delta as f32 / energy as f32;
        raw.clamp(MIN_FIELD_DIFF, MAX_FIELD_DIFF)
    }
}

/// Build the field-difference histogram for one frame.
///
/// Scans every window position: vertical bands `0..height - WINSIZE_HEIGHT`,
/// and within each band every horizontal position where the window fully
/// fits. Frames smaller than one window are an error, not an empty result.
pub fn build_histogram(luma: &[u8], res: Resolution) -> Result<FieldDiffHistogram> {
    res.validate()?;
    let width = res.width as usize;
    let height = res.height as usize;

    if luma.len() < res.luma_pixels() {
        return Err(DetectError::buffer_too_small(res.luma_pixels(), luma.len()));
    }
    if width < WINSIZE_WIDTH || height <= WINSIZE_HEIGHT {
        return Err(DetectError::frame_too_small(
            res.width,
            res.height,
            WINSIZE_WIDTH as u32,
            WINSIZE_HEIGHT as u32 + 1,
        ));
    }

    let mut histogram = FieldDiffHistogram::new();
    let mut window = WindowState::new();

    for top in 0..height - WINSIZE_HEIGHT {
        window.reset();

        // Prime the window with its first WINSIZE_WIDTH columns.
        for col in 0..WINSIZE_WIDTH {
            window.push_column(luma, width, top, col);
        }
        histogram.record(window.field_diff());

        // Slide right one column at a time.
        for col in WINSIZE_WIDTH..width {
            window.push_column(luma, width, top, col);
            histogram.record(window.field_diff());
        }
    }

    Ok(histogram)
}

/// Combined per-frame interlace analysis.
#[derive(Debug, Clone, Serialize)]
pub struct FrameAnalysis {
    /// Field-difference histogram over the frame.
    pub histogram: FieldDiffHistogram,
    /// Delta measurements and gamma ratio for the same frame.
    pub deltas: DeltaReport,
}

/// Interlace detector.
///
/// Couples the sliding-window histogram with the delta engine; the
/// histogram shape and the gamma ratio together are the signals downstream
/// classification works from.
#[derive(Debug, Clone, Copy)]
pub struct InterlaceDetector {
    delta: DeltaEngine,
}

impl InterlaceDetector {
    /// Create a detector using the best kernel path the CPU supports.
    pub fn new() -> Self {
        Self {
            delta: DeltaEngine::new(),
        }
    }

    /// Create a detector with explicit kernels.
    pub fn with_kernels(kernels: DiffKernels) -> Self {
        Self {
            delta: DeltaEngine::with_kernels(kernels),
        }
    }

    /// Analyze a single frame's luma plane.
    pub fn analyze(&self, luma: &[u8], res: Resolution) -> Result<FrameAnalysis> {
        let histogram = build_histogram(luma, res)?;
        let deltas = self.delta.deltas(luma, res)?;
        Ok(FrameAnalysis { histogram, deltas })
    }
}

impl Default for InterlaceDetector {
    fn default() -> Self {
        Self::new()
    }
}
