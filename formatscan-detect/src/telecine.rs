//! Telecine (pulldown) cadence detection.
//!
//! Telecine converts film-rate content to video rate by repeating fields in
//! a fixed cadence. The classic 3:2 pulldown repeats one field out of every
//! five frames, so the field difference between some pair of consecutive
//! frames in each five-frame cycle is (near) zero.
//!
//! The detector accumulates per-pair field SSDs into two tables of length
//! [`PATTERN_LENGTH`], indexed by frame index modulo the pattern length.
//! Over a long stream, a stable cadence concentrates near-zero energy at one
//! phase of each table. The even and odd minimal phases may differ (2:3 vs
//! 3:2 shift by one frame) or coincide (2:3:3:2 and other mixed pulldowns);
//! naming the exact pattern from the phases is left to the caller.

use crate::error::{DetectError, Result};
use crate::simd::DiffKernels;
use formatscan_core::Resolution;
use serde::Serialize;

/// Length of the repeating cadence window, in frames.
///
/// Five frames cover one cycle of 3:2/2:3 pulldown. Longer patterns
/// (e.g. the Euro 2:2:...:3 24-frame cadence) are out of scope.
pub const PATTERN_LENGTH: usize = 5;

/// A normalized phase energy below this threshold counts as a cadence match.
///
/// Only reliable for clean telecine; deinterlaced or transcoded content
/// adds noise that needs a more forgiving model.
pub const CADENCE_SSD_THRESHOLD: f64 = 0.1;

/// Field SSDs for one consecutive frame pair.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSsd {
    /// Mean squared difference across even rows, per field pixel.
    pub even: f64,
    /// Mean squared difference across odd rows, per field pixel.
    pub odd: f64,
}

/// Cadence verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TelecineVerdict {
    /// Both field tables show a near-zero phase: cadence present.
    Present,
    /// Phase energies are too uniform: no cadence.
    Absent,
    /// Not enough data to decide (short stream or zero total energy).
    Indeterminate,
}

/// End-of-stream telecine report.
#[derive(Debug, Clone, Serialize)]
pub struct TelecineReport {
    /// Normalized even-field energy per phase (sums to 1 when determinate).
    pub ssd_even: [f64; PATTERN_LENGTH],
    /// Normalized odd-field energy per phase.
    pub ssd_odd: [f64; PATTERN_LENGTH],
    /// Minimal-energy phase of the even table.
    pub phase_even: Option<usize>,
    /// Minimal-energy phase of the odd table.
    pub phase_odd: Option<usize>,
    /// Cadence verdict.
    pub verdict: TelecineVerdict,
    /// Number of frames analyzed (pairs + 1).
    pub frames: u64,
}

impl TelecineReport {
    /// Check whether a cadence was positively detected.
    pub fn is_present(&self) -> bool {
        self.verdict == TelecineVerdict::Present
    }
}

/// Index of the first minimum in a slice.
fn min_index(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v < values[best] {
            best = i;
        }
    }
    best
}

/// Telecine detector.
///
/// Feed consecutive frame pairs in stream order, then call
/// [`TelecineDetector::finish`]. Frame buffers stay caller-owned; the
/// detector holds only the fixed-size accumulator tables.
#[derive(Debug, Clone)]
pub struct TelecineDetector {
    res: Resolution,
    kernels: DiffKernels,
    seq_even: [f64; PATTERN_LENGTH],
    seq_odd: [f64; PATTERN_LENGTH],
    pairs: u64,
}

impl TelecineDetector {
    /// Create a detector for the given resolution.
    pub fn new(res: Resolution) -> Result<Self> {
        Self::with_kernels(res, DiffKernels::new())
    }

    /// Create a detector with explicit kernels.
    pub fn with_kernels(res: Resolution, kernels: DiffKernels) -> Result<Self> {
        res.validate()?;
        Ok(Self {
            res,
            kernels,
            seq_even: [0.0; PATTERN_LENGTH],
            seq_odd: [0.0; PATTERN_LENGTH],
            pairs: 0,
        })
    }

    /// Number of frames represented by the pairs pushed so far.
    pub fn frames_analyzed(&self) -> u64 {
        if self.pairs == 0 {
            0
        } else {
            self.pairs + 1
        }
    }

    /// Compute the per-field SSDs between two frames without accumulating.
    pub fn field_ssd(&self, prev: &[u8], cur: &[u8]) -> Result<FieldSsd> {
        let needed = self.res.luma_pixels();
        if prev.len() < needed {
            return Err(DetectError::buffer_too_small(needed, prev.len()));
        }
        if cur.len() < needed {
            return Err(DetectError::buffer_too_small(needed, cur.len()));
        }

        let w = self.res.width as usize;
        let h = self.res.height as usize;
        let mut sum_even = 0u64;
        let mut sum_odd = 0u64;

        for row in 0..h {
            let a = &prev[row * w..(row + 1) * w];
            let b = &cur[row * w..(row + 1) * w];
            let ssd = self.kernels.ssd_row(a, b);
            if row % 2 == 1 {
                sum_odd += ssd;
            } else {
                sum_even += ssd;
            }
        }

        let field_size = self.res.field_pixels() as f64;
        Ok(FieldSsd {
            even: sum_even as f64 / field_size,
            odd: sum_odd as f64 / field_size,
        })
    }

    /// Accumulate one consecutive frame pair `(prev, cur)`.
    ///
    /// The first call corresponds to stream frames 0 and 1; the pair's
    /// energy is filed under the phase of the later frame. The first frame
    /// of the stream, having no predecessor, contributes nothing.
    pub fn push_pair(&mut self, prev: &[u8], cur: &[u8]) -> Result<FieldSsd> {
        let ssd = self.field_ssd(prev, cur)?;
        let frame_index = self.pairs + 1;
        let phase = (frame_index % PATTERN_LENGTH as u64) as usize;
        self.seq_even[phase] += ssd.even;
        self.seq_odd[phase] += ssd.odd;
        self.pairs += 1;
        Ok(ssd)
    }

    /// Resolve the accumulated tables into a cadence verdict.
    ///
    /// A stream shorter than `PATTERN_LENGTH + 1` frames cannot populate
    /// every phase, and a stream with zero total difference energy carries
    /// no cadence information; both report [`TelecineVerdict::Indeterminate`]
    /// rather than guessing.
    pub fn finish(&self) -> TelecineReport {
        let frames = self.frames_analyzed();

        if frames < (PATTERN_LENGTH + 1) as u64 {
            return TelecineReport {
                ssd_even: self.seq_even,
                ssd_odd: self.seq_odd,
                phase_even: None,
                phase_odd: None,
                verdict: TelecineVerdict::Indeterminate,
                frames,
            };
        }

        let total_even: f64 = self.seq_even.iter().sum();
        let total_odd: f64 = self.seq_odd.iter().sum();
        if total_even <= 0.0 || total_odd <= 0.0 {
            tracing::debug!(frames, "zero field-difference energy, cadence indeterminate");
            return TelecineReport {
                ssd_even: self.seq_even,
                ssd_odd: self.seq_odd,
                phase_even: None,
                phase_odd: None,
                verdict: TelecineVerdict::Indeterminate,
                frames,
            };
        }

        let mut ssd_even = self.seq_even;
        let mut ssd_odd = self.seq_odd;
        for k in 0..PATTERN_LENGTH {
            ssd_even[k] /= total_even;
            ssd_odd[k] /= total_odd;
        }

        let phase_even = min_index(&ssd_even);
        let phase_odd = min_index(&ssd_odd);

        let verdict = if ssd_even[phase_even] < CADENCE_SSD_THRESHOLD
            && ssd_odd[phase_odd] < CADENCE_SSD_THRESHOLD
        {
            TelecineVerdict::Present
        } else {
            TelecineVerdict::Absent
        };

        tracing::debug!(
            frames,
            phase_even,
            phase_odd,
            ?verdict,
            "telecine analysis complete"
        );

        TelecineReport {
            ssd_even,
            ssd_odd,
            phase_even: Some(phase_even),
            phase_odd: Some(phase_odd),
            verdict,
            frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(w: u32, h: u32) -> Resolution {
        Resolution::new(w, h).unwrap()
    }

    /// Frame filled from a deterministic per-index pattern.
    fn patterned_frame(w: usize, h: usize, seed: u64) -> Vec<u8> {
        (0..w * h)
            .map(|i| ((i as u64 + 131 * seed).wrapping_mul(2654435761) >> 16) as u8)
            .collect()
    }

    #[test]
    fn test_min_index_takes_first_minimum() {
        assert_eq!(min_index(&[3.0, 1.0, 1.0, 2.0]), 1);
        assert_eq!(min_index(&[0.5]), 0);
        assert_eq!(min_index(&[2.0, 2.0, 2.0]), 0);
    }

    #[test]
    fn test_short_stream_is_indeterminate() {
        let resolution = res(16, 16);
        let mut detector = TelecineDetector::new(resolution).unwrap();
        let frames: Vec<Vec<u8>> = (0..3).map(|k| patterned_frame(16, 16, k)).collect();
        for pair in frames.windows(2) {
            detector.push_pair(&pair[0], &pair[1]).unwrap();
        }
        let report = detector.finish();
        assert_eq!(report.frames, 3);
        assert_eq!(report.verdict, TelecineVerdict::Indeterminate);
        assert_eq!(report.phase_even, None);
    }

    #[test]
    fn test_static_stream_is_indeterminate() {
        let resolution = res(16, 16);
        let mut detector = TelecineDetector::new(resolution).unwrap();
        let frame = patterned_frame(16, 16, 0);
        for _ in 0..10 {
            detector.push_pair(&frame, &frame).unwrap();
        }
        let report = detector.finish();
        assert_eq!(report.verdict, TelecineVerdict::Indeterminate);
    }

    #[test]
    fn test_duplicated_frame_cadence_is_detected() {
        let resolution = res(16, 16);
        let mut detector = TelecineDetector::new(resolution).unwrap();

        // Frame k duplicates frame k-1 whenever k % 5 == 2, like a repeated
        // film frame in a pulldown cycle; all other frames are distinct.
        let mut frames: Vec<Vec<u8>> = Vec::new();
        for k in 0..21u64 {
            if k % 5 == 2 {
                frames.push(frames[k as usize - 1].clone());
            } else {
                frames.push(patterned_frame(16, 16, k));
            }
        }
        for pair in frames.windows(2) {
            detector.push_pair(&pair[0], &pair[1]).unwrap();
        }

        let report = detector.finish();
        assert_eq!(report.verdict, TelecineVerdict::Present);
        assert_eq!(report.phase_even, Some(2));
        assert_eq!(report.phase_odd, Some(2));
        assert!(report.ssd_even[2] < CADENCE_SSD_THRESHOLD);
        assert!(report.ssd_odd[2] < CADENCE_SSD_THRESHOLD);
    }

    #[test]
    fn test_random_stream_is_absent() {
        let resolution = res(16, 16);
        let mut detector = TelecineDetector::new(resolution).unwrap();
        let frames: Vec<Vec<u8>> = (0..20).map(|k| patterned_frame(16, 16, k)).collect();
        for pair in frames.windows(2) {
            detector.push_pair(&pair[0], &pair[1]).unwrap();
        }
        let report = detector.finish();
        assert_eq!(report.verdict, TelecineVerdict::Absent);
    }

    #[test]
    fn test_normalized_tables_sum_to_one() {
        let resolution = res(16, 16);
        let mut detector = TelecineDetector::new(resolution).unwrap();
        let frames: Vec<Vec<u8>> = (0..8).map(|k| patterned_frame(16, 16, k)).collect();
        for pair in frames.windows(2) {
            detector.push_pair(&pair[0], &pair[1]).unwrap();
        }
        let report = detector.finish();
        assert!((report.ssd_even.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((report.ssd_odd.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_field_ssd_partitions_by_row_parity() {
        let resolution = res(8, 4);
        let detector = TelecineDetector::new(resolution).unwrap();

        // prev and cur differ by 2 on even rows only.
        let prev = vec![10u8; 8 * 4];
        let mut cur = prev.clone();
        cur[0..8].fill(12);
        cur[16..24].fill(12);

        let ssd = detector.field_ssd(&prev, &cur).unwrap();
        // 16 even-row pixels differing by 2, over a field of 16 pixels.
        assert!((ssd.even - 4.0).abs() < 1e-12);
        assert_eq!(ssd.odd, 0.0);
    }

    #[test]
    fn test_rejects_short_buffers() {
        let resolution = res(16, 16);
        let mut detector = TelecineDetector::new(resolution).unwrap();
        let good = vec![0u8; 256];
        let short = vec![0u8; 100];
        assert!(detector.push_pair(&good, &short).is_err());
        assert!(detector.push_pair(&short, &good).is_err());
    }

    #[test]
    fn test_empty_stream_finish() {
        let detector = TelecineDetector::new(res(16, 16)).unwrap();
        let report = detector.finish();
        assert_eq!(report.frames, 0);
        assert_eq!(report.verdict, TelecineVerdict::Indeterminate);
    }
}
