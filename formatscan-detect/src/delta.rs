//! Field and frame delta engine.
//!
//! Measures vertical gradient energy three ways over one frame's luma plane:
//! across adjacent rows of the whole frame, and across adjacent rows within
//! the even and odd fields separately. Interlaced content shows much higher
//! whole-frame gradient than field-internal gradient, which the `gamma` ratio
//! captures for downstream classification.

use crate::error::{DetectError, Result};
use crate::simd::DiffKernels;
use formatscan_core::Resolution;
use serde::Serialize;

/// Guard term keeping `gamma` finite when both field deltas are zero.
pub const GAMMA_EPSILON: f32 = 1e-5;

/// Per-frame delta measurements.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeltaReport {
    /// Mean squared adjacent-row difference across the whole frame.
    pub frame: f32,
    /// Mean squared row difference within the even field.
    pub even: f32,
    /// Mean squared row difference within the odd field.
    pub odd: f32,
    /// `frame / (even + odd + ε)`. Low values indicate the frame separates
    /// cleanly into fields (interlacing); high values indicate progressive
    /// content.
    pub gamma: f32,
}

/// Field/frame delta engine.
#[derive(Debug, Clone, Copy)]
pub struct DeltaEngine {
    kernels: DiffKernels,
}

impl DeltaEngine {
    /// Create an engine using the best kernel path the CPU supports.
    pub fn new() -> Self {
        Self {
            kernels: DiffKernels::new(),
        }
    }

    /// Create an engine with explicit kernels (pin a path for comparison
    /// runs or benchmarking).
    pub fn with_kernels(kernels: DiffKernels) -> Self {
        Self { kernels }
    }

    /// Mean squared row-to-row luma difference across the whole frame.
    pub fn frame_delta(&self, luma: &[u8], res: Resolution) -> Result<f32> {
        self.check_input(luma, res)?;
        let w = res.width as usize;
        let h = res.height as usize;

        let mut acc = 0u64;
        for row in 0..h - 1 {
            let cur = &luma[row * w..(row + 1) * w];
            let next = &luma[(row + 1) * w..(row + 2) * w];
            acc += self.kernels.ssd_row(cur, next);
        }

        Ok(acc as f32 / ((h - 1) * w) as f32)
    }

    /// Mean squared row differences within each field: `(even, odd)`.
    ///
    /// Even rows are compared two apart (`2i` vs `2i+2`), odd rows likewise
    /// (`2i+1` vs `2i+3`), so each measure stays inside one temporal field.
    pub fn field_delta(&self, luma: &[u8], res: Resolution) -> Result<(f32, f32)> {
        self.check_input(luma, res)?;
        if res.height < 4 {
            return Err(DetectError::frame_too_small(res.width, res.height, 1, 4));
        }
        let w = res.width as usize;
        let pairs = res.field_height() as usize - 1;

        let mut acc_even = 0u64;
        let mut acc_odd = 0u64;
        for i in 0..pairs {
            let even_a = &luma[2 * i * w..(2 * i + 1) * w];
            let even_b = &luma[(2 * i + 2) * w..(2 * i + 3) * w];
            acc_even += self.kernels.ssd_row(even_a, even_b);

            let odd_a = &luma[(2 * i + 1) * w..(2 * i + 2) * w];
            let odd_b = &luma[(2 * i + 3) * w..(2 * i + 4) * w];
            acc_odd += self.kernels.ssd_row(odd_a, odd_b);
        }

        let norm = (pairs * w) as f32;
        Ok((acc_even as f32 / norm, acc_odd as f32 / norm))
    }

    /// All three deltas plus the derived gamma ratio.
    pub fn deltas(&self, luma: &[u8], res: Resolution) -> Result<DeltaReport> {
        let frame = self.frame_delta(luma, res)?;
        let (even, odd) = self.field_delta(luma, res)?;
        let gamma = frame / (even + odd + GAMMA_EPSILON);
        Ok(DeltaReport {
            frame,
            even,
            odd,
            gamma,
        })
    }

    fn check_input(&self, luma: &[u8], res: Resolution) -> Result<()> {
        res.validate()?;
        let needed = res.luma_pixels();
        if luma.len() < needed {
            return Err(DetectError::buffer_too_small(needed, luma.len()));
        }
        Ok(())
    }
}

impl Default for DeltaEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::KernelPath;

    fn res(w: u32, h: u32) -> Resolution {
        Resolution::new(w, h).unwrap()
    }

    /// Frame whose rows alternate between two constant values.
    fn combed_frame(w: usize, h: usize, even: u8, odd: u8) -> Vec<u8> {
        let mut luma = vec![0u8; w * h];
        for row in 0..h {
            let value = if row % 2 == 0 { even } else { odd };
            luma[row * w..(row + 1) * w].fill(value);
        }
        luma
    }

    #[test]
    fn test_flat_frame_is_all_zero() {
        let engine = DeltaEngine::new();
        let luma = vec![128u8; 64 * 64];
        let report = engine.deltas(&luma, res(64, 64)).unwrap();
        assert_eq!(report.frame, 0.0);
        assert_eq!(report.even, 0.0);
        assert_eq!(report.odd, 0.0);
        assert_eq!(report.gamma, 0.0);
        assert!(report.gamma.is_finite());
    }

    #[test]
    fn test_combed_frame_has_high_gamma() {
        let engine = DeltaEngine::new();
        let luma = combed_frame(32, 32, 0, 255);
        let report = engine.deltas(&luma, res(32, 32)).unwrap();
        // Every adjacent-row pair differs by 255; within a field rows match.
        assert_eq!(report.frame, 255.0 * 255.0);
        assert_eq!(report.even, 0.0);
        assert_eq!(report.odd, 0.0);
        assert!(report.gamma > 1_000.0);
        assert!(report.gamma.is_finite());
    }

    #[test]
    fn test_vertical_gradient_frame() {
        let engine = DeltaEngine::new();
        let w = 16usize;
        let h = 8usize;
        // Row r has constant value 10*r: adjacent rows differ by 10,
        // field-internal rows differ by 20.
        let mut luma = vec![0u8; w * h];
        for row in 0..h {
            luma[row * w..(row + 1) * w].fill((10 * row) as u8);
        }
        let report = engine.deltas(&luma, res(w as u32, h as u32)).unwrap();
        assert_eq!(report.frame, 100.0);
        assert_eq!(report.even, 400.0);
        assert_eq!(report.odd, 400.0);
        assert!(report.gamma < 1.0);
    }

    #[test]
    fn test_kernel_paths_agree_on_deltas() {
        let scalar = DeltaEngine::with_kernels(DiffKernels::with_path(KernelPath::Scalar));
        let simd = DeltaEngine::with_kernels(DiffKernels::with_path(KernelPath::Avx2));

        // Width deliberately not a multiple of 16.
        let w = 37u32;
        let h = 12u32;
        let luma: Vec<u8> = (0..w * h).map(|i| (i * 29 % 256) as u8).collect();

        let a = scalar.deltas(&luma, res(w, h)).unwrap();
        let b = simd.deltas(&luma, res(w, h)).unwrap();
        assert_eq!(a.frame, b.frame);
        assert_eq!(a.even, b.even);
        assert_eq!(a.odd, b.odd);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let engine = DeltaEngine::new();
        let luma = vec![0u8; 63];
        let err = engine.frame_delta(&luma, res(8, 8)).unwrap_err();
        assert!(matches!(err, DetectError::BufferTooSmall { needed: 64, .. }));
    }

    #[test]
    fn test_rejects_invalid_resolution() {
        let engine = DeltaEngine::new();
        let luma = vec![0u8; 100];
        let bad = Resolution {
            width: 10,
            height: 5,
        };
        assert!(engine.frame_delta(&luma, bad).is_err());
    }

    #[test]
    fn test_field_delta_needs_four_rows() {
        let engine = DeltaEngine::new();
        let luma = vec![0u8; 16 * 2];
        let err = engine.field_delta(&luma, res(16, 2)).unwrap_err();
        assert!(matches!(err, DetectError::FrameTooSmall { .. }));
    }
}
