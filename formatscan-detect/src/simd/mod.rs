//! Difference kernels with runtime CPU dispatch.
//!
//! This module provides the sum-of-absolute-difference (SAD) and
//! sum-of-squared-difference (SSD) kernels used by the detectors, each in a
//! scalar reference implementation and an AVX2 implementation. The two paths
//! produce bit-identical integer results for all inputs; callers may compare
//! or substitute between them freely.
//!
//! Dispatch is decided once per process: the first kernel construction probes
//! the CPU, caches the result, and every later `DiffKernels::new()` reuses the
//! cached decision. A missing instruction set is not an error, only a
//! transparent fallback to the scalar path.

mod detect;
mod scalar;

#[cfg(target_arch = "x86_64")]
mod x86_64;

pub use detect::{cpu_capabilities, detect_simd, SimdCapabilities};

/// Window pitch supported by the difference kernels.
///
/// Other widths are outside the kernel contract; arbitrary row lengths are
/// handled by [`DiffKernels::ssd_row`], which decomposes them into supported
/// windows plus a scalar tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    /// 8-byte windows.
    X8,
    /// 16-byte windows.
    X16,
}

impl Pitch {
    /// Window width in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Self::X8 => 8,
            Self::X16 => 16,
        }
    }
}

/// Kernel execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPath {
    /// Portable reference loops.
    Scalar,
    /// 256-bit AVX2 loops.
    Avx2,
}

/// Difference-kernel dispatch object.
///
/// Selects an execution path once at construction and applies it to every
/// kernel call. The forced constructor exists so tests and benchmarks can pin
/// a path regardless of the host CPU.
#[derive(Debug, Clone, Copy)]
pub struct DiffKernels {
    path: KernelPath,
}

impl DiffKernels {
    /// Create kernels using the best path the CPU supports.
    pub fn new() -> Self {
        let caps = cpu_capabilities();
        let path = if caps.avx2 {
            KernelPath::Avx2
        } else {
            KernelPath::Scalar
        };
        Self { path }
    }

    /// Create kernels pinned to a specific path.
    ///
    /// Requesting [`KernelPath::Avx2`] on a CPU without AVX2 support falls
    /// back to the scalar path instead of failing.
    pub fn with_path(path: KernelPath) -> Self {
        let path = match path {
            KernelPath::Avx2 if !cpu_capabilities().avx2 => KernelPath::Scalar,
            other => other,
        };
        Self { path }
    }

    /// The path kernel calls will execute on.
    pub fn path(&self) -> KernelPath {
        self.path
    }

    /// Sum of absolute differences over `n` consecutive `pitch`-byte windows.
    ///
    /// `n = 0` returns 0 without reading memory. Panics if either slice is
    /// shorter than `n * pitch` bytes.
    pub fn sad(&self, p: &[u8], q: &[u8], pitch: Pitch, n: usize) -> u32 {
        if n == 0 {
            return 0;
        }
        let len = n * pitch.bytes();
        self.dispatch_sad(&p[..len], &q[..len])
    }

    /// Sum of squared differences over `n` consecutive `pitch`-byte windows.
    ///
    /// `n = 0` returns 0 without reading memory. Panics if either slice is
    /// shorter than `n * pitch` bytes.
    pub fn ssd(&self, p: &[u8], q: &[u8], pitch: Pitch, n: usize) -> u32 {
        if n == 0 {
            return 0;
        }
        let len = n * pitch.bytes();
        self.dispatch_ssd(&p[..len], &q[..len])
    }

    /// Sum of squared differences over two rows of arbitrary equal length.
    ///
    /// The row is decomposed into 16-byte windows, at most one 8-byte window,
    /// and a scalar tail shorter than 8 bytes, so every pixel is covered
    /// exactly once whichever kernel path executes.
    pub fn ssd_row(&self, p: &[u8], q: &[u8]) -> u64 {
        let len = p.len().min(q.len());
        let n16 = len / 16;
        let mut sum = self.ssd(p, q, Pitch::X16, n16) as u64;
        let mut off = n16 * 16;
        if len - off >= 8 {
            sum += self.ssd(&p[off..], &q[off..], Pitch::X8, 1) as u64;
            off += 8;
        }
        for i in off..len {
            let d = p[i] as i32 - q[i] as i32;
            sum += (d * d) as u64;
        }
        sum
    }

    fn dispatch_sad(&self, p: &[u8], q: &[u8]) -> u32 {
        match self.path {
            #[cfg(target_arch = "x86_64")]
            KernelPath::Avx2 => unsafe { x86_64::sad_avx2(p, q) },
            #[cfg(not(target_arch = "x86_64"))]
            KernelPath::Avx2 => scalar::sad_scalar(p, q),
            KernelPath::Scalar => scalar::sad_scalar(p, q),
        }
    }

    fn dispatch_ssd(&self, p: &[u8], q: &[u8]) -> u32 {
        match self.path {
            #[cfg(target_arch = "x86_64")]
            KernelPath::Avx2 => unsafe { x86_64::ssd_avx2(p, q) },
            #[cfg(not(target_arch = "x86_64"))]
            KernelPath::Avx2 => scalar::ssd_scalar(p, q),
            KernelPath::Scalar => scalar::ssd_scalar(p, q),
        }
    }
}

impl Default for DiffKernels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_windows_read_nothing() {
        let kernels = DiffKernels::new();
        // Empty slices are fine when n = 0.
        assert_eq!(kernels.sad(&[], &[], Pitch::X16, 0), 0);
        assert_eq!(kernels.ssd(&[], &[], Pitch::X8, 0), 0);
    }

    #[test]
    fn test_known_values() {
        let kernels = DiffKernels::new();
        let p = [10u8; 16];
        let q = [13u8; 16];
        assert_eq!(kernels.sad(&p, &q, Pitch::X16, 1), 3 * 16);
        assert_eq!(kernels.ssd(&p, &q, Pitch::X16, 1), 9 * 16);
        assert_eq!(kernels.sad(&p, &q, Pitch::X8, 2), 3 * 16);
        assert_eq!(kernels.ssd(&p, &q, Pitch::X8, 2), 9 * 16);
    }

    #[test]
    fn test_windows_are_consecutive() {
        let kernels = DiffKernels::with_path(KernelPath::Scalar);
        let p: Vec<u8> = (0..48).map(|i| i as u8).collect();
        let q = vec![0u8; 48];
        // Only the first two of three 16-byte windows are requested.
        let expected: u32 = (0..32).sum();
        assert_eq!(kernels.sad(&p, &q, Pitch::X16, 2), expected);
    }

    #[test]
    fn test_paths_agree() {
        let scalar = DiffKernels::with_path(KernelPath::Scalar);
        let simd = DiffKernels::with_path(KernelPath::Avx2);

        let p: Vec<u8> = (0..160).map(|i| (i * 31 % 256) as u8).collect();
        let q: Vec<u8> = (0..160).map(|i| (i * 17 % 256) as u8).collect();

        for n in [0, 1, 2, 5, 10] {
            assert_eq!(
                scalar.sad(&p, &q, Pitch::X16, n),
                simd.sad(&p, &q, Pitch::X16, n)
            );
            assert_eq!(
                scalar.ssd(&p, &q, Pitch::X16, n),
                simd.ssd(&p, &q, Pitch::X16, n)
            );
            assert_eq!(
                scalar.sad(&p, &q, Pitch::X8, n),
                simd.sad(&p, &q, Pitch::X8, n)
            );
            assert_eq!(
                scalar.ssd(&p, &q, Pitch::X8, n),
                simd.ssd(&p, &q, Pitch::X8, n)
            );
        }
    }

    #[test]
    fn test_ssd_row_covers_every_width() {
        let scalar = DiffKernels::with_path(KernelPath::Scalar);
        let simd = DiffKernels::with_path(KernelPath::Avx2);

        let p: Vec<u8> = (0..100).map(|i| (i * 3 % 256) as u8).collect();
        let q: Vec<u8> = (0..100).map(|i| (i * 7 % 256) as u8).collect();

        for width in [1, 7, 8, 9, 15, 16, 17, 23, 24, 31, 33, 100] {
            let brute: u64 = (0..width)
                .map(|i| {
                    let d = p[i] as i64 - q[i] as i64;
                    (d * d) as u64
                })
                .sum();
            assert_eq!(scalar.ssd_row(&p[..width], &q[..width]), brute);
            assert_eq!(simd.ssd_row(&p[..width], &q[..width]), brute);
        }
    }

    #[test]
    #[should_panic]
    fn test_undersized_buffer_panics() {
        let kernels = DiffKernels::with_path(KernelPath::Scalar);
        let p = [0u8; 8];
        let q = [0u8; 8];
        kernels.sad(&p, &q, Pitch::X16, 1);
    }
}
