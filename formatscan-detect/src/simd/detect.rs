//! Runtime SIMD feature detection.
//!
//! The probe runs at most once per process; every later dispatch reuses the
//! cached result. Missing SIMD support is never an error, only a fallback to
//! the scalar kernels.

use std::sync::OnceLock;

/// Detected SIMD capabilities for the current CPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimdCapabilities {
    /// SSE4.2 support (baseline for modern x86_64).
    pub sse42: bool,
    /// AVX2 support (256-bit integer SIMD).
    pub avx2: bool,
    /// FMA (Fused Multiply-Add) support.
    pub fma: bool,
}

impl SimdCapabilities {
    /// Check if any SIMD acceleration is available.
    pub fn has_simd(&self) -> bool {
        self.sse42 || self.avx2
    }

    /// Get the best available SIMD level as a string.
    pub fn best_level(&self) -> &'static str {
        if self.avx2 {
            "AVX2"
        } else if self.sse42 {
            "SSE4.2"
        } else {
            "Scalar"
        }
    }
}

/// Probe SIMD capabilities at runtime.
#[cfg(target_arch = "x86_64")]
pub fn detect_simd() -> SimdCapabilities {
    let mut caps = SimdCapabilities::default();

    if is_x86_feature_detected!("sse4.2") {
        caps.sse42 = true;
    }
    if is_x86_feature_detected!("avx2") {
        caps.avx2 = true;
    }
    if is_x86_feature_detected!("fma") {
        caps.fma = true;
    }

    caps
}

/// Fallback for architectures without accelerated kernels.
#[cfg(not(target_arch = "x86_64"))]
pub fn detect_simd() -> SimdCapabilities {
    SimdCapabilities::default()
}

static CAPABILITIES: OnceLock<SimdCapabilities> = OnceLock::new();

/// Process-wide cached capability probe.
///
/// The first call performs the probe; later calls return the cached value.
/// `OnceLock` makes the first write safe even if a host application calls in
/// from multiple threads.
pub fn cpu_capabilities() -> SimdCapabilities {
    *CAPABILITIES.get_or_init(|| {
        let caps = detect_simd();
        tracing::debug!(level = caps.best_level(), "probed CPU SIMD capabilities");
        caps
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        let caps = detect_simd();

        #[cfg(target_arch = "x86_64")]
        {
            // Modern x86_64 should have at least SSE4.2
            assert!(caps.sse42 || !caps.has_simd());
        }

        #[cfg(not(target_arch = "x86_64"))]
        assert!(!caps.has_simd());
    }

    #[test]
    fn test_cached_probe_is_stable() {
        let first = cpu_capabilities();
        let second = cpu_capabilities();
        assert_eq!(first.avx2, second.avx2);
        assert_eq!(first.sse42, second.sse42);
    }
}
