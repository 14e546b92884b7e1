//! x86_64 SIMD implementations using AVX2.
//!
//! All functions in this module are unsafe because they require the CPU to
//! support AVX2 instructions. Calling them on a CPU without AVX2 support will
//! result in an illegal instruction fault. Use `cpu_capabilities().avx2` to
//! check before calling.
//!
//! Every function produces bit-identical results to its scalar counterpart:
//! all arithmetic is exact integer arithmetic, so the only difference between
//! the paths is throughput.

use std::arch::x86_64::*;

/// AVX2 sum of absolute differences over two byte slices.
///
/// # Safety
///
/// The CPU must support AVX2 instructions.
#[target_feature(enable = "avx2")]
pub unsafe fn sad_avx2(p: &[u8], q: &[u8]) -> u32 {
    let len = p.len().min(q.len());
    let mut acc = _mm256_setzero_si256();
    let mut i = 0;

    // 32 bytes per iteration; _mm256_sad_epu8 accumulates into 4 u64 lanes.
    while i + 32 <= len {
        let a = _mm256_loadu_si256(p.as_ptr().add(i) as *const __m256i);
        let b = _mm256_loadu_si256(q.as_ptr().add(i) as *const __m256i);
        acc = _mm256_add_epi64(acc, _mm256_sad_epu8(a, b));
        i += 32;
    }

    // Tail blocks go through the zero-extending cast: the plain cast leaves
    // the upper 128 bits undefined, which would corrupt the accumulator.
    if i + 16 <= len {
        let a = _mm_loadu_si128(p.as_ptr().add(i) as *const __m128i);
        let b = _mm_loadu_si128(q.as_ptr().add(i) as *const __m128i);
        acc = _mm256_add_epi64(acc, _mm256_zextsi128_si256(_mm_sad_epu8(a, b)));
        i += 16;
    }

    if i + 8 <= len {
        let a = _mm_loadl_epi64(p.as_ptr().add(i) as *const __m128i);
        let b = _mm_loadl_epi64(q.as_ptr().add(i) as *const __m128i);
        acc = _mm256_add_epi64(acc, _mm256_zextsi128_si256(_mm_sad_epu8(a, b)));
        i += 8;
    }

    // Horizontal sum of the four u64 lanes.
    let lo = _mm256_castsi256_si128(acc);
    let hi = _mm256_extracti128_si256(acc, 1);
    let sum = _mm_add_epi64(lo, hi);
    let mut sad =
        (_mm_extract_epi64(sum, 0) as u64 + _mm_extract_epi64(sum, 1) as u64) as u32;

    // Remainder (kernel window sizes keep lengths a multiple of 8, but the
    // row helper may hand over an arbitrary tail).
    while i < len {
        sad += (p[i] as i32 - q[i] as i32).unsigned_abs();
        i += 1;
    }

    sad
}

/// AVX2 sum of squared differences over two byte slices.
///
/// # Safety
///
/// The CPU must support AVX2 instructions.
#[target_feature(enable = "avx2")]
pub unsafe fn ssd_avx2(p: &[u8], q: &[u8]) -> u32 {
    let len = p.len().min(q.len());
    let mut acc = _mm256_setzero_si256();
    let mut i = 0;

    // Widen 16 bytes to i16 lanes, subtract, then pairwise multiply-add
    // into i32 lanes. Differences fit i16 and the products fit i32 exactly.
    while i + 16 <= len {
        let a = _mm256_cvtepu8_epi16(_mm_loadu_si128(p.as_ptr().add(i) as *const __m128i));
        let b = _mm256_cvtepu8_epi16(_mm_loadu_si128(q.as_ptr().add(i) as *const __m128i));
        let d = _mm256_sub_epi16(a, b);
        acc = _mm256_add_epi32(acc, _mm256_madd_epi16(d, d));
        i += 16;
    }

    if i + 8 <= len {
        let a = _mm_cvtepu8_epi16(_mm_loadl_epi64(p.as_ptr().add(i) as *const __m128i));
        let b = _mm_cvtepu8_epi16(_mm_loadl_epi64(q.as_ptr().add(i) as *const __m128i));
        let d = _mm_sub_epi16(a, b);
        acc = _mm256_add_epi32(acc, _mm256_zextsi128_si256(_mm_madd_epi16(d, d)));
        i += 8;
    }

    // Horizontal sum of the eight i32 lanes.
    let lo = _mm256_castsi256_si128(acc);
    let hi = _mm256_extracti128_si256(acc, 1);
    let mut sum = _mm_add_epi32(lo, hi);
    sum = _mm_add_epi32(sum, _mm_srli_si128(sum, 8));
    sum = _mm_add_epi32(sum, _mm_srli_si128(sum, 4));
    let mut ssd = _mm_cvtsi128_si32(sum) as u32;

    while i < len {
        let d = p[i] as i32 - q[i] as i32;
        ssd += (d * d) as u32;
        i += 1;
    }

    ssd
}
