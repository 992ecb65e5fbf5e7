//! Horizontal sums
//!
//! Two strategies for folding a 128-bit register: SSE3 horizontal adds, or a
//! shuffle followed by a vertical add (plain SSE2). Wider registers are first
//! folded in half down to 128 bits.

#![allow(dead_code)]

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Sum of 4 f32 lanes via shuffles (SSE2)
#[inline]
#[target_feature(enable = "sse2")]
pub unsafe fn hsum_ps_shuffle(v: __m128) -> f32 {
    // [a+c, b+d, ..]
    let v = _mm_add_ps(v, _mm_movehl_ps(v, v));
    // lane 0: a+c + b+d
    let v = _mm_add_ss(v, _mm_shuffle_ps(v, v, 1));
    _mm_cvtss_f32(v)
}

/// Sum of 4 f32 lanes via horizontal adds (SSE3)
#[inline]
#[target_feature(enable = "sse3")]
pub unsafe fn hsum_ps_hadd(v: __m128) -> f32 {
    let v = _mm_hadd_ps(v, v);
    let v = _mm_hadd_ps(v, v);
    _mm_cvtss_f32(v)
}

/// Sum of 2 f64 lanes via a shuffle (SSE2)
#[inline]
#[target_feature(enable = "sse2")]
pub unsafe fn hsum_pd_shuffle(v: __m128d) -> f64 {
    let v = _mm_add_pd(v, _mm_shuffle_pd(v, v, 1));
    _mm_cvtsd_f64(v)
}

/// Sum of 2 f64 lanes via a horizontal add (SSE3)
#[inline]
#[target_feature(enable = "sse3")]
pub unsafe fn hsum_pd_hadd(v: __m128d) -> f64 {
    _mm_cvtsd_f64(_mm_hadd_pd(v, v))
}

/// Reduction used by the 128-bit tier, picked by the `hadd` feature
#[inline]
#[cfg(feature = "hadd")]
#[target_feature(enable = "sse3")]
pub unsafe fn hsum_ps(v: __m128) -> f32 {
    hsum_ps_hadd(v)
}

#[inline]
#[cfg(not(feature = "hadd"))]
#[target_feature(enable = "sse2")]
pub unsafe fn hsum_ps(v: __m128) -> f32 {
    hsum_ps_shuffle(v)
}

#[inline]
#[cfg(feature = "hadd")]
#[target_feature(enable = "sse3")]
pub unsafe fn hsum_pd(v: __m128d) -> f64 {
    hsum_pd_hadd(v)
}

#[inline]
#[cfg(not(feature = "hadd"))]
#[target_feature(enable = "sse2")]
pub unsafe fn hsum_pd(v: __m128d) -> f64 {
    hsum_pd_shuffle(v)
}

/// Sum of 8 f32 lanes (AVX)
#[inline]
#[target_feature(enable = "avx")]
pub unsafe fn hsum256_ps(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    hsum_ps_hadd(_mm_add_ps(low, high))
}

/// Sum of 4 f64 lanes (AVX)
#[inline]
#[target_feature(enable = "avx")]
pub unsafe fn hsum256_pd(v: __m256d) -> f64 {
    let high = _mm256_extractf128_pd(v, 1);
    let low = _mm256_castpd256_pd128(v);
    hsum_pd_hadd(_mm_add_pd(low, high))
}
