//! 128-bit kernels (SSE2)
//!
//! Aligned loads are only taken when both operands start on a 16-byte
//! boundary. On older cores the unaligned loads are noticeably slower, which
//! is the only reason the check exists; both paths produce identical results.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::is_aligned;
use super::reduce::{hsum_pd, hsum_ps};

const ALIGN: usize = 16;

/// SSE dot product for f32, 4 lanes
#[target_feature(enable = "sse2")]
#[cfg_attr(feature = "hadd", target_feature(enable = "sse3"))]
pub unsafe fn sdot(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let chunks = n / 4;
    let (pa, pb) = (a.as_ptr(), b.as_ptr());

    let mut s4 = _mm_setzero_ps();

    if is_aligned(pa, ALIGN) && is_aligned(pb, ALIGN) {
        for i in 0..chunks {
            let offset = i * 4;
            let prod = _mm_mul_ps(_mm_load_ps(pa.add(offset)), _mm_load_ps(pb.add(offset)));
            s4 = _mm_add_ps(s4, prod);
        }
    } else {
        for i in 0..chunks {
            let offset = i * 4;
            let prod = _mm_mul_ps(_mm_loadu_ps(pa.add(offset)), _mm_loadu_ps(pb.add(offset)));
            s4 = _mm_add_ps(s4, prod);
        }
    }

    let mut sum = hsum_ps(s4);

    for i in chunks * 4..n {
        sum += a[i] * b[i];
    }

    sum
}

/// SSE dot product for f64, 2 lanes
#[target_feature(enable = "sse2")]
#[cfg_attr(feature = "hadd", target_feature(enable = "sse3"))]
pub unsafe fn ddot(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    let chunks = n / 2;
    let (pa, pb) = (a.as_ptr(), b.as_ptr());

    let mut s2 = _mm_setzero_pd();

    if is_aligned(pa, ALIGN) && is_aligned(pb, ALIGN) {
        for i in 0..chunks {
            let offset = i * 2;
            let prod = _mm_mul_pd(_mm_load_pd(pa.add(offset)), _mm_load_pd(pb.add(offset)));
            s2 = _mm_add_pd(s2, prod);
        }
    } else {
        for i in 0..chunks {
            let offset = i * 2;
            let prod = _mm_mul_pd(_mm_loadu_pd(pa.add(offset)), _mm_loadu_pd(pb.add(offset)));
            s2 = _mm_add_pd(s2, prod);
        }
    }

    let mut sum = hsum_pd(s2);

    for i in chunks * 2..n {
        sum += a[i] * b[i];
    }

    sum
}

/// Multiply both halves of two f32x4 registers at f64 and add them to `acc`
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn widen_madd(va: __m128, vb: __m128, acc: __m128d) -> __m128d {
    let lo = _mm_mul_pd(_mm_cvtps_pd(va), _mm_cvtps_pd(vb));
    let hi = _mm_mul_pd(
        _mm_cvtps_pd(_mm_movehl_ps(va, va)),
        _mm_cvtps_pd(_mm_movehl_ps(vb, vb)),
    );
    _mm_add_pd(_mm_add_pd(acc, lo), hi)
}

/// SSE dot product for f32 inputs accumulated in f64
///
/// Loads 4 floats per operand and widens each half to a pair of doubles.
#[target_feature(enable = "sse2")]
#[cfg_attr(feature = "hadd", target_feature(enable = "sse3"))]
pub unsafe fn sddot(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len().min(b.len());
    let chunks = n / 4;
    let (pa, pb) = (a.as_ptr(), b.as_ptr());

    let mut s2 = _mm_setzero_pd();

    if is_aligned(pa, ALIGN) && is_aligned(pb, ALIGN) {
        for i in 0..chunks {
            let offset = i * 4;
            s2 = widen_madd(_mm_load_ps(pa.add(offset)), _mm_load_ps(pb.add(offset)), s2);
        }
    } else {
        for i in 0..chunks {
            let offset = i * 4;
            s2 = widen_madd(_mm_loadu_ps(pa.add(offset)), _mm_loadu_ps(pb.add(offset)), s2);
        }
    }

    let mut sum = hsum_pd(s2);

    for i in chunks * 4..n {
        sum += a[i] as f64 * b[i] as f64;
    }

    sum
}
