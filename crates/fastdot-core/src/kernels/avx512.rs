//! 512-bit kernels (AVX-512F)
//!
//! Same shape as the AVX kernels with twice the lanes. Lane reduction uses
//! the `_mm512_reduce_add_*` sequences.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::is_aligned;

const ALIGN: usize = 64;
// the mixed kernels load 8 floats (256 bits) per step
const ALIGN_MIXED: usize = 32;

#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn mul_add_ps(a: __m512, b: __m512, acc: __m512) -> __m512 {
    _mm512_add_ps(acc, _mm512_mul_ps(a, b))
}

#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn mul_add_pd(a: __m512d, b: __m512d, acc: __m512d) -> __m512d {
    _mm512_add_pd(acc, _mm512_mul_pd(a, b))
}

#[cfg(feature = "fma")]
#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn fmadd_ps(a: __m512, b: __m512, acc: __m512) -> __m512 {
    _mm512_fmadd_ps(a, b, acc)
}

#[cfg(feature = "fma")]
#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn fmadd_pd(a: __m512d, b: __m512d, acc: __m512d) -> __m512d {
    _mm512_fmadd_pd(a, b, acc)
}

macro_rules! avx512_kernels {
    (
        #[$feature:meta]
        sdot: $sdot:ident,
        ddot: $ddot:ident,
        sddot: $sddot:ident,
        madd_ps: $madd_ps:ident,
        madd_pd: $madd_pd:ident $(,)?
    ) => {
        /// AVX-512 dot product for f32, 16 lanes
        #[$feature]
        pub unsafe fn $sdot(a: &[f32], b: &[f32]) -> f32 {
            let n = a.len().min(b.len());
            let chunks = n / 16;
            let (pa, pb) = (a.as_ptr(), b.as_ptr());

            let mut s16 = _mm512_setzero_ps();

            if is_aligned(pa, ALIGN) && is_aligned(pb, ALIGN) {
                for i in 0..chunks {
                    let offset = i * 16;
                    s16 = $madd_ps(
                        _mm512_load_ps(pa.add(offset)),
                        _mm512_load_ps(pb.add(offset)),
                        s16,
                    );
                }
            } else {
                for i in 0..chunks {
                    let offset = i * 16;
                    s16 = $madd_ps(
                        _mm512_loadu_ps(pa.add(offset)),
                        _mm512_loadu_ps(pb.add(offset)),
                        s16,
                    );
                }
            }

            let mut sum = _mm512_reduce_add_ps(s16);

            for i in chunks * 16..n {
                sum += a[i] * b[i];
            }

            sum
        }

        /// AVX-512 dot product for f64, 8 lanes
        #[$feature]
        pub unsafe fn $ddot(a: &[f64], b: &[f64]) -> f64 {
            let n = a.len().min(b.len());
            let chunks = n / 8;
            let (pa, pb) = (a.as_ptr(), b.as_ptr());

            let mut s8 = _mm512_setzero_pd();

            if is_aligned(pa, ALIGN) && is_aligned(pb, ALIGN) {
                for i in 0..chunks {
                    let offset = i * 8;
                    s8 = $madd_pd(
                        _mm512_load_pd(pa.add(offset)),
                        _mm512_load_pd(pb.add(offset)),
                        s8,
                    );
                }
            } else {
                for i in 0..chunks {
                    let offset = i * 8;
                    s8 = $madd_pd(
                        _mm512_loadu_pd(pa.add(offset)),
                        _mm512_loadu_pd(pb.add(offset)),
                        s8,
                    );
                }
            }

            let mut sum = _mm512_reduce_add_pd(s8);

            for i in chunks * 8..n {
                sum += a[i] * b[i];
            }

            sum
        }

        /// AVX-512 dot product for f32 inputs accumulated in f64, 8 lanes
        #[$feature]
        pub unsafe fn $sddot(a: &[f32], b: &[f32]) -> f64 {
            let n = a.len().min(b.len());
            let chunks = n / 8;
            let (pa, pb) = (a.as_ptr(), b.as_ptr());

            let mut s8 = _mm512_setzero_pd();

            if is_aligned(pa, ALIGN_MIXED) && is_aligned(pb, ALIGN_MIXED) {
                for i in 0..chunks {
                    let offset = i * 8;
                    s8 = $madd_pd(
                        _mm512_cvtps_pd(_mm256_load_ps(pa.add(offset))),
                        _mm512_cvtps_pd(_mm256_load_ps(pb.add(offset))),
                        s8,
                    );
                }
            } else {
                for i in 0..chunks {
                    let offset = i * 8;
                    s8 = $madd_pd(
                        _mm512_cvtps_pd(_mm256_loadu_ps(pa.add(offset))),
                        _mm512_cvtps_pd(_mm256_loadu_ps(pb.add(offset))),
                        s8,
                    );
                }
            }

            let mut sum = _mm512_reduce_add_pd(s8);

            for i in chunks * 8..n {
                sum += a[i] as f64 * b[i] as f64;
            }

            sum
        }
    };
}

avx512_kernels! {
    #[target_feature(enable = "avx512f")]
    sdot: sdot,
    ddot: ddot,
    sddot: sddot,
    madd_ps: mul_add_ps,
    madd_pd: mul_add_pd,
}

#[cfg(feature = "fma")]
avx512_kernels! {
    #[target_feature(enable = "avx512f")]
    sdot: sdot_fma,
    ddot: ddot_fma,
    sddot: sddot_fma,
    madd_ps: fmadd_ps,
    madd_pd: fmadd_pd,
}
