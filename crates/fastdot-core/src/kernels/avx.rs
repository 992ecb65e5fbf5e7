//! 256-bit kernels (AVX, optionally FMA)
//!
//! The plain and FMA variants share one body; they differ only in the
//! multiply-accumulate step passed to `avx_kernels!`.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::is_aligned;
use super::reduce::{hsum256_pd, hsum256_ps};

const ALIGN: usize = 32;
// the mixed kernels load 4 floats (128 bits) per step
const ALIGN_MIXED: usize = 16;

#[inline]
#[target_feature(enable = "avx")]
unsafe fn mul_add_ps(a: __m256, b: __m256, acc: __m256) -> __m256 {
    _mm256_add_ps(acc, _mm256_mul_ps(a, b))
}

#[inline]
#[target_feature(enable = "avx")]
unsafe fn mul_add_pd(a: __m256d, b: __m256d, acc: __m256d) -> __m256d {
    _mm256_add_pd(acc, _mm256_mul_pd(a, b))
}

#[cfg(feature = "fma")]
#[inline]
#[target_feature(enable = "avx,fma")]
unsafe fn fmadd_ps(a: __m256, b: __m256, acc: __m256) -> __m256 {
    _mm256_fmadd_ps(a, b, acc)
}

#[cfg(feature = "fma")]
#[inline]
#[target_feature(enable = "avx,fma")]
unsafe fn fmadd_pd(a: __m256d, b: __m256d, acc: __m256d) -> __m256d {
    _mm256_fmadd_pd(a, b, acc)
}

macro_rules! avx_kernels {
    (
        #[$feature:meta]
        sdot: $sdot:ident,
        ddot: $ddot:ident,
        sddot: $sddot:ident,
        madd_ps: $madd_ps:ident,
        madd_pd: $madd_pd:ident $(,)?
    ) => {
        /// AVX dot product for f32, 8 lanes
        #[$feature]
        pub unsafe fn $sdot(a: &[f32], b: &[f32]) -> f32 {
            let n = a.len().min(b.len());
            let chunks = n / 8;
            let (pa, pb) = (a.as_ptr(), b.as_ptr());

            let mut s8 = _mm256_setzero_ps();

            if is_aligned(pa, ALIGN) && is_aligned(pb, ALIGN) {
                for i in 0..chunks {
                    let offset = i * 8;
                    s8 = $madd_ps(
                        _mm256_load_ps(pa.add(offset)),
                        _mm256_load_ps(pb.add(offset)),
                        s8,
                    );
                }
            } else {
                for i in 0..chunks {
                    let offset = i * 8;
                    s8 = $madd_ps(
                        _mm256_loadu_ps(pa.add(offset)),
                        _mm256_loadu_ps(pb.add(offset)),
                        s8,
                    );
                }
            }

            let mut sum = hsum256_ps(s8);

            for i in chunks * 8..n {
                sum += a[i] * b[i];
            }

            sum
        }

        /// AVX dot product for f64, 4 lanes
        #[$feature]
        pub unsafe fn $ddot(a: &[f64], b: &[f64]) -> f64 {
            let n = a.len().min(b.len());
            let chunks = n / 4;
            let (pa, pb) = (a.as_ptr(), b.as_ptr());

            let mut s4 = _mm256_setzero_pd();

            if is_aligned(pa, ALIGN) && is_aligned(pb, ALIGN) {
                for i in 0..chunks {
                    let offset = i * 4;
                    s4 = $madd_pd(
                        _mm256_load_pd(pa.add(offset)),
                        _mm256_load_pd(pb.add(offset)),
                        s4,
                    );
                }
            } else {
                for i in 0..chunks {
                    let offset = i * 4;
                    s4 = $madd_pd(
                        _mm256_loadu_pd(pa.add(offset)),
                        _mm256_loadu_pd(pb.add(offset)),
                        s4,
                    );
                }
            }

            let mut sum = hsum256_pd(s4);

            for i in chunks * 4..n {
                sum += a[i] * b[i];
            }

            sum
        }

        /// AVX dot product for f32 inputs accumulated in f64, 4 lanes
        #[$feature]
        pub unsafe fn $sddot(a: &[f32], b: &[f32]) -> f64 {
            let n = a.len().min(b.len());
            let chunks = n / 4;
            let (pa, pb) = (a.as_ptr(), b.as_ptr());

            let mut s4 = _mm256_setzero_pd();

            if is_aligned(pa, ALIGN_MIXED) && is_aligned(pb, ALIGN_MIXED) {
                for i in 0..chunks {
                    let offset = i * 4;
                    s4 = $madd_pd(
                        _mm256_cvtps_pd(_mm_load_ps(pa.add(offset))),
                        _mm256_cvtps_pd(_mm_load_ps(pb.add(offset))),
                        s4,
                    );
                }
            } else {
                for i in 0..chunks {
                    let offset = i * 4;
                    s4 = $madd_pd(
                        _mm256_cvtps_pd(_mm_loadu_ps(pa.add(offset))),
                        _mm256_cvtps_pd(_mm_loadu_ps(pb.add(offset))),
                        s4,
                    );
                }
            }

            let mut sum = hsum256_pd(s4);

            for i in chunks * 4..n {
                sum += a[i] as f64 * b[i] as f64;
            }

            sum
        }
    };
}

avx_kernels! {
    #[target_feature(enable = "avx")]
    sdot: sdot,
    ddot: ddot,
    sddot: sddot,
    madd_ps: mul_add_ps,
    madd_pd: mul_add_pd,
}

#[cfg(feature = "fma")]
avx_kernels! {
    #[target_feature(enable = "avx,fma")]
    sdot: sdot_fma,
    ddot: ddot_fma,
    sddot: sddot_fma,
    madd_ps: fmadd_ps,
    madd_pd: fmadd_pd,
}
