//! CPU capability probe
//!
//! One predicate per instruction-set extension the kernels care about. The
//! answers come from `is_x86_feature_detected!`, which caches CPUID results in
//! std, so every predicate is a cheap, lock-free read that is safe to call
//! from any number of threads. On targets outside the x86 family they are all
//! `false`.

use std::fmt;

/// 128-bit vectors (SSE2)
#[inline]
pub fn has_sse2() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        is_x86_feature_detected!("sse2")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        false
    }
}

/// Horizontal adds on 128-bit vectors (SSE3)
#[inline]
pub fn has_sse3() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        is_x86_feature_detected!("sse3")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        false
    }
}

/// 256-bit vectors (AVX)
#[inline]
pub fn has_avx() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        is_x86_feature_detected!("avx")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        false
    }
}

/// Fused multiply-add (FMA3)
#[inline]
pub fn has_fma() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        is_x86_feature_detected!("fma")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        false
    }
}

/// 512-bit vectors (AVX-512 Foundation)
#[inline]
pub fn has_avx512() -> bool {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        is_x86_feature_detected!("avx512f")
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        false
    }
}

/// Snapshot of every probed extension
///
/// Tier resolution is evaluated against one of these rather than against the
/// live predicates, so it can be exercised with synthetic hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CpuFeatures {
    pub sse2: bool,
    pub sse3: bool,
    pub avx: bool,
    pub fma: bool,
    pub avx512: bool,
}

impl CpuFeatures {
    /// Probe the executing processor
    pub fn detect() -> Self {
        Self {
            sse2: has_sse2(),
            sse3: has_sse3(),
            avx: has_avx(),
            fma: has_fma(),
            avx512: has_avx512(),
        }
    }

    /// A processor with no vector extensions at all
    pub const fn none() -> Self {
        Self {
            sse2: false,
            sse3: false,
            avx: false,
            fma: false,
            avx512: false,
        }
    }

    /// A processor with every extension the kernels use
    pub const fn all() -> Self {
        Self {
            sse2: true,
            sse3: true,
            avx: true,
            fma: true,
            avx512: true,
        }
    }
}

impl fmt::Display for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.sse2, "sse2"),
            (self.sse3, "sse3"),
            (self.avx, "avx"),
            (self.fma, "fma"),
            (self.avx512, "avx512f"),
        ];
        let mut first = true;
        for (present, name) in names {
            if present {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("(none)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_is_stable() {
        let first = CpuFeatures::detect();
        for _ in 0..8 {
            assert_eq!(CpuFeatures::detect(), first);
        }
    }

    #[test]
    fn detection_from_many_threads() {
        let expected = CpuFeatures::detect();
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(CpuFeatures::detect))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn implied_extensions() {
        let cpu = CpuFeatures::detect();
        if cpu.avx {
            assert!(cpu.sse2 && cpu.sse3);
        }
        if cpu.avx512 {
            assert!(cpu.avx);
        }
        #[cfg(target_arch = "x86_64")]
        assert!(cpu.sse2, "SSE2 is part of the x86_64 baseline");
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        assert_eq!(cpu, CpuFeatures::none());
    }

    #[test]
    fn display_lists_present_features() {
        assert_eq!(CpuFeatures::none().to_string(), "(none)");
        assert_eq!(CpuFeatures::all().to_string(), "sse2 sse3 avx fma avx512f");
        let partial = CpuFeatures {
            sse2: true,
            avx: true,
            ..CpuFeatures::none()
        };
        assert_eq!(partial.to_string(), "sse2 avx");
    }
}
