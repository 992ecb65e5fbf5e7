//! Dot product kernels, one module per instruction-set tier
//!
//! Every SIMD kernel follows the same template:
//!
//! 1. accumulate `W * (n / W)` products in `W` parallel lanes, using aligned
//!    loads when both operands allow it,
//! 2. fold the lanes into one scalar with a horizontal sum,
//! 3. add the `n % W` remaining products one at a time, in index order.
//!
//! The SIMD kernels are `unsafe` because they execute instructions the CPU may
//! not have. [`KernelSet`] is the safe face: it can only be obtained for a
//! tier whose requirements the running CPU satisfies.

pub mod scalar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod reduce;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), feature = "sse"))]
mod sse;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), feature = "avx"))]
mod avx;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), feature = "avx512"))]
mod avx512;

use crate::capability::CpuFeatures;
use crate::tier::{Family, Tier};

/// Single precision kernel
pub type SdotFn = fn(&[f32], &[f32]) -> f32;
/// Double precision kernel
pub type DdotFn = fn(&[f64], &[f64]) -> f64;
/// Single precision inputs, double precision accumulation
pub type SddotFn = fn(&[f32], &[f32]) -> f64;

#[inline(always)]
#[allow(dead_code)]
pub(crate) fn is_aligned<T>(ptr: *const T, align: usize) -> bool {
    (ptr as usize) % align == 0
}

/// The three kernels of one tier
#[derive(Clone, Copy, Debug)]
pub struct KernelSet {
    tier: Tier,
    sdot: SdotFn,
    ddot: DdotFn,
    sddot: SddotFn,
}

/// Wrap a tier module's `unsafe` kernels in safe function pointers.
#[allow(unused_macros)]
macro_rules! kernel_set {
    ($tier:expr, $module:ident :: { $sdot:ident, $ddot:ident, $sddot:ident }) => {{
        // Safety (all three): a `KernelSet` for this tier is only built once
        // `Tier::is_usable` has confirmed the CPU features.
        fn sdot(a: &[f32], b: &[f32]) -> f32 {
            unsafe { $module::$sdot(a, b) }
        }
        fn ddot(a: &[f64], b: &[f64]) -> f64 {
            unsafe { $module::$ddot(a, b) }
        }
        fn sddot(a: &[f32], b: &[f32]) -> f64 {
            unsafe { $module::$sddot(a, b) }
        }
        KernelSet {
            tier: $tier,
            sdot,
            ddot,
            sddot,
        }
    }};
}

impl KernelSet {
    /// Kernels for `tier`, or `None` if it is not compiled in or the running
    /// CPU lacks a required extension
    pub fn for_tier(tier: Tier) -> Option<Self> {
        Self::for_tier_on(tier, &CpuFeatures::detect())
    }

    pub(crate) fn for_tier_on(tier: Tier, cpu: &CpuFeatures) -> Option<Self> {
        if tier.is_usable(cpu) {
            Some(Self::table(tier))
        } else {
            None
        }
    }

    /// The scalar kernels, available everywhere
    pub const fn scalar() -> Self {
        Self {
            tier: Tier::Scalar,
            sdot: scalar::sdot,
            ddot: scalar::ddot,
            sddot: scalar::sddot,
        }
    }

    /// Unchecked table lookup. Callers must have verified `tier.is_usable`.
    /// Tiers that were not compiled in map to the scalar kernels.
    pub(crate) const fn table(tier: Tier) -> Self {
        match tier {
            #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), feature = "sse"))]
            Tier::Sse => kernel_set!(Tier::Sse, sse::{ sdot, ddot, sddot }),
            #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), feature = "avx"))]
            Tier::Avx => kernel_set!(Tier::Avx, avx::{ sdot, ddot, sddot }),
            #[cfg(all(
                any(target_arch = "x86", target_arch = "x86_64"),
                feature = "avx",
                feature = "fma"
            ))]
            Tier::AvxFma => kernel_set!(Tier::AvxFma, avx::{ sdot_fma, ddot_fma, sddot_fma }),
            #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), feature = "avx512"))]
            Tier::Avx512 => kernel_set!(Tier::Avx512, avx512::{ sdot, ddot, sddot }),
            #[cfg(all(
                any(target_arch = "x86", target_arch = "x86_64"),
                feature = "avx512",
                feature = "fma"
            ))]
            Tier::Avx512Fma => {
                kernel_set!(Tier::Avx512Fma, avx512::{ sdot_fma, ddot_fma, sddot_fma })
            }
            _ => Self::scalar(),
        }
    }

    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Elements per vector iteration for `family` in this tier
    pub fn width(&self, family: Family) -> usize {
        self.tier.width(family)
    }

    #[inline]
    pub fn dot_single(&self, a: &[f32], b: &[f32]) -> f32 {
        (self.sdot)(a, b)
    }

    #[inline]
    pub fn dot_double(&self, a: &[f64], b: &[f64]) -> f64 {
        (self.ddot)(a, b)
    }

    #[inline]
    pub fn dot_mixed(&self, a: &[f32], b: &[f32]) -> f64 {
        (self.sddot)(a, b)
    }
}
