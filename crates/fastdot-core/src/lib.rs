//! Runtime-dispatched SIMD dot products
//!
//! Three entry points cover the precision combinations numeric code needs:
//!
//! - [`dot_single`]: `f32` inputs, `f32` accumulation
//! - [`dot_double`]: `f64` inputs, `f64` accumulation
//! - [`dot_mixed`]: `f32` inputs, `f64` accumulation
//!
//! The first call of each entry point probes the CPU, picks the strongest
//! kernel tier it supports (scalar, SSE, AVX, AVX+FMA, AVX-512, AVX-512+FMA)
//! and caches the choice. After that a call costs one atomic load and one
//! indirect jump on top of the kernel itself.
//!
//! # Example
//!
//! ```rust
//! use fastdot_core::{dot_double, dot_mixed, dot_single};
//!
//! let a = [1.0f32, 2.0, 3.0, 4.0, 5.0];
//! let b = [5.0f32, 4.0, 3.0, 2.0, 1.0];
//! assert_eq!(dot_single(&a, &b), 35.0);
//! assert_eq!(dot_mixed(&a, &b), 35.0);
//!
//! let a = [0.5f64, 0.25];
//! let b = [2.0f64, 4.0];
//! assert_eq!(dot_double(&a, &b), 2.0);
//! ```
//!
//! # Choosing a tier explicitly
//!
//! ```rust
//! use fastdot_core::{select, Policy, Tier};
//!
//! // Never fails: an unsupported request degrades to a weaker tier.
//! let installed = select(Policy::Avx512Fma);
//! assert!(installed <= Tier::Avx512Fma);
//! select(Policy::Auto);
//! ```
//!
//! Results of different tiers agree up to floating-point reassociation, not
//! bit for bit: wider tiers sum in a different order and FMA tiers round once
//! per multiply-add.

pub mod capability;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod kernels;
pub mod tier;

pub use capability::CpuFeatures;
pub use config::{compiled_tiers, DispatchConfig, POLICY_ENV_VAR};
pub use dispatch::{
    active_tier, best_tier, dot_double, dot_mixed, dot_single, global, resolve, select,
    Dispatcher, PRECEDENCE,
};
pub use error::{Error, Result};
pub use kernels::KernelSet;
pub use tier::{Family, Policy, Tier};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        dot_double, dot_mixed, dot_single, select, DispatchConfig, Dispatcher, Family,
        KernelSet, Policy, Tier,
    };
}
