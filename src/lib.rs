//! Dot products that pick the fastest SIMD kernel for the running CPU
//!
//! This crate re-exports [`fastdot_core`]. The three entry points
//! ([`dot_single`], [`dot_double`], [`dot_mixed`]) select their kernel on
//! first use and call it directly afterwards.
//!
//! # Example
//!
//! ```rust
//! use fastdot::prelude::*;
//!
//! let a = [1.0f32, 2.0, 3.0, 4.0, 5.0];
//! let b = [5.0f32, 4.0, 3.0, 2.0, 1.0];
//! assert_eq!(dot_single(&a, &b), 35.0);
//! ```
//!
//! Call [`init_from_env`] early to honour `FASTDOT_IMPL` (for instance
//! `FASTDOT_IMPL=scalar` to rule out SIMD when chasing a numerical issue).

pub use fastdot_core::*;

/// Apply the policy in `FASTDOT_IMPL` to the process-wide dispatcher
///
/// A malformed value is logged and ignored. Returns the tier installed.
pub fn init_from_env() -> Tier {
    let config = DispatchConfig::from_env_lossy();
    let tier = config.apply();
    log::info!("fastdot: {} kernels active (policy {})", tier, config.policy);
    tier
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use fastdot_core::prelude::*;
}
