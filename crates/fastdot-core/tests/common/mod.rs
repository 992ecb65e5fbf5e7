//! Shared utilities for integration tests

#![allow(dead_code)]

use fastdot_core::{KernelSet, Tier};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate array lengths that test edge cases for SIMD operations
pub fn edge_case_lengths() -> Vec<usize> {
    vec![
        0,   // Empty
        1,   // Single element
        2,   // SSE f64 width
        3,   // SSE f64 width + 1
        4,   // SSE f32 / AVX f64 width
        5,   // + 1
        7,   // AVX f32 width - 1
        8,   // AVX f32 / AVX-512 f64 width
        9,   // + 1
        15,  // AVX-512 f32 width - 1
        16,  // AVX-512 f32 width
        17,  // + 1
        31,  // Prime
        32,  // Two AVX-512 f32 chunks
        63,  // Almost cache line
        64,  // Cache line
        100, // Round number
        127, // Mersenne prime
        128, // Power of 2
        1000,
    ]
}

/// Kernel sets of every tier this machine and build can run
pub fn usable_kernel_sets() -> Vec<KernelSet> {
    Tier::ALL
        .into_iter()
        .filter_map(KernelSet::for_tier)
        .collect()
}

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn random_f32(rng: &mut impl Rng, n: usize) -> Vec<f32> {
    (0..n).map(|_| rng.gen_range(-10.0f32..10.0)).collect()
}

pub fn random_f64(rng: &mut impl Rng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-10.0f64..10.0)).collect()
}

/// Reassociation error bound for a length-`n` dot product
///
/// Any summation order is within `n * eps * Σ|a_i b_i|` of the exact value
/// (to first order), so two orders are within twice that of each other.
pub fn tolerance(eps: f64, abs_products: f64, n: usize) -> f64 {
    4.0 * eps * (n as f64 + 1.0) * abs_products + f64::MIN_POSITIVE
}

pub fn abs_products_f32(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| (x as f64 * y as f64).abs()).sum()
}

pub fn abs_products_f64(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| (x * y).abs()).sum()
}

/// Assert two dot products agree within the reassociation bound
pub fn assert_close(actual: f64, expected: f64, tol: f64, context: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{context}: {actual} vs {expected} (diff {}, tol {tol})",
        (actual - expected).abs()
    );
}

/// Two copies of the same data: one starting on a 64-byte boundary, one
/// starting one element past such a boundary
pub struct AlignedCopy<T> {
    aligned: (Vec<T>, usize),
    offset: (Vec<T>, usize),
    len: usize,
}

impl<T: Copy + Default> AlignedCopy<T> {
    pub fn new(data: &[T]) -> Self {
        Self {
            aligned: Self::place(data, 0),
            offset: Self::place(data, 1),
            len: data.len(),
        }
    }

    fn place(data: &[T], extra: usize) -> (Vec<T>, usize) {
        let pad = 64 / std::mem::size_of::<T>() + 1;
        let mut buf = vec![T::default(); data.len() + pad + extra];
        let start = buf.as_ptr().align_offset(64) + extra;
        assert!(start < pad + extra, "allocation cannot be aligned");
        buf[start..start + data.len()].copy_from_slice(data);
        (buf, start)
    }

    pub fn aligned(&self) -> &[T] {
        let (buf, start) = &self.aligned;
        &buf[*start..*start + self.len]
    }

    pub fn offset(&self) -> &[T] {
        let (buf, start) = &self.offset;
        &buf[*start..*start + self.len]
    }
}
