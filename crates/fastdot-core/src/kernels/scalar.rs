//! Scalar reference kernels
//!
//! One accumulator of the result precision, products added in index order.
//! Every SIMD tier must agree with these up to reassociation.

use num_traits::Float;

/// Generic naive dot product: widen each element to `A`, multiply, accumulate
#[inline]
pub fn dot_naive<T, A>(a: &[T], b: &[T]) -> A
where
    T: Copy,
    A: Float + From<T>,
{
    let n = a.len().min(b.len());
    let mut sum = A::zero();

    for i in 0..n {
        sum = sum + <A as From<T>>::from(a[i]) * <A as From<T>>::from(b[i]);
    }

    sum
}

pub fn sdot(a: &[f32], b: &[f32]) -> f32 {
    dot_naive::<f32, f32>(a, b)
}

pub fn ddot(a: &[f64], b: &[f64]) -> f64 {
    dot_naive::<f64, f64>(a, b)
}

pub fn sddot(a: &[f32], b: &[f32]) -> f64 {
    dot_naive::<f32, f64>(a, b)
}
