//! Axis permutation seam.

use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Copies a tensor into another with its axes reordered.
///
/// Axis `i` of `dest` is axis `perm[i]` of `src`. The two tensors may use
/// different storage orders.
pub trait PermutationBackend {
    /// # Panics
    ///
    /// Panics if `dest` does not have the permuted shape of `src`.
    fn permute_into<T: Scalar>(dest: &mut Tensor<T>, src: &Tensor<T>, perm: &[usize]);
}
