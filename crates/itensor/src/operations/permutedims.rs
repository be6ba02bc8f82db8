//! Permutation operations for tensors.
//!
//! ```text
//! permutedims(tensor, perm)
//!     → validate permutation
//!     → allocate output with permuted shape (same storage order)
//!     → permutedims_into(output, tensor, perm)
//!
//! permutedims_into(dest, src, perm)
//!     → GenericBackend: strided view copy
//! ```

use crate::backend::{GenericBackend, PermutationBackend};
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::{DenseTensor, validate_permutation};

/// Permute the dimensions of a tensor, returning a new tensor.
///
/// # Arguments
///
/// * `tensor` - Input tensor
/// * `perm` - Permutation of dimensions. `perm[i]` gives the source dimension
///   for the i-th dimension of the result.
///
/// # Errors
///
/// Returns error if `perm` is not a valid permutation of `0..ndim`.
///
/// # Examples
///
/// ```
/// use itensor::Tensor;
/// use itensor::operations::permutedims;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
///
/// let t2 = permutedims(&t, &[1, 0]).unwrap();
/// assert_eq!(t2.shape(), &[3, 2]);
/// assert_eq!(t.get(&[1, 0]), t2.get(&[0, 1]));
/// ```
pub fn permutedims<T: Scalar>(
    tensor: &DenseTensor<T>,
    perm: &[usize],
) -> Result<DenseTensor<T>, TensorError> {
    validate_permutation(perm, tensor.ndim())?;

    let new_shape: Vec<usize> = perm.iter().map(|&p| tensor.shape()[p]).collect();
    let mut result = DenseTensor::with_order(&new_shape, tensor.order());
    permutedims_into(&mut result, tensor, perm);

    Ok(result)
}

/// Permute tensor dimensions into an existing output tensor.
///
/// # Panics
///
/// Panics if `perm` is not a permutation or `dest` does not have the
/// permuted shape of `src`.
///
/// # Examples
///
/// ```
/// use itensor::Tensor;
/// use itensor::operations::permutedims_into;
///
/// let src = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let mut dest = Tensor::zeros(&[3, 2]);
///
/// permutedims_into(&mut dest, &src, &[1, 0]);
/// assert_eq!(src.get(&[1, 2]), dest.get(&[2, 1]));
/// ```
pub fn permutedims_into<T: Scalar>(
    dest: &mut DenseTensor<T>,
    src: &DenseTensor<T>,
    perm: &[usize],
) {
    GenericBackend::permute_into(dest, src, perm);
}
