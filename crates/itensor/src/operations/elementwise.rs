//! Element-wise tensor operations.

use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Complex conjugate in-place (no-op for real element types).
///
/// # Example
///
/// ```
/// use itensor::{Tensor, c64};
/// use itensor::operations::conj_inplace;
///
/// let mut t = Tensor::from_vec(vec![c64::new(1.0, 2.0)], &[1]).unwrap();
/// conj_inplace(&mut t);
/// assert_eq!(t.get(&[0]).unwrap().im, -2.0);
/// ```
pub fn conj_inplace<ElT: Scalar>(tensor: &mut DenseTensor<ElT>) {
    tensor.map_inplace(|x| x.conjugate());
}

/// Multiply every element by `factor` in-place.
pub fn scale_inplace<ElT: Scalar>(tensor: &mut DenseTensor<ElT>, factor: ElT) {
    tensor.map_inplace(|x| x * factor);
}

/// `dest += factor * permute(src, perm)`.
///
/// `perm[i]` names the axis of `src` that lines up with axis `i` of
/// `dest`. Works for any storage order of either operand.
///
/// # Panics
///
/// Panics if `perm` is not a permutation or the permuted shape of `src`
/// differs from `dest`.
///
/// # Example
///
/// ```
/// use itensor::Tensor;
/// use itensor::operations::add_permuted;
///
/// let mut a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// let b = Tensor::from_vec(vec![10.0, 20.0, 30.0, 40.0], &[2, 2]).unwrap();
/// add_permuted(&mut a, &b, &[1, 0], 1.0);
/// assert_eq!(a.data(), &[11.0, 32.0, 23.0, 44.0]);
/// ```
pub fn add_permuted<ElT: Scalar>(
    dest: &mut DenseTensor<ElT>,
    src: &DenseTensor<ElT>,
    perm: &[usize],
    factor: ElT,
) {
    let src_view = src.view().permute(perm).with_iteration_order(dest.order());
    assert_eq!(
        src_view.shape().as_slice(),
        dest.shape(),
        "add_permuted: shape mismatch"
    );
    for (x, y) in dest.data_mut().iter_mut().zip(src_view.iter()) {
        *x += factor * y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Order;
    use crate::scalar::c64;

    #[test]
    fn test_conj_real_is_identity() {
        let mut t = DenseTensor::from_vec(vec![1.0, -2.0], &[2]).unwrap();
        conj_inplace(&mut t);
        assert_eq!(t.data(), &[1.0, -2.0]);
    }

    #[test]
    fn test_scale_inplace_complex() {
        let mut t = DenseTensor::from_vec(vec![c64::new(1.0, 0.0)], &[1]).unwrap();
        scale_inplace(&mut t, c64::new(0.0, 2.0));
        assert_eq!(t.data(), &[c64::new(0.0, 2.0)]);
    }

    #[test]
    fn test_add_permuted_3d() {
        let src: DenseTensor<f64> =
            DenseTensor::from_fn(&[2, 3, 4], |c| (c[0] * 100 + c[1] * 10 + c[2]) as f64);
        let mut dest: DenseTensor<f64> = DenseTensor::ones(&[4, 2, 3]);
        add_permuted(&mut dest, &src, &[2, 0, 1], 2.0);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    let expected = 1.0 + 2.0 * src.get(&[i, j, k]).unwrap();
                    assert_eq!(dest.get(&[k, i, j]), Some(&expected));
                }
            }
        }
    }

    #[test]
    fn test_add_permuted_col_major_dest() {
        let src: DenseTensor<f64> = DenseTensor::from_fn(&[2, 3], |c| (c[0] * 10 + c[1]) as f64);
        let mut dest: DenseTensor<f64> = DenseTensor::with_order(&[3, 2], Order::ColMajor);
        add_permuted(&mut dest, &src, &[1, 0], 1.0);
        assert_eq!(dest.get(&[2, 1]), Some(&12.0));
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_add_permuted_shape_mismatch() {
        let src: DenseTensor<f64> = DenseTensor::zeros(&[2, 3]);
        let mut dest: DenseTensor<f64> = DenseTensor::zeros(&[2, 3]);
        add_permuted(&mut dest, &src, &[1, 0], 1.0);
    }
}
