//! Generic (naive loop-based) backend implementation.
//!
//! The GEMM kernel here works on anything that implements [`RandomAccess`]:
//! plain slices, or strided [`TensorView`](crate::tensor::TensorView)s whose
//! elements are scattered through a larger buffer. That is what lets a
//! contraction run on a permuted operand without materializing it.

use crate::backend::PermutationBackend;
use crate::range::Order;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Read access by position.
pub trait RandomAccess<T> {
    /// Element at position `pos`.
    fn at(&self, pos: usize) -> T;
}

/// Write access by position.
pub trait RandomAccessMut<T>: RandomAccess<T> {
    /// Mutable element at position `pos`.
    fn at_mut(&mut self, pos: usize) -> &mut T;
}

impl<T: Copy> RandomAccess<T> for [T] {
    #[inline]
    fn at(&self, pos: usize) -> T {
        self[pos]
    }
}

impl<T: Copy> RandomAccessMut<T> for [T] {
    #[inline]
    fn at_mut(&mut self, pos: usize) -> &mut T {
        &mut self[pos]
    }
}

/// Transpose flag of a GEMM operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transpose {
    NoTrans,
    Trans,
}

/// Loop-based kernels over strided views.
pub struct GenericBackend;

impl PermutationBackend for GenericBackend {
    fn permute_into<ElT: Scalar>(dest: &mut Tensor<ElT>, src: &Tensor<ElT>, perm: &[usize]) {
        // Walk the destination in its own order and read the source through
        // a permuted view with the same iteration order.
        let order = dest.order();
        let src_view = src.view().permute(perm).with_iteration_order(order);
        let mut dest_view = dest.view_mut();
        dest_view.assign(&src_view);
    }
}

/// `C = alpha * op(A) * op(B) + beta * C` over random-access operands.
///
/// `op(A)` is `m x k`, `op(B)` is `k x n` and `C` is `m x n`. Element `(i, j)`
/// of a row-major matrix with leading dimension `ld` sits at position
/// `i * ld + j`; column-major swaps the roles of `i` and `j`.
///
/// Column-major calls are turned into row-major ones through
/// `C^T = op(B)^T op(A)^T`, so only the row-major kernels exist.
///
/// `beta != 1` scales `C` first. `beta == 0` is not special-cased: NaNs
/// already in `C` survive, so callers must pass a zeroed `C`.
///
/// # Panics
///
/// Panics if a leading dimension is smaller than the row length it indexes.
#[allow(clippy::too_many_arguments)]
pub fn gemm_generic<T, A, B, C>(
    order: Order,
    trans_a: Transpose,
    trans_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &A,
    lda: usize,
    b: &B,
    ldb: usize,
    beta: T,
    c: &mut C,
    ldc: usize,
) where
    T: Scalar,
    A: RandomAccess<T> + ?Sized,
    B: RandomAccess<T> + ?Sized,
    C: RandomAccessMut<T> + ?Sized,
{
    if order == Order::ColMajor {
        return gemm_generic(
            Order::RowMajor,
            trans_b,
            trans_a,
            n,
            m,
            k,
            alpha,
            b,
            ldb,
            a,
            lda,
            beta,
            c,
            ldc,
        );
    }

    let (a_cols, b_cols) = (
        match trans_a {
            Transpose::NoTrans => k,
            Transpose::Trans => m,
        },
        match trans_b {
            Transpose::NoTrans => n,
            Transpose::Trans => k,
        },
    );
    assert!(lda >= a_cols.max(1), "gemm: lda = {lda} too small ({a_cols} columns)");
    assert!(ldb >= b_cols.max(1), "gemm: ldb = {ldb} too small ({b_cols} columns)");
    assert!(ldc >= n.max(1), "gemm: ldc = {ldc} too small ({n} columns)");

    if m == 0 || n == 0 {
        return;
    }

    if beta != T::one() {
        scal(m, n, beta, c, ldc);
    }

    if k == 0 {
        return;
    }

    match (trans_a, trans_b) {
        (Transpose::NoTrans, Transpose::NoTrans) => {
            for i in 0..m {
                for p in 0..k {
                    let aip = alpha * a.at(i * lda + p);
                    for j in 0..n {
                        *c.at_mut(i * ldc + j) += aip * b.at(p * ldb + j);
                    }
                }
            }
        }
        (Transpose::NoTrans, Transpose::Trans) => {
            for i in 0..m {
                for j in 0..n {
                    let mut sum = T::zero();
                    for p in 0..k {
                        sum += a.at(i * lda + p) * b.at(j * ldb + p);
                    }
                    *c.at_mut(i * ldc + j) += alpha * sum;
                }
            }
        }
        (Transpose::Trans, Transpose::NoTrans) => {
            for p in 0..k {
                for i in 0..m {
                    let api = alpha * a.at(p * lda + i);
                    for j in 0..n {
                        *c.at_mut(i * ldc + j) += api * b.at(p * ldb + j);
                    }
                }
            }
        }
        (Transpose::Trans, Transpose::Trans) => {
            for i in 0..m {
                for j in 0..n {
                    let mut sum = T::zero();
                    for p in 0..k {
                        sum += a.at(p * lda + i) * b.at(j * ldb + p);
                    }
                    *c.at_mut(i * ldc + j) += alpha * sum;
                }
            }
        }
    }
}

/// Scale the row-major `m x n` block of `c` by `beta`.
fn scal<T, C>(m: usize, n: usize, beta: T, c: &mut C, ldc: usize)
where
    T: Scalar,
    C: RandomAccessMut<T> + ?Sized,
{
    for i in 0..m {
        for j in 0..n {
            *c.at_mut(i * ldc + j) *= beta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::c64;

    #[test]
    fn test_generic_permute_transpose() {
        let src: Tensor<f64> =
            Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let mut dest: Tensor<f64> = Tensor::zeros(&[3, 2]);

        GenericBackend::permute_into(&mut dest, &src, &[1, 0]);

        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(src.get(&[i, j]), dest.get(&[j, i]));
            }
        }
    }

    #[test]
    fn test_generic_permute_3d() {
        let src: Tensor<f64> =
            Tensor::from_fn(&[2, 3, 4], |c| (c[0] * 100 + c[1] * 10 + c[2]) as f64);

        // Permute [0,1,2] -> [2,0,1]: shape 2x3x4 -> 4x2x3
        let mut dest: Tensor<f64> = Tensor::zeros(&[4, 2, 3]);
        GenericBackend::permute_into(&mut dest, &src, &[2, 0, 1]);

        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(src.get(&[i, j, k]), dest.get(&[k, i, j]));
                }
            }
        }
    }

    #[test]
    fn test_generic_permute_into_col_major() {
        let src: Tensor<f64> = Tensor::from_fn(&[2, 3], |c| (c[0] * 10 + c[1]) as f64);
        let mut dest: Tensor<f64> = Tensor::with_order(&[3, 2], Order::ColMajor);
        GenericBackend::permute_into(&mut dest, &src, &[1, 0]);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(src.get(&[i, j]), dest.get(&[j, i]));
            }
        }
    }

    // A = [[1, 2, 3], [4, 5, 6]], B = [[7, 8], [9, 10], [11, 12]]
    // A B = [[58, 64], [139, 154]]
    const A: [f64; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    const B: [f64; 6] = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
    const AB: [f64; 4] = [58.0, 64.0, 139.0, 154.0];

    #[test]
    fn test_gemm_nn_row_major() {
        let mut c = [0.0; 4];
        gemm_generic(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            3,
            1.0,
            &A[..],
            3,
            &B[..],
            2,
            0.0,
            &mut c[..],
            2,
        );
        assert_eq!(c, AB);
    }

    #[test]
    fn test_gemm_tt_row_major() {
        // A^T stored as 3x2, B^T stored as 2x3.
        let at = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
        let bt = [7.0, 9.0, 11.0, 8.0, 10.0, 12.0];
        let mut c = [0.0; 4];
        gemm_generic(
            Order::RowMajor,
            Transpose::Trans,
            Transpose::Trans,
            2,
            2,
            3,
            1.0,
            &at[..],
            2,
            &bt[..],
            3,
            0.0,
            &mut c[..],
            2,
        );
        assert_eq!(c, AB);
    }

    #[test]
    fn test_gemm_col_major() {
        // Same matrices stored column-major.
        let a = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
        let b = [7.0, 9.0, 11.0, 8.0, 10.0, 12.0];
        let mut c = [0.0; 4];
        gemm_generic(
            Order::ColMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            3,
            1.0,
            &a[..],
            2,
            &b[..],
            3,
            0.0,
            &mut c[..],
            2,
        );
        assert_eq!(c, [58.0, 139.0, 64.0, 154.0]);
    }

    #[test]
    fn test_gemm_alpha_beta() {
        let mut c = [1.0, 1.0, 1.0, 1.0];
        gemm_generic(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            3,
            2.0,
            &A[..],
            3,
            &B[..],
            2,
            3.0,
            &mut c[..],
            2,
        );
        let expected: Vec<f64> = AB.iter().map(|x| 2.0 * x + 3.0).collect();
        assert_eq!(c.to_vec(), expected);
    }

    #[test]
    fn test_gemm_beta_zero_keeps_nan() {
        let mut c = [f64::NAN, 0.0, 0.0, 0.0];
        gemm_generic(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            3,
            1.0,
            &A[..],
            3,
            &B[..],
            2,
            0.0,
            &mut c[..],
            2,
        );
        assert!(c[0].is_nan());
        assert_eq!(c[1..], AB[1..]);
    }

    #[test]
    fn test_gemm_complex() {
        let i = c64::new(0.0, 1.0);
        let a = [i];
        let b = [i];
        let mut c = [c64::new(0.0, 0.0)];
        gemm_generic(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            1,
            1,
            1,
            c64::new(1.0, 0.0),
            &a[..],
            1,
            &b[..],
            1,
            c64::new(0.0, 0.0),
            &mut c[..],
            1,
        );
        assert_eq!(c[0], c64::new(-1.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "lda")]
    fn test_gemm_bad_lda() {
        let mut c = [0.0; 4];
        gemm_generic(
            Order::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            3,
            1.0,
            &A[..],
            2,
            &B[..],
            2,
            0.0,
            &mut c[..],
            2,
        );
    }
}
