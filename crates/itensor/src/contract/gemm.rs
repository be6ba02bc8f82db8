//! Tensor-level GEMM.
//!
//! A rank-`rA` tensor times a rank-`rB` tensor into a rank-`rC` tensor, with
//! `K = (rA + rB - rC) / 2` trailing axes of `op(A)` summed against the
//! leading axes of `op(B)`. The axis groups are fused into one matrix
//! dimension each and handed to [`backend::gemm`](crate::backend::gemm).

use crate::backend::{self, Transpose};
use crate::config::GemmBackend;
use crate::error::TensorError;
use crate::range::Order;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// `C = alpha * op(A) * op(B) + beta * C` on tensors.
///
/// With `Transpose::NoTrans`, A is laid out `[M axes..., K axes...]` and B
/// `[K axes..., N axes...]`; `Transpose::Trans` swaps the two groups of
/// the respective operand. C is `[M axes..., N axes...]`.
///
/// If A or B is empty nothing happens. If C is empty it is resized to the
/// product shape (in A's storage order), zero-filled, and `rC` is taken
/// from its rank.
///
/// # Errors
///
/// - `RankMismatch` if the ranks do not admit an integral `K`
/// - `OrderMismatch` if the operands use different storage orders
/// - `DimensionMismatch` if contracted extents of A and B differ
/// - `ShapeMismatch` if a non-empty C does not have the product shape
///
/// # Example
///
/// ```
/// use itensor::{GemmBackend, Tensor};
/// use itensor::backend::Transpose;
/// use itensor::contract::gemm;
///
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let b = Tensor::from_vec(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]).unwrap();
/// let mut c = Tensor::with_rank(2);
/// gemm(Transpose::NoTrans, Transpose::NoTrans, 1.0, &a, &b, 0.0, &mut c, GemmBackend::Generic)
///     .unwrap();
/// assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Scalar>(
    trans_a: Transpose,
    trans_b: Transpose,
    alpha: T,
    a: &Tensor<T>,
    b: &Tensor<T>,
    beta: T,
    c: &mut Tensor<T>,
    backend: GemmBackend,
) -> Result<(), TensorError> {
    if a.is_empty() || b.is_empty() {
        return Ok(());
    }

    let (rank_a, rank_b, rank_c) = (a.ndim(), b.ndim(), c.ndim());
    let sum = rank_a + rank_b;
    if sum < rank_c || (sum - rank_c) % 2 != 0 {
        return Err(TensorError::RankMismatch {
            expected: sum,
            actual: rank_c,
        });
    }
    let k_rank = (sum - rank_c) / 2;
    if k_rank > rank_a || k_rank > rank_b {
        return Err(TensorError::RankMismatch {
            expected: rank_a.min(rank_b),
            actual: k_rank,
        });
    }

    let order = a.order();
    if b.order() != order || (!c.is_empty() && c.order() != order) {
        return Err(TensorError::OrderMismatch);
    }

    let (m_dims, k_dims_a) = match trans_a {
        Transpose::NoTrans => a.shape().split_at(rank_a - k_rank),
        Transpose::Trans => {
            let (k, m) = a.shape().split_at(k_rank);
            (m, k)
        }
    };
    let (k_dims_b, n_dims) = match trans_b {
        Transpose::NoTrans => b.shape().split_at(k_rank),
        Transpose::Trans => {
            let (n, k) = b.shape().split_at(rank_b - k_rank);
            (k, n)
        }
    };

    for (&ka, &kb) in k_dims_a.iter().zip(k_dims_b) {
        if ka != kb {
            return Err(TensorError::DimensionMismatch {
                left: ka,
                right: kb,
            });
        }
    }

    let shape_c: Vec<usize> = m_dims.iter().chain(n_dims).copied().collect();
    if c.is_empty() {
        *c = Tensor::with_order(&shape_c, order);
    } else if c.shape() != shape_c.as_slice() {
        return Err(TensorError::ShapeMismatch {
            expected: shape_c.iter().product(),
            actual: c.len(),
        });
    }

    let m: usize = m_dims.iter().product();
    let n: usize = n_dims.iter().product();
    let k: usize = k_dims_a.iter().product();

    let (lda, ldb, ldc) = match order {
        Order::RowMajor => (
            if trans_a == Transpose::NoTrans { k } else { m },
            if trans_b == Transpose::NoTrans { n } else { k },
            n,
        ),
        Order::ColMajor => (
            if trans_a == Transpose::NoTrans { m } else { k },
            if trans_b == Transpose::NoTrans { k } else { n },
            m,
        ),
    };

    log::debug!(
        "tensor gemm: ranks ({rank_a}, {rank_b}) -> {}, m={m}, n={n}, k={k}",
        shape_c.len()
    );
    backend::gemm(
        backend,
        order,
        trans_a,
        trans_b,
        m,
        n,
        k,
        alpha,
        a.data(),
        lda.max(1),
        b.data(),
        ldb.max(1),
        beta,
        c.data_mut(),
        ldc.max(1),
    );
    Ok(())
}
