//! Backend abstraction for tensor operations.
//!
//! # Backends
//!
//! - `GenericBackend`: naive loops, works on strided views (always available)
//! - faer: `matmul` on strided matrix views for `f32`, `f64`, `c32`, `c64`
//!
//! [`gemm`] picks between the two at runtime from a
//! [`GemmBackend`](crate::config::GemmBackend). Both honour identical
//! parameter semantics, so results agree up to summation order.

mod faer_interop;
mod generic;
mod permutation;

pub use faer_interop::{MatrixLayout, gemm_faer, matmul_strided};
pub use generic::{GenericBackend, RandomAccess, RandomAccessMut, Transpose, gemm_generic};
pub use permutation::PermutationBackend;

use crate::config::GemmBackend;
use crate::range::Order;
use crate::scalar::Scalar;

/// CBLAS-style GEMM on contiguous slices, dispatched to `backend`.
///
/// Computes `C = alpha * op(A) * op(B) + beta * C` where `op(A)` is `m x k`
/// and `op(B)` is `k x n`.
///
/// # Panics
///
/// Panics on leading dimensions that are too small or operands that do not
/// fit their slices.
///
/// # Example
///
/// ```
/// use itensor::GemmBackend;
/// use itensor::backend::{Transpose, gemm};
/// use itensor::range::Order;
///
/// let a = [1.0, 2.0, 3.0, 4.0];
/// let b = [1.0, 0.0, 0.0, 1.0];
/// let mut c = [0.0; 4];
/// gemm(
///     GemmBackend::Generic,
///     Order::RowMajor,
///     Transpose::Trans,
///     Transpose::NoTrans,
///     2, 2, 2,
///     1.0, &a, 2, &b, 2,
///     0.0, &mut c, 2,
/// );
/// assert_eq!(c, [1.0, 3.0, 2.0, 4.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Scalar>(
    backend: GemmBackend,
    order: Order,
    trans_a: Transpose,
    trans_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) {
    log::trace!("gemm ({backend:?}, {order:?}, {trans_a:?}, {trans_b:?}): m={m}, n={n}, k={k}");
    match backend {
        GemmBackend::Generic => gemm_generic(
            order, trans_a, trans_b, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc,
        ),
        GemmBackend::Faer => gemm_faer(
            order, trans_a, trans_b, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc,
        ),
    }
}
