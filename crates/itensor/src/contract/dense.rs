//! Annotation-driven contraction of dense tensors.
//!
//! The contraction is lowered to one GEMM:
//!
//! ```text
//! A -> [uncontracted_a..., contracted...]      (dleft x dmid)
//! B -> [contracted..., uncontracted_b...]      (dmid x dright)
//! C viewed as [uncontracted_a..., uncontracted_b...]
//! ```
//!
//! All three reorderings are views; nothing is copied on the generic path.
//! The faer path needs each axis group to collapse to a single stride and
//! materializes an operand only when it does not.

use crate::backend::{MatrixLayout, Transpose, gemm_generic, matmul_strided};
use crate::config::{Config, GemmBackend};
use crate::contract::properties::ContractionProperties;
use crate::error::TensorError;
use crate::range::Order;
use crate::scalar::Scalar;
use crate::tensor::{Tensor, TensorView};

/// `C = alpha * A * B + beta * C`, axes matched by annotation tags.
///
/// A tag present in both `ann_a` and `ann_b` is summed over; every other
/// tag must appear in `ann_c`. If C is empty it is resized to the output
/// shape and zero-filled, otherwise its shape must match.
///
/// # Errors
///
/// Annotation and extent errors from [`ContractionProperties::compute`],
/// and `ShapeMismatch` for a non-empty C of the wrong shape.
#[allow(clippy::too_many_arguments)]
pub fn contract_into<T: Scalar>(
    alpha: T,
    a: &Tensor<T>,
    ann_a: &[i32],
    b: &Tensor<T>,
    ann_b: &[i32],
    beta: T,
    c: &mut Tensor<T>,
    ann_c: &[i32],
    config: &Config,
) -> Result<(), TensorError> {
    let props = ContractionProperties::compute(ann_a, a.shape(), ann_b, b.shape(), ann_c)?;

    if c.shape() != props.output_shape.as_slice() {
        if c.is_empty() && c.ndim() == ann_c.len() {
            *c = Tensor::zeros(&props.output_shape);
        } else {
            return Err(TensorError::ShapeMismatch {
                expected: props.output_shape.iter().product(),
                actual: c.len(),
            });
        }
    }

    log::debug!(
        "contract: ranks ({}, {}) -> {}, ncont={}, gemm {}x{}x{} ({:?})",
        a.ndim(),
        b.ndim(),
        ann_c.len(),
        props.ncont(),
        props.dleft,
        props.dmid,
        props.dright,
        config.gemm_backend
    );

    let a_view = a.view().permute(&props.perm_a).with_iteration_order(Order::RowMajor);
    let b_view = b.view().permute(&props.perm_b).with_iteration_order(Order::RowMajor);

    match config.gemm_backend {
        GemmBackend::Generic => {
            let mut c_view = c
                .view_mut()
                .permute(&props.perm_c)
                .with_iteration_order(Order::RowMajor);
            gemm_generic(
                Order::RowMajor,
                Transpose::NoTrans,
                Transpose::NoTrans,
                props.dleft,
                props.dright,
                props.dmid,
                alpha,
                &a_view,
                props.dmid.max(1),
                &b_view,
                props.dright.max(1),
                beta,
                &mut c_view,
                props.dright.max(1),
            );
        }
        GemmBackend::Faer => contract_faer(alpha, &a_view, &b_view, beta, c, &props),
    }
    Ok(())
}

/// Allocate C and contract into it.
///
/// # Example
///
/// ```
/// use itensor::{Config, Tensor};
/// use itensor::contract::contract;
///
/// // C[i,k] = A[i,j] * B[j,k]
/// let a = Tensor::<f64>::ones(&[2, 3]);
/// let b = Tensor::<f64>::ones(&[3, 4]);
/// let c = contract(&a, &[1, 2], &b, &[2, 3], &[1, 3], &Config::default()).unwrap();
/// assert_eq!(c.shape(), &[2, 4]);
/// assert_eq!(c.data(), &[3.0; 8]);
/// ```
pub fn contract<T: Scalar>(
    a: &Tensor<T>,
    ann_a: &[i32],
    b: &Tensor<T>,
    ann_b: &[i32],
    ann_c: &[i32],
    config: &Config,
) -> Result<Tensor<T>, TensorError> {
    let mut c = Tensor::with_rank(ann_c.len());
    contract_into(T::one(), a, ann_a, b, ann_b, T::zero(), &mut c, ann_c, config)?;
    Ok(c)
}

fn contract_faer<T: Scalar>(
    alpha: T,
    a_view: &TensorView<'_, T>,
    b_view: &TensorView<'_, T>,
    beta: T,
    c: &mut Tensor<T>,
    props: &ContractionProperties,
) {
    let rows = props.uncontracted_a.len();
    let ncont = props.ncont();

    let a_copy;
    let (a_data, la) = match a_view.matrix_layout(rows) {
        Some(layout) => (a_view.raw_parts().0, layout),
        None => {
            a_copy = a_view.to_tensor();
            (a_copy.data(), contiguous(props.dleft, props.dmid))
        }
    };
    let b_copy;
    let (b_data, lb) = match b_view.matrix_layout(ncont) {
        Some(layout) => (b_view.raw_parts().0, layout),
        None => {
            b_copy = b_view.to_tensor();
            (b_copy.data(), contiguous(props.dmid, props.dright))
        }
    };

    let mut c_view = c.view_mut().permute(&props.perm_c);
    match c_view.matrix_layout(rows) {
        Some(lc) => {
            let (c_data, _) = c_view.raw_parts_mut();
            matmul_strided(alpha, a_data, &la, b_data, &lb, beta, c_data, &lc);
        }
        None => {
            log::trace!("contract: C not fusable, computing into a temporary");
            let mut tmp = c_view.as_view().with_iteration_order(Order::RowMajor).to_tensor();
            let lc = contiguous(props.dleft, props.dright);
            matmul_strided(alpha, a_data, &la, b_data, &lb, beta, tmp.data_mut(), &lc);
            c_view
                .with_iteration_order(Order::RowMajor)
                .assign(&tmp.view());
        }
    }
}

// Row-major contiguous rows x cols matrix.
fn contiguous(rows: usize, cols: usize) -> MatrixLayout {
    MatrixLayout {
        rows,
        cols,
        row_stride: cols.max(1) as isize,
        col_stride: 1,
        offset: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::naive::contract_naive;
    use crate::scalar::c64;
    use approx::assert_relative_eq;

    fn configs() -> [Config; 2] {
        [
            Config::default().with_gemm_backend(GemmBackend::Generic),
            Config::default().with_gemm_backend(GemmBackend::Faer),
        ]
    }

    fn seq(shape: &[usize]) -> Tensor<f64> {
        let mut n = 0.0;
        Tensor::from_fn(shape, |_| {
            n += 1.0;
            n
        })
    }

    fn assert_close(x: &Tensor<f64>, y: &Tensor<f64>) {
        assert_eq!(x.shape(), y.shape());
        for (a, b) in x.data().iter().zip(y.data()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_matrix_multiply() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let b = Tensor::from_vec(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], &[3, 2]).unwrap();
        for config in configs() {
            let c = contract(&a, &[1, 2], &b, &[2, 3], &[1, 3], &config).unwrap();
            assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
        }
    }

    #[test]
    fn test_permuted_operands_and_output() {
        // C[l,i] = sum_{j,k} A[i,j,k] B[k,l,j]
        let a = seq(&[2, 3, 4]);
        let b = seq(&[4, 5, 3]);
        let expected = contract_naive(&a, &[1, 2, 3], &b, &[3, 4, 2], &[4, 1]).unwrap();
        for config in configs() {
            let c = contract(&a, &[1, 2, 3], &b, &[3, 4, 2], &[4, 1], &config).unwrap();
            assert_close(&c, &expected);
        }
    }

    #[test]
    fn test_interleaved_output() {
        // C[i,l,j] = sum_k A[i,j,k] B[k,l]: C is not in GEMM order.
        let a = seq(&[2, 3, 4]);
        let b = seq(&[4, 5]);
        let expected = contract_naive(&a, &[1, 2, 9], &b, &[9, 3], &[1, 3, 2]).unwrap();
        for config in configs() {
            let c = contract(&a, &[1, 2, 9], &b, &[9, 3], &[1, 3, 2], &config).unwrap();
            assert_close(&c, &expected);
        }
    }

    #[test]
    fn test_outer_and_full() {
        let a = seq(&[3]);
        let b = seq(&[4]);
        for config in configs() {
            let outer = contract(&a, &[1], &b, &[2], &[2, 1], &config).unwrap();
            assert_eq!(outer.shape(), &[4, 3]);
            assert_relative_eq!(*outer.get(&[3, 2]).unwrap(), 12.0);

            let dot = contract(&a, &[1], &a, &[1], &[], &config).unwrap();
            assert_eq!(dot.ndim(), 0);
            assert_relative_eq!(*dot.get(&[]).unwrap(), 14.0);
        }
    }

    #[test]
    fn test_alpha_beta_accumulate() {
        let a = seq(&[2, 2]);
        let b = seq(&[2, 2]);
        let base = contract(&a, &[1, 2], &b, &[2, 3], &[1, 3], &Config::default()).unwrap();
        for config in configs() {
            let mut c = Tensor::ones(&[2, 2]);
            contract_into(2.0, &a, &[1, 2], &b, &[2, 3], 3.0, &mut c, &[1, 3], &config).unwrap();
            for (x, y) in c.data().iter().zip(base.data()) {
                assert_relative_eq!(*x, 2.0 * y + 3.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_complex_contraction() {
        let i = c64::new(0.0, 1.0);
        let a = Tensor::from_vec(vec![i, c64::new(1.0, 0.0)], &[2]).unwrap();
        for config in configs() {
            let c = contract(&a, &[1], &a, &[1], &[], &config).unwrap();
            let z = *c.get(&[]).unwrap();
            assert_relative_eq!(z.re, 0.0, epsilon = 1e-12);
            assert_relative_eq!(z.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_wrong_output_shape() {
        let a = seq(&[2, 3]);
        let b = seq(&[3, 4]);
        let mut c: Tensor<f64> = Tensor::zeros(&[4, 2]);
        let result = contract_into(
            1.0,
            &a,
            &[1, 2],
            &b,
            &[2, 3],
            0.0,
            &mut c,
            &[1, 3],
            &Config::default(),
        );
        assert!(matches!(result, Err(TensorError::ShapeMismatch { .. })));
    }
}
