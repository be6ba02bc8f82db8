//! Accelerated GEMM through faer's strided matrix views.
//!
//! Both the CBLAS-style `(order, trans, ld)` description and a fused
//! [`TensorView`](crate::tensor::TensorView) become a [`MatrixLayout`]. A
//! layout with one unit stride is viewed in place through faer's
//! strided-slice constructors; any other layout is gathered into a
//! column-major buffer first. The parameter semantics match
//! [`gemm_generic`](crate::backend::gemm_generic) exactly: `beta != 1`
//! scales `C` first, then the product is accumulated with `Accum::Add`.

use std::borrow::Cow;

use faer::linalg::matmul::matmul;
use faer::mat::{MatMut, MatRef};
use faer::{Accum, Par};

use crate::backend::Transpose;
use crate::range::Order;
use crate::scalar::Scalar;

/// A strided matrix inside a flat buffer.
///
/// Element `(i, j)` lives at `offset + i * row_stride + j * col_stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLayout {
    pub rows: usize,
    pub cols: usize,
    pub row_stride: isize,
    pub col_stride: isize,
    pub offset: usize,
}

impl MatrixLayout {
    /// Layout of `op(X)` (`rows x cols`) for a CBLAS-style operand.
    pub fn from_blas(order: Order, trans: Transpose, rows: usize, cols: usize, ld: usize) -> Self {
        let ld = ld as isize;
        let (row_stride, col_stride) = match (order, trans) {
            (Order::RowMajor, Transpose::NoTrans) | (Order::ColMajor, Transpose::Trans) => (ld, 1),
            (Order::RowMajor, Transpose::Trans) | (Order::ColMajor, Transpose::NoTrans) => (1, ld),
        };
        Self {
            rows,
            cols,
            row_stride,
            col_stride,
            offset: 0,
        }
    }

    /// Buffer position of element `(i, j)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        (self.offset as isize + i as isize * self.row_stride + j as isize * self.col_stride) as usize
    }

    fn check_fits(&self, len: usize, name: &str) {
        assert!(
            self.row_stride >= 0 && self.col_stride >= 0,
            "{name}: negative strides are not supported"
        );
        if self.rows > 0 && self.cols > 0 {
            let last = self.index(self.rows - 1, self.cols - 1);
            assert!(
                last < len,
                "{name}: {}x{} matrix with strides ({}, {}) overruns buffer of length {len}",
                self.rows,
                self.cols,
                self.row_stride,
                self.col_stride
            );
        }
    }
}

/// CBLAS-style GEMM on contiguous slices, executed by faer.
///
/// # Panics
///
/// Panics if any operand does not fit in its slice.
#[allow(clippy::too_many_arguments)]
pub fn gemm_faer<T: Scalar>(
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
    let la = MatrixLayout::from_blas(order, trans_a, m, k, lda);
    let lb = MatrixLayout::from_blas(order, trans_b, k, n, ldb);
    let lc = MatrixLayout::from_blas(order, Transpose::NoTrans, m, n, ldc);
    matmul_strided(alpha, a, &la, b, &lb, beta, c, &lc);
}

/// `C = alpha * A * B + beta * C` with every operand given by a layout.
///
/// # Panics
///
/// Panics if the shapes are inconsistent or a layout overruns its buffer.
#[allow(clippy::too_many_arguments)]
pub fn matmul_strided<T: Scalar>(
    alpha: T,
    a: &[T],
    la: &MatrixLayout,
    b: &[T],
    lb: &MatrixLayout,
    beta: T,
    c: &mut [T],
    lc: &MatrixLayout,
) {
    assert_eq!(la.rows, lc.rows, "matmul: rows of A and C differ");
    assert_eq!(lb.cols, lc.cols, "matmul: columns of B and C differ");
    assert_eq!(la.cols, lb.rows, "matmul: inner dimensions differ");
    la.check_fits(a.len(), "A");
    lb.check_fits(b.len(), "B");
    lc.check_fits(c.len(), "C");

    let (m, n, k) = (lc.rows, lc.cols, la.cols);
    if m == 0 || n == 0 {
        return;
    }
    if beta != T::one() {
        for i in 0..m {
            for j in 0..n {
                c[lc.index(i, j)] *= beta;
            }
        }
    }
    if k == 0 {
        return;
    }

    let (a_buf, pa) = operand(a, la);
    let (b_buf, pb) = operand(b, lb);
    let a_mat = mat_ref(&a_buf, pa, m, k);
    let b_mat = mat_ref(&b_buf, pb, k, n);
    log::trace!("faer matmul: m={m}, n={n}, k={k}");

    match lc.packing() {
        Some(pc) => {
            let c_slice = &mut c[lc.offset..lc.offset + pc.span(m, n)];
            let mut c_mat = match pc {
                Packing::ColMajor(gap) => {
                    MatMut::from_column_major_slice_with_stride_mut(c_slice, m, n, gap)
                }
                Packing::RowMajor(gap) => {
                    MatMut::from_row_major_slice_with_stride_mut(c_slice, m, n, gap)
                }
            };
            matmul(c_mat.as_mut(), Accum::Add, a_mat, b_mat, alpha, Par::Seq);
        }
        None => {
            let mut tmp = gather(c, lc);
            let mut c_mat = MatMut::from_column_major_slice_mut(&mut tmp, m, n);
            matmul(c_mat.as_mut(), Accum::Add, a_mat, b_mat, alpha, Par::Seq);
            for j in 0..n {
                for i in 0..m {
                    c[lc.index(i, j)] = tmp[i + j * m];
                }
            }
        }
    }
}

/// How a layout maps onto faer's safe slice constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Packing {
    /// Unit row stride, columns `gap` apart.
    ColMajor(usize),
    /// Unit column stride, rows `gap` apart.
    RowMajor(usize),
}

impl Packing {
    /// Slice length covering a non-empty `rows x cols` matrix.
    fn span(self, rows: usize, cols: usize) -> usize {
        match self {
            Packing::ColMajor(gap) => (cols - 1) * gap + rows,
            Packing::RowMajor(gap) => (rows - 1) * gap + cols,
        }
    }
}

impl MatrixLayout {
    /// `None` when neither stride is 1 (a stride along an extent-1 axis
    /// does not count).
    fn packing(&self) -> Option<Packing> {
        let row_unit = self.rows <= 1 || self.row_stride == 1;
        let col_unit = self.cols <= 1 || self.col_stride == 1;
        let col_gap = if self.cols <= 1 { self.rows } else { self.col_stride as usize };
        let row_gap = if self.rows <= 1 { self.cols } else { self.row_stride as usize };
        if row_unit && col_gap >= self.rows {
            Some(Packing::ColMajor(col_gap))
        } else if col_unit && row_gap >= self.cols {
            Some(Packing::RowMajor(row_gap))
        } else {
            None
        }
    }
}

/// Column-major copy of the matrix described by `l`.
fn gather<T: Scalar>(data: &[T], l: &MatrixLayout) -> Vec<T> {
    (0..l.cols)
        .flat_map(|j| (0..l.rows).map(move |i| (i, j)))
        .map(|(i, j)| data[l.index(i, j)])
        .collect()
}

/// The operand as a slice faer can view, copying only non-unit layouts.
fn operand<'a, T: Scalar>(data: &'a [T], l: &MatrixLayout) -> (Cow<'a, [T]>, Packing) {
    match l.packing() {
        Some(p) => (Cow::Borrowed(&data[l.offset..l.offset + p.span(l.rows, l.cols)]), p),
        None => (Cow::Owned(gather(data, l)), Packing::ColMajor(l.rows)),
    }
}

fn mat_ref<T>(data: &[T], p: Packing, rows: usize, cols: usize) -> MatRef<'_, T> {
    match p {
        Packing::ColMajor(gap) => MatRef::from_column_major_slice_with_stride(data, rows, cols, gap),
        Packing::RowMajor(gap) => MatRef::from_row_major_slice_with_stride(data, rows, cols, gap),
    }
}
