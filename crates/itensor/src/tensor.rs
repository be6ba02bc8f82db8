//! Dense n-dimensional tensors and strided views over them.
//!
//! ```text
//! Tensor<ElT>          owns Dense<ElT> + Range (lower bounds 0, canonical weights)
//! TensorView<'a, ElT>  borrows a buffer through any Range + offset
//! TensorViewMut<'a, ElT>
//! ```
//!
//! Views are what make the generic GEMM path work on permuted or sliced data
//! without copying: they implement [`RandomAccess`], addressing elements by
//! their position in the view's iteration order.

use crate::backend::{MatrixLayout, RandomAccess, RandomAccessMut};
use crate::error::TensorError;
use crate::range::{Coord, Order, Range, RangeIter, is_permutation};
use crate::scalar::Scalar;
use crate::storage::Dense;

/// A dense n-dimensional tensor.
///
/// Invariant: `data().len() == range().area()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<ElT: Scalar> {
    storage: Dense<ElT>,
    range: Range,
}

/// Alias kept for symmetry with the storage type name.
pub type DenseTensor<ElT> = Tensor<ElT>;

impl<ElT: Scalar> Tensor<ElT> {
    /// Create a new row-major tensor with the given shape, zero-initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use itensor::Tensor;
    ///
    /// let t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self::filled(shape, ElT::zero())
    }

    /// Zero-initialized tensor in the given storage order.
    pub fn with_order(shape: &[usize], order: Order) -> Self {
        Self::from_range(Range::with_order(shape, order), ElT::zero())
    }

    /// Row-major tensor with every element set to `value`.
    pub fn filled(shape: &[usize], value: ElT) -> Self {
        Self::from_range(Range::new(shape), value)
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::filled(shape, ElT::one())
    }

    /// Tensor over the extents of `range` (lower bounds dropped, canonical
    /// weights in the range's order), every element set to `value`.
    pub fn from_range(range: Range, value: ElT) -> Self {
        let range = Range::with_order(&range.extents(), range.order());
        Self {
            storage: Dense::filled(range.area(), value),
            range,
        }
    }

    /// Rank-0 tensor holding one value.
    pub fn scalar(value: ElT) -> Self {
        Self::filled(&[], value)
    }

    /// Empty tensor of the given rank (every extent 0).
    ///
    /// Used as an output placeholder: [`contract::gemm`](crate::contract::gemm)
    /// sizes it from its operands.
    pub fn with_rank(rank: usize) -> Self {
        Self::zeros(&vec![0; rank])
    }

    /// Create tensor from row-major data and shape.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if data length doesn't match shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use itensor::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get(&[0, 1]), Some(&2.0));
    /// assert_eq!(t.get(&[1, 0]), Some(&4.0));
    /// ```
    pub fn from_vec(data: Vec<ElT>, shape: &[usize]) -> Result<Self, TensorError> {
        Self::from_vec_with_order(data, shape, Order::RowMajor)
    }

    /// Create tensor from data laid out in `order`.
    pub fn from_vec_with_order(
        data: Vec<ElT>,
        shape: &[usize],
        order: Order,
    ) -> Result<Self, TensorError> {
        let range = Range::with_order(shape, order);
        if data.len() != range.area() {
            return Err(TensorError::ShapeMismatch {
                expected: range.area(),
                actual: data.len(),
            });
        }
        Ok(Self {
            storage: Dense::from_vec(data),
            range,
        })
    }

    /// Row-major tensor whose element at each coordinate is `f(coord)`.
    pub fn from_fn<F>(shape: &[usize], mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> ElT,
    {
        let range = Range::new(shape);
        let data: Vec<ElT> = range.iter().map(|c| f(&c)).collect();
        Self {
            storage: Dense::from_vec(data),
            range,
        }
    }

    #[inline]
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Coordinates of every element, in storage order.
    pub fn iter_coords(&self) -> RangeIter<'_> {
        self.range.iter()
    }

    #[inline]
    pub fn order(&self) -> Order {
        self.range.order()
    }

    /// Get the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        // Lower bounds are always 0 for owned tensors.
        self.range.upbound()
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.range.rank()
    }

    /// Get total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if tensor is empty (has zero elements).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get underlying data as slice.
    #[inline]
    pub fn data(&self) -> &[ElT] {
        self.storage.as_slice()
    }

    /// Get underlying data as mutable slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [ElT] {
        self.storage.as_mut_slice()
    }

    /// Get element by linear index.
    #[inline]
    pub fn get_linear(&self, i: usize) -> Option<&ElT> {
        self.storage.as_slice().get(i)
    }

    /// Get element by cartesian indices.
    ///
    /// Returns `None` if indices are out of bounds or wrong number of indices.
    pub fn get(&self, indices: &[usize]) -> Option<&ElT> {
        if !self.range.includes(indices) {
            return None;
        }
        self.storage.as_slice().get(self.range.ordinal(indices))
    }

    /// Get mutable element by cartesian indices.
    pub fn get_mut(&mut self, indices: &[usize]) -> Option<&mut ElT> {
        if !self.range.includes(indices) {
            return None;
        }
        let ord = self.range.ordinal(indices);
        self.storage.as_mut_slice().get_mut(ord)
    }

    /// Set element by cartesian indices.
    ///
    /// # Errors
    ///
    /// Returns error if indices are out of bounds or wrong number of indices.
    pub fn set(&mut self, indices: &[usize], value: ElT) -> Result<(), TensorError> {
        self.check_indices(indices)?;
        let ord = self.range.ordinal(indices);
        self.storage.as_mut_slice()[ord] = value;
        Ok(())
    }

    fn check_indices(&self, indices: &[usize]) -> Result<(), TensorError> {
        if indices.len() != self.ndim() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }
        for (&idx, &dim) in indices.iter().zip(self.shape()) {
            if idx >= dim {
                return Err(TensorError::IndexOutOfBounds {
                    index: idx,
                    dim_size: dim,
                });
            }
        }
        Ok(())
    }

    /// Fill all elements with a value.
    pub fn fill(&mut self, value: ElT) {
        self.storage.fill(value);
    }

    /// Overwrite every element with successive calls to `f`.
    pub fn generate<F: FnMut() -> ElT>(&mut self, mut f: F) {
        for x in self.storage.as_mut_slice() {
            *x = f();
        }
    }

    /// Replace every element `x` with `f(x)`.
    pub fn map_inplace<F: FnMut(ElT) -> ElT>(&mut self, mut f: F) {
        for x in self.storage.as_mut_slice() {
            *x = f(*x);
        }
    }

    /// New tensor of the same layout with every element `x` replaced by
    /// `f(x)`, possibly of another element type.
    pub fn map<U: Scalar, F: FnMut(ElT) -> U>(&self, mut f: F) -> Tensor<U> {
        Tensor {
            storage: Dense::from_vec(self.data().iter().map(|&x| f(x)).collect()),
            range: self.range.clone(),
        }
    }

    /// Resize to `shape`, keeping the order. All elements become zero.
    pub fn resize(&mut self, shape: &[usize]) {
        self.range.resize(shape);
        self.storage.reset(self.range.area());
    }

    /// Consume the tensor and return its buffer.
    pub fn into_data(self) -> Vec<ElT> {
        self.storage.into_vec()
    }

    /// Borrow the whole tensor as a view.
    pub fn view(&self) -> TensorView<'_, ElT> {
        TensorView {
            data: self.storage.as_slice(),
            range: self.range.clone(),
            offset: 0,
        }
    }

    /// Borrow the whole tensor as a mutable view.
    pub fn view_mut(&mut self) -> TensorViewMut<'_, ElT> {
        TensorViewMut {
            range: self.range.clone(),
            data: self.storage.as_mut_slice(),
            offset: 0,
        }
    }

    /// Permute the dimensions of the tensor.
    ///
    /// # Arguments
    ///
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
    ///
    /// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let t2 = t.permutedims(&[1, 0]).unwrap();
    /// assert_eq!(t2.shape(), &[3, 2]);
    /// assert_eq!(t.get(&[1, 0]), t2.get(&[0, 1]));
    /// assert_eq!(t.get(&[0, 2]), t2.get(&[2, 0]));
    /// ```
    pub fn permutedims(&self, perm: &[usize]) -> Result<Self, TensorError> {
        crate::operations::permutedims(self, perm)
    }
}

/// A read-only strided view: `data[offset + range.ordinal(coord)]`.
#[derive(Debug, Clone)]
pub struct TensorView<'a, ElT> {
    data: &'a [ElT],
    range: Range,
    offset: usize,
}

impl<'a, ElT: Scalar> TensorView<'a, ElT> {
    #[inline]
    pub fn range(&self) -> &Range {
        &self.range
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.range.rank()
    }

    /// Extents of the view.
    pub fn shape(&self) -> Coord {
        self.range.extents()
    }

    /// Number of elements in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.range.area()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The underlying buffer and the offset of the view's first element.
    pub fn raw_parts(&self) -> (&'a [ElT], usize) {
        (self.data, self.offset)
    }

    /// Element at `coord`, or `None` outside the view.
    pub fn get(&self, coord: &[usize]) -> Option<ElT> {
        if !self.range.includes(coord) {
            return None;
        }
        self.data.get(self.offset + self.range.ordinal(coord)).copied()
    }

    /// View with dimensions reordered, `perm[i]` naming the source dimension.
    ///
    /// # Panics
    ///
    /// Panics if `perm` is not a permutation of `0..ndim`.
    pub fn permute(&self, perm: &[usize]) -> Self {
        Self {
            data: self.data,
            range: self.range.permute(perm),
            offset: self.offset,
        }
    }

    /// Sub-box `[lobound, upbound)` of the view.
    pub fn slice(&self, lobound: &[usize], upbound: &[usize]) -> Self {
        let range = self.range.slice(lobound, upbound);
        let offset = if range.is_empty() {
            self.offset
        } else {
            self.offset + self.range.ordinal(lobound)
        };
        Self {
            data: self.data,
            range,
            offset,
        }
    }

    /// Same elements, enumerated in `order`.
    pub fn with_iteration_order(&self, order: Order) -> Self {
        Self {
            data: self.data,
            range: self.range.with_iteration_order(order),
            offset: self.offset,
        }
    }

    /// Elements in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = ElT> + '_ {
        (0..self.len()).map(move |p| self.at(p))
    }

    /// Copy into a new owned tensor with canonical layout in the view's order.
    pub fn to_tensor(&self) -> Tensor<ElT> {
        let range = Range::with_order(&self.shape(), self.range.order());
        Tensor {
            storage: Dense::from_vec(self.iter().collect()),
            range,
        }
    }

    /// Describe the view as a strided matrix whose rows fuse dimensions
    /// `[0, split)` and whose columns fuse `[split, ndim)`, both row-major.
    ///
    /// Returns `None` if either group cannot be expressed with one stride.
    pub fn matrix_layout(&self, split: usize) -> Option<MatrixLayout> {
        matrix_layout(&self.range, self.offset, split)
    }
}

impl<ElT: Scalar> RandomAccess<ElT> for TensorView<'_, ElT> {
    #[inline]
    fn at(&self, pos: usize) -> ElT {
        self.data[self.offset + self.range.ordinal_at(pos)]
    }
}

/// A mutable strided view.
#[derive(Debug)]
pub struct TensorViewMut<'a, ElT> {
    data: &'a mut [ElT],
    range: Range,
    offset: usize,
}

impl<'a, ElT: Scalar> TensorViewMut<'a, ElT> {
    #[inline]
    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn shape(&self) -> Coord {
        self.range.extents()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.range.area()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The underlying buffer and the offset of the view's first element.
    pub fn raw_parts_mut(&mut self) -> (&mut [ElT], usize) {
        (&mut *self.data, self.offset)
    }

    /// Mutable element at `coord`, or `None` outside the view.
    pub fn get_mut(&mut self, coord: &[usize]) -> Option<&mut ElT> {
        if !self.range.includes(coord) {
            return None;
        }
        self.data.get_mut(self.offset + self.range.ordinal(coord))
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> TensorView<'_, ElT> {
        TensorView {
            data: &*self.data,
            range: self.range.clone(),
            offset: self.offset,
        }
    }

    /// View with dimensions reordered, `perm[i]` naming the source dimension.
    pub fn permute(self, perm: &[usize]) -> Self {
        Self {
            range: self.range.permute(perm),
            data: self.data,
            offset: self.offset,
        }
    }

    /// Same elements, enumerated in `order`.
    pub fn with_iteration_order(self, order: Order) -> Self {
        Self {
            range: self.range.with_iteration_order(order),
            data: self.data,
            offset: self.offset,
        }
    }

    /// Copy `src` element by element (both enumerated in iteration order).
    ///
    /// # Panics
    ///
    /// Panics if the extents differ.
    pub fn assign(&mut self, src: &TensorView<'_, ElT>) {
        assert_eq!(self.shape(), src.shape(), "assign: shape mismatch");
        for pos in 0..self.len() {
            *self.at_mut(pos) = src.at(pos);
        }
    }

    /// Strided matrix layout, see [`TensorView::matrix_layout`].
    pub fn matrix_layout(&self, split: usize) -> Option<MatrixLayout> {
        matrix_layout(&self.range, self.offset, split)
    }
}

impl<ElT: Scalar> RandomAccess<ElT> for TensorViewMut<'_, ElT> {
    #[inline]
    fn at(&self, pos: usize) -> ElT {
        self.data[self.offset + self.range.ordinal_at(pos)]
    }
}

impl<ElT: Scalar> RandomAccessMut<ElT> for TensorViewMut<'_, ElT> {
    #[inline]
    fn at_mut(&mut self, pos: usize) -> &mut ElT {
        let ord = self.offset + self.range.ordinal_at(pos);
        &mut self.data[ord]
    }
}

fn matrix_layout(range: &Range, offset: usize, split: usize) -> Option<MatrixLayout> {
    assert!(split <= range.rank(), "split {split} beyond rank {}", range.rank());
    let (rows, row_stride) = fuse_dims(range, 0..split)?;
    let (cols, col_stride) = fuse_dims(range, split..range.rank())?;
    Some(MatrixLayout {
        rows,
        cols,
        row_stride,
        col_stride,
        offset,
    })
}

// Fuse consecutive dimensions into one (extent, stride) pair, slowest first.
fn fuse_dims(range: &Range, dims: std::ops::Range<usize>) -> Option<(usize, isize)> {
    let mut extent = 1;
    let mut stride = None;
    let mut expected = None;
    for i in dims.rev() {
        let e = range.extent(i);
        if e == 1 {
            continue;
        }
        let w = range.weight()[i];
        match expected {
            None => stride = Some(w),
            Some(exp) if exp != w => return None,
            Some(_) => {}
        }
        expected = Some(w * e);
        extent *= e;
    }
    Some((extent, stride.unwrap_or(1) as isize))
}

/// Validate `perm` against `ndim`.
pub(crate) fn validate_permutation(perm: &[usize], ndim: usize) -> Result<(), TensorError> {
    if is_permutation(perm, ndim) {
        Ok(())
    } else {
        Err(TensorError::InvalidPermutation {
            perm: perm.to_vec(),
            ndim,
        })
    }
}
