//! Box-shaped index domains with stride weights.
//!
//! A [`Range`] describes the coordinates `lobound[i] <= c[i] < upbound[i]` and
//! maps each coordinate to a storage offset through a per-dimension weight:
//!
//! ```text
//! ordinal(c) = Σ (c[i] - lobound[i]) * weight[i]
//! ```
//!
//! Freshly built ranges have canonical weights, the running product of the
//! extents in the chosen [`Order`]. Because the weights double as strides, the
//! same type also describes non-owning views: [`Range::permute`] reorders the
//! dimensions and [`Range::slice`] narrows the bounds, both without touching
//! the weights.
//!
//! # Example
//!
//! ```
//! use itensor::range::{Order, Range};
//!
//! let r = Range::new(&[2, 3]);
//! assert_eq!(r.weight(), &[3, 1]);
//! assert_eq!(r.ordinal(&[1, 2]), 5);
//!
//! let c = Range::with_order(&[2, 3], Order::ColMajor);
//! assert_eq!(c.weight(), &[1, 2]);
//! assert_eq!(c.ordinal(&[1, 2]), 5);
//! ```

use smallvec::SmallVec;

/// Coordinate tuple, stored inline up to rank 8.
pub type Coord = SmallVec<[usize; 8]>;

/// Storage order of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Last dimension has weight 1.
    #[default]
    RowMajor,
    /// First dimension has weight 1.
    ColMajor,
}

/// A rectangular multi-dimensional index domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    lobound: Coord,
    upbound: Coord,
    weight: Coord,
    order: Order,
    area: usize,
}

impl Default for Range {
    /// The empty range: rank 0 and no elements.
    fn default() -> Self {
        Self {
            lobound: Coord::new(),
            upbound: Coord::new(),
            weight: Coord::new(),
            order: Order::RowMajor,
            area: 0,
        }
    }
}

/// Canonical weights of `extents` in `order`.
pub fn canonical_weights(extents: &[usize], order: Order) -> Coord {
    let mut weight: Coord = SmallVec::from_elem(0, extents.len());
    let mut w = 1;
    match order {
        Order::RowMajor => {
            for i in (0..extents.len()).rev() {
                weight[i] = w;
                w *= extents[i];
            }
        }
        Order::ColMajor => {
            for i in 0..extents.len() {
                weight[i] = w;
                w *= extents[i];
            }
        }
    }
    weight
}

impl Range {
    /// Row-major range with lower bounds 0.
    pub fn new(extents: &[usize]) -> Self {
        Self::with_order(extents, Order::RowMajor)
    }

    /// Range with lower bounds 0 and the given order.
    pub fn with_order(extents: &[usize], order: Order) -> Self {
        let lobound: Coord = SmallVec::from_elem(0, extents.len());
        Self::from_bounds(&lobound, extents, order)
    }

    /// Range over `[lobound, upbound)`.
    ///
    /// # Panics
    ///
    /// Panics if the bounds have different lengths or `lobound[i] > upbound[i]`.
    pub fn from_bounds(lobound: &[usize], upbound: &[usize], order: Order) -> Self {
        assert_eq!(
            lobound.len(),
            upbound.len(),
            "lower and upper bounds must have the same rank"
        );
        for (i, (&lo, &up)) in lobound.iter().zip(upbound).enumerate() {
            assert!(lo <= up, "range bounds out of order in dimension {i}: {lo} > {up}");
        }
        let extents: Coord = lobound.iter().zip(upbound).map(|(&lo, &up)| up - lo).collect();
        Self {
            lobound: SmallVec::from_slice(lobound),
            upbound: SmallVec::from_slice(upbound),
            weight: canonical_weights(&extents, order),
            order,
            area: extents.iter().product(),
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.lobound.len()
    }

    #[inline]
    pub fn lobound(&self) -> &[usize] {
        &self.lobound
    }

    #[inline]
    pub fn upbound(&self) -> &[usize] {
        &self.upbound
    }

    /// Stride of each dimension.
    #[inline]
    pub fn weight(&self) -> &[usize] {
        &self.weight
    }

    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    #[inline]
    pub fn extent(&self, i: usize) -> usize {
        self.upbound[i] - self.lobound[i]
    }

    pub fn extents(&self) -> Coord {
        (0..self.rank()).map(|i| self.extent(i)).collect()
    }

    /// Number of coordinates in the range.
    #[inline]
    pub fn area(&self) -> usize {
        self.area
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area == 0
    }

    /// Whether `coord` lies inside the range.
    pub fn includes(&self, coord: &[usize]) -> bool {
        coord.len() == self.rank()
            && coord
                .iter()
                .zip(self.lobound.iter().zip(&self.upbound))
                .all(|(&c, (&lo, &up))| lo <= c && c < up)
    }

    /// Storage offset of `coord`.
    #[inline]
    pub fn ordinal(&self, coord: &[usize]) -> usize {
        debug_assert!(self.includes(coord), "coordinate {coord:?} outside range");
        coord
            .iter()
            .zip(self.lobound.iter().zip(&self.weight))
            .map(|(&c, (&lo, &w))| (c - lo) * w)
            .sum()
    }

    /// Coordinate at iteration position `pos`.
    ///
    /// For ranges with canonical weights the position equals the ordinal, so
    /// this inverts [`Range::ordinal`].
    pub fn coordinate_of(&self, pos: usize) -> Coord {
        debug_assert!(pos < self.area, "position {pos} outside range of area {}", self.area);
        let mut coord: Coord = self.lobound.clone();
        let mut rem = pos;
        for i in self.dims_least_significant_first() {
            let ext = self.extent(i);
            coord[i] += rem % ext;
            rem /= ext;
        }
        coord
    }

    /// Storage offset of the coordinate at iteration position `pos`.
    ///
    /// Equivalent to `self.ordinal(&self.coordinate_of(pos))` without
    /// building the coordinate.
    #[inline]
    pub fn ordinal_at(&self, pos: usize) -> usize {
        let mut rem = pos;
        let mut ord = 0;
        for i in self.dims_least_significant_first() {
            let ext = self.extent(i);
            ord += (rem % ext) * self.weight[i];
            rem /= ext;
        }
        ord
    }

    /// The end sentinel of iteration: the upper bound.
    pub fn end_sentinel(&self) -> &[usize] {
        &self.upbound
    }

    /// Advance `coord` to the next coordinate in iteration order.
    ///
    /// The least significant dimension (last for row-major, first for
    /// column-major) moves fastest and carries into more significant ones.
    /// Stepping past the final coordinate sets `coord` to the end sentinel
    /// and returns `false`.
    pub fn increment(&self, coord: &mut [usize]) -> bool {
        debug_assert_eq!(coord.len(), self.rank());
        for i in self.dims_least_significant_first() {
            coord[i] += 1;
            if coord[i] < self.upbound[i] {
                return true;
            }
            coord[i] = self.lobound[i];
        }
        coord.copy_from_slice(&self.upbound);
        false
    }

    /// Iterate over all coordinates in order.
    pub fn iter(&self) -> RangeIter<'_> {
        RangeIter {
            range: self,
            next: (!self.is_empty()).then(|| self.lobound.clone()),
        }
    }

    /// Rebuild the range with new extents, lower bounds 0 and the same order.
    pub fn resize(&mut self, extents: &[usize]) {
        *self = Self::with_order(extents, self.order);
    }

    /// Range with dimensions reordered: dimension `i` of the result is
    /// dimension `perm[i]` of `self`. Weights travel with their dimension.
    ///
    /// # Panics
    ///
    /// Panics if `perm` is not a permutation of `0..rank`.
    pub fn permute(&self, perm: &[usize]) -> Range {
        assert!(
            is_permutation(perm, self.rank()),
            "invalid permutation {perm:?} for rank {}",
            self.rank()
        );
        Range {
            lobound: perm.iter().map(|&p| self.lobound[p]).collect(),
            upbound: perm.iter().map(|&p| self.upbound[p]).collect(),
            weight: perm.iter().map(|&p| self.weight[p]).collect(),
            order: self.order,
            area: self.area,
        }
    }

    /// Sub-box `[lobound, upbound)` keeping the weights.
    ///
    /// # Panics
    ///
    /// Panics if the sub-box is not contained in `self`.
    pub fn slice(&self, lobound: &[usize], upbound: &[usize]) -> Range {
        assert_eq!(lobound.len(), self.rank(), "slice rank mismatch");
        assert_eq!(upbound.len(), self.rank(), "slice rank mismatch");
        for i in 0..self.rank() {
            assert!(
                self.lobound[i] <= lobound[i] && lobound[i] <= upbound[i] && upbound[i] <= self.upbound[i],
                "slice [{}, {}) outside dimension {i} bounds [{}, {})",
                lobound[i],
                upbound[i],
                self.lobound[i],
                self.upbound[i]
            );
        }
        Range {
            lobound: SmallVec::from_slice(lobound),
            upbound: SmallVec::from_slice(upbound),
            weight: self.weight.clone(),
            order: self.order,
            area: lobound.iter().zip(upbound).map(|(&lo, &up)| up - lo).product(),
        }
    }

    /// Same coordinates and weights, enumerated in `order`.
    pub fn with_iteration_order(&self, order: Order) -> Range {
        Range {
            order,
            ..self.clone()
        }
    }

    /// Whether the weights are the canonical ones for this order.
    ///
    /// Dimensions of extent 1 are ignored since their weight is never used.
    pub fn is_contiguous(&self) -> bool {
        let canonical = canonical_weights(&self.extents(), self.order);
        (0..self.rank()).all(|i| self.extent(i) <= 1 || canonical[i] == self.weight[i])
    }

    fn dims_least_significant_first(&self) -> impl Iterator<Item = usize> + use<> {
        let rank = self.rank();
        let row_major = self.order == Order::RowMajor;
        (0..rank).map(move |i| if row_major { rank - 1 - i } else { i })
    }
}

/// Whether `perm` is a permutation of `0..n`.
pub fn is_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &p in perm {
        if p >= n || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

/// Iterator over the coordinates of a [`Range`].
#[derive(Debug, Clone)]
pub struct RangeIter<'a> {
    range: &'a Range,
    next: Option<Coord>,
}

impl RangeIter<'_> {
    /// Whether the iterator has reached the end sentinel.
    pub fn is_end(&self) -> bool {
        self.next.is_none()
    }
}

impl Iterator for RangeIter<'_> {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let current = self.next.take()?;
        let mut succ = current.clone();
        // Rank 0 holds a single coordinate; there is nothing to advance.
        if self.range.rank() > 0 && self.range.increment(&mut succ) {
            self.next = Some(succ);
        }
        Some(current)
    }
}

impl<'a> IntoIterator for &'a Range {
    type Item = Coord;
    type IntoIter = RangeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
