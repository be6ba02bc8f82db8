//! Ordered, duplicate-free collections of indices.
//!
//! An [`IndexSet`] keeps its non-trivial indices (dimension > 1) in positions
//! `[0, rn)` and its trivial indices (dimension 1) in `[rn, r)`. Only the
//! non-trivial part corresponds to storage axes; trivial indices are carried
//! for bookkeeping and still match by identity during contraction.

use crate::error::TensorError;
use crate::index::{Index, IndexType};

/// An ordered set of indices, non-trivial ones first.
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    inds: Vec<Index>,
    rn: usize,
}

impl IndexSet {
    /// Build a set from indices in any order.
    ///
    /// Non-trivial indices are moved in front of trivial ones. The relative
    /// order inside each group is preserved.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::DuplicateIndex` if an index appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use itensor::{Index, IndexSet, IndexType};
    ///
    /// let a = Index::new("a", 1, IndexType::Link);
    /// let b = Index::new("b", 3, IndexType::Link);
    /// let c = Index::new("c", 2, IndexType::Site);
    /// let is = IndexSet::new(&[a.clone(), b.clone(), c.clone()]).unwrap();
    ///
    /// assert_eq!(is.r(), 3);
    /// assert_eq!(is.rn(), 2);
    /// assert_eq!(is.dim(), 6);
    /// assert_eq!(is[0], b);
    /// assert_eq!(is[1], c);
    /// assert_eq!(is[2], a);
    /// ```
    pub fn new(indices: &[Index]) -> Result<Self, TensorError> {
        check_unique(indices)?;
        let mut inds: Vec<Index> = Vec::with_capacity(indices.len());
        inds.extend(indices.iter().filter(|i| !i.is_trivial()).cloned());
        let rn = inds.len();
        inds.extend(indices.iter().filter(|i| i.is_trivial()).cloned());
        Ok(Self { inds, rn })
    }

    /// Total number of indices.
    #[inline]
    pub fn r(&self) -> usize {
        self.inds.len()
    }

    /// Number of non-trivial indices.
    #[inline]
    pub fn rn(&self) -> usize {
        self.rn
    }

    /// Product of the non-trivial dimensions.
    pub fn dim(&self) -> usize {
        self.nontrivial().iter().map(Index::dim).product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inds.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&Index> {
        self.inds.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Index> {
        self.inds.iter()
    }

    /// Indices `[0, rn)`.
    #[inline]
    pub fn nontrivial(&self) -> &[Index] {
        &self.inds[..self.rn]
    }

    /// Indices `[rn, r)`.
    #[inline]
    pub fn trivial(&self) -> &[Index] {
        &self.inds[self.rn..]
    }

    /// Dimensions of the non-trivial indices, i.e. the storage extents.
    pub fn extents(&self) -> Vec<usize> {
        self.nontrivial().iter().map(Index::dim).collect()
    }

    /// Position of `index`, comparing identity and prime level.
    pub fn find(&self, index: &Index) -> Option<usize> {
        self.inds.iter().position(|i| i == index)
    }

    pub fn contains(&self, index: &Index) -> bool {
        self.find(index).is_some()
    }

    /// Position of the first index with the same identity, any prime level.
    pub fn find_noprime(&self, index: &Index) -> Option<usize> {
        self.inds.iter().position(|i| i.noprime_equals(index))
    }

    /// First index selected by `kind`.
    pub fn find_type(&self, kind: IndexType) -> Option<&Index> {
        self.inds.iter().find(|i| i.kind().matches(kind))
    }

    /// Smallest non-trivial dimension (1 if there is none).
    pub fn min_dim(&self) -> usize {
        self.nontrivial().iter().map(Index::dim).min().unwrap_or(1)
    }

    /// Largest non-trivial dimension (1 if there is none).
    pub fn max_dim(&self) -> usize {
        self.nontrivial().iter().map(Index::dim).max().unwrap_or(1)
    }

    /// Increase every prime level by `inc`.
    pub fn prime(&mut self, inc: u32) {
        for i in &mut self.inds {
            i.prime(inc);
        }
    }

    /// Increase the prime level of every index selected by `kind`.
    pub fn prime_type(&mut self, kind: IndexType, inc: u32) -> Result<(), TensorError> {
        self.try_update(|inds| {
            for i in inds.iter_mut() {
                i.prime_type(kind, inc);
            }
            Ok(())
        })
    }

    /// Increase the prime level of one index.
    ///
    /// # Errors
    ///
    /// `IndexNotFound` if `index` is not in the set, `DuplicateIndex` if the
    /// primed index collides with another one.
    pub fn prime_index(&mut self, index: &Index, inc: u32) -> Result<(), TensorError> {
        let pos = self.position_of(index)?;
        self.try_update(|inds| {
            inds[pos].prime(inc);
            Ok(())
        })
    }

    /// Reset the prime level of every index selected by `kind`.
    ///
    /// # Errors
    ///
    /// `DuplicateIndex` if two indices become equal, e.g. `i` and `i'`.
    pub fn noprime(&mut self, kind: IndexType) -> Result<(), TensorError> {
        self.try_update(|inds| {
            for i in inds.iter_mut() {
                i.noprime_type(kind);
            }
            Ok(())
        })
    }

    /// Reset the prime level of one index.
    pub fn noprime_index(&mut self, index: &Index) -> Result<(), TensorError> {
        let pos = self.position_of(index)?;
        self.try_update(|inds| {
            inds[pos].noprime();
            Ok(())
        })
    }

    /// Map prime level `old` to `new` on every index selected by `kind`.
    pub fn mapprime(&mut self, old: u32, new: u32, kind: IndexType) -> Result<(), TensorError> {
        self.try_update(|inds| {
            for i in inds.iter_mut() {
                i.mapprime(old, new, kind);
            }
            Ok(())
        })
    }

    /// Permutation carrying `other`'s storage axes onto this set's.
    ///
    /// `perm[i]` is the position in `other`'s non-trivial part of this set's
    /// `i`-th non-trivial index.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::IndexSetMismatch` unless both sets contain the
    /// same indices.
    pub fn permutation_from(&self, other: &IndexSet) -> Result<Vec<usize>, TensorError> {
        if self != other {
            return Err(TensorError::IndexSetMismatch {
                left: self.r(),
                right: other.r(),
            });
        }
        self.nontrivial()
            .iter()
            .map(|i| {
                other
                    .nontrivial()
                    .iter()
                    .position(|j| j == i)
                    .ok_or(TensorError::IndexSetMismatch {
                        left: self.rn(),
                        right: other.rn(),
                    })
            })
            .collect()
    }

    fn position_of(&self, index: &Index) -> Result<usize, TensorError> {
        self.find(index).ok_or(TensorError::IndexNotFound {
            id: index.id().0,
            prime_level: index.prime_level(),
        })
    }

    // Apply `f` to a copy and commit only if the result is still unique.
    fn try_update<F>(&mut self, f: F) -> Result<(), TensorError>
    where
        F: FnOnce(&mut [Index]) -> Result<(), TensorError>,
    {
        let mut inds = self.inds.clone();
        f(&mut inds)?;
        check_unique(&inds)?;
        self.inds = inds;
        Ok(())
    }
}

fn check_unique(indices: &[Index]) -> Result<(), TensorError> {
    for (n, i) in indices.iter().enumerate() {
        if indices[n + 1..].contains(i) {
            return Err(TensorError::DuplicateIndex {
                id: i.id().0,
                prime_level: i.prime_level(),
            });
        }
    }
    Ok(())
}

impl std::ops::Index<usize> for IndexSet {
    type Output = Index;

    #[inline]
    fn index(&self, i: usize) -> &Index {
        &self.inds[i]
    }
}

impl<'a> IntoIterator for &'a IndexSet {
    type Item = &'a Index;
    type IntoIter = std::slice::Iter<'a, Index>;

    fn into_iter(self) -> Self::IntoIter {
        self.inds.iter()
    }
}

/// Set equality: same rank and every index of one is found in the other.
impl PartialEq for IndexSet {
    fn eq(&self, other: &Self) -> bool {
        self.r() == other.r() && self.inds.iter().all(|i| other.contains(i))
    }
}

impl Eq for IndexSet {}
