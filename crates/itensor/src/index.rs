//! Tensor indices (labels) with identity and prime level.
//!
//! An [`Index`] names one axis of an [`ITensor`](crate::ITensor). Two indices
//! are equal when they share the same identity *and* prime level; the name and
//! type are metadata. Identity is drawn at construction from an
//! [`IdGenerator`], so two indices built with the same name and dimension are
//! still distinct:
//!
//! ```
//! use itensor::{Index, IndexType};
//!
//! let a = Index::new("a", 3, IndexType::Link);
//! let b = Index::new("a", 3, IndexType::Link);
//! assert_ne!(a, b);
//!
//! let ap = a.primed(1);
//! assert_ne!(ap, a);
//! assert_eq!(ap.noprimed(), a);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::Rng;

/// Type tag of an index.
///
/// `All` is a selector accepted by the prime-level operations to mean "any
/// type"; an index itself is never constructed with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    Link,
    Site,
    All,
}

impl IndexType {
    /// Whether an index of type `self` is selected by `selector`.
    #[inline]
    pub fn matches(self, selector: IndexType) -> bool {
        selector == IndexType::All || self == selector
    }
}

/// Runtime identity of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexId(pub u64);

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of index identities.
///
/// Passing a generator explicitly makes identity generation deterministic,
/// which is what tests want. [`Index::new`] uses the thread-local RNG.
pub trait IdGenerator {
    /// Produce the next identity.
    fn next_id(&mut self) -> IndexId;
}

/// Monotonic counter.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// Counter starting at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Counter starting at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> IndexId {
        let id = IndexId(self.next);
        self.next += 1;
        id
    }
}

/// Identities drawn from a caller-supplied (typically seeded) RNG.
#[derive(Debug, Clone)]
pub struct RandomIds<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomIds<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> IdGenerator for RandomIds<R> {
    fn next_id(&mut self) -> IndexId {
        IndexId(self.rng.random())
    }
}

/// Draw an identity from the thread-local RNG.
fn generate_id() -> IndexId {
    IndexId(rand::rng().random())
}

/// A labeled tensor axis.
#[derive(Debug, Clone)]
pub struct Index {
    id: IndexId,
    dim: usize,
    kind: IndexType,
    prime_level: u32,
    name: Arc<str>,
}

impl Index {
    /// Create an index with a fresh random identity.
    ///
    /// # Panics
    ///
    /// Panics if `dim == 0` or `kind == IndexType::All`.
    pub fn new(name: &str, dim: usize, kind: IndexType) -> Self {
        Self::with_id(generate_id(), name, dim, kind)
    }

    /// Create an index whose identity comes from `ids`.
    ///
    /// # Examples
    ///
    /// ```
    /// use itensor::{Index, IndexType, SequentialIds};
    ///
    /// let mut ids = SequentialIds::new();
    /// let i = Index::with_generator(&mut ids, "i", 2, IndexType::Site);
    /// let j = Index::with_generator(&mut ids, "j", 2, IndexType::Site);
    /// assert_eq!(i.id().0, 1);
    /// assert_eq!(j.id().0, 2);
    /// ```
    pub fn with_generator<G: IdGenerator + ?Sized>(
        ids: &mut G,
        name: &str,
        dim: usize,
        kind: IndexType,
    ) -> Self {
        Self::with_id(ids.next_id(), name, dim, kind)
    }

    /// Create an index with an explicit identity.
    ///
    /// # Panics
    ///
    /// Panics if `dim == 0` or `kind == IndexType::All`.
    pub fn with_id(id: IndexId, name: &str, dim: usize, kind: IndexType) -> Self {
        assert!(dim >= 1, "index dimension must be at least 1");
        assert!(
            kind != IndexType::All,
            "IndexType::All is a selector, not a valid index type"
        );
        Self {
            id,
            dim,
            kind,
            prime_level: 0,
            name: Arc::from(name),
        }
    }

    #[inline]
    pub fn id(&self) -> IndexId {
        self.id
    }

    /// Dimension of the axis.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Same as [`Index::dim`].
    #[inline]
    pub fn m(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn kind(&self) -> IndexType {
        self.kind
    }

    #[inline]
    pub fn prime_level(&self) -> u32 {
        self.prime_level
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A trivial index has dimension 1.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.dim == 1
    }

    /// Compare identities, ignoring prime level.
    #[inline]
    pub fn noprime_equals(&self, other: &Index) -> bool {
        self.id == other.id
    }

    /// Increase the prime level by `inc`.
    pub fn prime(&mut self, inc: u32) -> &mut Self {
        self.prime_level += inc;
        self
    }

    /// Increase the prime level by `inc` if this index is selected by `kind`.
    pub fn prime_type(&mut self, kind: IndexType, inc: u32) -> &mut Self {
        if self.kind.matches(kind) {
            self.prime_level += inc;
        }
        self
    }

    /// Reset the prime level to 0.
    pub fn noprime(&mut self) -> &mut Self {
        self.prime_level = 0;
        self
    }

    /// Reset the prime level to 0 if this index is selected by `kind`.
    pub fn noprime_type(&mut self, kind: IndexType) -> &mut Self {
        if self.kind.matches(kind) {
            self.prime_level = 0;
        }
        self
    }

    pub fn set_prime_level(&mut self, level: u32) -> &mut Self {
        self.prime_level = level;
        self
    }

    /// Change the prime level from `old` to `new`.
    ///
    /// Only applies if the current level is `old` and the index is selected
    /// by `kind`.
    pub fn mapprime(&mut self, old: u32, new: u32, kind: IndexType) -> &mut Self {
        if self.prime_level == old && self.kind.matches(kind) {
            self.prime_level = new;
        }
        self
    }

    /// Copy with the prime level increased by `inc`.
    pub fn primed(&self, inc: u32) -> Index {
        let mut i = self.clone();
        i.prime(inc);
        i
    }

    /// Copy with prime level 0.
    pub fn noprimed(&self) -> Index {
        let mut i = self.clone();
        i.noprime();
        i
    }

    /// Pair this index with a value (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `val >= self.dim()`.
    pub fn val(&self, val: usize) -> IndexVal {
        assert!(
            val < self.dim,
            "index value {val} out of range for dimension {}",
            self.dim
        );
        IndexVal {
            index: self.clone(),
            val,
        }
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.prime_level == other.prime_level
    }
}

impl Eq for Index {}

impl Hash for Index {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.prime_level.hash(state);
    }
}

/// An index together with one of its values, used for element access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexVal {
    pub index: Index,
    pub val: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_construction() {
        let i = Index::new("i", 3, IndexType::Link);
        assert_eq!(i.dim(), 3);
        assert_eq!(i.kind(), IndexType::Link);
        assert_eq!(i.prime_level(), 0);
        assert_eq!(i.name(), "i");
        assert!(!i.is_trivial());
        assert!(Index::new("t", 1, IndexType::Site).is_trivial());
    }

    #[test]
    #[should_panic(expected = "dimension must be at least 1")]
    fn test_zero_dim_rejected() {
        let _ = Index::new("bad", 0, IndexType::Link);
    }

    #[test]
    #[should_panic(expected = "selector")]
    fn test_all_type_rejected() {
        let _ = Index::new("bad", 2, IndexType::All);
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::starting_at(10);
        let a = Index::with_generator(&mut ids, "a", 2, IndexType::Link);
        let b = Index::with_generator(&mut ids, "b", 2, IndexType::Link);
        assert_eq!(a.id(), IndexId(10));
        assert_eq!(b.id(), IndexId(11));
    }

    #[test]
    fn test_seeded_ids_reproducible() {
        let mut g1 = RandomIds::new(StdRng::seed_from_u64(7));
        let mut g2 = RandomIds::new(StdRng::seed_from_u64(7));
        for _ in 0..5 {
            assert_eq!(g1.next_id(), g2.next_id());
        }
    }

    #[test]
    fn test_equality_ignores_name_and_type() {
        let a = Index::with_id(IndexId(5), "a", 2, IndexType::Link);
        let b = Index::with_id(IndexId(5), "b", 2, IndexType::Site);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prime_type_selector() {
        let mut s = Index::new("s", 2, IndexType::Site);
        s.prime_type(IndexType::Link, 1);
        assert_eq!(s.prime_level(), 0);
        s.prime_type(IndexType::Site, 2);
        assert_eq!(s.prime_level(), 2);
        s.prime_type(IndexType::All, 1);
        assert_eq!(s.prime_level(), 3);
        s.noprime_type(IndexType::Link);
        assert_eq!(s.prime_level(), 3);
        s.noprime_type(IndexType::All);
        assert_eq!(s.prime_level(), 0);
    }

    #[test]
    fn test_mapprime() {
        let mut l = Index::new("l", 4, IndexType::Link);
        l.prime(2);
        l.mapprime(1, 5, IndexType::All);
        assert_eq!(l.prime_level(), 2);
        l.mapprime(2, 5, IndexType::Site);
        assert_eq!(l.prime_level(), 2);
        l.mapprime(2, 5, IndexType::Link);
        assert_eq!(l.prime_level(), 5);
    }

    #[test]
    fn test_noprime_equals() {
        let a = Index::new("a", 2, IndexType::Link);
        let ap = a.primed(3);
        assert_ne!(a, ap);
        assert!(a.noprime_equals(&ap));
    }

    #[test]
    fn test_val() {
        let a = Index::new("a", 3, IndexType::Link);
        let iv = a.val(2);
        assert_eq!(iv.index, a);
        assert_eq!(iv.val, 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_val_out_of_range() {
        let a = Index::new("a", 3, IndexType::Link);
        let _ = a.val(3);
    }
}
