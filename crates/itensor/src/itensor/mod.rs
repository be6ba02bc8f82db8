//! Index-labeled tensors.
//!
//! An [`ITensor`] pairs an [`IndexSet`] with a shared, type-erased payload
//! ([`ITData`]) and a lazy overall scale factor ([`LogNumber`]). The value
//! of an element is always `stored * scale`.
//!
//! Copies are cheap: cloning an `ITensor` shares the payload, and the first
//! mutation through either copy detaches it (see [`ITensor::solo`]).
//! Sharing is not thread-safe: the payload sits behind an `Rc`, so
//! `ITensor` is `!Send` and `!Sync` and copies sharing one payload cannot
//! cross threads.
//! Storage axes correspond to the non-trivial indices, in `IndexSet` order;
//! indices of dimension 1 carry no axis.
//!
//! # Example
//!
//! ```
//! use itensor::{ITensor, Index, IndexType};
//!
//! let i = Index::new("i", 2, IndexType::Link);
//! let j = Index::new("j", 3, IndexType::Link);
//!
//! let mut a = ITensor::new(&[i.clone(), j.clone()]).unwrap();
//! a.set(&[i.val(1), j.val(2)], 4.0).unwrap();
//! a *= 0.5;
//! let x = a.real(&[j.val(2), i.val(1)]).unwrap();
//! assert!((x - 2.0).abs() < 1e-12);
//! ```

mod add;
mod contract;
mod ops;

use std::rc::Rc;

use crate::error::TensorError;
use crate::index::{Index, IndexType, IndexVal};
use crate::indexset::IndexSet;
use crate::itdata::ITData;
use crate::lognumber::LogNumber;
use crate::range::Order;
use crate::scalar::{Scalar, c64};
use crate::tensor::Tensor;

/// Tensor labeled by indices, with shared storage and a lazy scale factor.
///
/// Not `Send`:
///
/// ```compile_fail
/// fn needs_send<T: Send>() {}
/// needs_send::<itensor::ITensor>();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ITensor {
    is: IndexSet,
    store: Option<Rc<ITData>>,
    scale: LogNumber,
}

impl ITensor {
    /// Tensor with no indices and no storage.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Zero-filled real tensor over `inds`.
    ///
    /// # Errors
    ///
    /// `DuplicateIndex` if an index appears twice.
    pub fn new(inds: &[Index]) -> Result<Self, TensorError> {
        let is = IndexSet::new(inds)?;
        let store = ITData::real_dense(&is.extents());
        Ok(Self {
            is,
            store: Some(Rc::new(store)),
            scale: LogNumber::one(),
        })
    }

    /// Rank-0 tensor holding `x`.
    pub fn scalar(x: f64) -> Self {
        Self::from_parts(IndexSet::default(), ITData::ScalarReal(x))
    }

    /// Rank-0 tensor holding `z`.
    pub fn scalar_complex(z: c64) -> Self {
        Self::from_parts(IndexSet::default(), ITData::ScalarComplex(z))
    }

    /// Wrap an existing payload.
    ///
    /// The payload's axes must line up with the non-trivial indices of
    /// `inds` in the order [`IndexSet::new`] puts them.
    ///
    /// # Errors
    ///
    /// `DuplicateIndex` for repeated indices, `RankMismatch` or
    /// `DimensionMismatch` if the payload does not fit the indices.
    pub fn from_data(inds: &[Index], data: ITData) -> Result<Self, TensorError> {
        let is = IndexSet::new(inds)?;
        let want = is.extents();
        let have = data.extents();
        if want.len() != have.len() {
            return Err(TensorError::RankMismatch {
                expected: want.len(),
                actual: have.len(),
            });
        }
        if let Some((&w, &h)) = want.iter().zip(&have).find(|(w, h)| w != h) {
            return Err(TensorError::DimensionMismatch { left: w, right: h });
        }
        Ok(Self::from_parts(is, data))
    }

    pub(crate) fn from_parts(is: IndexSet, data: ITData) -> Self {
        Self {
            is,
            store: Some(Rc::new(data)),
            scale: LogNumber::one(),
        }
    }

    #[inline]
    pub fn inds(&self) -> &IndexSet {
        &self.is
    }

    /// Number of indices.
    #[inline]
    pub fn r(&self) -> usize {
        self.is.r()
    }

    /// Number of non-trivial indices, i.e. storage axes.
    #[inline]
    pub fn rn(&self) -> usize {
        self.is.rn()
    }

    /// Whether the tensor has no storage.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_none()
    }

    #[inline]
    pub fn scale(&self) -> LogNumber {
        self.scale
    }

    /// The raw payload, without the scale factor applied.
    pub fn data(&self) -> Option<&ITData> {
        self.store.as_deref()
    }

    pub fn is_complex(&self) -> bool {
        self.store.as_ref().is_some_and(|s| s.is_complex())
    }

    /// Whether both tensors point at the same payload.
    pub fn shares_storage_with(&self, other: &ITensor) -> bool {
        match (&self.store, &other.store) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn has_index(&self, index: &Index) -> bool {
        self.is.contains(index)
    }

    fn store(&self, operation: &'static str) -> Result<&ITData, TensorError> {
        self.store
            .as_deref()
            .ok_or(TensorError::EmptyTensor { operation })
    }

    fn store_mut(&mut self, operation: &'static str) -> Result<&mut ITData, TensorError> {
        match &mut self.store {
            Some(rc) => {
                if Rc::strong_count(rc) > 1 {
                    log::debug!("{operation}: copying shared {} payload", rc.kind());
                }
                Ok(Rc::make_mut(rc))
            }
            None => Err(TensorError::EmptyTensor { operation }),
        }
    }

    /// Exclusive access to the payload, copying it first if it is shared.
    ///
    /// The scale factor is not applied to the returned payload.
    ///
    /// # Errors
    ///
    /// `EmptyTensor` if there is no storage.
    pub fn solo(&mut self) -> Result<&mut ITData, TensorError> {
        self.store_mut("solo")
    }

    // Storage coordinate addressed by `ivs`.
    fn coord_of(&self, ivs: &[IndexVal]) -> Result<Vec<usize>, TensorError> {
        if ivs.len() != self.r() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.r(),
                actual: ivs.len(),
            });
        }
        let mut coord = vec![0; self.rn()];
        let mut seen = vec![false; self.r()];
        for iv in ivs {
            let pos = self.is.find(&iv.index).ok_or(TensorError::IndexNotFound {
                id: iv.index.id().0,
                prime_level: iv.index.prime_level(),
            })?;
            if seen[pos] {
                return Err(TensorError::DuplicateIndex {
                    id: iv.index.id().0,
                    prime_level: iv.index.prime_level(),
                });
            }
            seen[pos] = true;
            let dim = self.is[pos].dim();
            if iv.val >= dim {
                return Err(TensorError::IndexOutOfBounds {
                    index: iv.val,
                    dim_size: dim,
                });
            }
            if pos < self.rn() {
                coord[pos] = iv.val;
            }
        }
        Ok(coord)
    }

    /// Real element at `ivs`, one value per index in any order.
    ///
    /// # Errors
    ///
    /// - `WrongNumberOfIndices` unless every index gets exactly one value
    /// - `IndexNotFound` for a foreign index
    /// - `IndexOutOfBounds` for a value beyond the index dimension
    /// - `ComplexValue` if the element has an imaginary part
    pub fn real(&self, ivs: &[IndexVal]) -> Result<f64, TensorError> {
        let coord = self.coord_of(ivs)?;
        let x = self.store("real")?.get_real(&coord)?;
        Ok(x * self.scale.real()?)
    }

    /// Complex element at `ivs`.
    pub fn cplx(&self, ivs: &[IndexVal]) -> Result<c64, TensorError> {
        let coord = self.coord_of(ivs)?;
        let z = self.store("cplx")?.get(&coord)?;
        Ok(z * self.scale.real()?)
    }

    /// Write the element at `ivs`.
    ///
    /// The scale factor is first folded into the buffer, so the written
    /// value is exactly `x`.
    pub fn set(&mut self, ivs: &[IndexVal], x: f64) -> Result<(), TensorError> {
        let coord = self.coord_of(ivs)?;
        self.scale_to(LogNumber::one())?;
        self.store_mut("set")?.set_real(&coord, x)
    }

    /// Write a complex element, promoting a real payload.
    pub fn set_complex(&mut self, ivs: &[IndexVal], z: c64) -> Result<(), TensorError> {
        let coord = self.coord_of(ivs)?;
        self.scale_to(LogNumber::one())?;
        self.store_mut("set_complex")?.set_complex(&coord, z)
    }

    /// Value of a tensor without non-trivial indices.
    ///
    /// # Errors
    ///
    /// `NotScalar` if the tensor has storage axes, `ComplexValue` if the
    /// value is complex.
    pub fn to_real(&self) -> Result<f64, TensorError> {
        if self.rn() != 0 {
            return Err(TensorError::NotScalar { rank: self.rn() });
        }
        let x = self.store("to_real")?.get_real(&[])?;
        Ok(x * self.scale.real()?)
    }

    pub fn to_complex(&self) -> Result<c64, TensorError> {
        if self.rn() != 0 {
            return Err(TensorError::NotScalar { rank: self.rn() });
        }
        let z = self.store("to_complex")?.get(&[])?;
        Ok(z * self.scale.real()?)
    }

    /// Dense copy of the values with one axis per index of `order`.
    ///
    /// `order` must contain every index exactly once. Trivial indices become
    /// axes of extent 1.
    ///
    /// # Errors
    ///
    /// `IndexSetMismatch` if `order` is not the tensor's index set,
    /// `ComplexValue` if any element is complex.
    pub fn elements(&self, order: &[Index]) -> Result<Tensor<f64>, TensorError> {
        let perm = self.axis_order(order)?;
        let data = self.store("elements")?.to_real_tensor()?;
        export(&data, &perm, order, self.scale.real()?)
    }

    /// Complex form of [`elements`](Self::elements).
    pub fn elements_complex(&self, order: &[Index]) -> Result<Tensor<c64>, TensorError> {
        let perm = self.axis_order(order)?;
        let data = self.store("elements_complex")?.to_complex_tensor();
        export(&data, &perm, order, c64::new(self.scale.real()?, 0.0))
    }

    // Storage axis for each non-trivial index of `order`, in that order.
    fn axis_order(&self, order: &[Index]) -> Result<Vec<usize>, TensorError> {
        let wanted = IndexSet::new(order)?;
        if wanted != self.is {
            return Err(TensorError::IndexSetMismatch {
                left: self.r(),
                right: order.len(),
            });
        }
        Ok(order
            .iter()
            .filter(|i| !i.is_trivial())
            .filter_map(|i| self.is.find(i))
            .collect())
    }

    /// Fold the scale factor into the buffer so that `scale == target`.
    ///
    /// A zero scale cannot be divided out: the buffer is zero-filled instead.
    ///
    /// # Errors
    ///
    /// `ZeroScale` if `target` is zero, `TooBigForReal` if the ratio of the
    /// scales overflows.
    pub fn scale_to(&mut self, target: LogNumber) -> Result<(), TensorError> {
        if target.is_zero() {
            return Err(TensorError::ZeroScale);
        }
        if self.scale == target {
            return Ok(());
        }
        if self.scale.is_zero() {
            self.store_mut("scale_to")?.fill_real(0.0);
        } else {
            let ratio = (self.scale / target).real()?;
            self.store_mut("scale_to")?.mult_real(ratio);
        }
        self.scale = target;
        Ok(())
    }

    /// Bring both tensors to a common scale before combining buffers.
    ///
    /// `self` moves to the larger of the two scales when `other`'s is
    /// larger. Returns the factor that puts `other`'s stored values on
    /// `self`'s scale; 0 when `other` is logically zero.
    pub fn equalize_scales(&mut self, other: &ITensor) -> Result<f64, TensorError> {
        if other.scale.is_zero() {
            return Ok(0.0);
        }
        if self.scale.is_zero() {
            self.store_mut("equalize_scales")?.fill_real(0.0);
            self.scale = other.scale;
            return Ok(1.0);
        }
        if self.scale.magnitude_less_than(&other.scale) {
            self.scale_to(other.scale)?;
            return Ok(1.0);
        }
        (other.scale / self.scale).real()
    }

    /// Divide the buffer by its norm and multiply the norm into the scale.
    ///
    /// No-op without storage, when the norm is already 1 or when the buffer
    /// holds non-finite values. The norm is taken as `s * r` (see
    /// [`ITData::norm_factors`]) and never formed as an `f64`, so buffers
    /// whose squared norm overflows are still normalized.
    pub fn scale_out_norm(&mut self) -> Result<(), TensorError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let (s, r) = store.norm_factors();
        if s == 0.0 {
            self.scale = LogNumber::zero();
            return Ok(());
        }
        if !(s.is_finite() && r.is_finite()) {
            log::debug!("scale_out_norm: non-finite values, buffer left as is");
            return Ok(());
        }
        let nrm = LogNumber::from_real(s) * LogNumber::from_real(r);
        if nrm.log_magnitude().abs() < 1e-12 {
            return Ok(());
        }
        let store = self.store_mut("scale_out_norm")?;
        store.mult_real(1.0 / s);
        store.mult_real(1.0 / r);
        self.scale *= nrm;
        Ok(())
    }

    /// Set every element to `x`.
    pub fn fill(&mut self, x: f64) -> Result<(), TensorError> {
        self.store_mut("fill")?.fill_real(x);
        self.scale = LogNumber::one();
        Ok(())
    }

    pub fn fill_complex(&mut self, z: c64) -> Result<(), TensorError> {
        self.store_mut("fill_complex")?.fill_complex(z);
        self.scale = LogNumber::one();
        Ok(())
    }

    /// Set every element to successive values of `f`, in storage order.
    pub fn generate<F: FnMut() -> f64>(&mut self, f: F) -> Result<(), TensorError> {
        self.store_mut("generate")?.generate_real(f);
        self.scale = LogNumber::one();
        Ok(())
    }

    /// Replace every value `x` by `f(x)`.
    ///
    /// # Errors
    ///
    /// `UnsupportedDataKind` on complex tensors.
    pub fn map<F: FnMut(f64) -> f64>(&mut self, f: F) -> Result<(), TensorError> {
        self.scale_to(LogNumber::one())?;
        self.store_mut("map")?.map_real(f)
    }

    pub fn map_complex<F: FnMut(c64) -> c64>(&mut self, f: F) -> Result<(), TensorError> {
        self.scale_to(LogNumber::one())?;
        self.store_mut("map_complex")?.map_complex(f);
        Ok(())
    }

    /// Call `f` on every value (scale applied), in storage order.
    pub fn visit<F: FnMut(f64)>(&self, mut f: F) -> Result<(), TensorError> {
        let scale = self.scale.real()?;
        self.store("visit")?.visit_real(|x| f(x * scale))
    }

    /// Complex conjugate in place.
    pub fn conj(&mut self) -> Result<(), TensorError> {
        if self.store("conj")?.is_complex() {
            self.store_mut("conj")?.conj();
        }
        Ok(())
    }

    /// Frobenius norm of the values.
    pub fn norm(&self) -> Result<f64, TensorError> {
        let (s, r) = self.store("norm")?.norm_factors();
        (LogNumber::from_real(s) * LogNumber::from_real(r) * self.scale)
            .real()
            .map(f64::abs)
    }

    /// Raise the prime level of every index by `inc`.
    pub fn prime(&mut self, inc: u32) -> &mut Self {
        self.is.prime(inc);
        self
    }

    pub fn prime_type(&mut self, kind: IndexType, inc: u32) -> Result<(), TensorError> {
        self.is.prime_type(kind, inc)
    }

    pub fn prime_index(&mut self, index: &Index, inc: u32) -> Result<(), TensorError> {
        self.is.prime_index(index, inc)
    }

    pub fn noprime(&mut self, kind: IndexType) -> Result<(), TensorError> {
        self.is.noprime(kind)
    }

    pub fn noprime_index(&mut self, index: &Index) -> Result<(), TensorError> {
        self.is.noprime_index(index)
    }

    pub fn mapprime(&mut self, old: u32, new: u32, kind: IndexType) -> Result<(), TensorError> {
        self.is.mapprime(old, new, kind)
    }
}

fn export<T: Scalar>(
    data: &Tensor<T>,
    perm: &[usize],
    order: &[Index],
    scale: T,
) -> Result<Tensor<T>, TensorError> {
    let values: Vec<T> = data
        .view()
        .permute(perm)
        .with_iteration_order(Order::RowMajor)
        .iter()
        .map(|x| x * scale)
        .collect();
    let shape: Vec<usize> = order.iter().map(Index::dim).collect();
    Tensor::from_vec(values, &shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn link(name: &str, dim: usize) -> Index {
        Index::new(name, dim, IndexType::Link)
    }

    #[test]
    fn test_new_and_accessors() {
        let i = link("i", 2);
        let t = link("t", 1);
        let j = link("j", 3);
        let a = ITensor::new(&[i.clone(), t.clone(), j.clone()]).unwrap();
        assert_eq!(a.r(), 3);
        assert_eq!(a.rn(), 2);
        assert!(!a.is_empty());
        assert!(!a.is_complex());
        assert!(a.has_index(&t));
        assert_eq!(a.data().unwrap().extents(), vec![2, 3]);
        assert!(a.scale().is_one());

        assert!(ITensor::empty().is_empty());
        assert!(matches!(
            ITensor::new(&[i.clone(), i]),
            Err(TensorError::DuplicateIndex { .. })
        ));
    }

    #[test]
    fn test_element_access_any_order() {
        let i = link("i", 2);
        let t = link("t", 1);
        let j = link("j", 3);
        let mut a = ITensor::new(&[i.clone(), t.clone(), j.clone()]).unwrap();
        a.set(&[t.val(0), j.val(2), i.val(1)], 7.0).unwrap();
        assert_eq!(a.real(&[i.val(1), j.val(2), t.val(0)]).unwrap(), 7.0);
        assert_eq!(a.data().unwrap().get_real(&[1, 2]).unwrap(), 7.0);
        assert_eq!(a.cplx(&[j.val(2), i.val(1), t.val(0)]).unwrap(), c64::new(7.0, 0.0));
    }

    #[test]
    fn test_element_access_errors() {
        let i = link("i", 2);
        let j = link("j", 3);
        let k = link("k", 2);
        let a = ITensor::new(&[i.clone(), j.clone()]).unwrap();
        assert!(matches!(
            a.real(&[i.val(0)]),
            Err(TensorError::WrongNumberOfIndices { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            a.real(&[i.val(0), k.val(0)]),
            Err(TensorError::IndexNotFound { .. })
        ));
        let bad = IndexVal {
            index: j.clone(),
            val: 3,
        };
        assert!(matches!(
            a.real(&[i.val(0), bad]),
            Err(TensorError::IndexOutOfBounds { index: 3, dim_size: 3 })
        ));
        assert!(matches!(
            ITensor::empty().real(&[]),
            Err(TensorError::EmptyTensor { .. })
        ));
        assert!(matches!(
            ITensor::empty().conj(),
            Err(TensorError::EmptyTensor { .. })
        ));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(ITensor::scalar(2.5).to_real().unwrap(), 2.5);
        let z = ITensor::scalar_complex(c64::new(1.0, -1.0));
        assert!(z.is_complex());
        assert!(matches!(z.to_real(), Err(TensorError::ComplexValue { .. })));
        assert_eq!(z.to_complex().unwrap(), c64::new(1.0, -1.0));

        let a = ITensor::new(&[link("i", 2)]).unwrap();
        assert!(matches!(a.to_real(), Err(TensorError::NotScalar { rank: 1 })));

        // Only trivial indices: still a scalar.
        let t = link("t", 1);
        let mut b = ITensor::new(&[t.clone()]).unwrap();
        b.set(&[t.val(0)], 3.0).unwrap();
        assert_eq!(b.to_real().unwrap(), 3.0);
    }

    #[test]
    fn test_from_data_validates_extents() {
        let i = link("i", 2);
        let j = link("j", 3);
        let data = ITData::RealDense(Tensor::ones(&[2, 3]));
        assert!(ITensor::from_data(&[i.clone(), j.clone()], data.clone()).is_ok());
        assert!(matches!(
            ITensor::from_data(&[j.clone(), i.clone()], data.clone()),
            Err(TensorError::DimensionMismatch { left: 3, right: 2 })
        ));
        assert!(matches!(
            ITensor::from_data(&[i], data),
            Err(TensorError::RankMismatch { .. })
        ));
    }

    #[test]
    fn test_copy_on_write() {
        let i = link("i", 3);
        let mut a = ITensor::new(&[i.clone()]).unwrap();
        a.fill(1.0).unwrap();
        let mut b = a.clone();
        assert!(a.shares_storage_with(&b));

        b.set(&[i.val(0)], 5.0).unwrap();
        assert!(!a.shares_storage_with(&b));
        assert_eq!(a.real(&[i.val(0)]).unwrap(), 1.0);
        assert_eq!(b.real(&[i.val(0)]).unwrap(), 5.0);
    }

    #[test]
    fn test_scale_to_and_zero_scale() {
        let i = link("i", 2);
        let mut a = ITensor::new(&[i.clone()]).unwrap();
        a.fill(3.0).unwrap();
        a *= 2.0;
        assert_eq!(a.data().unwrap().get_real(&[0]).unwrap(), 3.0);

        a.scale_to(LogNumber::from_real(4.0)).unwrap();
        assert_relative_eq!(a.data().unwrap().get_real(&[0]).unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(a.real(&[i.val(0)]).unwrap(), 6.0, epsilon = 1e-12);

        assert!(matches!(
            a.scale_to(LogNumber::zero()),
            Err(TensorError::ZeroScale)
        ));

        a *= 0.0;
        assert!(a.scale().is_zero());
        assert_eq!(a.real(&[i.val(1)]).unwrap(), 0.0);
        a.scale_to(LogNumber::one()).unwrap();
        assert_eq!(a.data().unwrap().get_real(&[1]).unwrap(), 0.0);
    }

    #[test]
    fn test_scale_out_norm() {
        let i = link("i", 2);
        let mut a = ITensor::new(&[i.clone()]).unwrap();
        a.generate({
            let mut v = [3.0, 4.0].into_iter();
            move || v.next().unwrap_or(0.0)
        })
        .unwrap();
        a.scale_out_norm().unwrap();
        assert_relative_eq!(a.scale().real().unwrap(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(a.data().unwrap().get_real(&[1]).unwrap(), 0.8, epsilon = 1e-12);
        assert_relative_eq!(a.real(&[i.val(1)]).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(a.norm().unwrap(), 5.0, epsilon = 1e-12);

        let mut z = ITensor::new(&[i]).unwrap();
        z.scale_out_norm().unwrap();
        assert!(z.scale().is_zero());
        assert_eq!(z.norm().unwrap(), 0.0);
    }

    #[test]
    fn test_scale_out_norm_huge_values() {
        let i = link("i", 4);
        let mut a = ITensor::new(&[i.clone()]).unwrap();
        a.fill(1e200).unwrap();
        assert_relative_eq!(a.norm().unwrap(), 2e200, max_relative = 1e-14);

        a.scale_out_norm().unwrap();
        assert_relative_eq!(a.scale().log_magnitude(), 2e200_f64.ln(), max_relative = 1e-14);
        assert_relative_eq!(a.data().unwrap().get_real(&[3]).unwrap(), 0.5, epsilon = 1e-14);
        assert_relative_eq!(a.real(&[i.val(0)]).unwrap(), 1e200, max_relative = 1e-12);

        let mut bad = ITensor::new(&[i.clone()]).unwrap();
        bad.fill(f64::INFINITY).unwrap();
        bad.scale_out_norm().unwrap();
        assert!(bad.scale().is_one());
    }

    #[test]
    fn test_equalize_scales() {
        let i = link("i", 2);
        let mut a = ITensor::new(&[i.clone()]).unwrap();
        a.fill(1.0).unwrap();
        let mut b = a.clone();
        b *= 4.0;

        // Larger other: self moves to other's scale.
        let mut small = a.clone();
        assert_eq!(small.equalize_scales(&b).unwrap(), 1.0);
        assert_eq!(small.scale(), b.scale());
        assert_relative_eq!(small.real(&[i.val(0)]).unwrap(), 1.0, epsilon = 1e-12);

        // Larger self: other's buffer gets a factor.
        let mut big = b.clone();
        assert_relative_eq!(big.equalize_scales(&a).unwrap(), 0.25, epsilon = 1e-12);

        let mut zero = a.clone();
        zero *= 0.0;
        assert_eq!(a.clone().equalize_scales(&zero).unwrap(), 0.0);
        assert_eq!(zero.equalize_scales(&b).unwrap(), 1.0);
        assert_eq!(zero.real(&[i.val(0)]).unwrap(), 0.0);
    }

    #[test]
    fn test_map_and_visit_see_scaled_values() {
        let i = link("i", 3);
        let mut a = ITensor::new(&[i.clone()]).unwrap();
        a.fill(1.0).unwrap();
        a *= 2.0;
        a.map(|x| x + 1.0).unwrap();
        let mut seen = Vec::new();
        a.visit(|x| seen.push(x)).unwrap();
        assert_eq!(seen.len(), 3);
        for x in seen {
            assert_relative_eq!(x, 3.0, epsilon = 1e-12);
        }

        a.map_complex(|z| z * c64::new(0.0, 1.0)).unwrap();
        assert!(a.is_complex());
        assert!(a.map(|x| x).is_err());
        assert!(a.visit(|_| {}).is_err());
        a.conj().unwrap();
        let z = a.cplx(&[i.val(2)]).unwrap();
        assert_relative_eq!(z.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(z.im, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_elements_in_given_order() {
        let i = link("i", 2);
        let t = link("t", 1);
        let j = link("j", 3);
        let mut a = ITensor::new(&[i.clone(), j.clone(), t.clone()]).unwrap();
        a.set(&[i.val(1), j.val(0), t.val(0)], 5.0).unwrap();
        a *= 2.0;

        let e = a.elements(&[j.clone(), t.clone(), i.clone()]).unwrap();
        assert_eq!(e.shape(), &[3, 1, 2]);
        assert_relative_eq!(*e.get(&[0, 0, 1]).unwrap(), 10.0, epsilon = 1e-12);
        assert_eq!(e.data().iter().filter(|&&x| x != 0.0).count(), 1);

        let ec = a.elements_complex(&[i.clone(), j.clone(), t]).unwrap();
        assert_relative_eq!(ec.get(&[1, 0, 0]).unwrap().re, 10.0, epsilon = 1e-12);

        assert!(matches!(
            a.elements(&[i, j]),
            Err(TensorError::IndexSetMismatch { .. })
        ));
    }

    #[test]
    fn test_prime_ops_keep_storage() {
        let i = link("i", 2);
        let s = Index::new("s", 2, IndexType::Site);
        let mut a = ITensor::new(&[i.clone(), s.clone()]).unwrap();
        let b = a.clone();
        a.prime_type(IndexType::Site, 1).unwrap();
        assert!(a.has_index(&s.primed(1)));
        assert!(a.has_index(&i));
        assert!(a.shares_storage_with(&b));

        a.prime(1);
        assert!(a.has_index(&i.primed(1)));
        a.mapprime(2, 0, IndexType::All).unwrap();
        assert!(a.has_index(&s));
        a.noprime(IndexType::All).unwrap();
        assert!(a.has_index(&i));
        a.prime_index(&i, 2).unwrap();
        a.noprime_index(&i.primed(2)).unwrap();
        assert_eq!(a.inds(), b.inds());
        assert!(matches!(
            a.prime_index(&link("k", 2), 1),
            Err(TensorError::IndexNotFound { .. })
        ));
    }
}
