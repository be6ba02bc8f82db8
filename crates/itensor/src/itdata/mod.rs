//! Type-erased tensor payloads.
//!
//! An [`ITensor`](crate::ITensor) does not know statically whether its
//! elements are real or complex, or whether it holds a full buffer or a
//! single number. [`ITData`] is the closed set of payloads it can hold:
//!
//! | variant          | contents        |
//! |------------------|-----------------|
//! | `RealDense`      | `Tensor<f64>`   |
//! | `ComplexDense`   | `Tensor<c64>`   |
//! | `ScalarReal`     | `f64`           |
//! | `ScalarComplex`  | `c64`           |
//!
//! Unary operations match on `self`; binary ones (see `binary.rs`) match on
//! the pair. An operation that needs a wider type replaces `*self` with the
//! promoted variant.

mod binary;

use std::fmt;

use crate::error::TensorError;
use crate::operations::{conj_inplace, norm_factors, norm_factors_of, norm_sqr};
use crate::scalar::c64;
use crate::tensor::Tensor;

/// Tensor payload with dynamic element type and storage kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ITData {
    RealDense(Tensor<f64>),
    ComplexDense(Tensor<c64>),
    ScalarReal(f64),
    ScalarComplex(c64),
}

/// Discriminant of an [`ITData`], used in error messages and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    RealDense,
    ComplexDense,
    ScalarReal,
    ScalarComplex,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataKind::RealDense => "ITDense<Real>",
            DataKind::ComplexDense => "ITDense<Complex>",
            DataKind::ScalarReal => "ITScalar<Real>",
            DataKind::ScalarComplex => "ITScalar<Complex>",
        };
        f.write_str(name)
    }
}

impl Default for ITData {
    fn default() -> Self {
        ITData::ScalarReal(0.0)
    }
}

impl From<Tensor<f64>> for ITData {
    fn from(t: Tensor<f64>) -> Self {
        ITData::RealDense(t)
    }
}

impl From<Tensor<c64>> for ITData {
    fn from(t: Tensor<c64>) -> Self {
        ITData::ComplexDense(t)
    }
}

impl ITData {
    /// Zero-filled real dense payload.
    pub fn real_dense(extents: &[usize]) -> Self {
        ITData::RealDense(Tensor::zeros(extents))
    }

    pub fn kind(&self) -> DataKind {
        match self {
            ITData::RealDense(_) => DataKind::RealDense,
            ITData::ComplexDense(_) => DataKind::ComplexDense,
            ITData::ScalarReal(_) => DataKind::ScalarReal,
            ITData::ScalarComplex(_) => DataKind::ScalarComplex,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, ITData::ComplexDense(_) | ITData::ScalarComplex(_))
    }

    /// Extents of the storage axes (empty for scalar payloads).
    pub fn extents(&self) -> Vec<usize> {
        match self {
            ITData::RealDense(t) => t.shape().to_vec(),
            ITData::ComplexDense(t) => t.shape().to_vec(),
            ITData::ScalarReal(_) | ITData::ScalarComplex(_) => Vec::new(),
        }
    }

    /// Number of storage axes.
    pub fn rank(&self) -> usize {
        match self {
            ITData::RealDense(t) => t.ndim(),
            ITData::ComplexDense(t) => t.ndim(),
            ITData::ScalarReal(_) | ITData::ScalarComplex(_) => 0,
        }
    }

    /// Replace a real payload by its complex counterpart.
    pub(crate) fn promote(&mut self) {
        if !self.is_complex() {
            log::debug!("promoting {} to complex", self.kind());
        }
        match self {
            ITData::RealDense(t) => *self = ITData::ComplexDense(t.map(|x| c64::new(x, 0.0))),
            ITData::ScalarReal(x) => *self = ITData::ScalarComplex(c64::new(*x, 0.0)),
            ITData::ComplexDense(_) | ITData::ScalarComplex(_) => {}
        }
    }

    pub fn fill_real(&mut self, x: f64) {
        match self {
            ITData::RealDense(t) => t.fill(x),
            ITData::ComplexDense(t) => t.fill(c64::new(x, 0.0)),
            ITData::ScalarReal(v) => *v = x,
            ITData::ScalarComplex(v) => *v = c64::new(x, 0.0),
        }
    }

    /// Fill with a complex value, promoting real payloads.
    pub fn fill_complex(&mut self, z: c64) {
        match self {
            ITData::RealDense(t) => *self = ITData::ComplexDense(t.map(|_| z)),
            ITData::ComplexDense(t) => t.fill(z),
            ITData::ScalarReal(_) => *self = ITData::ScalarComplex(z),
            ITData::ScalarComplex(v) => *v = z,
        }
    }

    /// Overwrite every element with successive calls to `f`.
    pub fn generate_real<F: FnMut() -> f64>(&mut self, mut f: F) {
        match self {
            ITData::RealDense(t) => t.generate(f),
            ITData::ComplexDense(t) => t.generate(|| c64::new(f(), 0.0)),
            ITData::ScalarReal(v) => *v = f(),
            ITData::ScalarComplex(v) => *v = c64::new(f(), 0.0),
        }
    }

    pub fn generate_complex<F: FnMut() -> c64>(&mut self, mut f: F) {
        match self {
            ITData::RealDense(t) => *self = ITData::ComplexDense(t.map(|_| f())),
            ITData::ComplexDense(t) => t.generate(f),
            ITData::ScalarReal(_) => *self = ITData::ScalarComplex(f()),
            ITData::ScalarComplex(v) => *v = f(),
        }
    }

    pub fn mult_real(&mut self, x: f64) {
        let z = c64::new(x, 0.0);
        match self {
            ITData::RealDense(t) => t.map_inplace(|v| v * x),
            ITData::ComplexDense(t) => t.map_inplace(|v| v * z),
            ITData::ScalarReal(v) => *v *= x,
            ITData::ScalarComplex(v) => *v *= z,
        }
    }

    /// Multiply by a complex number, promoting real payloads.
    pub fn mult_complex(&mut self, z: c64) {
        match self {
            ITData::RealDense(t) => {
                *self = ITData::ComplexDense(t.map(|x| c64::new(x, 0.0) * z));
            }
            ITData::ComplexDense(t) => t.map_inplace(|v| v * z),
            ITData::ScalarReal(v) => *self = ITData::ScalarComplex(c64::new(*v, 0.0) * z),
            ITData::ScalarComplex(v) => *v *= z,
        }
    }

    /// Apply a real function to every element.
    ///
    /// # Errors
    ///
    /// `UnsupportedDataKind` on complex payloads.
    pub fn map_real<F: FnMut(f64) -> f64>(&mut self, mut f: F) -> Result<(), TensorError> {
        match self {
            ITData::RealDense(t) => t.map_inplace(f),
            ITData::ScalarReal(v) => *v = f(*v),
            ITData::ComplexDense(_) | ITData::ScalarComplex(_) => {
                return Err(self.unsupported("map_real"));
            }
        }
        Ok(())
    }

    /// Apply a complex function to every element, promoting real payloads.
    pub fn map_complex<F: FnMut(c64) -> c64>(&mut self, mut f: F) {
        match self {
            ITData::RealDense(t) => {
                *self = ITData::ComplexDense(t.map(|x| f(c64::new(x, 0.0))));
            }
            ITData::ComplexDense(t) => t.map_inplace(f),
            ITData::ScalarReal(v) => *self = ITData::ScalarComplex(f(c64::new(*v, 0.0))),
            ITData::ScalarComplex(v) => *v = f(*v),
        }
    }

    /// Call `f` on every element in storage order.
    ///
    /// # Errors
    ///
    /// `UnsupportedDataKind` on complex payloads.
    pub fn visit_real<F: FnMut(f64)>(&self, mut f: F) -> Result<(), TensorError> {
        match self {
            ITData::RealDense(t) => t.data().iter().for_each(|&x| f(x)),
            ITData::ScalarReal(v) => f(*v),
            ITData::ComplexDense(_) | ITData::ScalarComplex(_) => {
                return Err(self.unsupported("visit_real"));
            }
        }
        Ok(())
    }

    /// Call `f` on every element, real values widened to complex.
    pub fn visit_complex<F: FnMut(c64)>(&self, mut f: F) {
        match self {
            ITData::RealDense(t) => t.data().iter().for_each(|&x| f(c64::new(x, 0.0))),
            ITData::ComplexDense(t) => t.data().iter().for_each(|&z| f(z)),
            ITData::ScalarReal(v) => f(c64::new(*v, 0.0)),
            ITData::ScalarComplex(v) => f(*v),
        }
    }

    /// Element at storage coordinate `coord`, widened to complex.
    ///
    /// Scalar payloads take an empty coordinate.
    pub fn get(&self, coord: &[usize]) -> Result<c64, TensorError> {
        match self {
            ITData::RealDense(t) => lookup(t, coord).map(|x| c64::new(x, 0.0)),
            ITData::ComplexDense(t) => lookup(t, coord),
            ITData::ScalarReal(v) => check_scalar_coord(coord).map(|_| c64::new(*v, 0.0)),
            ITData::ScalarComplex(v) => check_scalar_coord(coord).map(|_| *v),
        }
    }

    /// Element at `coord` as a real number.
    ///
    /// # Errors
    ///
    /// `ComplexValue` if the element has a nonzero imaginary part, plus the
    /// coordinate errors of [`get`](Self::get).
    pub fn get_real(&self, coord: &[usize]) -> Result<f64, TensorError> {
        let z = self.get(coord)?;
        if z.im != 0.0 {
            return Err(TensorError::ComplexValue { imag: z.im });
        }
        Ok(z.re)
    }

    pub fn set_real(&mut self, coord: &[usize], x: f64) -> Result<(), TensorError> {
        match self {
            ITData::RealDense(t) => t.set(coord, x),
            ITData::ComplexDense(t) => t.set(coord, c64::new(x, 0.0)),
            ITData::ScalarReal(v) => check_scalar_coord(coord).map(|_| *v = x),
            ITData::ScalarComplex(v) => check_scalar_coord(coord).map(|_| *v = c64::new(x, 0.0)),
        }
    }

    /// Write a complex element, promoting real payloads.
    pub fn set_complex(&mut self, coord: &[usize], z: c64) -> Result<(), TensorError> {
        // Validate first so a bad coordinate leaves the payload untouched.
        self.get(coord)?;
        self.promote();
        match self {
            ITData::ComplexDense(t) => t.set(coord, z),
            ITData::ScalarComplex(v) => {
                *v = z;
                Ok(())
            }
            ITData::RealDense(_) | ITData::ScalarReal(_) => Err(self.unsupported("set_complex")),
        }
    }

    /// Sum of squared moduli of the stored elements.
    pub fn norm_sqr(&self) -> f64 {
        match self {
            ITData::RealDense(t) => norm_sqr(t),
            ITData::ComplexDense(t) => norm_sqr(t),
            ITData::ScalarReal(v) => v * v,
            ITData::ScalarComplex(v) => v.re * v.re + v.im * v.im,
        }
    }

    /// The norm as `(s, r)` with `norm = s * r`, safe from overflow.
    ///
    /// See [`norm_factors`](crate::operations::norm_factors).
    pub fn norm_factors(&self) -> (f64, f64) {
        match self {
            ITData::RealDense(t) => norm_factors(t),
            ITData::ComplexDense(t) => norm_factors(t),
            ITData::ScalarReal(v) => norm_factors_of(std::iter::once(c64::new(*v, 0.0))),
            ITData::ScalarComplex(v) => norm_factors_of(std::iter::once(*v)),
        }
    }

    /// Complex conjugate in place; no-op for real payloads.
    pub fn conj(&mut self) {
        match self {
            ITData::ComplexDense(t) => conj_inplace(t),
            ITData::ScalarComplex(v) => *v = c64::new(v.re, -v.im),
            ITData::RealDense(_) | ITData::ScalarReal(_) => {}
        }
    }

    /// Demote a complex payload whose imaginary parts are all zero.
    ///
    /// Returns whether the payload is real afterwards.
    pub fn to_real_if_possible(&mut self) -> bool {
        match self {
            ITData::ComplexDense(t) => {
                if t.data().iter().any(|z| z.im != 0.0) {
                    return false;
                }
                *self = ITData::RealDense(t.map(|z| z.re));
                true
            }
            ITData::ScalarComplex(v) => {
                if v.im != 0.0 {
                    return false;
                }
                *self = ITData::ScalarReal(v.re);
                true
            }
            ITData::RealDense(_) | ITData::ScalarReal(_) => true,
        }
    }

    /// Dense complex copy of the payload (rank 0 for scalars).
    pub fn to_complex_tensor(&self) -> Tensor<c64> {
        match self {
            ITData::RealDense(t) => t.map(|x| c64::new(x, 0.0)),
            ITData::ComplexDense(t) => t.clone(),
            ITData::ScalarReal(v) => Tensor::scalar(c64::new(*v, 0.0)),
            ITData::ScalarComplex(v) => Tensor::scalar(*v),
        }
    }

    /// Dense real copy of the payload (rank 0 for scalars).
    ///
    /// # Errors
    ///
    /// `ComplexValue` if any element has a nonzero imaginary part.
    pub fn to_real_tensor(&self) -> Result<Tensor<f64>, TensorError> {
        match self {
            ITData::RealDense(t) => Ok(t.clone()),
            ITData::ScalarReal(v) => Ok(Tensor::scalar(*v)),
            ITData::ComplexDense(_) | ITData::ScalarComplex(_) => {
                let mut demoted = self.clone();
                if demoted.to_real_if_possible() {
                    demoted.to_real_tensor()
                } else {
                    let mut imag = 0.0;
                    demoted.visit_complex(|z| {
                        if imag == 0.0 {
                            imag = z.im;
                        }
                    });
                    Err(TensorError::ComplexValue { imag })
                }
            }
        }
    }

    pub(crate) fn unsupported(&self, operation: &'static str) -> TensorError {
        TensorError::UnsupportedDataKind {
            operation,
            kinds: self.kind().to_string(),
        }
    }
}

fn lookup<T: crate::scalar::Scalar>(t: &Tensor<T>, coord: &[usize]) -> Result<T, TensorError> {
    if coord.len() != t.ndim() {
        return Err(TensorError::WrongNumberOfIndices {
            expected: t.ndim(),
            actual: coord.len(),
        });
    }
    for (&i, &dim) in coord.iter().zip(t.shape()) {
        if i >= dim {
            return Err(TensorError::IndexOutOfBounds {
                index: i,
                dim_size: dim,
            });
        }
    }
    Ok(t.data()[t.range().ordinal(coord)])
}

fn check_scalar_coord(coord: &[usize]) -> Result<(), TensorError> {
    if coord.is_empty() {
        Ok(())
    } else {
        Err(TensorError::WrongNumberOfIndices {
            expected: 0,
            actual: coord.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real_2x2() -> ITData {
        ITData::RealDense(Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap())
    }

    #[test]
    fn test_kind_and_extents() {
        let d = real_2x2();
        assert_eq!(d.kind(), DataKind::RealDense);
        assert_eq!(d.extents(), vec![2, 2]);
        assert!(!d.is_complex());
        assert!(ITData::ScalarComplex(c64::new(0.0, 1.0)).is_complex());
        assert!(ITData::ScalarReal(1.0).extents().is_empty());
    }

    #[test]
    fn test_fill_complex_promotes() {
        let mut d = real_2x2();
        d.fill_complex(c64::new(1.0, 1.0));
        assert_eq!(d.kind(), DataKind::ComplexDense);
        assert_eq!(d.get(&[1, 0]).unwrap(), c64::new(1.0, 1.0));

        let mut s = ITData::ScalarReal(2.0);
        s.fill_complex(c64::new(0.0, 3.0));
        assert_eq!(s, ITData::ScalarComplex(c64::new(0.0, 3.0)));
    }

    #[test]
    fn test_mult() {
        let mut d = real_2x2();
        d.mult_real(2.0);
        assert_eq!(d.get_real(&[1, 1]).unwrap(), 8.0);
        d.mult_complex(c64::new(0.0, 1.0));
        assert_eq!(d.kind(), DataKind::ComplexDense);
        assert_eq!(d.get(&[0, 1]).unwrap(), c64::new(0.0, 4.0));
    }

    #[test]
    fn test_map_real_rejects_complex() {
        let mut d = real_2x2();
        d.map_real(|x| x * x).unwrap();
        assert_eq!(d.get_real(&[1, 0]).unwrap(), 9.0);

        let mut c = ITData::ScalarComplex(c64::new(1.0, 1.0));
        let err = c.map_real(|x| x).unwrap_err();
        assert!(matches!(err, TensorError::UnsupportedDataKind { operation: "map_real", .. }));
        assert!(err.to_string().contains("ITScalar<Complex>"));
    }

    #[test]
    fn test_visit() {
        let d = real_2x2();
        let mut sum = 0.0;
        d.visit_real(|x| sum += x).unwrap();
        assert_eq!(sum, 10.0);

        let mut count = 0;
        ITData::ScalarComplex(c64::new(1.0, 2.0)).visit_complex(|_| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_get_errors() {
        let d = real_2x2();
        assert!(matches!(
            d.get(&[2, 0]),
            Err(TensorError::IndexOutOfBounds { index: 2, dim_size: 2 })
        ));
        assert!(matches!(
            d.get(&[0]),
            Err(TensorError::WrongNumberOfIndices { expected: 2, actual: 1 })
        ));
        let c = ITData::ScalarComplex(c64::new(1.0, 0.5));
        assert!(matches!(c.get_real(&[]), Err(TensorError::ComplexValue { .. })));
        assert!(matches!(c.get(&[0]), Err(TensorError::WrongNumberOfIndices { .. })));
    }

    #[test]
    fn test_set_complex_promotes_only_on_success() {
        let mut d = real_2x2();
        assert!(d.set_complex(&[5, 0], c64::new(0.0, 1.0)).is_err());
        assert_eq!(d.kind(), DataKind::RealDense);

        d.set_complex(&[0, 0], c64::new(0.0, 1.0)).unwrap();
        assert_eq!(d.kind(), DataKind::ComplexDense);
        assert_eq!(d.get(&[0, 0]).unwrap(), c64::new(0.0, 1.0));
        assert_eq!(d.get(&[1, 1]).unwrap(), c64::new(4.0, 0.0));
    }

    #[test]
    fn test_conj_and_demote() {
        let mut d = ITData::ComplexDense(
            Tensor::from_vec(vec![c64::new(1.0, 2.0), c64::new(3.0, 0.0)], &[2]).unwrap(),
        );
        d.conj();
        assert_eq!(d.get(&[0]).unwrap(), c64::new(1.0, -2.0));
        assert!(!d.to_real_if_possible());
        assert!(matches!(d.to_real_tensor(), Err(TensorError::ComplexValue { imag }) if imag == -2.0));

        d.set_complex(&[0], c64::new(5.0, 0.0)).unwrap();
        assert!(d.to_real_if_possible());
        assert_eq!(d.kind(), DataKind::RealDense);
        assert_eq!(d.get_real(&[0]).unwrap(), 5.0);
    }

    #[test]
    fn test_norm_sqr() {
        assert_eq!(real_2x2().norm_sqr(), 30.0);
        assert_eq!(ITData::ScalarComplex(c64::new(3.0, 4.0)).norm_sqr(), 25.0);
    }

    #[test]
    fn test_norm_factors() {
        let (s, r) = real_2x2().norm_factors();
        assert_eq!(s, 4.0);
        assert!((s * r - 30.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(ITData::ScalarReal(-1e300).norm_factors(), (1e300, 1.0));
        assert_eq!(ITData::ScalarComplex(c64::new(0.0, 0.0)).norm_factors(), (0.0, 0.0));
    }
}
