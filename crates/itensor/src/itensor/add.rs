//! Addition of [`ITensor`]s with the same indices in any order.

use super::ITensor;
use crate::error::TensorError;

impl ITensor {
    /// `self += other`.
    ///
    /// `other`'s storage axes are permuted onto `self`'s, so the index order
    /// of the two operands does not matter.
    ///
    /// # Errors
    ///
    /// `IndexSetMismatch` unless both tensors carry the same indices,
    /// `EmptyTensor` if either side has no storage.
    ///
    /// # Example
    ///
    /// ```
    /// use itensor::{ITensor, Index, IndexType};
    ///
    /// let i = Index::new("i", 2, IndexType::Link);
    /// let j = Index::new("j", 3, IndexType::Link);
    /// let mut a = ITensor::new(&[i.clone(), j.clone()]).unwrap();
    /// let mut b = ITensor::new(&[j.clone(), i.clone()]).unwrap();
    /// b.set(&[j.val(2), i.val(0)], 1.5).unwrap();
    ///
    /// a.plus_assign(&b).unwrap();
    /// assert_eq!(a.real(&[i.val(0), j.val(2)]).unwrap(), 1.5);
    /// ```
    pub fn plus_assign(&mut self, other: &ITensor) -> Result<(), TensorError> {
        self.add_scaled(other, 1.0)
    }

    /// `self -= other`.
    pub fn minus_assign(&mut self, other: &ITensor) -> Result<(), TensorError> {
        self.add_scaled(other, -1.0)
    }

    pub fn plus(&self, other: &ITensor) -> Result<ITensor, TensorError> {
        let mut sum = self.clone();
        sum.plus_assign(other)?;
        Ok(sum)
    }

    pub fn minus(&self, other: &ITensor) -> Result<ITensor, TensorError> {
        let mut diff = self.clone();
        diff.minus_assign(other)?;
        Ok(diff)
    }

    fn add_scaled(&mut self, other: &ITensor, sign: f64) -> Result<(), TensorError> {
        let Some(rhs) = other.store.clone() else {
            return Err(TensorError::EmptyTensor { operation: "plus" });
        };
        if self.is_empty() {
            return Err(TensorError::EmptyTensor { operation: "plus" });
        }
        let perm = self.is.permutation_from(&other.is)?;

        let fac = self.equalize_scales(other)?;
        if fac == 0.0 {
            return Ok(());
        }
        self.store_mut("plus")?.plus_eq(&rhs, &perm, sign * fac)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::TensorError;
    use crate::index::{Index, IndexType};
    use crate::itensor::ITensor;
    use crate::scalar::c64;
    use approx::assert_relative_eq;

    fn link(name: &str, dim: usize) -> Index {
        Index::new(name, dim, IndexType::Link)
    }

    fn counting(inds: &[Index]) -> ITensor {
        let mut t = ITensor::new(inds).unwrap();
        let mut n = 0.0;
        t.generate(|| {
            n += 1.0;
            n
        })
        .unwrap();
        t
    }

    #[test]
    fn test_plus_permuted() {
        let i = link("i", 2);
        let j = link("j", 3);
        let a = counting(&[i.clone(), j.clone()]);
        let b = counting(&[j.clone(), i.clone()]);
        let c = a.plus(&b).unwrap();
        for x in 0..2 {
            for y in 0..3 {
                let expect = (x * 3 + y + 1) as f64 + (y * 2 + x + 1) as f64;
                assert_relative_eq!(c.real(&[i.val(x), j.val(y)]).unwrap(), expect, epsilon = 1e-12);
            }
        }
        assert_eq!(a.real(&[i.val(0), j.val(0)]).unwrap(), 1.0);
    }

    #[test]
    fn test_plus_with_different_scales() {
        let i = link("i", 2);
        let mut a = counting(&[i.clone()]);
        let mut b = counting(&[i.clone()]);
        a *= 1e-3;
        b *= 1e3;
        let c = a.plus(&b).unwrap();
        assert_relative_eq!(c.real(&[i.val(1)]).unwrap(), 2e3 + 2e-3, max_relative = 1e-12);
        let d = b.plus(&a).unwrap();
        assert_relative_eq!(d.real(&[i.val(1)]).unwrap(), 2e3 + 2e-3, max_relative = 1e-12);
    }

    #[test]
    fn test_plus_zero_scale_operands() {
        let i = link("i", 2);
        let a = counting(&[i.clone()]);
        let mut z = counting(&[i.clone()]);
        z *= 0.0;
        assert_relative_eq!(a.plus(&z).unwrap().real(&[i.val(1)]).unwrap(), 2.0);
        assert_relative_eq!(z.plus(&a).unwrap().real(&[i.val(1)]).unwrap(), 2.0);
    }

    #[test]
    fn test_minus_self() {
        let i = link("i", 3);
        let mut a = counting(&[i.clone()]);
        let b = a.clone();
        a.minus_assign(&b).unwrap();
        assert_eq!(a.norm().unwrap(), 0.0);
        assert_eq!(b.real(&[i.val(2)]).unwrap(), 3.0);
    }

    #[test]
    fn test_plus_complex() {
        let i = link("i", 2);
        let mut a = counting(&[i.clone()]);
        let mut b = counting(&[i.clone()]);
        b *= c64::new(0.0, 1.0);
        a.plus_assign(&b).unwrap();
        assert!(a.is_complex());
        let z = a.cplx(&[i.val(0)]).unwrap();
        assert_relative_eq!(z.re, 1.0);
        assert_relative_eq!(z.im, 1.0);
    }

    #[test]
    fn test_plus_errors() {
        let i = link("i", 2);
        let j = link("j", 2);
        let a = counting(&[i.clone()]);
        let b = counting(&[j]);
        assert!(matches!(a.plus(&b), Err(TensorError::IndexSetMismatch { .. })));
        assert!(matches!(
            a.plus(&ITensor::empty()),
            Err(TensorError::EmptyTensor { .. })
        ));
        assert!(matches!(
            ITensor::empty().minus(&a),
            Err(TensorError::EmptyTensor { .. })
        ));
    }
}
