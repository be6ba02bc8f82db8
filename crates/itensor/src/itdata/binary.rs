//! Double dispatch over pairs of payloads.

use crate::config::Config;
use crate::contract;
use crate::error::TensorError;
use crate::itdata::ITData;
use crate::operations::{add_permuted, permutedims};
use crate::scalar::{Scalar, c64};
use crate::tensor::{Tensor, validate_permutation};

impl ITData {
    /// `self += fac * permute(other, perm)`.
    ///
    /// `perm[i]` is the axis of `other` that lines up with axis `i` of
    /// `self`. A complex `other` promotes a real `self`. Scalar payloads
    /// combine with each other and with rank-0 dense payloads only.
    ///
    /// # Errors
    ///
    /// - `InvalidPermutation` if `perm` does not fit `other`
    /// - `DimensionMismatch` if the permuted extents differ from `self`'s
    /// - `UnsupportedDataKind` for a scalar paired with a dense payload of
    ///   nonzero rank
    pub fn plus_eq(&mut self, other: &ITData, perm: &[usize], fac: f64) -> Result<(), TensorError> {
        if other.is_complex() && !self.is_complex() {
            self.promote();
        }
        match (&mut *self, other) {
            (ITData::RealDense(a), ITData::RealDense(b)) => {
                check_permuted_shape(a, b.shape(), perm)?;
                add_permuted(a, b, perm, fac);
                return Ok(());
            }
            (ITData::ComplexDense(a), ITData::ComplexDense(b)) => {
                check_permuted_shape(a, b.shape(), perm)?;
                add_permuted(a, b, perm, c64::new(fac, 0.0));
                return Ok(());
            }
            (ITData::ComplexDense(a), ITData::RealDense(b)) => {
                check_permuted_shape(a, b.shape(), perm)?;
                add_permuted(a, &b.map(|x| c64::new(x, 0.0)), perm, c64::new(fac, 0.0));
                return Ok(());
            }
            _ => {}
        }

        // At least one side is a scalar payload.
        if self.rank() != 0 || other.rank() != 0 {
            return Err(TensorError::UnsupportedDataKind {
                operation: "plus_eq",
                kinds: format!("{} += {}", self.kind(), other.kind()),
            });
        }
        let y = other.get(&[])?;
        let fac = c64::new(fac, 0.0);
        match self {
            ITData::RealDense(a) => a.data_mut()[0] += (fac * y).re,
            ITData::ComplexDense(a) => a.data_mut()[0] += fac * y,
            ITData::ScalarReal(x) => *x += (fac * y).re,
            ITData::ScalarComplex(x) => *x += fac * y,
        }
        Ok(())
    }

    /// Contract two payloads.
    ///
    /// `lind`, `rind` and `pind` annotate the axes of `self`, `other` and
    /// the result (see [`contract::contract`]). Mixed real/complex dense
    /// pairs are computed in complex arithmetic. A scalar payload scales
    /// the other side, whose axes are then arranged in `pind` order.
    pub fn contract(
        &self,
        other: &ITData,
        lind: &[i32],
        rind: &[i32],
        pind: &[i32],
        config: &Config,
    ) -> Result<ITData, TensorError> {
        let result = match (self, other) {
            (ITData::RealDense(a), ITData::RealDense(b)) => {
                ITData::RealDense(contract::contract(a, lind, b, rind, pind, config)?)
            }
            (ITData::ComplexDense(a), ITData::ComplexDense(b)) => {
                ITData::ComplexDense(contract::contract(a, lind, b, rind, pind, config)?)
            }
            (ITData::RealDense(a), ITData::ComplexDense(b)) => {
                let a = a.map(|x| c64::new(x, 0.0));
                ITData::ComplexDense(contract::contract(&a, lind, b, rind, pind, config)?)
            }
            (ITData::ComplexDense(a), ITData::RealDense(b)) => {
                let b = b.map(|x| c64::new(x, 0.0));
                ITData::ComplexDense(contract::contract(a, lind, &b, rind, pind, config)?)
            }
            (ITData::ScalarReal(_) | ITData::ScalarComplex(_), _) => {
                scaled(other, rind, self, pind)?
            }
            (_, ITData::ScalarReal(_) | ITData::ScalarComplex(_)) => {
                scaled(self, lind, other, pind)?
            }
        };
        Ok(result)
    }

    /// In-place form of [`contract`](Self::contract).
    pub fn contract_eq(
        &mut self,
        other: &ITData,
        lind: &[i32],
        rind: &[i32],
        pind: &[i32],
        config: &Config,
    ) -> Result<(), TensorError> {
        *self = self.contract(other, lind, rind, pind, config)?;
        Ok(())
    }
}

// `data * scalar`, with the axes of `data` (annotated `ind`) rearranged to
// `pind`.
fn scaled(data: &ITData, ind: &[i32], scalar: &ITData, pind: &[i32]) -> Result<ITData, TensorError> {
    if ind.len() != data.rank() {
        return Err(TensorError::WrongNumberOfIndices {
            expected: data.rank(),
            actual: ind.len(),
        });
    }
    let perm = pind
        .iter()
        .map(|tag| ind.iter().position(|t| t == tag))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| TensorError::annotation("result tag not found on the scaled operand"))?;
    validate_permutation(&perm, data.rank())?;

    let mut result = match data {
        ITData::RealDense(t) => ITData::RealDense(permutedims(t, &perm)?),
        ITData::ComplexDense(t) => ITData::ComplexDense(permutedims(t, &perm)?),
        ITData::ScalarReal(_) | ITData::ScalarComplex(_) => data.clone(),
    };
    match scalar {
        ITData::ScalarReal(s) => result.mult_real(*s),
        ITData::ScalarComplex(s) => result.mult_complex(*s),
        ITData::RealDense(_) | ITData::ComplexDense(_) => {
            return Err(scalar.unsupported("contract"));
        }
    }
    Ok(result)
}

fn check_permuted_shape<T: Scalar>(
    dest: &Tensor<T>,
    src_shape: &[usize],
    perm: &[usize],
) -> Result<(), TensorError> {
    validate_permutation(perm, src_shape.len())?;
    if dest.ndim() != perm.len() {
        return Err(TensorError::RankMismatch {
            expected: dest.ndim(),
            actual: perm.len(),
        });
    }
    for (&d, &p) in dest.shape().iter().zip(perm) {
        if d != src_shape[p] {
            return Err(TensorError::DimensionMismatch {
                left: d,
                right: src_shape[p],
            });
        }
    }
    Ok(())
}
