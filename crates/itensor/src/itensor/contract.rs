//! Contraction of two [`ITensor`]s over their common indices.
//!
//! Planning works on index sets only. Every non-trivial index shared by
//! both operands gets a tag `1..=ncont` in the order it is found; every
//! remaining storage axis gets a fresh tag, first those of `self`, then
//! those of `other`. The tagged payloads are then handed to
//! [`ITData::contract`]. Shared trivial indices are dropped from the result
//! without touching storage.

use std::rc::Rc;

use super::ITensor;
use crate::config::{Config, ScalePolicy};
use crate::error::TensorError;
use crate::index::Index;
use crate::indexset::IndexSet;
use crate::itdata::ITData;

/// Storage annotations and result indices for one contraction.
#[derive(Debug)]
struct Plan {
    lind: Vec<i32>,
    rind: Vec<i32>,
    pind: Vec<i32>,
    result: IndexSet,
}

impl Plan {
    fn new(a: &IndexSet, b: &IndexSet) -> Result<Self, TensorError> {
        let mut lind = vec![0i32; a.rn()];
        let mut rind = vec![0i32; b.rn()];
        let mut ncont = 0;
        for (i, ai) in a.nontrivial().iter().enumerate() {
            if let Some(j) = b.nontrivial().iter().position(|bj| bj == ai) {
                ncont += 1;
                lind[i] = ncont;
                rind[j] = ncont;
            }
        }

        let mut next = ncont;
        for tag in lind.iter_mut().chain(rind.iter_mut()).filter(|t| **t == 0) {
            next += 1;
            *tag = next;
        }
        let pind: Vec<i32> = (ncont + 1..=next).collect();

        let a_free = |i: &&Index| !b.contains(i);
        let b_free = |i: &&Index| !a.contains(i);
        let labels: Vec<Index> = a
            .nontrivial()
            .iter()
            .filter(a_free)
            .chain(b.nontrivial().iter().filter(b_free))
            .chain(a.trivial().iter().filter(a_free))
            .chain(b.trivial().iter().filter(b_free))
            .cloned()
            .collect();
        let result = IndexSet::new(&labels)?;

        log::debug!(
            "contraction plan: rn {}x{}, {} contracted ({} incl. trivial), result rank {}",
            a.rn(),
            b.rn(),
            ncont,
            a.iter().filter(|i| b.contains(i)).count(),
            result.r()
        );
        Ok(Self {
            lind,
            rind,
            pind,
            result,
        })
    }
}

impl ITensor {
    /// Contract with `other` over all common indices, using the default
    /// [`Config`].
    ///
    /// # Example
    ///
    /// ```
    /// use itensor::{ITensor, Index, IndexType};
    ///
    /// let i = Index::new("i", 2, IndexType::Link);
    /// let j = Index::new("j", 3, IndexType::Link);
    /// let mut a = ITensor::new(&[i.clone(), j.clone()]).unwrap();
    /// let mut b = ITensor::new(&[j.clone()]).unwrap();
    /// a.fill(1.0).unwrap();
    /// b.fill(2.0).unwrap();
    ///
    /// let c = a.contract(&b).unwrap();
    /// assert_eq!(c.r(), 1);
    /// assert!((c.real(&[i.val(0)]).unwrap() - 6.0).abs() < 1e-12);
    /// ```
    pub fn contract(&self, other: &ITensor) -> Result<ITensor, TensorError> {
        self.contract_with(other, &Config::default())
    }

    /// Contract with `other` under an explicit configuration.
    ///
    /// The result is written to fresh storage, so `a.contract(&a)` is fine.
    /// Its indices are the uncontracted non-trivial indices of `self`, then
    /// of `other`, then the uncontracted trivial ones in the same order.
    ///
    /// # Errors
    ///
    /// `EmptyTensor` if either side has no storage, `DimensionMismatch` if a
    /// shared index has inconsistent storage extents.
    pub fn contract_with(&self, other: &ITensor, config: &Config) -> Result<ITensor, TensorError> {
        let (Some(lhs), Some(rhs)) = (&self.store, &other.store) else {
            return Err(TensorError::EmptyTensor {
                operation: "contract",
            });
        };
        let plan = Plan::new(&self.is, &other.is)?;
        let data: ITData = lhs.contract(rhs, &plan.lind, &plan.rind, &plan.pind, config)?;

        let mut result = ITensor {
            is: plan.result,
            store: Some(Rc::new(data)),
            scale: self.scale * other.scale,
        };
        if config.scale_policy == ScalePolicy::NormalizeAfterContract {
            result.scale_out_norm()?;
        }
        Ok(result)
    }

    /// `*self = self.contract(other)`.
    pub fn contract_assign(&mut self, other: &ITensor) -> Result<(), TensorError> {
        *self = self.contract(other)?;
        Ok(())
    }
}
