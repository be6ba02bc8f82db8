use crate::scalar::Scalar;

/// Owned, contiguous element buffer.
///
/// Shape and layout belong to the [`Range`](crate::range::Range) stored next
/// to it in [`Tensor`](crate::Tensor); the buffer only holds `area` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<ElT: Scalar> {
    data: Vec<ElT>,
}

impl<ElT: Scalar> Dense<ElT> {
    pub fn filled(len: usize, value: ElT) -> Self {
        Self {
            data: vec![value; len],
        }
    }

    pub fn from_vec(data: Vec<ElT>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[ElT] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [ElT] {
        &mut self.data
    }

    pub fn fill(&mut self, value: ElT) {
        self.data.fill(value);
    }

    /// Discard the contents and hold `len` zeros instead.
    pub fn reset(&mut self, len: usize) {
        self.data.clear();
        self.data.resize(len, ElT::zero());
    }

    pub fn into_vec(self) -> Vec<ElT> {
        self.data
    }
}
