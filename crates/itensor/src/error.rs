//! Error types for itensor.

use thiserror::Error;

/// Errors that can occur in tensor operations.
///
/// Low-level primitives ([`Range`](crate::range::Range) construction and the
/// matrix-shaped GEMM kernels) panic on violated preconditions. Everything
/// from the tensor-level `gemm`/`contract` up to [`ITensor`](crate::ITensor)
/// reports failures through this type.
#[derive(Debug, Error)]
pub enum TensorError {
    /// Shape mismatch between data length and expected size.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for tensor with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Operation requires specific tensor rank.
    #[error("expected tensor of rank {expected}, got rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Two axes that are summed over have different extents.
    #[error("dimension mismatch on contracted axis: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// An index appears more than once in an index set.
    #[error("duplicate index (id {id}, prime level {prime_level})")]
    DuplicateIndex { id: u64, prime_level: u32 },

    /// A requested index is not part of the index set.
    #[error("index (id {id}, prime level {prime_level}) not found")]
    IndexNotFound { id: u64, prime_level: u32 },

    /// Two tensors were combined whose index sets differ.
    #[error("index sets do not match: rank {left} vs rank {right}")]
    IndexSetMismatch { left: usize, right: usize },

    /// The tensor has no storage.
    #[error("{operation}: tensor is empty (default constructed)")]
    EmptyTensor { operation: &'static str },

    /// No implementation exists for this combination of storage kinds.
    #[error("operation not defined for this data subtype: {operation} on {kinds}")]
    UnsupportedDataKind {
        operation: &'static str,
        kinds: String,
    },

    /// A real value was requested from an element with nonzero imaginary part.
    #[error("element is complex (imaginary part {imag})")]
    ComplexValue { imag: f64 },

    /// A scalar was requested from a tensor that has non-trivial indices.
    #[error("tensor is not a scalar: it has {rank} non-trivial indices")]
    NotScalar { rank: usize },

    /// Cannot rescale the storage to a zero scale factor.
    #[error("cannot scale tensor data to a zero scale factor")]
    ZeroScale,

    /// The scale factor exceeds the range of `f64`.
    #[error("scale factor too large to represent as f64 (log magnitude {log_magnitude})")]
    TooBigForReal { log_magnitude: f64 },

    /// Operands of a GEMM call use different storage orders.
    #[error("storage order mismatch between GEMM operands")]
    OrderMismatch,

    /// Malformed contraction annotation.
    #[error("invalid contraction annotation: {message}")]
    InvalidAnnotation { message: String },
}

impl TensorError {
    pub(crate) fn annotation(message: impl Into<String>) -> Self {
        TensorError::InvalidAnnotation {
            message: message.into(),
        }
    }
}
