//! itensor - index-labeled dense tensors with contraction by shared labels
//!
//! Tensors are addressed by [`Index`] objects rather than axis positions.
//! Contracting two [`ITensor`]s sums over every index they share; adding
//! them lines up equal indices regardless of order.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Labeled tensors (itensor module)
//!     → ITensor: IndexSet + shared ITData + lazy LogNumber scale
//!
//! Level 2: Type-erased payloads (itdata module)
//!     → ITData: real/complex dense or scalar, double dispatch
//!
//! Level 3: Dense tensors and annotated contraction (tensor, contract)
//!     → Tensor<T> over a Range, strided views, contract by integer tags
//!
//! Level 4: GEMM backends (backend module)
//!     → GenericBackend (loops over strided views)
//!     → faer matmul on strided matrix views
//! ```
//!
//! # Example
//!
//! ```
//! use itensor::{ITensor, Index, IndexType};
//!
//! let i = Index::new("i", 2, IndexType::Link);
//! let j = Index::new("j", 3, IndexType::Link);
//! let k = Index::new("k", 4, IndexType::Link);
//!
//! let mut a = ITensor::new(&[i.clone(), j.clone()]).unwrap();
//! let mut b = ITensor::new(&[k.clone(), j.clone()]).unwrap();
//! a.fill(1.0).unwrap();
//! b.fill(0.5).unwrap();
//!
//! // C(i,k) = Σ_j A(i,j) B(k,j)
//! let c = a.contract(&b).unwrap();
//! assert!(c.has_index(&i) && c.has_index(&k));
//! assert!((c.real(&[k.val(3), i.val(1)]).unwrap() - 1.5).abs() < 1e-12);
//! ```

pub mod backend;
pub mod config;
pub mod contract;
pub mod error;
pub mod index;
pub mod indexset;
pub mod itdata;
pub mod itensor;
pub mod lognumber;
pub mod operations;
pub mod random;
pub mod range;
pub mod scalar;
pub mod storage;
pub mod tensor;

pub use config::{Config, GemmBackend, ScalePolicy};
pub use error::TensorError;
pub use index::{IdGenerator, Index, IndexId, IndexType, IndexVal, RandomIds, SequentialIds};
pub use indexset::IndexSet;
pub use itdata::{DataKind, ITData};
pub use itensor::ITensor;
pub use lognumber::LogNumber;
pub use scalar::{Scalar, c32, c64};
pub use tensor::{DenseTensor, Tensor};
