//! Tensor contraction operations.
//!
//! Axes are matched by integer annotation tags:
//! - a tag in both A and B is contracted (summed over)
//! - a tag in one operand and in C is an output axis
//!
//! # Implementations
//!
//! - [`gemm`]: tensor-level GEMM with transpose flags
//! - [`contract`] / [`contract_into`]: annotation-driven, lowered to one GEMM
//! - [`contract_naive`]: loop-based reference
//!
//! # Example
//!
//! ```
//! use itensor::{Config, Tensor};
//! use itensor::contract::contract;
//!
//! // C[k,i] = A[i,j] * B[j,k]
//! let a = Tensor::<f64>::ones(&[2, 3]);
//! let b = Tensor::<f64>::ones(&[3, 4]);
//! let c = contract(&a, &[1, 2], &b, &[2, 3], &[3, 1], &Config::default()).unwrap();
//! assert_eq!(c.shape(), &[4, 2]);
//! ```

mod dense;
mod gemm;
mod naive;
mod properties;

pub use dense::{contract, contract_into};
pub use gemm::gemm;
pub use naive::contract_naive;
pub use properties::ContractionProperties;
