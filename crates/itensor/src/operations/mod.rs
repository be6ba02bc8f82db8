//! Tensor operations.
//!
//! ```text
//! Level 1: High-level API (permutedims, norm)
//!     → allocate output
//!     → call in-place version
//!
//! Level 2: In-place API (permutedims_into, add_permuted)
//!     → walk strided views
//! ```

mod elementwise;
mod norm;
mod permutedims;

pub use elementwise::{add_permuted, conj_inplace, scale_inplace};
pub use norm::{norm, norm_factors, norm_sqr};
pub(crate) use norm::norm_factors_of;
pub use permutedims::{permutedims, permutedims_into};
