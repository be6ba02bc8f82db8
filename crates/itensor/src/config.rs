//! Explicit configuration threaded through contraction calls.
//!
//! There is no process-wide option state: every decision that affects how a
//! contraction is computed is read from a [`Config`] value passed by the
//! caller (or [`Config::default`]).
//!
//! # Example
//!
//! ```
//! use itensor::{Config, GemmBackend, ScalePolicy};
//!
//! let config = Config::default()
//!     .with_gemm_backend(GemmBackend::Generic)
//!     .with_scale_policy(ScalePolicy::Keep);
//! assert_eq!(config.gemm_backend, GemmBackend::Generic);
//! ```

/// Which matrix-multiply implementation executes GEMM-shaped contractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GemmBackend {
    /// Nested loops over random-access operands. Works on any strided view.
    Generic,
    /// faer's `matmul` on strided matrix views.
    #[default]
    Faer,
}

/// What happens to the lazy scale factor after a contraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalePolicy {
    /// Leave the buffer values untouched.
    Keep,
    /// Divide the buffer by its norm and fold the norm into the scale
    /// factor, so long chains of contractions keep the raw values near one.
    #[default]
    NormalizeAfterContract,
}

/// Contraction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// GEMM implementation.
    pub gemm_backend: GemmBackend,
    /// Scale factor handling after `ITensor` contraction.
    pub scale_policy: ScalePolicy,
}

impl Config {
    /// Replace the GEMM backend.
    pub fn with_gemm_backend(mut self, backend: GemmBackend) -> Self {
        self.gemm_backend = backend;
        self
    }

    /// Replace the scale policy.
    pub fn with_scale_policy(mut self, policy: ScalePolicy) -> Self {
        self.scale_policy = policy;
        self
    }
}
