//! Scalar trait for tensor element types.

use faer_traits::ComplexField;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

pub use faer::{c32, c64};

/// Trait for scalar types supported by itensor.
///
/// This wraps faer's `ComplexField` with the arithmetic bounds used by the
/// generic GEMM kernels. The four implementors (`f32`, `f64`, `c32`, `c64`)
/// are exactly the element types the accelerated backend handles.
pub trait Scalar:
    ComplexField
    + Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + MulAssign
    + 'static
{
    /// The real type associated with this scalar.
    type Real: Scalar;

    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    /// Converts a real number into this scalar type.
    fn from_f64(x: f64) -> Self;

    /// Widens the value to double-precision complex.
    fn to_c64(self) -> c64;

    /// Complex conjugate (identity for real types).
    fn conjugate(self) -> Self;

    /// Squared modulus, accumulated in double precision.
    fn abs_sqr(self) -> f64;
}

impl Scalar for f32 {
    type Real = f32;

    fn one() -> Self {
        1.0
    }

    fn from_f64(x: f64) -> Self {
        x as f32
    }

    fn to_c64(self) -> c64 {
        c64::new(self as f64, 0.0)
    }

    fn conjugate(self) -> Self {
        self
    }

    fn abs_sqr(self) -> f64 {
        (self as f64) * (self as f64)
    }
}

impl Scalar for f64 {
    type Real = f64;

    fn one() -> Self {
        1.0
    }

    fn from_f64(x: f64) -> Self {
        x
    }

    fn to_c64(self) -> c64 {
        c64::new(self, 0.0)
    }

    fn conjugate(self) -> Self {
        self
    }

    fn abs_sqr(self) -> f64 {
        self * self
    }
}

impl Scalar for c32 {
    type Real = f32;

    fn one() -> Self {
        c32::new(1.0, 0.0)
    }

    fn from_f64(x: f64) -> Self {
        c32::new(x as f32, 0.0)
    }

    fn to_c64(self) -> c64 {
        c64::new(self.re as f64, self.im as f64)
    }

    fn conjugate(self) -> Self {
        c32::new(self.re, -self.im)
    }

    fn abs_sqr(self) -> f64 {
        let (re, im) = (self.re as f64, self.im as f64);
        re * re + im * im
    }
}

impl Scalar for c64 {
    type Real = f64;

    fn one() -> Self {
        c64::new(1.0, 0.0)
    }

    fn from_f64(x: f64) -> Self {
        c64::new(x, 0.0)
    }

    fn to_c64(self) -> c64 {
        self
    }

    fn conjugate(self) -> Self {
        c64::new(self.re, -self.im)
    }

    fn abs_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}
