//! Scalar arithmetic on [`ITensor`].
//!
//! Real factors only touch the lazy scale; the buffer is left alone.

use std::ops::{Div, DivAssign, Mul, MulAssign, Neg};
use std::rc::Rc;

use super::ITensor;
use crate::lognumber::LogNumber;
use crate::scalar::c64;

impl MulAssign<f64> for ITensor {
    /// A zero factor sets the scale to zero and leaves the buffer as is.
    fn mul_assign(&mut self, fac: f64) {
        if fac == 0.0 {
            self.scale = LogNumber::zero();
        } else {
            self.scale *= fac;
        }
    }
}

impl DivAssign<f64> for ITensor {
    /// # Panics
    ///
    /// Panics if `fac` is zero.
    fn div_assign(&mut self, fac: f64) {
        self.scale = self.scale / LogNumber::from_real(fac);
    }
}

impl MulAssign<c64> for ITensor {
    /// A purely real factor goes to the scale; anything else multiplies the
    /// (detached) buffer, promoting it to complex.
    fn mul_assign(&mut self, z: c64) {
        if z.im == 0.0 {
            *self *= z.re;
        } else if let Some(store) = &mut self.store {
            Rc::make_mut(store).mult_complex(z);
        }
    }
}

impl DivAssign<c64> for ITensor {
    /// # Panics
    ///
    /// Panics if `z` is zero.
    fn div_assign(&mut self, z: c64) {
        if z.im == 0.0 {
            *self /= z.re;
        } else {
            let n = z.re * z.re + z.im * z.im;
            *self *= c64::new(z.re / n, -z.im / n);
        }
    }
}

impl Mul<f64> for ITensor {
    type Output = ITensor;

    fn mul(mut self, fac: f64) -> ITensor {
        self *= fac;
        self
    }
}

impl Mul<ITensor> for f64 {
    type Output = ITensor;

    fn mul(self, mut t: ITensor) -> ITensor {
        t *= self;
        t
    }
}

impl Div<f64> for ITensor {
    type Output = ITensor;

    fn div(mut self, fac: f64) -> ITensor {
        self /= fac;
        self
    }
}

impl Neg for ITensor {
    type Output = ITensor;

    fn neg(mut self) -> ITensor {
        self.scale = -self.scale;
        self
    }
}
