//! Real numbers stored as sign and log-magnitude.
//!
//! An [`ITensor`](crate::ITensor) keeps its overall scale factor apart from
//! the element buffer. Long contraction chains multiply scales together and
//! would overflow an `f64`; the log representation does not.

use std::fmt;
use std::ops::{Div, Mul, MulAssign, Neg};

use crate::error::TensorError;

/// A real number `sign * exp(lognum)`.
///
/// `sign == 0` is exact zero, in which case `lognum` is ignored.
#[derive(Debug, Clone, Copy)]
pub struct LogNumber {
    lognum: f64,
    sign: i8,
}

impl LogNumber {
    /// Convert from a real number.
    pub fn from_real(x: f64) -> Self {
        if x == 0.0 {
            Self::zero()
        } else {
            Self {
                lognum: x.abs().ln(),
                sign: if x < 0.0 { -1 } else { 1 },
            }
        }
    }

    pub fn one() -> Self {
        Self {
            lognum: 0.0,
            sign: 1,
        }
    }

    pub fn zero() -> Self {
        Self {
            lognum: 0.0,
            sign: 0,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.sign == 0
    }

    /// `-1`, `0` or `+1`.
    #[inline]
    pub fn sign(&self) -> i8 {
        self.sign
    }

    /// Natural log of the magnitude. Meaningless for zero.
    #[inline]
    pub fn log_magnitude(&self) -> f64 {
        self.lognum
    }

    /// Whether the value is exactly one.
    pub fn is_one(&self) -> bool {
        self.sign == 1 && self.lognum == 0.0
    }

    /// The value as an `f64`.
    ///
    /// Magnitudes too small for `f64` come back as zero.
    ///
    /// # Errors
    ///
    /// `TooBigForReal` if the magnitude exceeds `f64::MAX`.
    ///
    /// # Example
    ///
    /// ```
    /// use itensor::LogNumber;
    ///
    /// let x = LogNumber::from_real(-2.0) * LogNumber::from_real(3.0);
    /// assert!((x.real().unwrap() + 6.0).abs() < 1e-12);
    /// ```
    pub fn real(&self) -> Result<f64, TensorError> {
        if self.sign == 0 {
            return Ok(0.0);
        }
        if self.lognum > f64::MAX.ln() {
            return Err(TensorError::TooBigForReal {
                log_magnitude: self.lognum,
            });
        }
        Ok(f64::from(self.sign) * self.lognum.exp())
    }

    /// `|self| < |other|`.
    pub fn magnitude_less_than(&self, other: &LogNumber) -> bool {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => false,
            (true, false) => true,
            (false, true) => false,
            (false, false) => self.lognum < other.lognum,
        }
    }
}

impl Default for LogNumber {
    fn default() -> Self {
        Self::one()
    }
}

impl From<f64> for LogNumber {
    fn from(x: f64) -> Self {
        Self::from_real(x)
    }
}

impl PartialEq for LogNumber {
    fn eq(&self, other: &Self) -> bool {
        self.sign == other.sign && (self.sign == 0 || self.lognum == other.lognum)
    }
}

impl Mul for LogNumber {
    type Output = LogNumber;

    fn mul(self, rhs: LogNumber) -> LogNumber {
        if self.is_zero() || rhs.is_zero() {
            return LogNumber::zero();
        }
        LogNumber {
            lognum: self.lognum + rhs.lognum,
            sign: self.sign * rhs.sign,
        }
    }
}

impl Div for LogNumber {
    type Output = LogNumber;

    /// # Panics
    ///
    /// Panics when dividing by zero.
    fn div(self, rhs: LogNumber) -> LogNumber {
        assert!(!rhs.is_zero(), "LogNumber: division by zero");
        if self.is_zero() {
            return LogNumber::zero();
        }
        LogNumber {
            lognum: self.lognum - rhs.lognum,
            sign: self.sign * rhs.sign,
        }
    }
}

impl MulAssign<f64> for LogNumber {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * LogNumber::from_real(rhs);
    }
}

impl MulAssign for LogNumber {
    fn mul_assign(&mut self, rhs: LogNumber) {
        *self = *self * rhs;
    }
}

impl Neg for LogNumber {
    type Output = LogNumber;

    fn neg(self) -> LogNumber {
        LogNumber {
            lognum: self.lognum,
            sign: -self.sign,
        }
    }
}

impl fmt::Display for LogNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sign {
            0 => write!(f, "0"),
            s => write!(f, "{}exp({})", if s < 0 { "-" } else { "" }, self.lognum),
        }
    }
}
