//! Tensor norm operations.

use crate::scalar::{Scalar, c64};
use crate::tensor::DenseTensor;

/// Compute the Frobenius norm (L2 norm) of a tensor.
///
/// For a tensor T, returns sqrt(sum(|T_i|^2)) where the sum is over all elements.
/// Squares are taken after dividing by the largest component, so the result
/// is finite whenever the norm itself fits in an `f64`.
///
/// # Example
///
/// ```
/// use itensor::Tensor;
/// use itensor::operations::norm;
///
/// let t = Tensor::from_vec(vec![3.0, 4.0], &[2]).unwrap();
/// assert!((norm(&t) - 5.0).abs() < 1e-10);
/// ```
pub fn norm<ElT: Scalar>(tensor: &DenseTensor<ElT>) -> f64 {
    let (s, r) = norm_factors(tensor);
    s * r
}

/// The norm split as `(s, r)` with `norm = s * r`.
///
/// `s` is the largest real or imaginary component in magnitude and `r` lies
/// in `[1, sqrt(2 * len)]`, so neither factor overflows for finite data.
/// An all-zero tensor gives `(0, 0)`.
pub fn norm_factors<ElT: Scalar>(tensor: &DenseTensor<ElT>) -> (f64, f64) {
    norm_factors_of(tensor.data().iter().map(|x| x.to_c64()))
}

pub(crate) fn norm_factors_of<I>(values: I) -> (f64, f64)
where
    I: Iterator<Item = c64> + Clone,
{
    let s = values
        .clone()
        .map(|z| z.re.abs().max(z.im.abs()))
        .fold(0.0, f64::max);
    if s == 0.0 {
        return (0.0, 0.0);
    }
    if !s.is_finite() {
        return (s, 1.0);
    }
    let ssq: f64 = values
        .map(|z| {
            let (re, im) = (z.re / s, z.im / s);
            re * re + im * im
        })
        .sum();
    (s, ssq.sqrt())
}

/// Compute the squared Frobenius norm of a tensor.
///
/// The sum is accumulated in `f64` whatever the element precision. It
/// overflows once the norm exceeds about `1e154`; use [`norm_factors`] there.
pub fn norm_sqr<ElT: Scalar>(tensor: &DenseTensor<ElT>) -> f64 {
    tensor.data().iter().map(|&x| x.abs_sqr()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm_f64_2d() {
        let t = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        // sqrt(1 + 4 + 9 + 16) = sqrt(30)
        assert_relative_eq!(norm(&t), 30.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_norm_c64() {
        // |3+4i| = 5
        let t = DenseTensor::from_vec(vec![c64::new(3.0, 4.0)], &[1]).unwrap();
        assert_relative_eq!(norm(&t), 5.0, epsilon = 1e-10);

        let t2 = DenseTensor::from_vec(vec![c64::new(1.0, 0.0), c64::new(0.0, 1.0)], &[2]).unwrap();
        assert_relative_eq!(norm_sqr(&t2), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_norm_scalar() {
        let t = DenseTensor::<f64>::zeros(&[]);
        assert_relative_eq!(norm(&t), 0.0);

        let t2 = DenseTensor::from_vec(vec![-5.0], &[]).unwrap();
        assert_relative_eq!(norm(&t2), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_norm_f32_accumulates_in_f64() {
        let t = DenseTensor::<f32>::filled(&[4], 0.5);
        assert_relative_eq!(norm_sqr(&t), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_of_huge_values_is_finite() {
        let t = DenseTensor::from_vec(vec![3e200, -4e200], &[2]).unwrap();
        assert!(norm_sqr(&t).is_infinite());
        assert_relative_eq!(norm(&t), 5e200, max_relative = 1e-14);

        let (s, r) = norm_factors(&DenseTensor::from_vec(vec![c64::new(0.0, 1e300); 4], &[4]).unwrap());
        assert_eq!(s, 1e300);
        assert_relative_eq!(r, 2.0, epsilon = 1e-14);
        assert_eq!(norm_factors(&DenseTensor::<f64>::zeros(&[3])), (0.0, 0.0));
    }
}
