//! Random tensors.
//!
//! [`Tensor`] gets uniform and normal constructors; [`ITensor`] gets a
//! uniform fill in `[-1, 1)`. Every entry point takes the RNG explicitly
//! except the thread-RNG shorthands [`Tensor::random`] and [`Tensor::randn`].

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use rand_distr::StandardNormal;

use crate::error::TensorError;
use crate::index::Index;
use crate::itdata::ITData;
use crate::itensor::ITensor;
use crate::scalar::{Scalar, c64};
use crate::tensor::Tensor;

/// Element types that can be drawn at random.
pub trait RandomScalar: Scalar {
    /// Uniform in `[0, 1)`, independently per real component.
    fn uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Standard normal. Complex values have `E|z|^2 = 1`.
    fn normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomScalar for f64 {
    fn uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardUniform.sample(rng)
    }

    fn normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardNormal.sample(rng)
    }
}

impl RandomScalar for c64 {
    fn uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        c64::new(f64::uniform(rng), f64::uniform(rng))
    }

    fn normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        c64::new(f64::normal(rng) * s, f64::normal(rng) * s)
    }
}

impl<T: RandomScalar> Tensor<T> {
    /// Row-major tensor with entries uniform in `[0, 1)`, from the thread RNG.
    pub fn random(shape: &[usize]) -> Self {
        Self::random_with_rng(shape, &mut rand::rng())
    }

    /// # Example
    ///
    /// ```
    /// use itensor::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let a = Tensor::<f64>::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(1));
    /// let b = Tensor::<f64>::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(1));
    /// assert_eq!(a, b);
    /// ```
    pub fn random_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        Self::from_fn(shape, |_| T::uniform(rng))
    }

    /// Row-major tensor with standard normal entries, from the thread RNG.
    pub fn randn(shape: &[usize]) -> Self {
        Self::randn_with_rng(shape, &mut rand::rng())
    }

    pub fn randn_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        Self::from_fn(shape, |_| T::normal(rng))
    }
}

impl ITensor {
    /// Real tensor over `inds` with values uniform in `[-1, 1)`.
    ///
    /// # Example
    ///
    /// ```
    /// use itensor::{ITensor, Index, IndexType};
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let i = Index::new("i", 4, IndexType::Link);
    /// let t = ITensor::random(&[i.clone()], &mut StdRng::seed_from_u64(7)).unwrap();
    /// t.visit(|x| assert!((-1.0..1.0).contains(&x))).unwrap();
    /// ```
    pub fn random<R: Rng + ?Sized>(inds: &[Index], rng: &mut R) -> Result<Self, TensorError> {
        let mut t = ITensor::new(inds)?;
        t.randomize(rng)?;
        Ok(t)
    }

    /// Overwrite the values with uniform samples in `[-1, 1)`.
    ///
    /// The scale is reset to one and a complex payload becomes real.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), TensorError> {
        if self.is_complex() {
            let is = self.inds().clone();
            let data = ITData::real_dense(&is.extents());
            *self = ITensor::from_parts(is, data);
        }
        self.generate(|| rng.random_range(-1.0..1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_uniform_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        let t = Tensor::<f64>::random_with_rng(&[4, 5], &mut rng);
        assert_eq!(t.shape(), &[4, 5]);
        assert!(t.data().iter().all(|x| (0.0..1.0).contains(x)));

        let z = Tensor::<c64>::random_with_rng(&[6], &mut rng);
        assert!(z.data().iter().all(|z| (0.0..1.0).contains(&z.re) && (0.0..1.0).contains(&z.im)));
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 2000.0;
        let t = Tensor::<f64>::randn_with_rng(&[2000], &mut rng);
        let mean = t.data().iter().sum::<f64>() / n;
        let var = t.data().iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var - 1.0).abs() < 0.15, "variance {var}");

        let z = Tensor::<c64>::randn_with_rng(&[2000], &mut rng);
        let power = z.data().iter().map(|z| z.re * z.re + z.im * z.im).sum::<f64>() / n;
        assert!((power - 1.0).abs() < 0.15, "E|z|^2 = {power}");
    }

    #[test]
    fn test_rank_zero() {
        let t = Tensor::<f64>::random(&[]);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_itensor_random_is_seeded() {
        let i = Index::new("i", 5, IndexType::Link);
        let j = Index::new("j", 4, IndexType::Link);
        let inds = [i.clone(), j.clone()];
        let a = ITensor::random(&inds, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = ITensor::random(&inds, &mut StdRng::seed_from_u64(3)).unwrap();
        let mut n = 0;
        a.visit(|x| {
            assert!((-1.0..1.0).contains(&x));
            n += 1;
        })
        .unwrap();
        assert_eq!(n, 20);
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_randomize_resets_complex_and_scale() {
        let i = Index::new("i", 3, IndexType::Link);
        let mut a = ITensor::new(&[i]).unwrap();
        a *= c64::new(0.0, 1.0);
        a *= 5.0;
        a.randomize(&mut StdRng::seed_from_u64(1)).unwrap();
        assert!(!a.is_complex());
        assert!(a.scale().is_one());
    }
}
