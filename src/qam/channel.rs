//! AWGN channel.
//!
//! Each symbol gets two independent zero-mean Gaussian draws, one for the
//! in-phase rail and one for the quadrature rail.

use crate::qam::error::{QamError, Result};
use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone)]
pub struct AwgnChannel {
    variance: f64,
    distr: Normal<f64>,
}

impl AwgnChannel {
    /// Per-axis standard deviation is `sqrt(variance)`.
    pub fn new(variance: f64) -> Result<Self> {
        if !variance.is_finite() || variance < 0.0 {
            return Err(QamError::DegenerateParameter(variance));
        }
        let distr = Normal::new(0.0, variance.sqrt())
            .map_err(|_| QamError::DegenerateParameter(variance))?;

        Ok(Self { variance, distr })
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn std_dev(&self) -> f64 {
        self.distr.std_dev()
    }

    /// Returns a perturbed copy of `symbols`; the input is left untouched.
    pub fn add_noise<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        symbols: &[Complex64],
    ) -> Vec<Complex64> {
        symbols
            .iter()
            .map(|s| {
                let re = self.distr.sample(rng);
                let im = self.distr.sample(rng);
                Complex64::new(s.re + re, s.im + im)
            })
            .collect()
    }
}

pub fn add_noise<R: Rng + ?Sized>(
    variance: f64,
    symbols: &[Complex64],
    rng: &mut R,
) -> Result<Vec<Complex64>> {
    Ok(AwgnChannel::new(variance)?.add_noise(rng, symbols))
}
