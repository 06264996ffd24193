use crate::qam::constellation::{Constellation, ModulationOrder};
use crate::qam::error::Result;
use num_complex::Complex64;

/// Minimum-distance (maximum-likelihood under AWGN) detector.
pub struct Demodulator {
    constellation: Constellation,
}

impl Demodulator {
    pub fn new(order: ModulationOrder) -> Self {
        Self {
            constellation: Constellation::new(order),
        }
    }

    pub fn from_order(m: usize) -> Result<Self> {
        Ok(Self::new(ModulationOrder::try_from(m)?))
    }

    pub fn constellation(&self) -> &Constellation {
        &self.constellation
    }

    /// Hard decision for each received symbol
    pub fn decide(&self, symbols: &[Complex64]) -> Vec<usize> {
        symbols
            .iter()
            .map(|&s| self.constellation.nearest_index(s))
            .collect()
    }

    /// Recovers `bits_per_symbol` bits per symbol, MSB-first.
    pub fn demodulate(&self, symbols: &[Complex64]) -> Vec<u8> {
        let bits_per_symbol = self.constellation.bits_per_symbol();
        let mut bits = Vec::with_capacity(symbols.len() * bits_per_symbol);

        for index in self.decide(symbols) {
            for j in (0..bits_per_symbol).rev() {
                bits.push(((index >> j) & 1) as u8);
            }
        }

        bits
    }
}

pub fn demodulate(m: usize, symbols: &[Complex64]) -> Result<Vec<u8>> {
    Ok(Demodulator::from_order(m)?.demodulate(symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qam::error::QamError;
    use crate::qam::modulator::modulate;

    #[test]
    fn test_qpsk_scenario() {
        let symbols = [Complex64::new(-1.0, -1.0), Complex64::new(1.0, 1.0)];
        assert_eq!(demodulate(4, &symbols).unwrap(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_every_index_round_trips() {
        for order in ModulationOrder::ALL {
            let demodulator = Demodulator::new(order);
            let points = demodulator.constellation().points().to_vec();
            let indices: Vec<usize> = (0..order.points()).collect();
            assert_eq!(demodulator.decide(&points), indices);
        }
    }

    #[test]
    fn test_small_perturbation_is_absorbed() {
        let bits = vec![1, 0, 1, 1, 0, 1, 1, 1, 0, 0, 1, 0];
        let symbols = modulate(64, &bits).unwrap();
        let nudged: Vec<Complex64> = symbols
            .iter()
            .map(|s| s + Complex64::new(0.4, -0.6))
            .collect();
        assert_eq!(demodulate(64, &nudged).unwrap(), bits);
    }

    #[test]
    fn test_far_outside_snaps_to_corner() {
        let bits = demodulate(16, &[Complex64::new(50.0, -50.0)]).unwrap();
        // row 3, col 0 -> index 12
        assert_eq!(bits, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_unsupported_order() {
        assert_eq!(
            demodulate(32, &[Complex64::new(0.0, 0.0)]),
            Err(QamError::InvalidConfiguration(32))
        );
    }
}
