use crate::qam::constellation::{Constellation, ModulationOrder};
use crate::qam::error::{QamError, Result};
use num_complex::Complex64;

/// Maps bit groups straight onto constellation indices (no Gray coding).
pub struct Modulator {
    constellation: Constellation,
}

impl Modulator {
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

    pub fn bits_per_symbol(&self) -> usize {
        self.constellation.bits_per_symbol()
    }

    /// Modulates `bits` MSB-first, one symbol per `bits_per_symbol` chunk.
    ///
    /// The whole input is validated before any symbol is produced.
    pub fn modulate(&self, bits: &[u8]) -> Result<Vec<Complex64>> {
        let bits_per_symbol = self.bits_per_symbol();
        if bits.len() % bits_per_symbol != 0 {
            return Err(QamError::invalid_input(format!(
                "Bitstream length must be a multiple of log2(M): got {} bits for {} bits per symbol",
                bits.len(),
                bits_per_symbol
            )));
        }
        if let Some((i, &bit)) = bits
            .iter()
            .enumerate()
            .find(|(_, b)| **b > 1)
        {
            return Err(QamError::invalid_input(format!(
                "bit {} has value {}, expected 0 or 1",
                i, bit
            )));
        }

        let symbols = bits
            .chunks_exact(bits_per_symbol)
            .map(|chunk| {
                let index = chunk
                    .iter()
                    .fold(0usize, |acc, &bit| (acc << 1) | bit as usize);
                self.constellation.points()[index]
            })
            .collect();

        Ok(symbols)
    }
}

pub fn modulate(m: usize, bits: &[u8]) -> Result<Vec<Complex64>> {
    Modulator::from_order(m)?.modulate(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qpsk_scenario() {
        let symbols = modulate(4, &[0, 0, 1, 1]).unwrap();
        assert_eq!(
            symbols,
            vec![Complex64::new(-1.0, -1.0), Complex64::new(1.0, 1.0)]
        );
    }

    #[test]
    fn test_qam16_row_in_high_bits() {
        // 1010 -> index 10 -> row 2, col 2
        let symbols = modulate(16, &[1, 0, 1, 0]).unwrap();
        assert_eq!(symbols, vec![Complex64::new(1.0, 1.0)]);

        // 0001 -> row 0, col 1
        let symbols = modulate(16, &[0, 0, 0, 1]).unwrap();
        assert_eq!(symbols, vec![Complex64::new(-3.0, -1.0)]);
    }

    #[test]
    fn test_empty_input_yields_no_symbols() {
        assert!(modulate(64, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_length_not_multiple() {
        let err = modulate(16, &[1, 0, 1, 0, 1]).unwrap_err();
        assert!(matches!(err, QamError::InvalidInput(_)));

        let err = modulate(64, &[0; 8]).unwrap_err();
        assert!(matches!(err, QamError::InvalidInput(_)));
    }

    #[test]
    fn test_non_binary_bit_rejected() {
        let err = modulate(4, &[0, 2]).unwrap_err();
        assert!(matches!(err, QamError::InvalidInput(_)));
    }

    #[test]
    fn test_bad_order_checked_first() {
        assert_eq!(
            modulate(8, &[0, 1, 0]),
            Err(QamError::InvalidConfiguration(8))
        );
    }
}
