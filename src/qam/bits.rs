use rand::Rng;

/// Uniform random 0/1 sequence
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len)
        .map(|_| rng.random_range(0..=1u8))
        .collect()
}

/// Mismatches over the length of `original`; missing recovered bits count as errors.
pub fn count_bit_errors(original: &[u8], recovered: &[u8]) -> usize {
    let mismatched = original
        .iter()
        .zip(recovered.iter())
        .filter(|(a, b)| a != b)
        .count();
    mismatched + original.len().saturating_sub(recovered.len())
}

pub fn bit_error_rate(original: &[u8], recovered: &[u8]) -> f64 {
    if original.is_empty() {
        return 0.0;
    }
    count_bit_errors(original, recovered) as f64 / original.len() as f64
}

pub fn bits_to_string(bits: &[u8]) -> String {
    bits.iter()
        .map(|&b| if b == 0 { '0' } else { '1' })
        .collect()
}
