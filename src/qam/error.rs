//! Error types for the QAM core.
//!
//! Every failure is a deterministic validation failure, so nothing here is
//! retryable. Operations abort before producing any output.

use thiserror::Error;

/// Result type alias for QAM operations
pub type Result<T> = std::result::Result<T, QamError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QamError {
    /// Modulation order outside {4, 16, 64}
    #[error(
        "unsupported modulation order {0}: supported modulations are QPSK (4), QAM16 (16), and QAM64 (64)"
    )]
    InvalidConfiguration(usize),

    /// Malformed bit sequence or sweep request
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Noise variance that cannot be turned into a standard deviation
    #[error("degenerate parameter: noise variance must be finite and non-negative, got {0}")]
    DegenerateParameter(f64),
}

impl QamError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        QamError::InvalidInput(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = QamError::InvalidConfiguration(8);
        assert!(err.to_string().contains("order 8"));

        let err = QamError::DegenerateParameter(-1.5);
        assert!(err.to_string().contains("-1.5"));

        let err = QamError::invalid_input("Bitstream length must be a multiple of log2(M)");
        assert_eq!(
            err.to_string(),
            "invalid input: Bitstream length must be a multiple of log2(M)"
        );
    }
}
