/// Log level (overridable with RUST_LOG)
pub const LOG_LEVEL: &str = "info";

// ============================================================================
// Sweep defaults
// ============================================================================

/// Default modulation order (QAM16)
pub const DEFAULT_ORDER: usize = 16;

/// Default number of generated bits per trial
pub const DEFAULT_NUM_BITS: usize = 36;

/// Noise variances swept when none are given
pub const DEFAULT_NOISE_VARIANCES: [f64; 5] = [0.1, 0.5, 1.0, 1.5, 2.0];

/// Orders run by `batch` when none are given
pub const DEFAULT_BATCH_ORDERS: [usize; 3] = [4, 16, 64];

// ============================================================================
// Console output
// ============================================================================

/// Width of the BER bar chart (characters at BER = 1.0)
pub const CHART_WIDTH: usize = 50;

/// Sweeps with fewer steps than this skip the progress bar
pub const PROGRESS_MIN_STEPS: usize = 20;
