//! BER sweep driver.
//!
//! One sweep modulates a bit realization once and then, for every noise
//! level in input order, pushes the *clean* symbols through a fresh AWGN
//! draw, demodulates, and counts bit errors against the original bits.
//! Levels never see each other's noise.
//!
//! Each [`Experiment`] owns its RNG, so independent sweeps can run on
//! separate threads (see [`run_batch`]) and a seeded sweep is reproducible.

use crate::qam::{
    bits::{bit_error_rate, count_bit_errors, random_bits},
    channel::AwgnChannel,
    constellation::ModulationOrder,
    demodulator::Demodulator,
    error::{QamError, Result},
    modulator::Modulator,
};
use crate::utils::consts::{DEFAULT_NOISE_VARIANCES, DEFAULT_NUM_BITS, DEFAULT_ORDER};
use num_complex::Complex64;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Modulation order M
    pub order: usize,
    /// Bits per trial
    pub num_bits: usize,
    /// Noise variances, swept in this order
    pub noise_variances: Vec<f64>,
    /// `None` draws the seed from the OS
    pub seed: Option<u64>,
    /// Independent repetitions averaged into each point
    pub trials: usize,
    /// Keep raw symbols and bits of the first trial
    pub keep_traces: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            num_bits: DEFAULT_NUM_BITS,
            noise_variances: DEFAULT_NOISE_VARIANCES.to_vec(),
            seed: None,
            trials: 1,
            keep_traces: false,
        }
    }
}

impl SweepConfig {
    pub fn new(order: usize, num_bits: usize, noise_variances: Vec<f64>) -> Self {
        Self {
            order,
            num_bits,
            noise_variances,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_traces(mut self, keep_traces: bool) -> Self {
        self.keep_traces = keep_traces;
        self
    }

    /// Checks the order first so nothing is generated for a bad M.
    pub fn validate(&self) -> Result<ModulationOrder> {
        let order = ModulationOrder::try_from(self.order)?;
        let bits_per_symbol = order.bits_per_symbol();

        if self.num_bits == 0 {
            return Err(QamError::invalid_input("bit count must be positive"));
        }
        if self.num_bits % bits_per_symbol != 0 {
            return Err(QamError::invalid_input(format!(
                "Bitstream length must be a multiple of log2(M): got {} bits for {} bits per symbol",
                self.num_bits, bits_per_symbol
            )));
        }
        if self.trials == 0 {
            return Err(QamError::invalid_input("trial count must be positive"));
        }
        if let Some(&bad) = self
            .noise_variances
            .iter()
            .find(|v| !v.is_finite() || **v < 0.0)
        {
            return Err(QamError::DegenerateParameter(bad));
        }

        Ok(order)
    }
}

/// One (noise level, BER) result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    pub noise_variance: f64,
    /// `10*log10(bit_energy / noise_variance)`, `+inf` for a noiseless level
    pub snr_db: f64,
    pub ber: f64,
    pub bit_errors: usize,
    pub total_bits: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelTrace {
    pub noise_variance: f64,
    pub noisy_symbols: Vec<Complex64>,
    pub recovered_bits: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepTrace {
    pub original_bits: Vec<u8>,
    pub clean_symbols: Vec<Complex64>,
    pub levels: Vec<LevelTrace>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepReport {
    pub order: ModulationOrder,
    pub bits_per_symbol: usize,
    pub num_bits: usize,
    pub trials: usize,
    /// Mean |s|^2 of the clean symbols, averaged over trials
    pub symbol_energy: f64,
    pub bit_energy: f64,
    pub points: Vec<SweepPoint>,
    pub trace: Option<SweepTrace>,
}

impl SweepReport {
    /// `(noise_variance, ber)` pairs in input order
    pub fn ber_curve(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.noise_variance, p.ber))
            .collect()
    }

    pub fn snr_curve(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.snr_db, p.ber))
            .collect()
    }
}

struct TrialOutcome {
    symbol_energy: f64,
    bit_errors: Vec<usize>,
    trace: Option<SweepTrace>,
}

pub struct Experiment {
    config: SweepConfig,
    order: ModulationOrder,
    modulator: Modulator,
    demodulator: Demodulator,
    channels: Vec<AwgnChannel>,
    rng: StdRng,
}

impl Experiment {
    pub fn new(config: SweepConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: SweepConfig, rng: StdRng) -> Result<Self> {
        let order = config.validate()?;
        let channels = config
            .noise_variances
            .iter()
            .map(|&v| AwgnChannel::new(v))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            modulator: Modulator::new(order),
            demodulator: Demodulator::new(order),
            order,
            channels,
            config,
            rng,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn order(&self) -> ModulationOrder {
        self.order
    }

    /// Number of progress steps a full run reports
    pub fn total_steps(&self) -> usize {
        self.config.trials * self.channels.len()
    }

    pub fn run(&mut self) -> Result<SweepReport> {
        self.run_with_progress(|_| {})
    }

    /// Runs every trial; `on_step` is called once per (trial, level).
    pub fn run_with_progress<F: FnMut(usize)>(&mut self, mut on_step: F) -> Result<SweepReport> {
        info!(
            "{} sweep: {} bits x {} trial(s), {} noise level(s)",
            self.order,
            self.config.num_bits,
            self.config.trials,
            self.channels.len()
        );

        let mut step = 0;
        let mut energy_sum = 0.0;
        let mut errors = vec![0usize; self.channels.len()];
        let mut trace = None;

        for trial in 0..self.config.trials {
            let bits = random_bits(&mut self.rng, self.config.num_bits);
            let keep = self.config.keep_traces && trial == 0;
            let outcome = self.run_trial(&bits, keep, |_| {
                step += 1;
                on_step(step);
            })?;

            energy_sum += outcome.symbol_energy;
            for (total, e) in errors.iter_mut().zip(outcome.bit_errors) {
                *total += e;
            }
            if outcome.trace.is_some() {
                trace = outcome.trace;
            }
        }

        let report = self.report(
            self.config.num_bits,
            self.config.trials,
            energy_sum / self.config.trials as f64,
            &errors,
            trace,
        );
        info!(
            "{} sweep done: Eb = {:.3}, BER range {:?}",
            self.order,
            report.bit_energy,
            ber_range(&report.points)
        );
        Ok(report)
    }

    /// Single sweep over a caller-supplied bit sequence.
    pub fn run_bits(&mut self, bits: &[u8]) -> Result<SweepReport> {
        if bits.is_empty() {
            return Err(QamError::invalid_input("bit count must be positive"));
        }
        let keep = self.config.keep_traces;
        let outcome = self.run_trial(bits, keep, |_| {})?;
        Ok(self.report(
            bits.len(),
            1,
            outcome.symbol_energy,
            &outcome.bit_errors,
            outcome.trace,
        ))
    }

    fn run_trial<F: FnMut(usize)>(
        &mut self,
        bits: &[u8],
        keep_traces: bool,
        mut on_level: F,
    ) -> Result<TrialOutcome> {
        let clean = self.modulator.modulate(bits)?;
        let symbol_energy = mean_symbol_energy(&clean);

        let mut bit_errors = Vec::with_capacity(self.channels.len());
        let mut levels = Vec::new();

        for (i, channel) in self.channels.iter().enumerate() {
            let noisy = channel.add_noise(&mut self.rng, &clean);
            let recovered = self.demodulator.demodulate(&noisy);
            let errors = count_bit_errors(bits, &recovered);

            debug!(
                "variance {:.3}: {} / {} bit errors (BER {:.4})",
                channel.variance(),
                errors,
                bits.len(),
                bit_error_rate(bits, &recovered)
            );
            bit_errors.push(errors);
            on_level(i);

            if keep_traces {
                levels.push(LevelTrace {
                    noise_variance: channel.variance(),
                    noisy_symbols: noisy,
                    recovered_bits: recovered,
                });
            }
        }

        let trace = keep_traces.then(|| SweepTrace {
            original_bits: bits.to_vec(),
            clean_symbols: clean,
            levels,
        });

        Ok(TrialOutcome {
            symbol_energy,
            bit_errors,
            trace,
        })
    }

    fn report(
        &self,
        num_bits: usize,
        trials: usize,
        symbol_energy: f64,
        errors: &[usize],
        trace: Option<SweepTrace>,
    ) -> SweepReport {
        let bits_per_symbol = self.order.bits_per_symbol();
        let bit_energy = symbol_energy / bits_per_symbol as f64;
        let total_bits = num_bits * trials;

        let points = self
            .channels
            .iter()
            .zip(errors)
            .map(|(channel, &bit_errors)| SweepPoint {
                noise_variance: channel.variance(),
                snr_db: snr_db(bit_energy, channel.variance()),
                ber: bit_errors as f64 / total_bits as f64,
                bit_errors,
                total_bits,
            })
            .collect();

        SweepReport {
            order: self.order,
            bits_per_symbol,
            num_bits,
            trials,
            symbol_energy,
            bit_energy,
            points,
            trace,
        }
    }
}

pub fn mean_symbol_energy(symbols: &[Complex64]) -> f64 {
    if symbols.is_empty() {
        return 0.0;
    }
    symbols.iter().map(|s| s.norm_sqr()).sum::<f64>() / symbols.len() as f64
}

/// Eb/N in dB; a zero variance gives `+inf`.
pub fn snr_db(bit_energy: f64, noise_variance: f64) -> f64 {
    10.0 * (bit_energy / noise_variance).log10()
}

fn ber_range(points: &[SweepPoint]) -> Option<(f64, f64)> {
    points.iter().map(|p| p.ber).fold(None, |acc, ber| match acc {
        None => Some((ber, ber)),
        Some((lo, hi)) => Some((lo.min(ber), hi.max(ber))),
    })
}

pub fn run_sweep(
    m: usize,
    num_bits: usize,
    noise_variances: &[f64],
    seed: Option<u64>,
) -> Result<SweepReport> {
    let config = SweepConfig {
        seed,
        ..SweepConfig::new(m, num_bits, noise_variances.to_vec())
    };
    Experiment::new(config)?.run()
}

/// Runs one sweep per order on scoped threads, results in `orders` order.
///
/// With a base seed, order `i` is seeded with `seed + i`.
pub fn run_batch(base: &SweepConfig, orders: &[usize]) -> Vec<Result<SweepReport>> {
    let configs: Vec<SweepConfig> = orders
        .iter()
        .enumerate()
        .map(|(i, &order)| SweepConfig {
            order,
            seed: base.seed.map(|s| s.wrapping_add(i as u64)),
            ..base.clone()
        })
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = configs
            .into_iter()
            .map(|config| {
                scope.spawn(move || -> Result<SweepReport> {
                    Experiment::new(config)?.run()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}
