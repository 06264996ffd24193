use clap::{Args, Parser, Subcommand};
use qamsim_rs::qam::{Experiment, SweepConfig, SweepReport, build_constellation, run_batch};
use qamsim_rs::ui::{self, XAxis, progress::SweepProgress};
use qamsim_rs::utils::consts::{DEFAULT_BATCH_ORDERS, DEFAULT_ORDER, PROGRESS_MIN_STEPS};
use qamsim_rs::utils::dump::{load_sweep_config, write_report_json};
use qamsim_rs::utils::logging::init_logging;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about = "QAM bit-error-rate simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep noise levels for one modulation order
    Sweep {
        /// Modulation order M (4, 16 or 64)
        #[arg(short = 'm', long)]
        order: Option<usize>,
        #[command(flatten)]
        common: CommonArgs,
        /// JSON file with a sweep configuration; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print bits and symbols of the first trial
        #[arg(long)]
        trace: bool,
        #[arg(long, value_enum, default_value_t = XAxis::Variance)]
        x_axis: XAxis,
    },
    /// Run independent sweeps for several orders in parallel
    Batch {
        #[arg(long, value_delimiter = ',')]
        orders: Option<Vec<usize>>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// List the constellation table
    Constellation {
        #[arg(short = 'm', long, default_value_t = DEFAULT_ORDER)]
        order: usize,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Bits generated per trial
    #[arg(short = 'n', long = "bits")]
    num_bits: Option<usize>,
    /// Comma-separated noise variances
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    noise: Option<Vec<f64>>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(short, long)]
    trials: Option<usize>,
    /// Write the report as JSON ("-" for stdout)
    #[arg(long)]
    json: Option<String>,
}

impl CommonArgs {
    fn apply(&self, config: &mut SweepConfig) {
        if let Some(num_bits) = self.num_bits {
            config.num_bits = num_bits;
        }
        if let Some(noise) = &self.noise {
            config.noise_variances = noise.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
    }

    fn quiet(&self) -> bool {
        self.json.as_deref() == Some("-")
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result: Result<(), Box<dyn Error>> = match cli.command {
        Commands::Sweep {
            order,
            common,
            config,
            trace,
            x_axis,
        } => sweep(order, &common, config, trace, x_axis),
        Commands::Batch { orders, common } => batch(orders, &common),
        Commands::Constellation { order } => build_constellation(order)
            .map(|c| ui::print_constellation(&c))
            .map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn sweep(
    order: Option<usize>,
    common: &CommonArgs,
    config_path: Option<PathBuf>,
    trace: bool,
    x_axis: XAxis,
) -> Result<(), Box<dyn Error>> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading sweep configuration from {}", path.display());
            load_sweep_config(path)?
        }
        None => SweepConfig::default(),
    };
    if let Some(order) = order {
        config.order = order;
    }
    common.apply(&mut config);
    config.keep_traces |= trace;

    let quiet = common.quiet();
    let report = run_with_progress(config, !quiet)?;

    if !quiet {
        ui::print_banner();
        ui::print_trace(&report);
        ui::print_report(&report);
        ui::print_chart(&report, x_axis);
    }
    if let Some(dest) = &common.json {
        write_report_json(std::slice::from_ref(&report), dest)?;
    }
    Ok(())
}

fn run_with_progress(config: SweepConfig, show: bool) -> Result<SweepReport, Box<dyn Error>> {
    let mut experiment = Experiment::new(config)?;
    let total = experiment.total_steps();
    let progress = SweepProgress::new(
        total as u64,
        &experiment.order().to_string(),
        show && total >= PROGRESS_MIN_STEPS,
    );

    let report = experiment.run_with_progress(|step| progress.set_position(step as u64))?;
    progress.finish_and_clear();
    Ok(report)
}

fn batch(orders: Option<Vec<usize>>, common: &CommonArgs) -> Result<(), Box<dyn Error>> {
    let orders = orders.unwrap_or_else(|| DEFAULT_BATCH_ORDERS.to_vec());
    let mut base = SweepConfig::default();
    common.apply(&mut base);

    info!("Batch of {} sweeps", orders.len());
    let quiet = common.quiet();
    let mut reports = Vec::new();
    let mut failures = 0;

    if !quiet {
        ui::print_banner();
    }
    for (order, result) in orders.iter().zip(run_batch(&base, &orders)) {
        match result {
            Ok(report) => {
                if !quiet {
                    ui::print_report(&report);
                    ui::print_chart(&report, XAxis::Variance);
                }
                reports.push(report);
            }
            Err(e) => {
                error!("M = {}: {}", order, e);
                failures += 1;
            }
        }
    }

    if let Some(dest) = &common.json {
        write_report_json(&reports, dest)?;
    }
    if failures > 0 {
        return Err(format!("{} of {} sweeps failed", failures, orders.len()).into());
    }
    Ok(())
}
