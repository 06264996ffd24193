pub mod progress;

use crate::qam::{Constellation, SweepReport, bits::bits_to_string};
use crate::utils::consts::CHART_WIDTH;
use num_complex::Complex64;

/// Horizontal axis of the BER chart
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum XAxis {
    /// Noise variance
    Variance,
    /// Eb/N in dB
    Snr,
}

pub fn print_banner() {
    println!("QamSim-rs");
}

pub fn print_report(report: &SweepReport) {
    println!(
        "{} ({} bits/symbol), {} bits x {} trial(s)",
        report.order, report.bits_per_symbol, report.num_bits, report.trials
    );
    println!(
        "Symbol energy {:.3}, bit energy {:.3}",
        report.symbol_energy, report.bit_energy
    );
    println!("Noise Variance\tSNR (dB)\tBit Error Rate (BER)");
    for p in &report.points {
        println!(
            "{:.2}\t\t{}\t\t{:.4}",
            p.noise_variance,
            format_db(p.snr_db),
            p.ber
        );
    }
}

pub fn print_chart(report: &SweepReport, axis: XAxis) {
    let curve = match axis {
        XAxis::Variance => report.ber_curve(),
        XAxis::Snr => report.snr_curve(),
    };
    let label = match axis {
        XAxis::Variance => "variance",
        XAxis::Snr => "SNR dB",
    };

    println!("BER vs {}", label);
    for (x, ber) in curve {
        let x = match axis {
            XAxis::Variance => format!("{:.2}", x),
            XAxis::Snr => format_db(x),
        };
        println!("{:>8} |{} {:.3}", x, bar(ber), ber);
    }
}

pub fn print_trace(report: &SweepReport) {
    let Some(trace) = &report.trace else {
        return;
    };

    println!("Original Bits:");
    println!("{}", bits_to_string(&trace.original_bits));
    println!("Modulated Symbols:");
    println!("{}", format_symbols(&trace.clean_symbols));

    for level in &trace.levels {
        println!("---------------------------------");
        println!("Noise Variance {:.2}", level.noise_variance);
        println!("Noisy Symbols:");
        println!("{}", format_symbols(&level.noisy_symbols));
        println!("Demodulated Bits:");
        println!("{}", bits_to_string(&level.recovered_bits));
    }
    println!("---------------------------------");
}

pub fn print_constellation(constellation: &Constellation) {
    let width = constellation.bits_per_symbol();
    println!(
        "{} constellation ({} points)",
        constellation.order(),
        constellation.len()
    );
    for (i, p) in constellation.points().iter().enumerate() {
        println!("{:>3}  {:0width$b}  ({:>2}, {:>2})", i, i, p.re, p.im, width = width);
    }
}

fn bar(ber: f64) -> String {
    let filled = (ber.clamp(0.0, 1.0) * CHART_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}

fn format_db(db: f64) -> String {
    if db.is_infinite() {
        if db > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{:.2}", db)
    }
}

fn format_symbols(symbols: &[Complex64]) -> String {
    symbols
        .iter()
        .map(|s| format!("({:.2}, {:.2})", s.re, s.im))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scales_with_ber() {
        assert_eq!(bar(0.0), "");
        assert_eq!(bar(1.0).chars().count(), CHART_WIDTH);
        assert_eq!(bar(0.5).chars().count(), CHART_WIDTH / 2);
    }

    #[test]
    fn test_format_db() {
        assert_eq!(format_db(f64::INFINITY), "inf");
        assert_eq!(format_db(3.0103), "3.01");
    }

    #[test]
    fn test_format_symbols() {
        let s = format_symbols(&[Complex64::new(-1.0, 1.0), Complex64::new(0.5, -3.25)]);
        assert_eq!(s, "(-1.00, 1.00) (0.50, -3.25)");
    }
}
