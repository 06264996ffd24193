use crate::qam::{SweepConfig, SweepReport};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
pub struct ReportDump<'a> {
    pub version: &'static str,
    pub reports: &'a [SweepReport],
}

/// Writes reports as pretty JSON; `-` means stdout.
pub fn write_report_json(reports: &[SweepReport], dest: &str) -> io::Result<()> {
    let dump = ReportDump {
        version: env!("CARGO_PKG_VERSION"),
        reports,
    };

    let mut writer: Box<dyn Write> = match dest {
        "-" => Box::new(io::stdout()),
        path => Box::new(BufWriter::new(File::create(path)?)),
    };
    serde_json::to_writer_pretty(&mut writer, &dump)?;
    writeln!(writer)?;
    writer.flush()
}

/// Loads a sweep configuration; missing fields take their defaults.
pub fn load_sweep_config<P: AsRef<Path>>(path: P) -> io::Result<SweepConfig> {
    let reader = BufReader::new(File::open(path)?);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qam::run_sweep;

    #[test]
    fn test_report_serializes() {
        let report = run_sweep(4, 8, &[0.0, 1.0], Some(3)).unwrap();
        let dump = ReportDump {
            version: "test",
            reports: std::slice::from_ref(&report),
        };
        let value = serde_json::to_value(&dump).unwrap();

        assert_eq!(value["reports"][0]["order"], 4);
        assert_eq!(value["reports"][0]["points"][1]["noise_variance"], 1.0);
        // +inf dB is not representable in JSON
        assert!(value["reports"][0]["points"][0]["snr_db"].is_null());
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("qamsim_cfg_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "order": 64, "num_bits": 120, "seed": 5 }"#).unwrap();

        let config = load_sweep_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.order, 64);
        assert_eq!(config.num_bits, 120);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.trials, 1);
        assert_eq!(config.noise_variances, SweepConfig::default().noise_variances);
    }

    #[test]
    fn test_bad_config_is_io_error() {
        let path = std::env::temp_dir().join(format!("qamsim_bad_{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = load_sweep_config(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
