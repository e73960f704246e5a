//! audiosplit - Remove silence and split audio files into bounded segments
//!
//! Usage: audiosplit [OPTIONS] <INPUTS>... -o <OUTPUT_DIR>

use anyhow::Result;
use clap::Parser;
use splitter_cli::job::{spawn_job, SplitJob};
use splitter_cli::output::{print_json_failure, print_json_report, progress_bar};
use splitter_core::{OutputFormat, SplitterConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audiosplit")]
#[command(about = "Remove silence from audio files and split them into segments", long_about = None)]
struct Args {
    /// Input audio files, processed in the given order
    inputs: Vec<PathBuf>,

    /// Directory the archive is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Path to configuration file (TOML); flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target segment duration in milliseconds
    #[arg(long)]
    target_ms: Option<u64>,

    /// Minimum segment duration in milliseconds
    #[arg(long)]
    min_ms: Option<u64>,

    /// Silence threshold in dBFS (-100 to 0)
    #[arg(long, allow_negative_numbers = true)]
    threshold_db: Option<f64>,

    /// Minimum length of a silent gap in milliseconds
    #[arg(long)]
    min_silence_ms: Option<u64>,

    /// Output format: wav, mp3, flac or ogg
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// File name of the produced archive
    #[arg(long)]
    archive_name: Option<String>,

    /// Do not add manifest.json to the archive
    #[arg(long)]
    no_manifest: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Build the run configuration: defaults, then config file, then flags
    fn to_config(&self) -> Result<SplitterConfig> {
        let mut config = match &self.config {
            Some(path) => SplitterConfig::load(path)?,
            None => SplitterConfig::default(),
        };

        if let Some(v) = self.target_ms {
            config.segmentation.target_duration_ms = v;
        }
        if let Some(v) = self.min_ms {
            config.segmentation.min_duration_ms = v;
        }
        if let Some(v) = self.format {
            config.segmentation.output_format = v;
        }
        if let Some(v) = self.threshold_db {
            config.silence.threshold_db = v;
        }
        if let Some(v) = self.min_silence_ms {
            config.silence.min_silence_gap_ms = v;
        }
        if let Some(v) = &self.archive_name {
            config.archive.file_name = v.clone();
        }
        if self.no_manifest {
            config.archive.manifest = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    // Default: no logs (clean JSON output for parsing), unless RUST_LOG is set
    // Verbose: show Info level logs for debugging
    let mut logger = env_logger::Builder::from_default_env();
    if let Some(level) = log_level(args.verbose, std::env::var_os("RUST_LOG").is_some()) {
        logger.filter_level(level);
    }
    logger.init();

    if let Err(e) = run_audiosplit(args).await {
        print_json_failure(&e);
        std::process::exit(1);
    }

    Ok(())
}

/// Level forced on the logger; `None` leaves RUST_LOG directives in charge
fn log_level(verbose: bool, rust_log_set: bool) -> Option<log::LevelFilter> {
    if verbose {
        Some(log::LevelFilter::Info)
    } else if rust_log_set {
        None
    } else {
        Some(log::LevelFilter::Off)
    }
}

async fn run_audiosplit(args: Args) -> Result<()> {
    let config = args.to_config()?;

    log::info!(
        "Splitting {} file(s): target {} ms, minimum {} ms, threshold {} dB, format {}",
        args.inputs.len(),
        config.segmentation.target_duration_ms,
        config.segmentation.min_duration_ms,
        config.silence.threshold_db,
        config.segmentation.output_format
    );

    let job = SplitJob {
        inputs: args.inputs,
        output_dir: args.output_dir,
        config,
    };

    let report = spawn_job(job)
        .wait(|fraction| eprintln!("{}", progress_bar(fraction, 30)))
        .await?;

    print_json_report(&report);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "audiosplit",
            "a.wav",
            "b.mp3",
            "--target-ms",
            "20000",
            "--threshold-db",
            "-55",
            "-f",
            "flac",
            "--no-manifest",
        ]);

        assert_eq!(args.inputs, vec![PathBuf::from("a.wav"), PathBuf::from("b.mp3")]);

        let config = args.to_config().unwrap();
        assert_eq!(config.segmentation.target_duration_ms, 20_000);
        assert_eq!(config.segmentation.min_duration_ms, 3_000);
        assert_eq!(config.segmentation.output_format, OutputFormat::Flac);
        assert_eq!(config.silence.threshold_db, -55.0);
        assert!(!config.archive.manifest);
    }

    #[test]
    fn test_invalid_flag_value_rejected() {
        let args = Args::parse_from(["audiosplit", "a.wav", "--threshold-db", "-120"]);
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_log_level_respects_rust_log() {
        assert_eq!(log_level(false, false), Some(log::LevelFilter::Off));
        assert_eq!(log_level(false, true), None);
        assert_eq!(log_level(true, false), Some(log::LevelFilter::Info));
        assert_eq!(log_level(true, true), Some(log::LevelFilter::Info));
    }

    #[test]
    fn test_unknown_format_rejected_by_parser() {
        assert!(Args::try_parse_from(["audiosplit", "a.wav", "--format", "aiff"]).is_err());
    }
}
