//! JSON output formatting

use crate::job::JobReport;
use serde::Serialize;

#[derive(Serialize)]
struct SuccessOutput<'a> {
    status: &'static str,
    #[serde(flatten)]
    report: &'a JobReport,
}

#[derive(Serialize)]
struct FailureOutput<'a> {
    status: &'static str,
    error: &'a str,
}

/// Render a finished run as pretty JSON
pub fn report_json(report: &JobReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SuccessOutput {
        status: "success",
        report,
    })
}

/// Print a finished run as JSON on stdout
pub fn print_json_report(report: &JobReport) {
    match report_json(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }
}

/// Print a failed run as JSON on stdout
pub fn print_json_failure(error: &anyhow::Error) {
    let message = format!("{:#}", error);
    let output = FailureOutput {
        status: "error",
        error: &message,
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing failure: {}", e),
    }
}

/// Text progress bar for a completed fraction
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        " ".repeat(width - filled),
        (fraction * 100.0).round() as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_report_json_is_flat() {
        let report = JobReport {
            archive: PathBuf::from("/out/split_audio.zip"),
            files: 2,
            segments: 3,
            entries: vec!["segment_1.wav".to_string()],
            processing_time_seconds: 0.5,
        };

        let value: serde_json::Value = serde_json::from_str(&report_json(&report).unwrap()).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["archive"], "/out/split_audio.zip");
        assert_eq!(value["segments"], 3);
        assert_eq!(value["entries"][0], "segment_1.wav");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[    ]   0%");
        assert_eq!(progress_bar(0.5, 4), "[##  ]  50%");
        assert_eq!(progress_bar(1.0, 4), "[####] 100%");
    }
}
