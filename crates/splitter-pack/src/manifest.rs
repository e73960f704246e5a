//! JSON manifest stored alongside the segments
//!
//! Records where every archive entry came from and the parameters of the run.

use serde::{Deserialize, Serialize};
use splitter_core::SplitterConfig;

/// Reserved archive entry name of the manifest
pub const MANIFEST_NAME: &str = "manifest.json";

/// Complete manifest structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub created_at: String,
    pub parameters: ManifestParameters,
    pub entries: Vec<ManifestEntry>,
}

/// Run parameters relevant to the produced segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestParameters {
    pub target_duration_ms: u64,
    pub min_duration_ms: u64,
    pub threshold_db: f64,
    pub min_silence_gap_ms: u64,
    pub output_format: String,
}

/// One segment in the archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Name of the entry in the archive
    pub file_name: String,
    /// Name assigned by the engine (before collision handling)
    pub segment_name: String,
    pub source_path: String,
    pub duration_ms: u64,
}

impl Manifest {
    pub fn new(config: &SplitterConfig) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            parameters: ManifestParameters {
                target_duration_ms: config.segmentation.target_duration_ms,
                min_duration_ms: config.segmentation.min_duration_ms,
                threshold_db: config.silence.threshold_db,
                min_silence_gap_ms: config.silence.min_silence_gap_ms,
                output_format: config.segmentation.output_format.to_string(),
            },
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serialization() {
        let mut manifest = Manifest::new(&SplitterConfig::default());
        manifest.push(ManifestEntry {
            file_name: "segment_1_1.wav".to_string(),
            segment_name: "segment_1".to_string(),
            source_path: "/in/b.wav".to_string(),
            duration_ms: 4_000,
        });

        let json = manifest.to_json().unwrap();
        let parsed: Manifest = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.parameters.target_duration_ms, 10_000);
        assert_eq!(parsed.parameters.output_format, "wav");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].file_name, "segment_1_1.wav");
        assert!(chrono::DateTime::parse_from_rfc3339(&parsed.created_at).is_ok());
    }
}
