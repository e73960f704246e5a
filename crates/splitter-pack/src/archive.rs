//! ZIP archive writer
//!
//! The archive is assembled in a temporary file next to its destination and
//! only moved into place once every entry has been written.

use rayon::prelude::*;
use serde::Serialize;
use splitter_core::{NamedSegment, SplitError, SplitResult, SplitterConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::encoder::SegmentEncoder;
use crate::manifest::{Manifest, ManifestEntry, MANIFEST_NAME};
use crate::naming::UniqueNamer;

/// Outcome of a successful packaging step
#[derive(Debug, Clone, Serialize)]
pub struct PackSummary {
    pub archive: PathBuf,
    pub entries: Vec<String>,
    pub bytes_written: u64,
}

/// ZIP archive under construction
pub struct SegmentArchive {
    path: PathBuf,
    writer: ZipWriter<NamedTempFile>,
    entries: Vec<String>,
}

impl SegmentArchive {
    /// Start a new archive that will be persisted at `path`
    pub fn create(path: &Path) -> SplitResult<Self> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        std::fs::create_dir_all(dir).map_err(|e| SplitError::archive(path, e))?;
        let temp = NamedTempFile::new_in(dir).map_err(|e| SplitError::archive(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: ZipWriter::new(temp),
            entries: Vec::new(),
        })
    }

    /// Add a stored (uncompressed) entry
    pub fn add(&mut self, name: &str, data: &[u8]) -> SplitResult<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(data.len() as u64 >= u32::MAX as u64);

        self.writer
            .start_file(name, options)
            .map_err(|e| SplitError::archive(&self.path, e))?;
        self.writer
            .write_all(data)
            .map_err(|e| SplitError::archive(&self.path, e))?;

        self.entries.push(name.to_string());
        Ok(())
    }

    /// Finish the archive and move it to its final path
    pub fn finish(self) -> SplitResult<PackSummary> {
        let temp = self
            .writer
            .finish()
            .map_err(|e| SplitError::archive(&self.path, e))?;

        let file = temp
            .persist(&self.path)
            .map_err(|e| SplitError::archive(&self.path, e.error))?;

        let bytes_written = file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| SplitError::archive(&self.path, e))?;

        log::info!(
            "Wrote {} ({} entries, {} bytes)",
            self.path.display(),
            self.entries.len(),
            bytes_written
        );

        Ok(PackSummary {
            archive: self.path,
            entries: self.entries,
            bytes_written,
        })
    }
}

/// Encode `segments` and write them to `<output_dir>/<archive file name>`
///
/// Entries keep the order of `segments`; clashing names get a `_<n>` suffix.
/// Nothing is written if any segment fails to encode.
pub fn pack_segments(
    segments: &[NamedSegment],
    config: &SplitterConfig,
    encoder: &dyn SegmentEncoder,
    output_dir: &Path,
) -> SplitResult<PackSummary> {
    let format = config.segmentation.output_format;

    let encoded = segments
        .par_iter()
        .map(|segment| {
            encoder.encode(&segment.buffer, format).map_err(|e| {
                SplitError::encode(
                    format!("{} of {}", segment.name, segment.source.display()),
                    format,
                    e,
                )
            })
        })
        .collect::<SplitResult<Vec<Vec<u8>>>>()?;

    log::info!("Encoded {} segment(s) as {}", encoded.len(), format);

    let archive_path = output_dir.join(&config.archive.file_name);
    let mut archive = SegmentArchive::create(&archive_path)?;

    let mut namer = UniqueNamer::new();
    let mut manifest = Manifest::new(config);
    if config.archive.manifest {
        namer.reserve(MANIFEST_NAME);
    }

    for (segment, data) in segments.iter().zip(&encoded) {
        let file_name = namer.claim(&segment.name, format.extension());
        if file_name != format!("{}.{}", segment.name, format.extension()) {
            log::debug!(
                "{} from {} renamed to {}",
                segment.name,
                segment.source.display(),
                file_name
            );
        }

        archive.add(&file_name, data)?;
        manifest.push(ManifestEntry {
            file_name,
            segment_name: segment.name.clone(),
            source_path: segment.source.display().to_string(),
            duration_ms: segment.duration_ms(),
        });
    }

    if config.archive.manifest {
        let json = manifest
            .to_json()
            .map_err(|e| SplitError::archive(&archive_path, e))?;
        archive.add(MANIFEST_NAME, json.as_bytes())?;
    }

    archive.finish()
}
