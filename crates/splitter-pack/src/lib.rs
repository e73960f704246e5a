//! Packaging of segmentation results
//!
//! Encodes segments, gives them globally unique archive names and bundles them
//! into a single ZIP file.

pub mod archive;
pub mod encoder;
pub mod manifest;
pub mod naming;

pub use archive::{pack_segments, PackSummary, SegmentArchive};
pub use encoder::{DefaultEncoder, SegmentEncoder};
pub use manifest::{Manifest, ManifestEntry, MANIFEST_NAME};
pub use naming::UniqueNamer;
