//! Video discovery and annotation reconciliation.
//!
//! The scanner and matcher reason about filenames only; they never open a
//! video file or look inside an annotation.

pub mod matcher;
pub mod scanner;

pub use matcher::match_annotations;
pub use scanner::{load_task_file, scan_videos};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One discovered video and its annotation state. Produced fresh by each
/// scan and never mutated after matching completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Filename including extension.
    pub filename: String,

    /// Filename minus extension; the join key across all directories.
    pub stem: String,

    /// Full path to the video file.
    pub path: PathBuf,

    /// Whether a pre-computed annotation draft exists for this stem.
    pub has_pre_annotation: bool,

    /// Whether a human-authored annotation exists for this stem.
    pub has_annotation: bool,
}

/// Path of the annotation text file for `stem` inside `dir`. Shared by the
/// pre-annotation, output, and model annotation directories.
pub fn annotation_path(stem: &str, dir: &Path) -> PathBuf {
    dir.join(format!("{}.{}", stem, matcher::ANNOTATION_EXTENSION))
}
