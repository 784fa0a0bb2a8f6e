//! Reconciliation of scanned videos against annotation directories.

use std::collections::HashSet;
use std::path::Path;

use super::VideoRecord;

/// Extension of annotation text files.
pub const ANNOTATION_EXTENSION: &str = "txt";

/// Set the `has_pre_annotation` / `has_annotation` flags on each video by
/// stem membership in the two directories. Annotation content is never
/// inspected here.
pub async fn match_annotations(
    videos: &mut [VideoRecord],
    pre_annotation_dir: Option<&Path>,
    output_dir: Option<&Path>,
) {
    let pre_stems = match pre_annotation_dir {
        Some(dir) => collect_annotation_stems(dir).await,
        None => HashSet::new(),
    };
    let output_stems = match output_dir {
        Some(dir) => collect_annotation_stems(dir).await,
        None => HashSet::new(),
    };

    for video in videos.iter_mut() {
        video.has_pre_annotation = pre_stems.contains(&video.stem);
        video.has_annotation = output_stems.contains(&video.stem);
    }
}

/// Single-level listing of annotation stems in `dir`. A missing or
/// unreadable directory means nothing is annotated yet, not an error.
async fn collect_annotation_stems(dir: &Path) -> HashSet<String> {
    let mut stems = HashSet::new();

    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return stems;
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let path = entry.path();
        let is_annotation = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(ANNOTATION_EXTENSION))
            .unwrap_or(false);
        if !is_annotation {
            continue;
        }

        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.insert(stem.to_string());
        }
    }

    stems
}
