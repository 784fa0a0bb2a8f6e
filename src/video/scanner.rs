//! Recursive video discovery with an optional task-file allow-list.

use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::VideoRecord;

/// Extension of the video files surfaced for annotation.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Scan `video_dir` recursively for video files. When `task_file` is given,
/// only stems listed in it are reported. An unset (empty) video directory
/// yields an empty result; a set but missing one is an error.
///
/// Ordering follows filesystem traversal and is not guaranteed; callers
/// needing a deterministic order must sort the result themselves.
pub async fn scan_videos(video_dir: &Path, task_file: Option<&Path>) -> Result<Vec<VideoRecord>> {
    // A fresh install has no video directory configured yet; that is an
    // empty library, not an error.
    if video_dir.as_os_str().is_empty() {
        return Ok(Vec::new());
    }

    if !video_dir.exists() {
        return Err(anyhow!(
            "video directory does not exist: {}",
            video_dir.display()
        ));
    }

    let allow_list = match task_file {
        Some(path) => Some(load_task_file(path).await?),
        None => None,
    };

    let mut videos = Vec::new();
    for entry in WalkDir::new(video_dir) {
        let entry =
            entry.map_err(|e| anyhow!("failed to walk {}: {}", video_dir.display(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_video = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(VIDEO_EXTENSION))
            .unwrap_or(false);
        if !is_video {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if let Some(allowed) = &allow_list {
            if !allowed.contains(&stem) {
                continue;
            }
        }

        videos.push(VideoRecord {
            filename,
            stem,
            path: path.to_path_buf(),
            has_pre_annotation: false,
            has_annotation: false,
        });
    }

    debug!("Found {} videos under {}", videos.len(), video_dir.display());
    Ok(videos)
}

/// Load the allow-list of stems from a task file. Blank lines are skipped
/// and an optional video extension suffix is stripped from each entry.
pub async fn load_task_file(path: &Path) -> Result<HashSet<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("failed to load task file {}: {}", path.display(), e))?;

    let suffix = format!(".{}", VIDEO_EXTENSION);
    let mut stems = HashSet::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let stem = line.strip_suffix(&suffix).unwrap_or(line);
        stems.insert(stem.to_string());
    }

    Ok(stems)
}
