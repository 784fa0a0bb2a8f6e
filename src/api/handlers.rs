//! API request handlers

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::debug;

use crate::annotation::{self, Annotation};
use crate::config::Config;
use crate::video::{self, annotation_path};

use super::models::{DialogResponse, ModelAnnotationResponse, VideoListResponse, VideoStats};

/// Handle video listing requests: scan the video directory, reconcile the
/// annotation state of each stem, and compute progress stats.
pub async fn list_videos(config: &Config) -> Result<VideoListResponse> {
    let mut videos = video::scan_videos(&config.video_dir, config.task_file.as_deref()).await?;

    video::match_annotations(
        &mut videos,
        config.pre_annotation_dir.as_deref(),
        Some(&config.output_dir),
    )
    .await;

    let stats = VideoStats::from_videos(&videos);
    Ok(VideoListResponse { videos, stats })
}

/// Resolve the annotation shown for a stem. The output directory wins, then
/// the pre-annotation draft, then an empty tutorial shell.
pub async fn get_annotation(config: &Config, stem: &str) -> Annotation {
    if !config.output_dir.as_os_str().is_empty() {
        let output_path = annotation_path(stem, &config.output_dir);
        if let Ok(annotation) = annotation::parse_file(&output_path).await {
            return annotation;
        }
    }

    if let Some(pre_dir) = &config.pre_annotation_dir {
        let pre_path = annotation_path(stem, pre_dir);
        if let Ok(annotation) = annotation::parse_file(&pre_path).await {
            return annotation;
        }
    }

    Annotation::empty()
}

/// Validate and persist an annotation to the output directory. A
/// `ValidationError` inside the returned error marks a rejected write as
/// opposed to an IO failure.
pub async fn save_annotation(config: &Config, stem: &str, annotation: &Annotation) -> Result<()> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(anyhow!("output directory not set"));
    }

    annotation::validate_annotation(annotation)?;

    let path = annotation_path(stem, &config.output_dir);
    debug!("Saving annotation for {} to {}", stem, path.display());
    annotation.save(&path).await
}

/// Delete the output annotation for a stem. The underlying `io::Error` is
/// kept in the chain so the server can map a missing file to 404.
pub async fn delete_annotation(config: &Config, stem: &str) -> Result<()> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(anyhow!("output directory not set"));
    }

    let path = annotation_path(stem, &config.output_dir);
    tokio::fs::remove_file(&path)
        .await
        .with_context(|| format!("failed to delete {}", path.display()))
}

/// Read the model-generated annotation for a stem, if one exists.
pub async fn get_model_annotation(config: &Config, stem: &str) -> Result<ModelAnnotationResponse> {
    let Some(model_dir) = &config.model_annotation_dir else {
        return Ok(ModelAnnotationResponse::unavailable(
            "model annotation directory not configured",
        ));
    };

    let path = annotation_path(stem, model_dir);
    if !path.exists() {
        return Ok(ModelAnnotationResponse::unavailable(
            "model annotation not found",
        ));
    }

    let annotation = annotation::parse_file(&path).await?;
    Ok(ModelAnnotationResponse::available(annotation))
}

/// Persist an already-validated configuration to the active config path,
/// the same file the running configuration was resolved from at startup.
pub async fn save_config(config: &Config, path: &Path) -> Result<()> {
    config.save(path).await
}

/// Open a native file or folder picker and return the selected path. A
/// cancelled dialog yields an empty path rather than an error.
pub async fn open_dialog(mode: &str) -> Result<DialogResponse> {
    let directory = match mode {
        "directory" => true,
        "file" => false,
        _ => return Err(anyhow!("invalid mode, must be 'file' or 'directory'")),
    };

    let path = open_native_dialog(directory).await?;
    Ok(DialogResponse { path })
}

#[cfg(target_os = "macos")]
async fn open_native_dialog(directory: bool) -> Result<String> {
    let script = if directory {
        "POSIX path of (choose folder)"
    } else {
        "POSIX path of (choose file)"
    };
    run_dialog_command("osascript", &["-e", script]).await
}

#[cfg(target_os = "windows")]
async fn open_native_dialog(directory: bool) -> Result<String> {
    let script = if directory {
        r#"
Add-Type -AssemblyName System.Windows.Forms
$dialog = New-Object System.Windows.Forms.FolderBrowserDialog
if ($dialog.ShowDialog() -eq "OK") { $dialog.SelectedPath }
"#
    } else {
        r#"
Add-Type -AssemblyName System.Windows.Forms
$dialog = New-Object System.Windows.Forms.OpenFileDialog
if ($dialog.ShowDialog() -eq "OK") { $dialog.FileName }
"#
    };
    run_dialog_command("powershell", &["-NoProfile", "-Command", script]).await
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
async fn open_native_dialog(directory: bool) -> Result<String> {
    let args: &[&str] = if directory {
        &["--file-selection", "--directory"]
    } else {
        &["--file-selection"]
    };
    run_dialog_command("zenity", args).await
}

async fn run_dialog_command(program: &str, args: &[&str]) -> Result<String> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| anyhow!("failed to run {}: {}", program, e))?;

    // Pickers exit non-zero when the user cancels.
    if !output.status.success() {
        return Ok(String::new());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
