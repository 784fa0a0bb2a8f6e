use std::collections::HashSet;
use std::path::PathBuf;

use tempfile::TempDir;
use tokio::fs;

use mp4_labeler::annotation::{self, Annotation, Step, ValidationError};
use mp4_labeler::api::handlers;
use mp4_labeler::video::{annotation_path, match_annotations, scan_videos};
use mp4_labeler::Config;

fn step(number: u32, timestamp: &str, description: &str) -> Step {
    Step {
        number,
        timestamp: timestamp.to_string(),
        description: description.to_string(),
    }
}

fn tutorial(title: &str, steps: Vec<Step>) -> Annotation {
    Annotation {
        title: title.to_string(),
        is_tutorial: true,
        steps,
    }
}

#[tokio::test]
async fn test_scan_missing_directory_is_an_error() {
    let result = scan_videos(&PathBuf::from("/nonexistent/videos"), None).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("/nonexistent/videos"), "error was: {}", err);
}

#[tokio::test]
async fn test_scan_with_unset_video_dir_is_empty() {
    // Fresh install: no video directory configured yet.
    let videos = scan_videos(&PathBuf::new(), None).await.unwrap();
    assert!(videos.is_empty());
}

#[tokio::test]
async fn test_list_videos_with_unconfigured_video_dir() {
    let response = handlers::list_videos(&Config::default()).await.unwrap();
    assert!(response.videos.is_empty());
    assert_eq!(response.stats.total, 0);
}

#[tokio::test]
async fn test_scan_finds_videos_recursively() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("week1");
    fs::create_dir_all(&nested).await.unwrap();

    fs::write(temp_dir.path().join("intro.mp4"), b"x").await.unwrap();
    fs::write(nested.join("trim.MP4"), b"x").await.unwrap();
    fs::write(nested.join("notes.txt"), b"x").await.unwrap();
    fs::write(temp_dir.path().join("readme.md"), b"x").await.unwrap();

    let videos = scan_videos(temp_dir.path(), None).await.unwrap();
    let stems: HashSet<String> = videos.iter().map(|v| v.stem.clone()).collect();

    assert_eq!(stems, HashSet::from(["intro".to_string(), "trim".to_string()]));
    for video in &videos {
        assert!(!video.has_pre_annotation);
        assert!(!video.has_annotation);
    }
}

#[tokio::test]
async fn test_task_file_restricts_scan() {
    let temp_dir = TempDir::new().unwrap();
    for stem in ["a", "b", "c"] {
        fs::write(temp_dir.path().join(format!("{}.mp4", stem)), b"x")
            .await
            .unwrap();
    }

    // One entry with extension, one blank line, one bare stem.
    let task_file = temp_dir.path().join("tasks.txt");
    fs::write(&task_file, "a.mp4\n\nb").await.unwrap();

    let videos = scan_videos(temp_dir.path(), Some(&task_file)).await.unwrap();
    let stems: HashSet<String> = videos.iter().map(|v| v.stem.clone()).collect();

    assert_eq!(stems, HashSet::from(["a".to_string(), "b".to_string()]));
}

#[tokio::test]
async fn test_missing_task_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = scan_videos(temp_dir.path(), Some(&temp_dir.path().join("missing.txt"))).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_three_way_matching() {
    let videos_dir = TempDir::new().unwrap();
    let pre_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    for stem in ["a", "b", "c"] {
        fs::write(videos_dir.path().join(format!("{}.mp4", stem)), b"x")
            .await
            .unwrap();
    }
    fs::write(pre_dir.path().join("b.txt"), b"draft").await.unwrap();
    fs::write(output_dir.path().join("b.txt"), b"final").await.unwrap();
    fs::write(output_dir.path().join("c.txt"), b"final").await.unwrap();

    let mut videos = scan_videos(videos_dir.path(), None).await.unwrap();
    videos.sort_by(|x, y| x.stem.cmp(&y.stem));
    match_annotations(&mut videos, Some(pre_dir.path()), Some(output_dir.path())).await;

    assert!(!videos[0].has_pre_annotation && !videos[0].has_annotation);
    assert!(videos[1].has_pre_annotation && videos[1].has_annotation);
    assert!(!videos[2].has_pre_annotation && videos[2].has_annotation);
}

#[tokio::test]
async fn test_matching_with_missing_directories_clears_flags() {
    let videos_dir = TempDir::new().unwrap();
    fs::write(videos_dir.path().join("a.mp4"), b"x").await.unwrap();

    let mut videos = scan_videos(videos_dir.path(), None).await.unwrap();
    match_annotations(
        &mut videos,
        Some(&PathBuf::from("/nonexistent/pre")),
        Some(&PathBuf::from("/nonexistent/out")),
    )
    .await;

    assert!(!videos[0].has_pre_annotation);
    assert!(!videos[0].has_annotation);
}

#[tokio::test]
async fn test_save_creates_parents_and_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("out").join("nested");

    let ann = tutorial(
        "Trim a clip",
        vec![
            step(1, "00:05.000", "Open the file"),
            step(2, "00:12.500", "Drag the trim handle"),
        ],
    );

    let path = annotation_path("clip_01", &output_dir);
    ann.save(&path).await.unwrap();

    let loaded = annotation::parse_file(&path).await.unwrap();
    assert_eq!(loaded, ann);
}

#[tokio::test]
async fn test_parse_file_reports_path_on_missing_file() {
    let err = annotation::parse_file(&PathBuf::from("/nonexistent/a.txt"))
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("/nonexistent/a.txt"), "error was: {}", err);
}

fn config_for(videos: &TempDir, pre: Option<&TempDir>, output: &TempDir) -> Config {
    Config {
        video_dir: videos.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
        pre_annotation_dir: pre.map(|d| d.path().to_path_buf()),
        model_annotation_dir: None,
        task_file: None,
    }
}

#[tokio::test]
async fn test_annotation_retrieval_precedence() {
    let videos_dir = TempDir::new().unwrap();
    let pre_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let config = config_for(&videos_dir, Some(&pre_dir), &output_dir);

    // Neither source exists: empty tutorial shell.
    let ann = handlers::get_annotation(&config, "clip").await;
    assert_eq!(ann, Annotation::empty());

    // Pre-annotation only.
    fs::write(pre_dir.path().join("clip.txt"), "Draft title\n\n1) 00:05 Draft step\n")
        .await
        .unwrap();
    let ann = handlers::get_annotation(&config, "clip").await;
    assert_eq!(ann.title, "Draft title");

    // Output file present: it wins over the draft.
    fs::write(
        output_dir.path().join("clip.txt"),
        "Final title\n\n1) 00:05 Final step\n",
    )
    .await
    .unwrap();
    let ann = handlers::get_annotation(&config, "clip").await;
    assert_eq!(ann.title, "Final title");
}

#[tokio::test]
async fn test_save_handler_rejects_invalid_annotation() {
    let videos_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let config = config_for(&videos_dir, None, &output_dir);

    let invalid = tutorial(
        "Title",
        vec![step(1, "00:05.000", "Open file"), step(3, "00:10.000", "Save")],
    );

    let err = handlers::save_annotation(&config, "clip", &invalid)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::NonConsecutiveSteps {
            expected: 2,
            actual: 3
        })
    );
    assert!(!output_dir.path().join("clip.txt").exists());

    let valid = tutorial("Title", vec![step(1, "00:05.000", "Open file")]);
    handlers::save_annotation(&config, "clip", &valid).await.unwrap();
    assert!(output_dir.path().join("clip.txt").exists());
}

#[tokio::test]
async fn test_delete_handler_maps_missing_file() {
    let videos_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let config = config_for(&videos_dir, None, &output_dir);

    let err = handlers::delete_annotation(&config, "clip").await.unwrap_err();
    let io_err = err.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);

    fs::write(output_dir.path().join("clip.txt"), "[not tutorial]\n")
        .await
        .unwrap();
    handlers::delete_annotation(&config, "clip").await.unwrap();
    assert!(!output_dir.path().join("clip.txt").exists());
}

#[tokio::test]
async fn test_list_videos_stats() {
    let videos_dir = TempDir::new().unwrap();
    let pre_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    for stem in ["a", "b", "c", "d"] {
        fs::write(videos_dir.path().join(format!("{}.mp4", stem)), b"x")
            .await
            .unwrap();
    }
    fs::write(pre_dir.path().join("a.txt"), b"draft").await.unwrap();
    fs::write(pre_dir.path().join("b.txt"), b"draft").await.unwrap();
    fs::write(output_dir.path().join("b.txt"), b"final").await.unwrap();

    let config = config_for(&videos_dir, Some(&pre_dir), &output_dir);
    let response = handlers::list_videos(&config).await.unwrap();

    assert_eq!(response.stats.total, 4);
    assert_eq!(response.stats.annotated, 1);
    assert_eq!(response.stats.pre_annotated, 1);
    assert_eq!(response.stats.unannotated, 2);
}

#[tokio::test]
async fn test_config_save_writes_back_to_active_path() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.toml");

    let mut config = Config::default();
    config.video_dir = temp_dir.path().to_path_buf();
    config.save(&config_path).await.unwrap();

    // Edit the running config and save through the handler: the file it
    // was loaded from must be the one updated.
    let mut loaded = Config::load_from(&config_path).unwrap();
    loaded.output_dir = temp_dir.path().join("edited-out");
    handlers::save_config(&loaded, &config_path).await.unwrap();

    let reloaded = Config::load_from(&config_path).unwrap();
    assert_eq!(reloaded, loaded);
}

#[tokio::test]
async fn test_model_annotation_lookup() {
    let videos_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let model_dir = TempDir::new().unwrap();

    let mut config = config_for(&videos_dir, None, &output_dir);
    let response = handlers::get_model_annotation(&config, "clip").await.unwrap();
    assert!(!response.available);

    config.model_annotation_dir = Some(model_dir.path().to_path_buf());
    let response = handlers::get_model_annotation(&config, "clip").await.unwrap();
    assert!(!response.available);

    fs::write(model_dir.path().join("clip.txt"), "Model title\n\n1) 00:05 Step\n")
        .await
        .unwrap();
    let response = handlers::get_model_annotation(&config, "clip").await.unwrap();
    assert!(response.available);
    assert_eq!(response.annotation.unwrap().title, "Model title");
}
