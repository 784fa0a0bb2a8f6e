//! API data models

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::video::VideoRecord;

/// Aggregate annotation progress over the scanned videos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    pub total: usize,
    pub annotated: usize,
    pub pre_annotated: usize,
    pub unannotated: usize,
}

impl VideoStats {
    /// A video counts as annotated once an output file exists; as
    /// pre-annotated only while no output file has been written yet.
    pub fn from_videos(videos: &[VideoRecord]) -> Self {
        let total = videos.len();
        let annotated = videos.iter().filter(|v| v.has_annotation).count();
        let pre_annotated = videos
            .iter()
            .filter(|v| !v.has_annotation && v.has_pre_annotation)
            .count();

        Self {
            total,
            annotated,
            pre_annotated,
            unannotated: total - annotated - pre_annotated,
        }
    }
}

/// Response payload for the video listing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoRecord>,
    pub stats: VideoStats,
}

/// Response payload for the read-only model annotation endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelAnnotationResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl ModelAnnotationResponse {
    pub fn available(annotation: Annotation) -> Self {
        Self {
            available: true,
            message: None,
            annotation: Some(annotation),
        }
    }

    pub fn unavailable(message: &str) -> Self {
        Self {
            available: false,
            message: Some(message.to_string()),
            annotation: None,
        }
    }
}

/// Status payload returned by mutating endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Response payload for the native dialog endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct DialogResponse {
    pub path: String,
}
