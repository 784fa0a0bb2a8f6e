//! Annotation format engine: parsing, validation, and serialization of the
//! line-oriented annotation files written next to each video stem.

pub mod parser;
pub mod validator;

pub use parser::{parse_file, parse_lines};
pub use validator::{validate_annotation, validate_step, validate_timestamp, ValidationError};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One taught action inside a tutorial annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position in the step list.
    pub number: u32,

    /// Timestamp in `mm:ss.SSS` form. The parser canonicalizes `mm:ss`
    /// input by appending `.000`.
    pub timestamp: String,

    /// Free-text description of the action.
    pub description: String,
}

/// The annotation for one video, identified by the video's stem.
///
/// A non-tutorial annotation carries no title and no steps; the two states
/// are mutually exclusive representations, not independent flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub title: String,
    pub is_tutorial: bool,
    pub steps: Vec<Step>,
}

impl Annotation {
    /// Empty tutorial shell returned when no annotation file exists yet.
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            is_tutorial: true,
            steps: Vec::new(),
        }
    }

    /// Annotation marking a video as not being a tutorial.
    pub fn not_tutorial() -> Self {
        Self {
            title: String::new(),
            is_tutorial: false,
            steps: Vec::new(),
        }
    }

    /// Render the annotation in its canonical on-disk text form.
    pub fn format(&self) -> String {
        if !self.is_tutorial {
            return format!("{}\n", parser::NOT_TUTORIAL_SENTINEL);
        }

        let mut out = String::new();
        if !self.title.is_empty() {
            out.push_str(&self.title);
            out.push_str("\n\n");
        }

        for step in &self.steps {
            out.push_str(&format!(
                "{}) {} {}\n",
                step.number, step.timestamp, step.description
            ));
        }

        out
    }

    /// Write the annotation to `path`, creating parent directories as needed.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| anyhow!("failed to create directory {}: {}", dir.display(), e))?;
            }
        }

        tokio::fs::write(path, self.format())
            .await
            .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))
    }
}
