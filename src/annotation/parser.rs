//! Permissive annotation parser.
//!
//! Malformed step lines are dropped silently so that legacy or partially
//! edited files can still be loaded for editing; the strict checks live in
//! [`super::validator`] and gate saves instead.

use anyhow::{anyhow, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use super::{Annotation, Step};

/// First-line sentinel marking a video as not being a tutorial.
pub const NOT_TUTORIAL_SENTINEL: &str = "[not tutorial]";

/// Step line grammar: `1) 00:11 description` or `1) 00:11.123 description`.
fn step_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)\)\s+(\d{2}:\d{2}(?:\.\d{3})?)\s+(.+)$").expect("step pattern is valid")
    })
}

/// Parse annotation text given as a sequence of lines. Never fails: lines
/// that do not match the step grammar are skipped.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Annotation {
    let Some(first_line) = lines.first() else {
        return Annotation::empty();
    };

    let first_line = first_line.as_ref().trim();
    if first_line.eq_ignore_ascii_case(NOT_TUTORIAL_SENTINEL) {
        return Annotation::not_tutorial();
    }

    let mut annotation = Annotation::empty();
    annotation.title = first_line.to_string();

    for line in &lines[1..] {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let Some(captures) = step_pattern().captures(line) else {
            continue;
        };
        let Ok(number) = captures[1].parse::<u32>() else {
            continue;
        };

        let mut timestamp = captures[2].to_string();
        if !timestamp.contains('.') {
            timestamp.push_str(".000");
        }

        annotation.steps.push(Step {
            number,
            timestamp,
            description: captures[3].to_string(),
        });
    }

    annotation
}

/// Parse the annotation file at `path`.
pub async fn parse_file(path: &Path) -> Result<Annotation> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("failed to read {}: {}", path.display(), e))?;

    let lines: Vec<&str> = content.lines().collect();
    Ok(parse_lines(&lines))
}
