//! Strict annotation validator, run before a save is accepted.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::{Annotation, Step};

/// Maximum tutorial title length, counted in Unicode characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// A rule violation found in an annotation. Always recoverable: the caller
/// rejects the write and reports the reason to the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid timestamp format, should be mm:ss.SSS (e.g., 12:32.766)")]
    TimestampFormat,

    #[error("seconds cannot exceed 59")]
    SecondsOutOfRange,

    #[error("milliseconds cannot exceed 999")]
    MillisecondsOutOfRange,

    #[error("step number must be greater than 0")]
    StepNumberNotPositive,

    #[error("step description cannot be empty")]
    EmptyDescription,

    #[error("tutorial title cannot be empty")]
    EmptyTitle,

    #[error("tutorial title cannot exceed 100 characters")]
    TitleTooLong,

    #[error("at least one step is required")]
    NoSteps,

    #[error("step {position} validation failed: {source}")]
    InvalidStep {
        position: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("step numbers not consecutive, expected {expected}, got {actual}")]
    NonConsecutiveSteps { expected: u32, actual: u32 },
}

/// Timestamp grammar: `DD:DD` or `DD:DD.DDD`, ASCII digits only.
fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d{2}:\d{2}(\.\d{3})?$").expect("timestamp pattern is valid"))
}

/// Validate a timestamp string. Minutes are unconstrained; seconds must be
/// below 60 and milliseconds, when present, below 1000.
pub fn validate_timestamp(timestamp: &str) -> Result<(), ValidationError> {
    if !timestamp_pattern().is_match(timestamp) {
        return Err(ValidationError::TimestampFormat);
    }

    let seconds: u32 = timestamp[3..5]
        .parse()
        .map_err(|_| ValidationError::TimestampFormat)?;
    if seconds >= 60 {
        return Err(ValidationError::SecondsOutOfRange);
    }

    if timestamp.len() > 5 {
        let milliseconds: u32 = timestamp[6..9]
            .parse()
            .map_err(|_| ValidationError::TimestampFormat)?;
        if milliseconds >= 1000 {
            return Err(ValidationError::MillisecondsOutOfRange);
        }
    }

    Ok(())
}

/// Validate a single step in isolation.
pub fn validate_step(step: &Step) -> Result<(), ValidationError> {
    if step.number == 0 {
        return Err(ValidationError::StepNumberNotPositive);
    }

    validate_timestamp(&step.timestamp)?;

    if step.description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }

    Ok(())
}

/// Validate a whole annotation. Checks run in order and the first failure
/// short-circuits. A non-tutorial annotation is always valid.
pub fn validate_annotation(annotation: &Annotation) -> Result<(), ValidationError> {
    if !annotation.is_tutorial {
        return Ok(());
    }

    if annotation.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    if annotation.title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong);
    }

    if annotation.steps.is_empty() {
        return Err(ValidationError::NoSteps);
    }

    for (i, step) in annotation.steps.iter().enumerate() {
        validate_step(step).map_err(|source| ValidationError::InvalidStep {
            position: i + 1,
            source: Box::new(source),
        })?;

        let expected = (i + 1) as u32;
        if step.number != expected {
            return Err(ValidationError::NonConsecutiveSteps {
                expected,
                actual: step.number,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_timestamp_ranges() {
        assert!(validate_timestamp("00:00").is_ok());
        assert!(validate_timestamp("99:59").is_ok());
        assert!(validate_timestamp("12:59.999").is_ok());

        assert_eq!(
            validate_timestamp("12:60"),
            Err(ValidationError::SecondsOutOfRange)
        );
        // Four millisecond digits fail the grammar, not the range check.
        assert_eq!(
            validate_timestamp("12:59.1000"),
            Err(ValidationError::TimestampFormat)
        );
        assert_eq!(
            validate_timestamp("1:05"),
            Err(ValidationError::TimestampFormat)
        );
        assert_eq!(
            validate_timestamp("01:05.1"),
            Err(ValidationError::TimestampFormat)
        );
    }

    #[test]
    fn test_step_rules() {
        assert!(validate_step(&step(1, "00:05.000", "Open file")).is_ok());
        assert_eq!(
            validate_step(&step(0, "00:05.000", "Open file")),
            Err(ValidationError::StepNumberNotPositive)
        );
        assert_eq!(
            validate_step(&step(1, "00:05.000", "   ")),
            Err(ValidationError::EmptyDescription)
        );
    }

    #[test]
    fn test_not_tutorial_is_always_valid() {
        assert!(validate_annotation(&Annotation::not_tutorial()).is_ok());

        // Populated title and steps are ignored once is_tutorial is false.
        let mut ann = tutorial("", vec![step(7, "bogus", "")]);
        ann.is_tutorial = false;
        assert!(validate_annotation(&ann).is_ok());
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(
            validate_annotation(&tutorial("   ", vec![])),
            Err(ValidationError::EmptyTitle)
        );

        // Counted in characters, not bytes: 100 CJK characters pass.
        let wide = "标".repeat(100);
        let ok = tutorial(&wide, vec![step(1, "00:05.000", "Open file")]);
        assert!(validate_annotation(&ok).is_ok());

        let too_long = "标".repeat(101);
        assert_eq!(
            validate_annotation(&tutorial(&too_long, vec![])),
            Err(ValidationError::TitleTooLong)
        );
    }

    #[test]
    fn test_steps_required() {
        assert_eq!(
            validate_annotation(&tutorial("Title", vec![])),
            Err(ValidationError::NoSteps)
        );
    }

    #[test]
    fn test_numbering_gap_reports_expected_and_actual() {
        let ann = tutorial(
            "Title",
            vec![
                step(1, "00:05.000", "Open file"),
                step(3, "00:10.000", "Click save"),
            ],
        );

        assert_eq!(
            validate_annotation(&ann),
            Err(ValidationError::NonConsecutiveSteps {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_invalid_step_names_position() {
        let ann = tutorial(
            "Title",
            vec![
                step(1, "00:05.000", "Open file"),
                step(2, "00:61.000", "Click save"),
            ],
        );

        match validate_annotation(&ann) {
            Err(ValidationError::InvalidStep { position, source }) => {
                assert_eq!(position, 2);
                assert_eq!(*source, ValidationError::SecondsOutOfRange);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
