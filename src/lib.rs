//! mp4-labeler
//!
//! Web-based tool for annotating short instructional video clips with a
//! small line-oriented text format: a title plus timestamped steps. The
//! core is the annotation format engine (parse, validate, format) and the
//! reconciliation of a video directory against the pre-annotation and
//! output directories.

pub mod annotation;
pub mod api;
pub mod config;
pub mod video;

pub use crate::annotation::{Annotation, Step, ValidationError};
pub use crate::config::Config;
pub use crate::video::{annotation_path, VideoRecord};
