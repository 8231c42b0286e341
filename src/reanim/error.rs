//! Error taxonomy for the reanimation pipeline.
//!
//! Parse-time errors ([`ReanimError::DefinitionParse`]) abort loading of a
//! definition. Everything else is raised at runtime, logged by the caller and
//! recovered locally so a simulation tick is never aborted.

use std::io;
use thiserror::Error;

/// Errors produced while loading or driving reanimations.
#[derive(Error, Debug)]
pub enum ReanimError {
    /// Malformed animation document (unknown field, bad markers, cycles...).
    #[error("definition parse error: {0}")]
    DefinitionParse(String),

    /// An animation, unit or combo name that does not exist.
    #[error("unknown animation: {0}")]
    UnknownAnimation(String),

    /// A track references an image the image store does not know about.
    #[error("missing resource: image '{image}' for track '{track}'")]
    MissingResource { track: String, image: String },

    /// Combo configuration references a track or part group that does not exist.
    #[error("config inconsistency: {0}")]
    ConfigInconsistency(String),

    /// I/O error while reading a definition or configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON decoding error outside the definition document itself.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Engine settings file could not be read or written.
    #[error("config file error: {0}")]
    Config(String),
}

impl ReanimError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        ReanimError::DefinitionParse(msg.into())
    }

    /// Whether this error aborts initialization instead of being recovered.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReanimError::DefinitionParse(_) | ReanimError::Io(_) | ReanimError::Json(_)
        )
    }
}

/// Result type using [`ReanimError`].
pub type Result<T> = std::result::Result<T, ReanimError>;
