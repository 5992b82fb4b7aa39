//! Error taxonomy for tutorial operations.
//!
//! Not-found and navigation errors are recoverable and end up as guidance text.
//! Corruption never leaves the state store. I/O failures abort the current call.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorError {
    #[error("tutorial '{name}' not found")]
    TutorialNotFound { name: String },

    #[error("lesson '{lesson}' not found in tutorial '{tutorial}'")]
    LessonNotFound { tutorial: String, lesson: String },

    #[error("step '{step}' not found in lesson '{lesson}'")]
    StepNotFound { lesson: String, step: String },

    #[error("content for {tutorial}/{lesson}/{step} not found at {}", path.display())]
    ContentNotFound {
        tutorial: String,
        lesson: String,
        step: String,
        path: PathBuf,
    },

    #[error("invalid tutorial metadata {}: {reason}", path.display())]
    InvalidMetadata { path: PathBuf, reason: String },

    #[error("invalid navigation: {0}")]
    InvalidNavigation(String),

    #[error("state corruption: {0}")]
    StateCorruption(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("render step content: {0}")]
    Render(#[from] minijinja::Error),
}

pub type Result<T> = std::result::Result<T, TutorError>;

impl TutorError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TutorError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for errors the caller can answer with name suggestions.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TutorError::TutorialNotFound { .. }
                | TutorError::LessonNotFound { .. }
                | TutorError::StepNotFound { .. }
                | TutorError::ContentNotFound { .. }
        )
    }
}

/// Attach a context string to `std::io::Result`, mirroring `anyhow::Context`.
pub trait IoContext<T> {
    fn io_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| TutorError::io(context(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_errors_name_the_level() {
        let err = TutorError::LessonNotFound {
            tutorial: "basics".to_string(),
            lesson: "missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "lesson 'missing' not found in tutorial 'basics'"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn io_context_wraps_source() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.io_context(|| "write state.json").expect_err("error");
        assert_eq!(err.to_string(), "write state.json: denied");
        assert!(!err.is_not_found());
    }
}
