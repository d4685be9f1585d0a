//! Error types for the model-mentions library.
//!
//! Extraction itself never fails on text input; the error surface is limited
//! to configuration problems detected once at startup, primarily a lexicon or
//! validity matrix that is internally inconsistent.

use thiserror::Error;

/// Main result type for model-mentions operations.
pub type Result<T> = std::result::Result<T, MentionError>;

/// Error type covering the fallible surfaces of the library.
#[derive(Error, Debug)]
pub enum MentionError {
    /// Configuration errors (window size, overrides)
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Lexicon construction and referential-integrity errors
    #[error("Lexicon error: {message}")]
    Lexicon {
        /// Error description
        message: String,
        /// Lexicon entry (token or vendor) that caused the error
        entry: Option<String>,
    },
}

impl MentionError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new lexicon error
    pub fn lexicon(message: impl Into<String>) -> Self {
        Self::Lexicon {
            message: message.into(),
            entry: None,
        }
    }

    /// Create a new lexicon error with the offending entry attached
    pub fn lexicon_entry(message: impl Into<String>, entry: impl Into<String>) -> Self {
        Self::Lexicon {
            message: message.into(),
            entry: Some(entry.into()),
        }
    }
}
