//! Configuration types for the extraction engine.
//!
//! The engine is deliberately light on knobs: the proximity window is the one
//! parameter with real behavioral weight, and tests override it per call to
//! probe boundary behavior.

use serde::{Deserialize, Serialize};

use crate::core::errors::{MentionError, Result};

/// Default proximity window, in tokens along the flat token stream.
pub const DEFAULT_WINDOW: usize = 12;

/// Configuration for a [`ModelMentionExtractor`](crate::extract::ModelMentionExtractor).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Maximum token distance between a family hit and an associated
    /// version/tier hit, measured on the flat token stream.
    pub window: usize,

    /// Attempt cross-sentence pairing across exactly one sentence boundary
    /// when same-sentence association leaves a combination incomplete.
    pub cross_sentence: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            cross_sentence: true,
        }
    }
}

impl ExtractionConfig {
    /// Configuration with an overridden proximity window.
    pub fn with_window(window: usize) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    /// Validate the configuration, returning field-scoped errors.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(MentionError::config_field(
                "proximity window must be at least 1 token",
                "window",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractionConfig::default();
        assert_eq!(config.window, 12);
        assert!(config.cross_sentence);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = ExtractionConfig::with_window(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window"));
    }
}
