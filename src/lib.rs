//! # Model-Mentions: AI Model Mention Extraction Engine
//!
//! A high-performance engine for finding mentions of AI model products in
//! free-form text and resolving each to a structured identity. Given a
//! post title or body, the engine identifies mentions like "Claude 3.5
//! Sonnet", "GPT-4.5" or "o3-mini", assigns vendor, family, version and
//! tier plus a confidence level, and renders the single best label for
//! display.
//!
//! ## Architecture
//!
//! ```text
//! Tokenizer → Candidate Scanner → Proximity Associator → Validity Gate
//!                                                             │
//!                                          Mentions ──→ Label Renderer
//! ```
//!
//! Data flows one way; every stage consumes immutable input and produces a
//! new output. The vocabulary (family patterns, tier patterns, version
//! shapes and the validity matrix of real products) lives in a read-only
//! [`Lexicon`] shared across threads, so concurrent extraction needs no
//! locking. The validity matrix is the single point of semantic truth:
//! structurally plausible but cross-vendor combinations ("GPT Sonnet")
//! are stripped down rather than surfaced as confident mentions.
//!
//! ## Quick Start
//!
//! ```rust
//! use model_mentions::{best_model_label, ModelMentionExtractor};
//!
//! let extractor = ModelMentionExtractor::new();
//! let mentions = extractor.extract("Claude 3.5 Sonnet just shipped.");
//! assert_eq!(
//!     best_model_label(&mentions).as_deref(),
//!     Some("Claude 3.5 Sonnet")
//! );
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Core configuration and error types
pub mod core {
    //! Configuration and error handling.

    pub mod config;
    pub mod errors;
}

// Extraction pipeline stages
pub mod extract {
    //! The extraction pipeline, one module per stage.

    pub mod associate;
    pub mod claude_versions;
    pub mod gate;
    pub mod lexicon;
    pub mod pipeline;
    pub mod render;
    pub mod scan;
    pub mod tokenize;
}

// Convenience re-exports of the primary public API
pub use crate::core::config::ExtractionConfig;
pub use crate::core::errors::{MentionError, Result};
pub use crate::extract::claude_versions::extract_claude_version;
pub use crate::extract::gate::{Confidence, Mention};
pub use crate::extract::lexicon::{Lexicon, LexiconData};
pub use crate::extract::pipeline::{extract_model_mentions, ModelMentionExtractor};
pub use crate::extract::render::{best_model_label, format_label};
