//! Candidate scanning: tagging tokens as family, tier, or version hits.
//!
//! A single linear pass over the token stream with O(1) lexicon lookups.
//! Family lookup takes priority over tier and version lookup so a vendor
//! name can never be re-read as a tier word; compound tokens of the form
//! `<family>-<version>` ("gpt-4.5") contribute a family hit and, when the
//! suffix has a recognized version shape, a version hit at the same
//! position. A compound with a bogus suffix ("gpt-8") therefore degrades
//! to a bare family hit instead of inventing a version.

use tracing::trace;

use crate::extract::lexicon::{version_shape, Lexicon, VersionShape};
use crate::extract::tokenize::{Position, TokenizedText};

/// What a scanned token was recognized as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    /// A family pattern hit ("claude", "gpt"), resolved to its vendor
    Family {
        /// Vendor owning the family
        vendor: String,
        /// The matched family token, lowercased
        family: String,
    },
    /// A tier pattern hit ("sonnet", "mini"), with its owning vendor when
    /// the tier word is vendor-scoped
    Tier {
        /// The matched tier token, lowercased
        tier: String,
        /// Owning vendor, `None` for ambiguous tiers
        vendor: Option<String>,
    },
    /// A version-shaped token ("3.5", "o3-mini"); carries no vendor by
    /// itself
    Version {
        /// The matched version token, lowercased
        version: String,
        /// Shape class of the version
        shape: VersionShape,
    },
}

/// A tagged candidate with the position of its originating token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Recognition result
    pub kind: CandidateKind,
    /// Sentence-grid position of the source token
    pub position: Position,
    /// Flat-stream index of the source token, used for window distances
    pub flat_index: usize,
}

impl Candidate {
    /// True for family hits.
    pub fn is_family(&self) -> bool {
        matches!(self.kind, CandidateKind::Family { .. })
    }

    /// True for tier hits.
    pub fn is_tier(&self) -> bool {
        matches!(self.kind, CandidateKind::Tier { .. })
    }

    /// True for version hits.
    pub fn is_version(&self) -> bool {
        matches!(self.kind, CandidateKind::Version { .. })
    }
}

/// Scan the token stream, producing candidates ordered by position.
pub fn scan(tokenized: &TokenizedText, lexicon: &Lexicon) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for token in &tokenized.tokens {
        let lower = token.text.to_lowercase();

        if let Some(vendor) = lexicon.family_vendor(&lower) {
            candidates.push(Candidate {
                kind: CandidateKind::Family {
                    vendor: vendor.to_string(),
                    family: lower,
                },
                position: token.position,
                flat_index: token.flat_index,
            });
            continue;
        }

        if let Some(scope) = lexicon.tier_scope(&lower) {
            candidates.push(Candidate {
                kind: CandidateKind::Tier {
                    tier: lower,
                    vendor: scope.map(str::to_string),
                },
                position: token.position,
                flat_index: token.flat_index,
            });
            continue;
        }

        if let Some(shape) = version_shape(&lower) {
            candidates.push(Candidate {
                kind: CandidateKind::Version {
                    version: lower,
                    shape,
                },
                position: token.position,
                flat_index: token.flat_index,
            });
            continue;
        }

        // Compound family-version token like "gpt-4.5" or "claude-3"
        if let Some((prefix, suffix)) = lower.split_once('-') {
            if let Some(vendor) = lexicon.family_vendor(prefix) {
                candidates.push(Candidate {
                    kind: CandidateKind::Family {
                        vendor: vendor.to_string(),
                        family: prefix.to_string(),
                    },
                    position: token.position,
                    flat_index: token.flat_index,
                });
                if let Some(shape) = version_shape(suffix) {
                    candidates.push(Candidate {
                        kind: CandidateKind::Version {
                            version: suffix.to_string(),
                            shape,
                        },
                        position: token.position,
                        flat_index: token.flat_index,
                    });
                }
            }
        }
    }

    trace!(candidates = candidates.len(), "candidate scan complete");
    candidates
}
