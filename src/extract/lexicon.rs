//! Static vocabulary and validity tables for mention extraction.
//!
//! The lexicon holds four tables: family patterns (surface token to vendor),
//! tier patterns (surface token to an optional owning vendor), a canonical
//! family per vendor used for rendering and vendor inference, and the
//! validity matrix of allowed `(vendor, version, tier)` rows. All matching
//! logic lives elsewhere; adding a vendor or model is a data change here,
//! not a code change.
//!
//! The lexicon is read-only after construction and shared behind an `Arc`,
//! so concurrent extraction calls need no locking.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::errors::{MentionError, Result};

/// Shape class of a version token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionShape {
    /// Plain numeric release like "3", "3.5", "4.1"
    Numeric,
    /// OpenAI reasoning-model code like "o3", "o4", "o3-mini"
    ReasoningCode,
}

/// Classify `token` as a version token, if it has a recognized shape.
///
/// Implemented as anchored character scans over an intentionally narrow
/// grammar: a major digit `3`/`4` with an optional single-digit minor, or
/// `o3`/`o4` with an optional `-mini` suffix. Everything else (including
/// "8" or "4.5.1") is rejected here; the validity matrix decides which of
/// the surviving shapes name real products.
pub fn version_shape(token: &str) -> Option<VersionShape> {
    let bytes = token.as_bytes();
    match bytes {
        [b'3' | b'4'] => Some(VersionShape::Numeric),
        [b'3' | b'4', b'.', minor] if minor.is_ascii_digit() => Some(VersionShape::Numeric),
        [b'o' | b'O', b'3' | b'4'] => Some(VersionShape::ReasoningCode),
        [b'o' | b'O', b'3' | b'4', rest @ ..] if rest.eq_ignore_ascii_case(b"-mini") => {
            Some(VersionShape::ReasoningCode)
        }
        _ => None,
    }
}

/// One allowed `(vendor, version, tier)` combination. `None` marks an
/// absent component, so `("anthropic", None, Some("sonnet"))` allows a
/// version-less "Claude Sonnet".
pub type MatrixRow = (String, Option<String>, Option<String>);

/// Raw lexicon tables, serde-friendly so alternative vocabularies can be
/// loaded from configuration. Convert into a [`Lexicon`] with
/// [`Lexicon::from_data`], which validates referential integrity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconData {
    /// Family surface token to vendor ("claude" -> "anthropic")
    pub families: Vec<(String, String)>,
    /// Tier surface token to owning vendor; `None` means the tier word is
    /// ambiguous and carries no vendor prior ("pro")
    pub tiers: Vec<(String, Option<String>)>,
    /// Canonical family token per vendor, used for rendering and for
    /// inferred-vendor mentions
    pub canonical_families: Vec<(String, String)>,
    /// Allowed (vendor, version, tier) combinations
    pub matrix: Vec<MatrixRow>,
    /// Version-prefix vendor priors for standalone version tokens
    /// ("o" -> "openai", "3" -> "anthropic")
    pub version_priors: Vec<(String, String)>,
}

impl LexiconData {
    /// The built-in vocabulary covering the vendors and models the engine
    /// ships with.
    pub fn builtin() -> Self {
        let s = str::to_string;
        Self {
            families: vec![
                (s("claude"), s("anthropic")),
                (s("anthropic"), s("anthropic")),
                (s("gpt"), s("openai")),
                (s("openai"), s("openai")),
                (s("gemini"), s("google")),
                (s("llama"), s("meta")),
                (s("mistral"), s("mistral")),
                (s("qwen"), s("alibaba")),
                (s("deepseek"), s("deepseek")),
            ],
            tiers: vec![
                (s("sonnet"), Some(s("anthropic"))),
                (s("haiku"), Some(s("anthropic"))),
                (s("opus"), Some(s("anthropic"))),
                // weak prior: "mini" usually means an OpenAI variant
                (s("mini"), Some(s("openai"))),
                (s("pro"), None),
            ],
            canonical_families: vec![
                (s("anthropic"), s("claude")),
                (s("openai"), s("gpt")),
                (s("google"), s("gemini")),
                (s("meta"), s("llama")),
                (s("mistral"), s("mistral")),
                (s("alibaba"), s("qwen")),
                (s("deepseek"), s("deepseek")),
            ],
            matrix: vec![
                (s("anthropic"), Some(s("3.5")), Some(s("sonnet"))),
                (s("anthropic"), Some(s("3.5")), Some(s("haiku"))),
                (s("anthropic"), Some(s("3")), Some(s("opus"))),
                (s("anthropic"), None, Some(s("sonnet"))),
                (s("anthropic"), None, Some(s("haiku"))),
                (s("anthropic"), None, Some(s("opus"))),
                (s("openai"), Some(s("4.1")), None),
                (s("openai"), Some(s("4.5")), None),
                (s("openai"), Some(s("o3")), None),
                (s("openai"), Some(s("o4")), None),
                (s("openai"), Some(s("o3-mini")), None),
            ],
            version_priors: vec![
                (s("o"), s("openai")),
                (s("4"), s("openai")),
                (s("3"), s("anthropic")),
            ],
        }
    }
}

impl Default for LexiconData {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Validated, lookup-optimized vocabulary tables.
#[derive(Debug)]
pub struct Lexicon {
    families: AHashMap<String, String>,
    tiers: AHashMap<String, Option<String>>,
    canonical: AHashMap<String, String>,
    matrix: AHashSet<MatrixRow>,
    version_priors: Vec<(String, String)>,
}

impl Lexicon {
    /// Build a lexicon from raw tables, validating referential integrity.
    ///
    /// This is the single fatal-at-init surface of the engine: a tier or
    /// matrix row referencing a vendor with no family pattern, a matrix
    /// version with an unrecognized shape, or a matrix tier missing from
    /// the tier table are all reported as lexicon errors here and can
    /// never surface per extraction call.
    pub fn from_data(data: LexiconData) -> Result<Self> {
        let mut families = AHashMap::new();
        for (token, vendor) in data.families {
            families.insert(token.to_lowercase(), vendor.to_lowercase());
        }
        if families.is_empty() {
            return Err(MentionError::lexicon("family table is empty"));
        }

        let vendors: AHashSet<&String> = families.values().collect();
        let check_vendor = |vendor: &String, context: &str| -> Result<()> {
            if vendors.contains(vendor) {
                Ok(())
            } else {
                Err(MentionError::lexicon_entry(
                    format!("{context} references vendor '{vendor}' with no family pattern"),
                    vendor.clone(),
                ))
            }
        };

        let mut tiers = AHashMap::new();
        for (token, scope) in data.tiers {
            let scope = scope.map(|v| v.to_lowercase());
            if let Some(vendor) = &scope {
                check_vendor(vendor, "tier")?;
            }
            tiers.insert(token.to_lowercase(), scope);
        }

        let mut canonical = AHashMap::new();
        for (vendor, family) in data.canonical_families {
            let vendor = vendor.to_lowercase();
            let family = family.to_lowercase();
            check_vendor(&vendor, "canonical family")?;
            if !families.contains_key(&family) {
                return Err(MentionError::lexicon_entry(
                    format!("canonical family '{family}' is not a family pattern"),
                    family,
                ));
            }
            canonical.insert(vendor, family);
        }

        let mut matrix = AHashSet::new();
        for (vendor, version, tier) in data.matrix {
            let vendor = vendor.to_lowercase();
            check_vendor(&vendor, "validity matrix row")?;
            let version = version.map(|v| v.to_lowercase());
            if let Some(v) = &version {
                if version_shape(v).is_none() {
                    return Err(MentionError::lexicon_entry(
                        format!("matrix version '{v}' does not match any version shape"),
                        v.clone(),
                    ));
                }
            }
            let tier = tier.map(|t| t.to_lowercase());
            if let Some(t) = &tier {
                if !tiers.contains_key(t) {
                    return Err(MentionError::lexicon_entry(
                        format!("matrix tier '{t}' is not a tier pattern"),
                        t.clone(),
                    ));
                }
            }
            matrix.insert((vendor, version, tier));
        }

        let mut version_priors = Vec::new();
        for (prefix, vendor) in data.version_priors {
            let vendor = vendor.to_lowercase();
            check_vendor(&vendor, "version prior")?;
            version_priors.push((prefix.to_lowercase(), vendor));
        }

        Ok(Self {
            families,
            tiers,
            canonical,
            matrix,
            version_priors,
        })
    }

    /// The process-wide lexicon built from [`LexiconData::builtin`].
    pub fn shared() -> Arc<Lexicon> {
        static SHARED: Lazy<Arc<Lexicon>> = Lazy::new(|| {
            Arc::new(
                Lexicon::from_data(LexiconData::builtin())
                    .expect("builtin lexicon tables are internally consistent"),
            )
        });
        Arc::clone(&SHARED)
    }

    /// Vendor owning `token` if it is a family pattern (case-insensitive
    /// lookups expect an already-lowercased token).
    pub fn family_vendor(&self, token: &str) -> Option<&str> {
        self.families.get(token).map(String::as_str)
    }

    /// Tier scope for `token`: `Some(Some(vendor))` for a vendor-owned
    /// tier, `Some(None)` for an ambiguous tier, `None` when the token is
    /// not a tier pattern.
    pub fn tier_scope(&self, token: &str) -> Option<Option<&str>> {
        self.tiers.get(token).map(|scope| scope.as_deref())
    }

    /// Canonical family token for `vendor`, used when a mention's vendor
    /// was inferred rather than matched from a family pattern.
    pub fn canonical_family(&self, vendor: &str) -> Option<&str> {
        self.canonical.get(vendor).map(String::as_str)
    }

    /// Infer a vendor for a standalone version token from its prefix.
    pub fn infer_vendor(&self, version: &str) -> Option<&str> {
        self.version_priors
            .iter()
            .find(|(prefix, _)| version.starts_with(prefix.as_str()))
            .map(|(_, vendor)| vendor.as_str())
    }

    /// True when the exact `(vendor, version, tier)` row is allowed.
    pub fn triple_valid(&self, vendor: &str, version: &str, tier: &str) -> bool {
        self.matrix.contains(&(
            vendor.to_string(),
            Some(version.to_string()),
            Some(tier.to_string()),
        ))
    }

    /// True when `version` appears in any matrix row for `vendor`.
    pub fn version_valid(&self, vendor: &str, version: &str) -> bool {
        self.matrix
            .iter()
            .any(|(v, ver, _)| v == vendor && ver.as_deref() == Some(version))
    }

    /// True when `tier` appears in any matrix row for `vendor`.
    pub fn tier_valid(&self, vendor: &str, tier: &str) -> bool {
        self.matrix
            .iter()
            .any(|(v, _, t)| v == vendor && t.as_deref() == Some(tier))
    }

    /// True when pairing `tier` with `vendor` is not a cross-vendor
    /// contradiction: the tier is either owned by `vendor` or ambiguous.
    pub fn tier_compatible(&self, vendor: &str, tier: &str) -> bool {
        match self.tiers.get(tier) {
            Some(Some(owner)) => owner == vendor,
            Some(None) => true,
            None => false,
        }
    }
}
