//! Validity gating and confidence scoring.
//!
//! The gate is the single point of semantic truth: a structurally
//! well-formed combination only becomes a [`Mention`] after its components
//! survive the validity matrix. Invalid components are dropped (and
//! reported back to the pipeline so other anchors may reuse them), never
//! silently accepted; a cross-vendor (vendor, tier) pair can therefore
//! never reach a high-confidence mention.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::extract::associate::{Anchor, RawCombination};
use crate::extract::lexicon::{Lexicon, VersionShape};
use crate::extract::scan::{Candidate, CandidateKind};
use crate::extract::tokenize::{Span, TokenizedText};

/// Engine-assessed reliability of a mention.
///
/// `High` requires a resolved family plus at least one matrix-validated
/// version or tier; `Medium` is family-only or an anchored partial with an
/// inferred vendor; `Low` is any weaker partial still surfaced. Variants
/// are declared weakest-first so the derived ordering ranks `High`
/// highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Weak partial match (no vendor could be resolved)
    Low,
    /// Family or vendor resolved, but no matrix-validated combination
    Medium,
    /// Family plus a matrix-validated version and/or tier
    High,
}

/// One extracted model mention. Created transiently per extraction call
/// and never persisted by the engine; serialization (with these exact
/// field names) is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    /// Owning vendor, when resolved ("anthropic")
    pub vendor: Option<String>,
    /// Family token, matched or canonical for the vendor ("claude")
    pub family: Option<String>,
    /// Validated or surfaced version token ("3.5", "o3-mini")
    pub version: Option<String>,
    /// Validated or surfaced tier token ("sonnet")
    pub tier: Option<String>,
    /// Engine-assessed reliability
    pub confidence: Confidence,
    /// Sentence text the mention was extracted from
    pub source_text: String,
    /// Token range covered by the mention's hits
    pub span: Span,
}

impl Mention {
    /// Number of optional identity components present; used as the final
    /// renderer tie-break so a version+tier mention beats a version-only
    /// one at equal confidence and position.
    pub fn completeness(&self) -> usize {
        usize::from(self.version.is_some()) + usize::from(self.tier.is_some())
    }
}

/// Gate output: the mention (if any survived) plus which candidate hits
/// it actually kept, so the pipeline can release dropped components to
/// the fallback anchor passes.
#[derive(Debug, Clone)]
pub struct GatedCombination {
    /// Surviving mention, `None` when the combination was rejected
    pub mention: Option<Mention>,
    /// Candidate index of the version the mention kept
    pub kept_version: Option<usize>,
    /// Candidate index of the tier the mention kept
    pub kept_tier: Option<usize>,
}

impl GatedCombination {
    fn rejected() -> Self {
        Self {
            mention: None,
            kept_version: None,
            kept_tier: None,
        }
    }
}

struct VersionHit<'a> {
    idx: usize,
    version: &'a str,
    shape: VersionShape,
}

struct TierHit<'a> {
    idx: usize,
    tier: &'a str,
    scope: Option<&'a str>,
}

fn version_hit<'a>(candidates: &'a [Candidate], idx: Option<usize>) -> Option<VersionHit<'a>> {
    let idx = idx?;
    match &candidates[idx].kind {
        CandidateKind::Version { version, shape } => Some(VersionHit {
            idx,
            version,
            shape: *shape,
        }),
        _ => None,
    }
}

fn tier_hit<'a>(candidates: &'a [Candidate], idx: Option<usize>) -> Option<TierHit<'a>> {
    let idx = idx?;
    match &candidates[idx].kind {
        CandidateKind::Tier { tier, vendor } => Some(TierHit {
            idx,
            tier,
            scope: vendor.as_deref(),
        }),
        _ => None,
    }
}

/// Gate one raw combination against the validity matrix.
pub fn gate(
    raw: &RawCombination,
    candidates: &[Candidate],
    tokenized: &TokenizedText,
    lexicon: &Lexicon,
) -> GatedCombination {
    let family = raw.family.map(|idx| match &candidates[idx].kind {
        CandidateKind::Family { vendor, family } => (idx, vendor.as_str(), family.as_str()),
        _ => unreachable!("family slot always references a family hit"),
    });
    let mut version = version_hit(candidates, raw.version);
    let mut tier = tier_hit(candidates, raw.tier);

    // Resolve the vendor from the strongest available signal
    let vendor: Option<&str> = match (family, raw.anchor) {
        (Some((_, vendor, _)), _) => Some(vendor),
        (None, Anchor::Tier) => tier.as_ref().and_then(|t| t.scope),
        (None, Anchor::Version) => version
            .as_ref()
            .and_then(|v| lexicon.infer_vendor(v.version)),
        (None, Anchor::Family) => None,
    };

    let Some(vendor) = vendor else {
        // No vendor signal at all: surface what we have as a weak partial
        return build(
            raw,
            candidates,
            tokenized,
            lexicon,
            None,
            family,
            version,
            tier,
            Confidence::Low,
        );
    };

    // Cross-vendor tiers are contradictions, not products
    if tier
        .as_ref()
        .is_some_and(|t| !lexicon.tier_compatible(vendor, t.tier))
    {
        trace!(vendor, "dropping cross-vendor tier");
        tier = None;
    }

    let version_token = version.as_ref().map(|v| v.version);
    let tier_token = tier.as_ref().map(|t| t.tier);
    let mut validated = false;
    match (version_token, tier_token) {
        (Some(v), Some(t)) => {
            if lexicon.triple_valid(vendor, v, t) {
                validated = true;
            } else if lexicon.version_valid(vendor, v) {
                // Keep the validated pair, release the tier
                tier = None;
                validated = true;
            } else {
                // Version failed for this vendor; the compatible tier
                // stays, validated only if the matrix knows the pair
                validated = lexicon.tier_valid(vendor, t);
                version = None;
            }
        }
        (Some(v), None) => {
            if lexicon.version_valid(vendor, v) {
                validated = true;
            } else {
                version = None;
            }
        }
        (None, Some(t)) => {
            // Compatibility was already enforced; validation decides
            // whether the pair counts toward high confidence
            validated = lexicon.tier_valid(vendor, t);
        }
        (None, None) => {}
    }

    let confidence = match raw.anchor {
        Anchor::Family => {
            if validated {
                Confidence::High
            } else {
                Confidence::Medium
            }
        }
        Anchor::Tier => Confidence::Medium,
        Anchor::Version => match &version {
            // A reasoning code names a product unambiguously even without
            // a family token nearby
            Some(v) if validated && v.shape == VersionShape::ReasoningCode => Confidence::High,
            Some(_) => Confidence::Medium,
            // The anchor itself was invalid; nothing worth surfacing
            None => return GatedCombination::rejected(),
        },
    };

    build(
        raw,
        candidates,
        tokenized,
        lexicon,
        Some(vendor),
        family,
        version,
        tier,
        confidence,
    )
}

#[allow(clippy::too_many_arguments)]
fn build(
    raw: &RawCombination,
    candidates: &[Candidate],
    tokenized: &TokenizedText,
    lexicon: &Lexicon,
    vendor: Option<&str>,
    family: Option<(usize, &str, &str)>,
    version: Option<VersionHit<'_>>,
    tier: Option<TierHit<'_>>,
    confidence: Confidence,
) -> GatedCombination {
    let anchor_idx = raw
        .family
        .or(raw.tier)
        .or(raw.version)
        .expect("a raw combination always has an anchor hit");
    let mut span = Span::point(candidates[anchor_idx].position);
    for idx in [
        family.as_ref().map(|f| f.0),
        version.as_ref().map(|v| v.idx),
        tier.as_ref().map(|t| t.idx),
    ]
    .into_iter()
    .flatten()
    {
        span = span.merge(&Span::point(candidates[idx].position));
    }

    // Canonical family stands in when the vendor was inferred
    let family_name = family.map(|(_, _, name)| name.to_string()).or_else(|| {
        vendor
            .and_then(|v| lexicon.canonical_family(v))
            .map(str::to_string)
    });

    GatedCombination {
        kept_version: version.as_ref().map(|v| v.idx),
        kept_tier: tier.as_ref().map(|t| t.idx),
        mention: Some(Mention {
            vendor: vendor.map(str::to_string),
            family: family_name,
            version: version.map(|v| v.version.to_string()),
            tier: tier.map(|t| t.tier.to_string()),
            confidence,
            source_text: tokenized
                .sentence_text(raw.sentence)
                .unwrap_or_default()
                .to_string(),
            span,
        }),
    }
}
