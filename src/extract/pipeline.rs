//! Extraction pipeline: tokenize, scan, associate, gate, combine.
//!
//! Data flows one way through the stages; each stage consumes immutable
//! input and produces a new output. The pipeline owns the bookkeeping of
//! which hits were consumed by which anchor pass:
//!
//! 1. family-anchored association (primary),
//! 2. tier-anchored fallback for tiers no family kept,
//! 3. version-anchored fallback for versions no mention kept,
//! 4. deferred family-only anchors (skipped when their sentence already
//!    produced a mention for the same vendor),
//! 5. cross-sentence combination across exactly one sentence boundary.
//!
//! Components dropped by the gate are released back into the later passes
//! rather than lost, so "GPT Sonnet" still surfaces an anthropic tier
//! mention after the cross-vendor tier is stripped from the GPT
//! combination.

use std::sync::Arc;

use ahash::AHashSet;
use tracing::debug;

use crate::core::config::ExtractionConfig;
use crate::core::errors::Result;
use crate::extract::associate::Associator;
use crate::extract::gate::{gate, Confidence, Mention};
use crate::extract::lexicon::Lexicon;
use crate::extract::render::best_model_label;
use crate::extract::scan::scan;
use crate::extract::tokenize::{tokenize, TokenizedText};

/// Stateless extraction engine over a shared read-only lexicon.
///
/// Each call is pure CPU-bound work over one text; instances are cheap to
/// clone and safe to use from many threads concurrently.
#[derive(Debug, Clone)]
pub struct ModelMentionExtractor {
    config: ExtractionConfig,
    lexicon: Arc<Lexicon>,
}

impl Default for ModelMentionExtractor {
    fn default() -> Self {
        Self {
            config: ExtractionConfig::default(),
            lexicon: Lexicon::shared(),
        }
    }
}

impl ModelMentionExtractor {
    /// Extractor with the built-in lexicon and default window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor with an overridden configuration.
    pub fn with_config(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            lexicon: Lexicon::shared(),
        })
    }

    /// Extractor with a custom lexicon, for callers that load their own
    /// vocabulary tables.
    pub fn with_lexicon(config: ExtractionConfig, lexicon: Arc<Lexicon>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, lexicon })
    }

    /// Active configuration.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract all model mentions from one text, ordered by anchor pass
    /// and position. Never fails: text without recognized vocabulary
    /// yields an empty list.
    pub fn extract(&self, text: &str) -> Vec<Mention> {
        let tokenized = tokenize(text);
        let candidates = scan(&tokenized, &self.lexicon);
        if candidates.is_empty() {
            return Vec::new();
        }

        let associator = Associator::new(&candidates, self.config.window);
        let mut mentions: Vec<Mention> = Vec::new();
        let mut kept_versions: AHashSet<usize> = AHashSet::new();
        let mut kept_tiers: AHashSet<usize> = AHashSet::new();
        let mut family_only: Vec<Mention> = Vec::new();

        // Pass 1: family-anchored. Gating runs inside the loop so partners
        // released by one family hit stay available to the next.
        for (idx, candidate) in candidates.iter().enumerate() {
            if !candidate.is_family() {
                continue;
            }
            let raw = associator.associate_family(idx, &kept_versions, &kept_tiers);
            let gated = gate(&raw, &candidates, &tokenized, &self.lexicon);
            kept_versions.extend(gated.kept_version);
            kept_tiers.extend(gated.kept_tier);
            if let Some(mention) = gated.mention {
                if mention.version.is_none() && mention.tier.is_none() {
                    family_only.push(mention);
                } else {
                    mentions.push(mention);
                }
            }
        }

        // Pass 2: tier-anchored fallback
        for &idx in associator.tier_indices() {
            if kept_tiers.contains(&idx) {
                continue;
            }
            let raw = associator.associate_tier(idx, &kept_versions);
            let gated = gate(&raw, &candidates, &tokenized, &self.lexicon);
            kept_versions.extend(gated.kept_version);
            kept_tiers.extend(gated.kept_tier);
            mentions.extend(gated.mention);
        }

        // Pass 3: version-anchored fallback
        for &idx in associator.version_indices() {
            if kept_versions.contains(&idx) {
                continue;
            }
            let raw = associator.associate_version(idx);
            let gated = gate(&raw, &candidates, &tokenized, &self.lexicon);
            kept_versions.extend(gated.kept_version);
            mentions.extend(gated.mention);
        }

        // Pass 4: family-only anchors, one per vendor and sentence
        for mention in family_only {
            let duplicate = mentions.iter().any(|m| {
                m.vendor == mention.vendor
                    && m.span.start.sentence == mention.span.start.sentence
            });
            if !duplicate {
                mentions.push(mention);
            }
        }

        // Pass 5: cross-sentence combination
        if self.config.cross_sentence {
            let combined =
                cross_sentence_pass(&mentions, &associator, &tokenized, &self.lexicon);
            mentions.extend(combined);
        }

        debug!(
            mentions = mentions.len(),
            candidates = candidates.len(),
            "extraction complete"
        );
        mentions
    }

    /// Extract from a post's title and body as one text, title first.
    pub fn extract_post(&self, title: &str, body: &str) -> Vec<Mention> {
        let title = title.trim();
        let body = body.trim();
        if body.is_empty() {
            self.extract(title)
        } else if title.is_empty() {
            self.extract(body)
        } else {
            self.extract(&format!("{title} {body}"))
        }
    }

    /// Render the single best label for a text, if any mention was found.
    pub fn best_label(&self, text: &str) -> Option<String> {
        best_model_label(&self.extract(text))
    }
}

/// Secondary associator pass: combine a (vendor, version) mention with a
/// (vendor, tier) mention from the directly following sentence, in either
/// direction, when the borrowing sentence has no family hit of its own.
/// Combined candidates must be matrix-valid as a full triple and are added
/// alongside the originals, never replacing them.
fn cross_sentence_pass(
    mentions: &[Mention],
    associator: &Associator<'_>,
    tokenized: &TokenizedText,
    lexicon: &Lexicon,
) -> Vec<Mention> {
    let mut combined: Vec<Mention> = Vec::new();

    let mut try_combine = |versioned: &Mention, tiered: &Mention, partner_sentence: usize| {
        let (Some(vendor), Some(version), Some(tier)) =
            (&versioned.vendor, &versioned.version, &tiered.tier)
        else {
            return;
        };
        if tiered.vendor.as_ref() != Some(vendor) {
            return;
        }
        if associator.sentence_has_family(partner_sentence) {
            return;
        }
        if !lexicon.triple_valid(vendor, version, tier) {
            return;
        }
        let duplicate = mentions.iter().chain(combined.iter()).any(|m| {
            m.vendor.as_ref() == Some(vendor)
                && m.version.as_ref() == Some(version)
                && m.tier.as_ref() == Some(tier)
        });
        if duplicate {
            return;
        }

        let first = if versioned.span.start <= tiered.span.start {
            versioned
        } else {
            tiered
        };
        let second = if std::ptr::eq(first, versioned) {
            tiered
        } else {
            versioned
        };
        let source_text = match (
            tokenized.sentence_text(first.span.start.sentence),
            tokenized.sentence_text(second.span.start.sentence),
        ) {
            (Some(a), Some(b)) => format!("{a} {b}"),
            _ => first.source_text.clone(),
        };

        combined.push(Mention {
            vendor: Some(vendor.clone()),
            family: versioned.family.clone().or_else(|| {
                lexicon.canonical_family(vendor).map(str::to_string)
            }),
            version: Some(version.clone()),
            tier: Some(tier.clone()),
            confidence: Confidence::High,
            source_text,
            span: versioned.span.merge(&tiered.span),
        });
    };

    for m1 in mentions {
        let s1 = m1.span.start.sentence;
        for m2 in mentions {
            let s2 = m2.span.start.sentence;
            if s2 != s1 + 1 {
                continue;
            }
            // version in sentence i, tier borrowed from sentence i+1
            if m1.version.is_some() && m1.tier.is_none() && m2.tier.is_some()
                && m2.version.is_none()
            {
                try_combine(m1, m2, s2);
            }
            // tier in sentence i, version borrowed from sentence i+1
            if m1.tier.is_some() && m1.version.is_none() && m2.version.is_some()
                && m2.tier.is_none()
            {
                try_combine(m2, m1, s2);
            }
        }
    }

    combined
}

/// Extract model mentions from a post title and optional body text using
/// the built-in lexicon and default window.
pub fn extract_model_mentions(title: &str, body: &str) -> Vec<Mention> {
    ModelMentionExtractor::new().extract_post(title, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::lexicon::LexiconData;

    fn labels(mentions: &[Mention]) -> Vec<String> {
        mentions
            .iter()
            .filter_map(|m| crate::extract::render::format_label(m))
            .collect()
    }

    #[test]
    fn test_valid_triple_single_high_mention() {
        let mentions = ModelMentionExtractor::new().extract("Claude 3.5 Sonnet just shipped.");
        assert_eq!(mentions.len(), 1);
        let m = &mentions[0];
        assert_eq!(m.vendor.as_deref(), Some("anthropic"));
        assert_eq!(m.family.as_deref(), Some("claude"));
        assert_eq!(m.version.as_deref(), Some("3.5"));
        assert_eq!(m.tier.as_deref(), Some("sonnet"));
        assert_eq!(m.confidence, Confidence::High);
        assert_eq!(best_model_label(&mentions).as_deref(), Some("Claude 3.5 Sonnet"));
    }

    #[test]
    fn test_compound_token_high_mention() {
        let mentions = ModelMentionExtractor::new().extract("GPT-4.5 is out now.");
        assert_eq!(mentions.len(), 1);
        let m = &mentions[0];
        assert_eq!(m.vendor.as_deref(), Some("openai"));
        assert_eq!(m.version.as_deref(), Some("4.5"));
        assert_eq!(m.tier, None);
        assert_eq!(m.confidence, Confidence::High);
        assert_eq!(best_model_label(&mentions).as_deref(), Some("GPT-4.5"));
    }

    #[test]
    fn test_reasoning_code_high_without_family() {
        let mentions = ModelMentionExtractor::new().extract("o3-mini handles this well.");
        assert_eq!(mentions.len(), 1);
        let m = &mentions[0];
        assert_eq!(m.vendor.as_deref(), Some("openai"));
        assert_eq!(m.version.as_deref(), Some("o3-mini"));
        assert_eq!(m.confidence, Confidence::High);
        assert_eq!(best_model_label(&mentions).as_deref(), Some("O3-MINI"));
    }

    #[test]
    fn test_cross_vendor_tier_never_high_combined() {
        let mentions =
            ModelMentionExtractor::new().extract("I like GPT Sonnet style responses.");
        // No mention may carry the openai vendor together with the sonnet tier
        assert!(mentions.iter().all(|m| {
            !(m.vendor.as_deref() == Some("openai") && m.tier.as_deref() == Some("sonnet"))
        }));
        let gpt = mentions
            .iter()
            .find(|m| m.vendor.as_deref() == Some("openai"))
            .expect("family mention survives");
        assert_eq!(gpt.confidence, Confidence::Medium);
        assert_eq!(gpt.tier, None);
    }

    #[test]
    fn test_family_only_medium() {
        let mentions = ModelMentionExtractor::new().extract("Claude announced new pricing.");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].confidence, Confidence::Medium);
        assert_eq!(best_model_label(&mentions).as_deref(), Some("Claude"));
    }

    #[test]
    fn test_no_vocabulary_no_mentions() {
        let mentions = ModelMentionExtractor::new().extract("Nothing interesting here.");
        assert!(mentions.is_empty());
        assert_eq!(best_model_label(&mentions), None);
    }

    #[test]
    fn test_cross_sentence_combination() {
        let extractor = ModelMentionExtractor::new();
        let mentions = extractor.extract_post("Claude 3.5 just dropped.", "Sonnet is fantastic.");
        let all_labels = labels(&mentions);
        assert!(all_labels.contains(&"Claude 3.5 Sonnet".to_string()));
        assert_eq!(
            best_model_label(&mentions).as_deref(),
            Some("Claude 3.5 Sonnet")
        );
    }

    #[test]
    fn test_cross_sentence_disabled_by_config() {
        let config = ExtractionConfig {
            cross_sentence: false,
            ..ExtractionConfig::default()
        };
        let extractor = ModelMentionExtractor::with_config(config).unwrap();
        let mentions = extractor.extract("Claude 3.5 just dropped. Sonnet is fantastic.");
        assert!(!labels(&mentions).contains(&"Claude 3.5 Sonnet".to_string()));
    }

    #[test]
    fn test_cross_sentence_tier_first_direction() {
        // Tier in sentence one borrows the version from sentence two
        let mentions =
            ModelMentionExtractor::new().extract("Sonnet is great. 3.5 dropped today.");
        let all_labels = labels(&mentions);
        assert!(all_labels.contains(&"Claude 3.5 Sonnet".to_string()));
        assert_eq!(
            best_model_label(&mentions).as_deref(),
            Some("Claude 3.5 Sonnet")
        );
    }

    #[test]
    fn test_cross_sentence_tier_first_blocked_by_partner_family() {
        // The version's sentence has its own family anchor, so the tier
        // does not borrow from it
        let mentions =
            ModelMentionExtractor::new().extract("Sonnet is great. Claude 3.5 dropped today.");
        assert!(!labels(&mentions).contains(&"Claude 3.5 Sonnet".to_string()));
    }

    #[test]
    fn test_cross_sentence_not_across_two_boundaries() {
        let mentions = ModelMentionExtractor::new()
            .extract("Claude 3.5 just dropped. Unrelated words here. Sonnet is fantastic.");
        assert!(!labels(&mentions).contains(&"Claude 3.5 Sonnet".to_string()));
    }

    #[test]
    fn test_cross_sentence_blocked_by_partner_family() {
        // Sentence two has its own family anchor, so its tier is not
        // borrowed backwards
        let mentions = ModelMentionExtractor::new()
            .extract("Claude 3.5 just dropped. GPT Sonnet talk continues.");
        assert!(!labels(&mentions).contains(&"Claude 3.5 Sonnet".to_string()));
    }

    #[test]
    fn test_multi_mention_text() {
        let mentions = ModelMentionExtractor::new()
            .extract("I use GPT-4.5 sometimes, but Sonnet feels faster.");
        let all_labels = labels(&mentions);
        assert!(all_labels.contains(&"GPT-4.5".to_string()));
        assert!(all_labels.contains(&"Claude Sonnet".to_string()));
    }

    #[test]
    fn test_standalone_version_and_tier() {
        let mentions = ModelMentionExtractor::new().extract("4.5 and Sonnet are both fast.");
        let all_labels = labels(&mentions);
        assert!(all_labels.contains(&"GPT-4.5".to_string()));
        assert!(all_labels.contains(&"Claude Sonnet".to_string()));
    }

    #[test]
    fn test_gpt8_false_positive_guard() {
        let mentions = ModelMentionExtractor::new().extract_post("OpenAI announces GPT-8!", "");
        let all_labels = labels(&mentions);
        assert!(!all_labels.iter().any(|l| l.contains('8')));
        assert!(all_labels.is_empty() || all_labels.contains(&"OpenAI".to_string()));
    }

    #[test]
    fn test_window_boundary() {
        let extractor = ModelMentionExtractor::new();
        let filler_11 = "w ".repeat(11);
        let at_window = format!("claude {filler_11}3.5 end");
        let mentions = extractor.extract(&at_window);
        assert!(mentions
            .iter()
            .any(|m| m.confidence == Confidence::High && m.version.as_deref() == Some("3.5")));

        let filler_12 = "w ".repeat(12);
        let past_window = format!("claude {filler_12}3.5 end");
        let mentions = extractor.extract(&past_window);
        assert!(!mentions
            .iter()
            .any(|m| m.confidence == Confidence::High && m.version.is_some()));
    }

    #[test]
    fn test_idempotence() {
        let extractor = ModelMentionExtractor::new();
        let text = "Claude 3.5 Sonnet vs GPT-4.5. o3-mini is also fine.";
        let first = extractor.extract(text);
        let second = extractor.extract(text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_family_tokens_collapse() {
        let mentions = ModelMentionExtractor::new().extract("Claude and Anthropic news.");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].vendor.as_deref(), Some("anthropic"));
    }

    #[test]
    fn test_custom_lexicon_extractor() {
        let mut data = LexiconData::builtin();
        data.families.push(("grok".into(), "xai".into()));
        data.canonical_families.push(("xai".into(), "grok".into()));
        let lexicon = Arc::new(Lexicon::from_data(data).unwrap());
        let extractor =
            ModelMentionExtractor::with_lexicon(ExtractionConfig::default(), lexicon).unwrap();

        let mentions = extractor.extract("Grok answered instantly.");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].vendor.as_deref(), Some("xai"));
        assert_eq!(mentions[0].family.as_deref(), Some("grok"));
        assert_eq!(mentions[0].confidence, Confidence::Medium);

        // The built-in vocabulary still works through the extended tables
        let mentions = extractor.extract("Claude 3.5 Sonnet just shipped.");
        assert_eq!(mentions[0].confidence, Confidence::High);
    }

    #[test]
    fn test_best_label_convenience() {
        let extractor = ModelMentionExtractor::new();
        assert_eq!(
            extractor
                .best_label("Claude 3.5 Sonnet just shipped.")
                .as_deref(),
            Some("Claude 3.5 Sonnet")
        );
        assert_eq!(extractor.best_label("Nothing interesting here."), None);
    }
}
