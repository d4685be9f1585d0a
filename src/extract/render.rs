//! Canonical display labels for extracted mentions.
//!
//! Formatting is vendor-specific: Anthropic mentions render as
//! `"Claude {version} {Tier}"` with missing parts omitted, OpenAI numeric
//! versions as `"GPT-{version}"` and reasoning codes fully uppercased.
//! Other vendors fall back to a capitalized family, tier, or vendor name.

use crate::extract::gate::Mention;

/// Capitalize the first character, leaving the rest untouched.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Format a single mention as a display label, or `None` when the mention
/// has nothing renderable.
pub fn format_label(mention: &Mention) -> Option<String> {
    match mention.vendor.as_deref() {
        Some("anthropic") => {
            let mut parts = vec!["Claude".to_string()];
            if let Some(version) = &mention.version {
                parts.push(version.clone());
            }
            if let Some(tier) = &mention.tier {
                parts.push(capitalize(tier));
            }
            Some(parts.join(" "))
        }
        Some("openai") => match &mention.version {
            Some(version) if version.starts_with('o') => Some(version.to_uppercase()),
            Some(version) => Some(format!("GPT-{version}")),
            None => Some("OpenAI".to_string()),
        },
        Some(vendor) => {
            // Fallback: family, then tier, then the bare vendor name
            if let Some(family) = &mention.family {
                Some(capitalize(family))
            } else if let Some(tier) = &mention.tier {
                Some(capitalize(tier))
            } else {
                Some(capitalize(vendor))
            }
        }
        None => mention.tier.as_deref().map(capitalize),
    }
}

/// Select the best mention and render it: highest confidence first, ties
/// broken by earliest span start, then by the more complete mention
/// (version plus tier beats version alone).
pub fn best_model_label(mentions: &[Mention]) -> Option<String> {
    mentions
        .iter()
        .filter(|m| format_label(m).is_some())
        .max_by(|a, b| {
            a.confidence
                .cmp(&b.confidence)
                .then_with(|| b.span.start.cmp(&a.span.start))
                .then_with(|| a.completeness().cmp(&b.completeness()))
        })
        .and_then(format_label)
}
