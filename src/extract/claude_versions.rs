//! Claude-specific version normalization.
//!
//! A narrower companion to the generic mention engine: given a post title
//! and body, find which Claude release is being discussed and return a
//! canonical display form ("Sonnet 4.5", "Claude 3.7", "Opus"). Matching
//! runs over an ordered pattern table, most specific first, so "Sonnet
//! 4.5" is never misread as "Claude 4.5". The earliest match in the text
//! wins; at equal positions the earlier table entry (the more specific
//! pattern) wins. Title text is scanned before body text.

use crate::extract::tokenize::tokenize;

/// One table entry: a head word, the words allowed to follow it (empty
/// for single-word patterns), and the canonical label it normalizes to.
struct VersionPattern {
    head: &'static str,
    follow: &'static [&'static str],
    label: &'static str,
}

/// Ordered by specificity: tier+version, then claude+version, then bare
/// tiers, then generic Claude references.
const PATTERNS: &[VersionPattern] = &[
    VersionPattern { head: "sonnet", follow: &["4.5", "4-5"], label: "Sonnet 4.5" },
    VersionPattern { head: "sonnet", follow: &["3.7", "3-7"], label: "Sonnet 3.7" },
    VersionPattern { head: "sonnet", follow: &["3.5", "3-5"], label: "Sonnet 3.5" },
    VersionPattern { head: "opus", follow: &["4.0", "4-0", "4"], label: "Opus 4" },
    VersionPattern { head: "opus", follow: &["3.5", "3-5"], label: "Opus 3.5" },
    VersionPattern { head: "haiku", follow: &["3.5", "3-5"], label: "Haiku 3.5" },
    VersionPattern { head: "claude", follow: &["3.7", "3-7"], label: "Claude 3.7" },
    VersionPattern { head: "claude", follow: &["3.5", "3-5"], label: "Claude 3.5" },
    VersionPattern { head: "claude", follow: &["3.0", "3-0", "3"], label: "Claude 3" },
    VersionPattern { head: "claude", follow: &["4.5", "4-5"], label: "Claude 4.5" },
    VersionPattern { head: "claude", follow: &["4.0", "4-0", "4"], label: "Claude 4" },
    VersionPattern { head: "claude", follow: &["2.5", "2-5"], label: "Claude 2.5" },
    VersionPattern { head: "claude", follow: &["2.0", "2-0", "2"], label: "Claude 2" },
    VersionPattern { head: "sonnet", follow: &[], label: "Sonnet" },
    VersionPattern { head: "opus", follow: &[], label: "Opus" },
    VersionPattern { head: "haiku", follow: &[], label: "Haiku" },
    VersionPattern { head: "claude", follow: &["code", "ai"], label: "Claude" },
];

fn matches_at(pattern: &VersionPattern, words: &[String], index: usize) -> bool {
    let Some(rest) = words[index].strip_prefix(pattern.head) else {
        return false;
    };
    if !rest.is_empty() {
        // Fused form like "sonnet4.5"; only a recognized version suffix counts
        return pattern.follow.contains(&rest);
    }
    if pattern.follow.is_empty() {
        return true;
    }
    words
        .get(index + 1)
        .is_some_and(|next| pattern.follow.contains(&next.as_str()))
}

/// Extract the Claude version discussed in a post, most specific match
/// first. Returns `None` when no pattern matches.
pub fn extract_claude_version(title: &str, text: &str) -> Option<String> {
    let title = title.trim();
    let text = text.trim();
    let combined = if text.is_empty() {
        title.to_string()
    } else if title.is_empty() {
        text.to_string()
    } else {
        format!("{title} {text}")
    };

    let words: Vec<String> = tokenize(&combined)
        .tokens
        .into_iter()
        .map(|t| t.text.to_lowercase())
        .collect();

    let mut best: Option<(usize, usize)> = None;
    for (priority, pattern) in PATTERNS.iter().enumerate() {
        for index in 0..words.len() {
            if matches_at(pattern, &words, index) {
                let key = (index, priority);
                if best.map_or(true, |current| key < current) {
                    best = Some(key);
                }
                break;
            }
        }
    }

    best.map(|(_, priority)| PATTERNS[priority].label.to_string())
}
