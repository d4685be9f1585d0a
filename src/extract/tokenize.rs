//! Sentence and token segmentation for mention extraction.
//!
//! Splitting is intentionally conservative: sentence boundaries are
//! terminal punctuation followed by whitespace (no abbreviation handling),
//! tokens are whitespace-delimited with surrounding punctuation trimmed.
//! Internal `-` and `.` are preserved so "GPT-4.5" and "o3-mini" survive
//! as single tokens. Tokenization is pure; identical input always yields
//! an identical token stream.

use serde::{Deserialize, Serialize};

/// Position of a token inside one tokenization pass.
///
/// `(sentence, token)` pairs are unique per pass and totally ordered; the
/// derived ordering (sentence first, then token) is the order used for
/// association tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based sentence index
    pub sentence: usize,
    /// Zero-based token index within the sentence
    pub token: usize,
}

/// Inclusive position range covered by a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// First token covered
    pub start: Position,
    /// Last token covered
    pub end: Position,
}

impl Span {
    /// Span covering a single token.
    pub fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(&self, other: &Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A single token with its position in the sentence grid and in the flat
/// token stream. Window distances are measured on `flat_index`; tie-breaks
/// use `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text after punctuation trimming (original case preserved)
    pub text: String,
    /// Sentence-grid position
    pub position: Position,
    /// Index in the flattened token stream across all sentences
    pub flat_index: usize,
}

/// Output of one tokenization pass: the sentence texts plus the flat,
/// sentence-ordered token stream.
#[derive(Debug, Clone, Default)]
pub struct TokenizedText {
    /// Sentence substrings, in input order
    pub sentences: Vec<String>,
    /// All tokens, ordered by `(sentence, token)`
    pub tokens: Vec<Token>,
}

impl TokenizedText {
    /// True when the input produced no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Source text of the given sentence, if it exists.
    pub fn sentence_text(&self, index: usize) -> Option<&str> {
        self.sentences.get(index).map(String::as_str)
    }
}

fn is_sentence_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split `text` into sentences on terminal punctuation followed by
/// whitespace or end of input. Runs of terminal punctuation ("?!", "...")
/// close a single sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = trimmed.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_sentence_terminal(c) {
            continue;
        }
        // Swallow the rest of the punctuation run
        let mut end = idx + c.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if is_sentence_terminal(next) {
                end = next_idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };
        if at_boundary {
            let sentence = trimmed[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }
    }

    let tail = trimmed[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Trim leading/trailing punctuation while keeping internal `-` and `.`
/// intact. Trimming only touches the ends, so "GPT-4.5" and "o3-mini"
/// pass through whole while "(shipped)." reduces to "shipped".
fn trim_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_ascii_punctuation())
}

/// Tokenize `text` into sentences and position-tagged tokens.
///
/// Empty input yields an empty [`TokenizedText`]; there are no error
/// conditions.
pub fn tokenize(text: &str) -> TokenizedText {
    let sentences = split_sentences(text);
    let mut tokens = Vec::new();
    let mut flat_index = 0;

    for (sentence_idx, sentence) in sentences.iter().enumerate() {
        let mut token_idx = 0;
        for raw in sentence.split_whitespace() {
            let trimmed = trim_token(raw);
            if trimmed.is_empty() {
                continue;
            }
            tokens.push(Token {
                text: trimmed.to_string(),
                position: Position {
                    sentence: sentence_idx,
                    token: token_idx,
                },
                flat_index,
            });
            token_idx += 1;
            flat_index += 1;
        }
    }

    TokenizedText { sentences, tokens }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokenized: &TokenizedText) -> Vec<&str> {
        tokenized.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn test_sentence_split_on_terminal_punctuation() {
        let tokenized = tokenize("Claude 3.5 just dropped. Sonnet is fantastic.");
        assert_eq!(tokenized.sentences.len(), 2);
        assert_eq!(tokenized.sentences[0], "Claude 3.5 just dropped.");
        assert_eq!(tokenized.sentences[1], "Sonnet is fantastic.");
    }

    #[test]
    fn test_punctuation_run_closes_one_sentence() {
        let tokenized = tokenize("Really?! Yes... definitely.");
        assert_eq!(tokenized.sentences.len(), 3);
        assert_eq!(tokenized.sentences[0], "Really?!");
        assert_eq!(tokenized.sentences[1], "Yes...");
    }

    #[test]
    fn test_internal_hyphen_and_dot_preserved() {
        let tokenized = tokenize("GPT-4.5 is out, and o3-mini too!");
        let texts = texts(&tokenized);
        assert!(texts.contains(&"GPT-4.5"));
        assert!(texts.contains(&"o3-mini"));
    }

    #[test]
    fn test_surrounding_punctuation_trimmed() {
        let tokenized = tokenize("(Claude), \"3.5\" shipped.");
        assert_eq!(texts(&tokenized), vec!["Claude", "3.5", "shipped"]);
    }

    #[test]
    fn test_version_dot_not_treated_as_boundary_mid_token() {
        // "3.5" has no whitespace after the dot, so the sentence continues
        let tokenized = tokenize("Claude 3.5 Sonnet just shipped.");
        assert_eq!(tokenized.sentences.len(), 1);
        assert_eq!(
            texts(&tokenized),
            vec!["Claude", "3.5", "Sonnet", "just", "shipped"]
        );
    }

    #[test]
    fn test_positions_and_flat_indices() {
        let tokenized = tokenize("One two. Three four.");
        let positions: Vec<(usize, usize, usize)> = tokenized
            .tokens
            .iter()
            .map(|t| (t.position.sentence, t.position.token, t.flat_index))
            .collect();
        assert_eq!(
            positions,
            vec![(0, 0, 0), (0, 1, 1), (1, 0, 2), (1, 1, 3)]
        );
    }

    #[test]
    fn test_deterministic() {
        let a = tokenize("GPT-4.5 is out now.");
        let b = tokenize("GPT-4.5 is out now.");
        assert_eq!(a.tokens, b.tokens);
        assert_eq!(a.sentences, b.sentences);
    }
}
