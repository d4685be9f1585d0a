//! Windowed proximity association between candidate hits.
//!
//! The associator is purely positional: it decides which hits are close
//! enough to belong together, and leaves every semantic judgment (vendor
//! compatibility, matrix validity, confidence) to the gate. Candidates are
//! indexed once per text, so each nearest-partner query is a binary search
//! plus a bounded outward walk instead of a quadratic re-scan.
//!
//! Baseline association restricts partners to the anchor's sentence;
//! distances are measured on the flat token stream. Equidistant partners
//! of the same kind tie-break toward the one appearing earlier in the
//! text.

use ahash::AHashSet;
use smallvec::SmallVec;

use crate::extract::scan::Candidate;

/// Which hit anchors a raw combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Anchored on a family hit (primary pass)
    Family,
    /// Anchored on a tier hit left unconsumed by the primary pass
    Tier,
    /// Anchored on a version hit left unconsumed by the earlier passes
    Version,
}

/// A positional grouping of candidate hits, referenced by index into the
/// scan output. Not yet semantically checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCombination {
    /// Anchor kind of this combination
    pub anchor: Anchor,
    /// Family hit index, when present
    pub family: Option<usize>,
    /// Version hit index, when present
    pub version: Option<usize>,
    /// Tier hit index, when present
    pub tier: Option<usize>,
    /// Sentence of the anchor hit
    pub sentence: usize,
}

/// Position-indexed view over one text's candidates.
pub struct Associator<'a> {
    candidates: &'a [Candidate],
    window: usize,
    versions: SmallVec<[usize; 8]>,
    tiers: SmallVec<[usize; 8]>,
    family_sentences: AHashSet<usize>,
}

impl<'a> Associator<'a> {
    /// Index `candidates` (already ordered by position) for nearest-partner
    /// queries under the given window.
    pub fn new(candidates: &'a [Candidate], window: usize) -> Self {
        let mut versions = SmallVec::new();
        let mut tiers = SmallVec::new();
        let mut family_sentences = AHashSet::new();

        for (idx, candidate) in candidates.iter().enumerate() {
            if candidate.is_version() {
                versions.push(idx);
            } else if candidate.is_tier() {
                tiers.push(idx);
            } else {
                family_sentences.insert(candidate.position.sentence);
            }
        }

        Self {
            candidates,
            window,
            versions,
            tiers,
            family_sentences,
        }
    }

    /// True when `sentence` contains at least one family hit. The
    /// cross-sentence fallback only borrows from sentences without a
    /// family anchor of their own.
    pub fn sentence_has_family(&self, sentence: usize) -> bool {
        self.family_sentences.contains(&sentence)
    }

    /// Associate a family hit with its nearest version and tier partners,
    /// skipping partners already claimed by earlier combinations. A family
    /// hit with no partner in range still yields a family-only
    /// combination.
    pub fn associate_family(
        &self,
        family_idx: usize,
        claimed_versions: &AHashSet<usize>,
        claimed_tiers: &AHashSet<usize>,
    ) -> RawCombination {
        let anchor = &self.candidates[family_idx];
        RawCombination {
            anchor: Anchor::Family,
            family: Some(family_idx),
            version: self.nearest(&self.versions, anchor, claimed_versions),
            tier: self.nearest(&self.tiers, anchor, claimed_tiers),
            sentence: anchor.position.sentence,
        }
    }

    /// Associate an unconsumed tier hit with the nearest unclaimed version
    /// in its sentence.
    pub fn associate_tier(
        &self,
        tier_idx: usize,
        claimed_versions: &AHashSet<usize>,
    ) -> RawCombination {
        let anchor = &self.candidates[tier_idx];
        RawCombination {
            anchor: Anchor::Tier,
            family: None,
            version: self.nearest(&self.versions, anchor, claimed_versions),
            tier: Some(tier_idx),
            sentence: anchor.position.sentence,
        }
    }

    /// A standalone combination for an unconsumed version hit.
    pub fn associate_version(&self, version_idx: usize) -> RawCombination {
        let anchor = &self.candidates[version_idx];
        RawCombination {
            anchor: Anchor::Version,
            family: None,
            version: Some(version_idx),
            tier: None,
            sentence: anchor.position.sentence,
        }
    }

    /// Candidate indices of all version hits, in text order.
    pub fn version_indices(&self) -> &[usize] {
        &self.versions
    }

    /// Candidate indices of all tier hits, in text order.
    pub fn tier_indices(&self) -> &[usize] {
        &self.tiers
    }

    /// Nearest entry of `list` to `anchor`: same sentence, flat-stream
    /// distance at most `window`, skipping claimed indices. Same-sentence
    /// candidates are contiguous in flat order, so each direction stops at
    /// the first out-of-sentence or out-of-window entry. Equidistant left
    /// and right partners resolve to the left (earlier) one.
    fn nearest(
        &self,
        list: &[usize],
        anchor: &Candidate,
        claimed: &AHashSet<usize>,
    ) -> Option<usize> {
        let target = anchor.flat_index;
        let sentence = anchor.position.sentence;
        let split =
            list.partition_point(|&idx| self.candidates[idx].flat_index < target);

        let mut best_left: Option<(usize, usize)> = None;
        let mut i = split;
        while i > 0 {
            i -= 1;
            let idx = list[i];
            let candidate = &self.candidates[idx];
            if candidate.position.sentence != sentence {
                break;
            }
            let distance = target - candidate.flat_index;
            if distance > self.window {
                break;
            }
            if claimed.contains(&idx) {
                continue;
            }
            best_left = Some((distance, idx));
            break;
        }

        let mut best_right: Option<(usize, usize)> = None;
        let mut i = split;
        while i < list.len() {
            let idx = list[i];
            let candidate = &self.candidates[idx];
            if candidate.position.sentence != sentence {
                break;
            }
            let distance = candidate.flat_index - target;
            if distance > self.window {
                break;
            }
            if claimed.contains(&idx) {
                i += 1;
                continue;
            }
            best_right = Some((distance, idx));
            break;
        }

        match (best_left, best_right) {
            (Some((dl, left)), Some((dr, right))) => {
                if dl <= dr {
                    Some(left)
                } else {
                    Some(right)
                }
            }
            (Some((_, left)), None) => Some(left),
            (None, Some((_, right))) => Some(right),
            (None, None) => None,
        }
    }
}
