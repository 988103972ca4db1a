//! # BPE Merge Engine
//!
//! Two merge policies are provided:
//!
//! * [`MergePolicy::Greedy`] scans adjacent pairs left to right and merges
//!   any pair whose concatenation is a known merge result, immediately
//!   stepping back one position so new adjacencies are seen first.
//!   Only the existence of a merge matters, not its rank.
//! * [`MergePolicy::RankOrdered`] is canonical BPE: repeatedly merge the
//!   leftmost occurrence of the lowest-ranked exact ``(left, right)`` pair.
//!
//! The two agree on many inputs, but not all; `Greedy` is the default.

use serde::{Deserialize, Serialize};

use crate::{pretokenizers::Symbol, vocab::MergeTable};

/// Selects the merge loop used by [`BpeMergeEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergePolicy {
    /// Merge any known pair as soon as it is encountered.
    #[default]
    Greedy,

    /// Merge the lowest-ranked pair first.
    RankOrdered,
}

/// Applies a [`MergeTable`] to a sequence of symbols.
///
/// The engine never mutates the table; it only reads the table's
/// cached lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BpeMergeEngine {
    policy: MergePolicy,
}

impl BpeMergeEngine {
    /// Create an engine with the given policy.
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy }
    }

    /// Get the configured policy.
    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Merge marked text into subword strings.
    ///
    /// The text is split into one symbol per code point before merging.
    pub fn merge(
        &self,
        marked_text: &str,
        merges: &MergeTable,
    ) -> Vec<String> {
        let mut symbols = Symbol::split_chars(marked_text, 0);
        self.merge_symbols(&mut symbols, merges);
        symbols.into_iter().map(|s| s.text).collect()
    }

    /// Merge a symbol buffer in place.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, symbols, merges)))]
    pub fn merge_symbols(
        &self,
        symbols: &mut Vec<Symbol>,
        merges: &MergeTable,
    ) {
        match self.policy {
            MergePolicy::Greedy => greedy_merge(symbols, merges),
            MergePolicy::RankOrdered => rank_ordered_merge(symbols, merges),
        }
    }
}

/// Merge marked text with the default [`MergePolicy::Greedy`] engine.
pub fn merge(
    marked_text: &str,
    merges: &MergeTable,
) -> Vec<String> {
    BpeMergeEngine::default().merge(marked_text, merges)
}

fn greedy_merge(
    symbols: &mut Vec<Symbol>,
    merges: &MergeTable,
) {
    let mut buf = String::new();

    // `idx` is the right-hand index of the pair under inspection.
    let mut idx = 1;
    while idx < symbols.len() {
        buf.clear();
        buf.push_str(&symbols[idx - 1].text);
        buf.push_str(&symbols[idx].text);

        if merges.contains_merged(&buf) {
            let right = symbols.remove(idx);
            symbols[idx - 1].absorb(right);

            // Step back so the merged symbol meets its left neighbour.
            idx = (idx - 1).max(1);
        } else {
            idx += 1;
        }
    }
}

fn rank_ordered_merge(
    symbols: &mut Vec<Symbol>,
    merges: &MergeTable,
) {
    while symbols.len() >= 2 {
        // Lowest rank wins; ties go to the leftmost pair.
        let best = symbols
            .windows(2)
            .enumerate()
            .filter_map(|(idx, w)| merges.pair_rank(&w[0].text, &w[1].text).map(|r| (r, idx)))
            .min();

        let Some((_, idx)) = best else {
            break;
        };
        let right = symbols.remove(idx + 1);
        symbols[idx].absorb(right);
    }
}
