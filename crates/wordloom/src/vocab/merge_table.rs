//! # Ordered BPE Merge Table

use core::fmt::{Display, Formatter};
use std::sync::OnceLock;

use crate::{
    WLError,
    WLResult,
    types::{WLHashMap, hash_map_with_capacity, hash_map_new},
};

/// A ``left right`` merge rule.
///
/// The rank of a rule is its position in the [`MergeTable`];
/// lower ranks merge first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeRule {
    /// The left symbol.
    pub left: String,

    /// The right symbol.
    pub right: String,
}

impl MergeRule {
    /// Create a new rule.
    pub fn new<L: Into<String>, R: Into<String>>(
        left: L,
        right: R,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Parse a ``"left right"`` rule line.
    pub fn parse(line: &str) -> WLResult<Self> {
        match line.split_once(' ') {
            Some((left, right)) if !left.is_empty() && !right.is_empty() => {
                Ok(Self::new(left, right))
            }
            _ => Err(WLError::Parse(format!("malformed merge rule: {line:?}"))),
        }
    }

    /// The symbol produced by this rule.
    pub fn merged(&self) -> String {
        let mut merged = String::with_capacity(self.left.len() + self.right.len());
        merged.push_str(&self.left);
        merged.push_str(&self.right);
        merged
    }
}

impl Display for MergeRule {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        write!(f, "{} {}", self.left, self.right)
    }
}

/// Rank map of ``{ left -> { right -> rank } }``.
pub type PairRankMap = WLHashMap<String, WLHashMap<String, usize>>;

/// An immutable, ordered list of [`MergeRule`]s.
///
/// Both lookup tables are derived on first use and cached
/// for the lifetime of the table.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    rules: Vec<MergeRule>,

    /// ``{ left + right -> rank }``, first rule wins.
    merged_lookup: OnceLock<WLHashMap<String, usize>>,

    /// ``{ left -> { right -> rank } }``, first rule wins.
    pair_ranks: OnceLock<PairRankMap>,
}

impl PartialEq for MergeTable {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.rules == other.rules
    }
}

impl From<Vec<MergeRule>> for MergeTable {
    fn from(rules: Vec<MergeRule>) -> Self {
        Self::from_rules(rules)
    }
}

impl MergeTable {
    /// Build a table from rules, in rank order.
    pub fn from_rules(rules: Vec<MergeRule>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    /// Build a table from ``"left right"`` lines, in rank order.
    pub fn parse_lines<I, S>(lines: I) -> WLResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = lines
            .into_iter()
            .map(|line| MergeRule::parse(line.as_ref()))
            .collect::<WLResult<Vec<_>>>()?;
        Ok(Self::from_rules(rules))
    }

    /// The rules, in rank order.
    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get the ``{ left + right -> rank }`` lookup.
    ///
    /// Distinct rules with the same concatenation collapse to one entry.
    pub fn merged_lookup(&self) -> &WLHashMap<String, usize> {
        self.merged_lookup.get_or_init(|| {
            let mut lookup = hash_map_with_capacity(self.rules.len());
            for (rank, rule) in self.rules.iter().enumerate() {
                lookup.entry(rule.merged()).or_insert(rank);
            }
            lookup
        })
    }

    /// Get the ``{ left -> { right -> rank } }`` lookup.
    pub fn pair_ranks(&self) -> &PairRankMap {
        self.pair_ranks.get_or_init(|| {
            let mut ranks: PairRankMap = hash_map_new();
            for (rank, rule) in self.rules.iter().enumerate() {
                ranks
                    .entry(rule.left.clone())
                    .or_default()
                    .entry(rule.right.clone())
                    .or_insert(rank);
            }
            ranks
        })
    }

    /// Is ``left + right`` a known merge result?
    pub fn contains_merged(
        &self,
        merged: &str,
    ) -> bool {
        self.merged_lookup().contains_key(merged)
    }

    /// Look up the rank of the exact ``(left, right)`` pair.
    pub fn pair_rank(
        &self,
        left: &str,
        right: &str,
    ) -> Option<usize> {
        self.pair_ranks()
            .get(left)
            .and_then(|rights| rights.get(right))
            .copied()
    }
}
