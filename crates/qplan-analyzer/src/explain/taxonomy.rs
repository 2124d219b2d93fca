//! Operator Taxonomy
//!
//! Maps the free-text operator names engines print (`"Table scan on title"`,
//! `"HASH_JOIN"`, `"Inner hash join"`) onto a small closed set of canonical
//! operators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical operator category of a plan node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    SeqScan,
    IndexScan,
    NestedLoop,
    HashJoin,
    Aggregate,
    Sort,
    Filter,
    Hash,
    /// Stand-in for a plan that could not be obtained. Never produced by
    /// [`Operator::classify`].
    Error,
    /// Anything else, carrying the engine text unchanged
    Other(String),
}

/// Substring patterns in priority order. The first match wins.
const PATTERNS: &[(&[&str], Operator)] = &[
    (
        &[
            "table scan",
            "seq scan",
            "seq_scan",
            "sequential scan",
            "table_scan",
        ],
        Operator::SeqScan,
    ),
    (
        &[
            "index scan",
            "index_scan",
            "index lookup",
            "index range scan",
            "index only scan",
        ],
        Operator::IndexScan,
    ),
    (&["nested loop", "nested_loop"], Operator::NestedLoop),
    (&["hash join", "hash_join"], Operator::HashJoin),
    (&["aggregate", "group_by"], Operator::Aggregate),
    (&["sort", "ordering", "order_by", "top_n"], Operator::Sort),
    (&["filter"], Operator::Filter),
    (&["hash"], Operator::Hash),
];

const UNKNOWN: &str = "Unknown";

impl Operator {
    /// Classifies an engine operator name.
    ///
    /// Matching is a case-insensitive substring test. Blank input becomes
    /// `Other("Unknown")` so that labels are never empty.
    pub fn classify(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Other(UNKNOWN.to_string());
        }

        let lowered = raw.to_lowercase();
        PATTERNS
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|p| lowered.contains(p)))
            .map(|(_, operator)| operator.clone())
            .unwrap_or_else(|| Self::Other(raw.to_string()))
    }

    /// Canonical display label
    pub fn label(&self) -> &str {
        match self {
            Self::SeqScan => "Seq Scan",
            Self::IndexScan => "Index Scan",
            Self::NestedLoop => "Nested Loop",
            Self::HashJoin => "Hash Join",
            Self::Aggregate => "Aggregate",
            Self::Sort => "Sort",
            Self::Filter => "Filter",
            Self::Hash => "Hash",
            Self::Error => "Error",
            Self::Other(text) => text,
        }
    }

    pub fn is_scan(&self) -> bool {
        matches!(self, Self::SeqScan | Self::IndexScan)
    }

    pub fn is_join(&self) -> bool {
        matches!(self, Self::NestedLoop | Self::HashJoin)
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests;
