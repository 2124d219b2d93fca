//! Workload summary
//!
//! [`WorkloadInfo`] collects, over a corpus of normalized plans, the
//! relations, operator labels, filterable attributes and filter predicates
//! seen. Learned optimizers use it to size their action and feature spaces.

use crate::explain::{PlanNode, info_keys};
use crate::workload::attributes::filtered_attributes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Generic scan label used before physical operators are known
pub const GENERIC_SCAN: &str = "Scan";
/// Generic join label used before physical operators are known
pub const GENERIC_JOIN: &str = "Join";

/// Sorted summaries of a plan corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadInfo {
    pub rel_names: Vec<String>,
    pub rel_ids: Vec<String>,
    pub scan_types: Vec<String>,
    pub join_types: Vec<String>,
    pub all_ops: Vec<String>,
    pub all_attributes: Vec<String>,
    /// Table identity to the filter predicates applied to it
    pub all_filters: BTreeMap<String, BTreeSet<String>>,
    /// Symmetric join edges, set by [`WorkloadInfo::with_join_graph`]
    pub join_edges: BTreeSet<(String, String)>,
}

#[derive(Default)]
struct Collector {
    rel_names: BTreeSet<String>,
    rel_ids: BTreeSet<String>,
    scan_types: BTreeSet<String>,
    join_types: BTreeSet<String>,
    all_ops: BTreeSet<String>,
    all_attributes: BTreeSet<String>,
    all_filters: BTreeMap<String, BTreeSet<String>>,
}

impl Collector {
    fn visit(&mut self, node: &PlanNode) {
        let label = node.operator.label().to_string();

        if let Some(name) = &node.table_name {
            self.rel_names.insert(name.clone());
        }
        if let Some(table_id) = node.table_id() {
            self.rel_ids.insert(table_id);
        }

        if let Some(filter) = node.filter() {
            self.add_filter(node, filter);
        }

        if let Some(sql) = node.info_str(info_keys::SQL_STR) {
            self.all_attributes.extend(filtered_attributes(sql));
        }

        if node.is_scan_like() || label.contains("Scan") {
            self.scan_types.insert(label.clone());
        } else if node.is_join_like() {
            self.join_types.insert(label.clone());
        }
        self.all_ops.insert(label);

        for child in &node.children {
            self.visit(child);
        }
    }

    /// A filter on a node without a table belongs to the single table in its
    /// subtree; with zero or several candidates it cannot be attributed.
    fn add_filter(&mut self, node: &PlanNode, filter: &str) {
        let table_id = match node.table_id() {
            Some(table_id) => Some(table_id),
            None => {
                let candidates: BTreeSet<String> =
                    node.iter().filter_map(|n| n.table_id()).collect();
                if candidates.len() == 1 {
                    candidates.into_iter().next()
                } else {
                    tracing::debug!(
                        operator = %node.operator,
                        candidates = candidates.len(),
                        filter,
                        "skipping filter that cannot be attributed to one table"
                    );
                    None
                }
            }
        };

        if let Some(table_id) = table_id {
            self.all_filters
                .entry(table_id)
                .or_default()
                .insert(filter.to_string());
        }
    }

    fn finish(self) -> WorkloadInfo {
        WorkloadInfo {
            rel_names: self.rel_names.into_iter().collect(),
            rel_ids: self.rel_ids.into_iter().collect(),
            scan_types: self.scan_types.into_iter().collect(),
            join_types: self.join_types.into_iter().collect(),
            all_ops: self.all_ops.into_iter().collect(),
            all_attributes: self.all_attributes.into_iter().collect(),
            all_filters: self.all_filters,
            join_edges: BTreeSet::new(),
        }
    }
}

impl WorkloadInfo {
    /// Summarizes a corpus in one recursive pass per plan
    pub fn from_plans(plans: &[PlanNode]) -> Self {
        let mut collector = Collector::default();
        for plan in plans {
            collector.visit(plan);
        }
        let info = collector.finish();

        tracing::debug!(
            plans = plans.len(),
            relations = info.rel_names.len(),
            ops = info.all_ops.len(),
            attributes = info.all_attributes.len(),
            "built workload info"
        );
        info
    }

    /// Replaces the scan and join label sets with an external action space.
    ///
    /// `None` keeps the current set. Old scan and join labels are removed from
    /// `all_ops` and the new ones added.
    pub fn set_physical_ops<J, S>(&mut self, join_ops: Option<J>, scan_ops: Option<S>)
    where
        J: IntoIterator,
        J::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let old_scans = std::mem::take(&mut self.scan_types);
        let old_joins = std::mem::take(&mut self.join_types);

        self.scan_types = match scan_ops {
            Some(ops) => sorted_unique(ops),
            None => old_scans.clone(),
        };
        self.join_types = match join_ops {
            Some(ops) => sorted_unique(ops),
            None => old_joins.clone(),
        };

        let old_len = self.all_ops.len();
        let mut all_ops: BTreeSet<String> = self
            .all_ops
            .iter()
            .filter(|op| !old_scans.contains(op) && !old_joins.contains(op))
            .cloned()
            .collect();
        all_ops.extend(self.scan_types.iter().cloned());
        all_ops.extend(self.join_types.iter().cloned());
        self.all_ops = all_ops.into_iter().collect();

        if self.all_ops.len() != old_len {
            tracing::info!(
                old_scans = ?old_scans,
                old_joins = ?old_joins,
                new_scans = ?self.scan_types,
                new_joins = ?self.join_types,
                all_ops = ?self.all_ops,
                "search space changed from query nodes to action space"
            );
        }
    }

    /// Records a `table -> neighbours` join graph as symmetric edges
    pub fn with_join_graph(mut self, join_graph: &HashMap<String, Vec<String>>) -> Self {
        self.join_edges.clear();
        for (left, neighbours) in join_graph {
            for right in neighbours {
                self.join_edges.insert((left.clone(), right.clone()));
                self.join_edges.insert((right.clone(), left.clone()));
            }
        }
        self
    }

    /// True if `left` and `right` are joined in the recorded graph
    pub fn has_join_edge(&self, left: &str, right: &str) -> bool {
        self.join_edges
            .contains(&(left.to_string(), right.to_string()))
    }

    /// True once scan or join labels are more specific than the generic
    /// `Scan` / `Join` placeholders
    pub fn has_physical_ops(&self) -> bool {
        self.scan_types != [GENERIC_SCAN] || self.join_types != [GENERIC_JOIN]
    }
}

fn sorted_unique<I>(ops: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    ops.into_iter()
        .map(Into::into)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

impl fmt::Display for WorkloadInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rel_names: {:?}", self.rel_names)?;
        writeln!(f, "rel_ids: {:?}", self.rel_ids)?;
        writeln!(f, "scan_types: {:?}", self.scan_types)?;
        writeln!(f, "join_types: {:?}", self.join_types)?;
        writeln!(f, "all_ops: {:?}", self.all_ops)?;
        write!(f, "all_attributes: {:?}", self.all_attributes)
    }
}

#[cfg(test)]
mod tests;
