//! Plan Model - The canonical, engine-agnostic plan tree
//!
//! Every adapter produces a [`PlanNode`] tree. A node keeps a small set of
//! typed fields that mean the same thing for every engine (operator, cost,
//! table identity, children) and pushes engine-specific extras into `info`.

use crate::explain::taxonomy::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Well-known `info` keys
pub mod info_keys {
    pub const FILTER: &str = "filter";
    pub const JOIN_TYPE: &str = "join_type";
    pub const JOIN_CONDITIONS: &str = "join_conditions";
    pub const ESTIMATED_ROWS: &str = "estimated_rows";
    pub const ACTUAL_ROWS: &str = "actual_rows";
    pub const ENGINE: &str = "engine";
    pub const RAW_COST: &str = "raw_cost";
    pub const RAW_CARDINALITY: &str = "raw_cardinality";
    pub const ERROR: &str = "error";
    pub const INDEX: &str = "index";
    pub const TABLES: &str = "tables";
    pub const OPERATION: &str = "operation";
    pub const EXTRA_INFO: &str = "extra_info";
    pub const LINE: &str = "line";
    pub const EXPLAIN_TEXT: &str = "explain_text";
    pub const SQL_STR: &str = "sql_str";
    pub const QUERY_NAME: &str = "query_name";
    pub const PATH: &str = "path";
}

/// A single node in a normalized plan tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Canonical operator
    pub operator: Operator,
    /// Engine-reported cost, or the sentinel when absent
    pub cost: f64,
    /// Actual time in milliseconds (from EXPLAIN ANALYZE)
    pub actual_time_ms: Option<f64>,
    /// Relation scanned by this node (scan nodes only)
    pub table_name: Option<String>,
    /// Alias of the scanned relation
    pub table_alias: Option<String>,
    /// Engine extras not captured by the typed fields
    pub info: HashMap<String, Value>,
    /// Child nodes, in engine order
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates a new plan node with the given operator and cost
    pub fn new(operator: Operator, cost: f64) -> Self {
        Self {
            operator,
            cost,
            actual_time_ms: None,
            table_name: None,
            table_alias: None,
            info: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// Creates an error node standing in for a plan that could not be read
    pub fn error(message: impl Into<String>, cost: f64) -> Self {
        let message: String = message.into();
        Self::new(Operator::Error, cost).with_info(info_keys::ERROR, message)
    }

    /// Sets the table name, with the alias defaulting to the name
    pub fn with_table(mut self, name: impl Into<String>, alias: Option<String>) -> Self {
        let name = name.into();
        self.table_alias = Some(alias.unwrap_or_else(|| name.clone()));
        self.table_name = Some(name);
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Sets an info entry
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }

    /// Copy of this node without its children
    pub fn without_children(&self) -> Self {
        Self {
            operator: self.operator.clone(),
            cost: self.cost,
            actual_time_ms: self.actual_time_ms,
            table_name: self.table_name.clone(),
            table_alias: self.table_alias.clone(),
            info: self.info.clone(),
            children: Vec::new(),
        }
    }

    pub fn is_scan(&self) -> bool {
        self.operator.is_scan()
    }

    pub fn is_join(&self) -> bool {
        self.operator.is_join()
    }

    /// A scan, or any node that reads a relation
    pub fn is_scan_like(&self) -> bool {
        self.is_scan() || self.table_name.is_some()
    }

    /// A join, including engine join operators the taxonomy keeps as `Other`
    pub fn is_join_like(&self) -> bool {
        self.is_join()
            || (self.operator.is_other() && self.operator.label().to_lowercase().contains("join"))
    }

    pub fn is_error(&self) -> bool {
        self.operator == Operator::Error
    }

    /// Returns true if this is a leaf node (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Table identity: `"name AS alias"` when the alias differs, else the name
    pub fn table_id(&self) -> Option<String> {
        let name = self.table_name.as_deref()?;
        match self.table_alias.as_deref() {
            Some(alias) if alias != name => Some(format!("{name} AS {alias}")),
            _ => Some(name.to_string()),
        }
    }

    /// The filter predicate recorded by the engine, if any
    pub fn filter(&self) -> Option<&str> {
        self.info.get(info_keys::FILTER).and_then(Value::as_str)
    }

    /// Info entry as text
    pub fn info_str(&self, key: &str) -> Option<&str> {
        self.info.get(key).and_then(Value::as_str)
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the maximum depth of this subtree
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Returns an iterator over all nodes in the subtree (depth-first, pre-order)
    pub fn iter(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(self)
    }

    /// Table identities of every scan node in the subtree, in plan order
    pub fn tables(&self) -> Vec<String> {
        self.iter()
            .filter(|n| n.is_scan_like())
            .filter_map(|n| n.table_id())
            .collect()
    }

    /// Indented one-node-per-line rendering
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.operator.label());
        if let Some(table_id) = self.table_id() {
            out.push_str(" [");
            out.push_str(&table_id);
            out.push(']');
        }
        out.push_str(&format!(" cost={}\n", self.cost));
        for child in &self.children {
            child.write_tree(out, depth + 1);
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_tree_string().trim_end())
    }
}

/// Iterator for traversing plan nodes depth-first
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(root: &'a PlanNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

impl<'a> IntoIterator for &'a PlanNode {
    type Item = &'a PlanNode;
    type IntoIter = PlanNodeIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
