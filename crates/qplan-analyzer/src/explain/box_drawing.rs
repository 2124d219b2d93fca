//! Box-Drawing Text Plan Adapter
//!
//! DuckDB's default EXPLAIN renders the plan as a grid of boxes. The box
//! layout does not encode parent/child edges in a form that survives line
//! splitting, so this adapter summarizes the whole rendering as one node:
//! the most significant operator, the largest row estimate, and the tables
//! mentioned.

use crate::explain::fields::{cost_from_cardinality, number_value, parse_numeric_text};
use crate::explain::plan::{PlanNode, info_keys};
use crate::explain::taxonomy::Operator;
use indexmap::IndexSet;
use qplan_core::{Engine, NormalizerConfig};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static BOX_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[│└┬┘┌┐├─┤┴┼]").expect("valid regex"));

static ROW_ESTIMATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"~\s*([\d,]+)\s+[Rr]ows|EC:\s*([\d,]+)").expect("valid regex")
});

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Table:\s*(\w+)").expect("valid regex"));

/// Operator keywords by priority. A keyword from an earlier family always
/// beats one from a later family.
const KEYWORD_FAMILIES: &[&[&str]] = &[
    &[
        "HASH_JOIN",
        "NESTED_LOOP",
        "UNGROUPED_AGGREGATE",
        "HASH_GROUP_BY",
        "AGGREGATE",
        "ORDER_BY",
        "TOP_N",
        "SORT",
    ],
    &["SEQ_SCAN", "INDEX_SCAN", "TABLE_SCAN"],
    &["FILTER", "Filters:"],
];

/// Summarizes a box-drawing plan rendering as a single node.
///
/// Never fails: an empty rendering becomes an error node.
pub fn parse_box_plan<S: AsRef<str>>(
    lines: &[S],
    engine: Engine,
    config: &NormalizerConfig,
) -> PlanNode {
    let text = lines
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        tracing::warn!(engine = %engine, "box plan rendering is empty");
        return PlanNode::error("empty plan rendering", config.failure_cost)
            .with_info(info_keys::ENGINE, engine.id());
    }

    // (family rank, keyword, cleaned line) of the best operator line so far
    let mut best: Option<(usize, &str, String)> = None;
    let mut max_rows: Option<f64> = None;
    let mut tables: IndexSet<String> = IndexSet::new();

    for line in text.lines() {
        let cleaned = BOX_CHARS.replace_all(line, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            continue;
        }

        if cleaned.chars().count() < config.box_label_max_len
            && let Some((rank, keyword)) = keyword_rank(cleaned)
            && best.as_ref().is_none_or(|(best_rank, _, _)| rank < *best_rank)
        {
            tracing::trace!(rank, keyword, line = cleaned, "operator candidate");
            best = Some((rank, keyword, cleaned.to_string()));
        }

        for caps in ROW_ESTIMATE.captures_iter(line) {
            let Some(rows) = caps
                .get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| parse_numeric_text(m.as_str()))
            else {
                continue;
            };
            max_rows = Some(max_rows.map_or(rows, |current: f64| current.max(rows)));
        }

        for caps in TABLE.captures_iter(line) {
            tables.insert(caps[1].to_string());
        }
    }

    let operator = match &best {
        Some((_, keyword, _)) => Operator::classify(keyword),
        None => Operator::Other(fallback_label(&tables, engine, config)),
    };

    let cost = max_rows.map_or(config.sentinel_cost, cost_from_cardinality);
    let mut node = PlanNode::new(operator, cost);

    if node.is_scan()
        && tables.len() == 1
        && let Some(table) = tables.first()
    {
        node = node.with_table(table.clone(), None);
    }

    if let Some(rows) = max_rows {
        node.info
            .insert(info_keys::ESTIMATED_ROWS.to_string(), number_value(rows));
    }
    if !tables.is_empty() {
        node.info.insert(
            info_keys::TABLES.to_string(),
            Value::Array(tables.iter().cloned().map(Value::String).collect()),
        );
    }
    if let Some((_, _, label)) = best {
        node.info
            .insert(info_keys::OPERATION.to_string(), Value::String(label));
    }
    node.info.insert(
        info_keys::ENGINE.to_string(),
        Value::String(engine.id().to_string()),
    );
    if config.echo_raw_payload {
        node.info
            .insert(info_keys::EXPLAIN_TEXT.to_string(), Value::String(text));
    }

    tracing::debug!(
        engine = %engine,
        operator = %node.operator,
        tables = tables.len(),
        "summarized box plan"
    );
    node
}

/// Rank of the best keyword family present in `line`, with the first of its
/// keywords found. Sibling boxes share a row, so a line can hold several.
fn keyword_rank(line: &str) -> Option<(usize, &'static str)> {
    KEYWORD_FAMILIES.iter().enumerate().find_map(|(rank, family)| {
        family
            .iter()
            .find(|keyword| line.contains(**keyword))
            .map(|keyword| (rank, *keyword))
    })
}

fn fallback_label(tables: &IndexSet<String>, engine: Engine, config: &NormalizerConfig) -> String {
    match tables.len() {
        0 => format!("{} Plan", engine.display_name()),
        1 => format!("Scan {}", tables[0]),
        _ => {
            let listed: Vec<&str> = tables
                .iter()
                .take(config.box_join_label_tables)
                .map(String::as_str)
                .collect();
            format!("Join ({})", listed.join(", "))
        }
    }
}
