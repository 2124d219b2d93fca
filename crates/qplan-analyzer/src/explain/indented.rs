//! Indented Text Plan Adapter
//!
//! Parses tree-style text plans where nesting is given by the column of an
//! arrow marker, as printed by MySQL's `EXPLAIN FORMAT=TREE` and
//! `EXPLAIN ANALYZE`:
//!
//! ```text
//! -> Nested loop inner join  (cost=4.5 rows=3)
//!     -> Table scan on t  (cost=1.2 rows=10)
//!     -> Filter: (mi.info_type_id = 3)  (cost=0.3 rows=1)
//!         -> Index lookup on mi using movie_id_movie_info (movie_id=t.id)  (cost=0.3 rows=2)
//! ```

use crate::explain::fields::{number_value, parse_numeric_text};
use crate::explain::plan::{PlanNode, info_keys};
use crate::explain::taxonomy::Operator;
use qplan_core::{Engine, NormalizerConfig};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static COST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cost=([^\s)]+)").expect("valid regex"));

static ESTIMATED_ROWS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rows=([0-9][0-9.e+\-]*)").expect("valid regex"));

static ACTUAL_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"actual time=([0-9.e+\-]+)\.\.([0-9.e+\-]+)").expect("valid regex")
});

static ACTUAL_ROWS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"actual[^)]*?rows=([0-9][0-9.e+\-]*)").expect("valid regex"));

static TABLE_SCAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)table scan on (\w+)").expect("valid regex"));

static INDEX_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)index (?:lookup|range scan|scan) on (\w+) using (\w+)").expect("valid regex")
});

static FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Filter: (.+?)(?:\s+\(cost=|\s+\(actual time=|$)").expect("valid regex")
});

/// Converts indented plan lines into a plan tree.
///
/// Never fails: a payload without any operator line becomes an error node.
pub fn parse_indented_plan<S: AsRef<str>>(
    lines: &[S],
    engine: Engine,
    config: &NormalizerConfig,
) -> PlanNode {
    let marker = config.indent_marker.as_str();
    let indent_width = config.indent_width.max(1);

    // Open ancestors, most recent last. The first entry is the root and is
    // never popped until the end.
    let mut stack: Vec<(usize, PlanNode)> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let Some(column) = line.find(marker) else {
            tracing::trace!(line = %line.trim(), "skipping line without marker");
            continue;
        };
        let level = column / indent_width;
        let body = &line[column + marker.len()..];
        let node = parse_operator_line(body, line.trim(), engine, config);

        if stack.is_empty() {
            stack.push((level, node));
            continue;
        }

        close_levels(&mut stack, Some(level));
        stack.push((level, node));
    }

    close_levels(&mut stack, None);

    match stack.pop() {
        Some((_, root)) => {
            tracing::debug!(
                engine = %engine,
                node_count = root.node_count(),
                depth = root.depth(),
                "normalized indented plan"
            );
            root
        }
        None => {
            tracing::warn!(engine = %engine, "indented plan has no operator lines");
            PlanNode::error("no plan operators found", config.failure_cost)
                .with_info(info_keys::ENGINE, engine.id())
        }
    }
}

/// Pops every non-root entry at `level` or deeper (everything when `level`
/// is `None`), attaching each popped node as the last child of the entry
/// beneath it.
fn close_levels(stack: &mut Vec<(usize, PlanNode)>, level: Option<usize>) {
    while stack.len() > 1 {
        let closes = match (level, stack.last()) {
            (Some(level), Some((top, _))) => *top >= level,
            _ => true,
        };
        if !closes {
            break;
        }
        if let Some((_, child)) = stack.pop()
            && let Some((_, parent)) = stack.last_mut()
        {
            parent.children.push(child);
        }
    }
}

fn parse_operator_line(
    body: &str,
    trimmed_line: &str,
    engine: Engine,
    config: &NormalizerConfig,
) -> PlanNode {
    let operation = body.split('(').next().unwrap_or_default().trim();
    let operator = classify_operation(operation);

    let mut node = PlanNode::new(operator, config.sentinel_cost);

    // Estimates live in the trailing `(cost=... rows=...)` group, before the
    // `(actual ...)` section. Predicates may mention `cost=` or `rows=` too.
    let (estimate, actual) = match body.rfind("(actual") {
        Some(pos) => body.split_at(pos),
        None => (body, ""),
    };
    let estimate = estimate.rfind("(cost=").map_or("", |pos| &estimate[pos..]);

    if let Some(caps) = COST.captures(estimate) {
        let raw = &caps[1];
        let end = raw.rsplit("..").next().unwrap_or(raw);
        match parse_numeric_text(end).filter(|c| *c >= 0.0) {
            Some(cost) => node.cost = cost,
            None => {
                tracing::trace!(raw_cost = raw, "unusable cost, keeping sentinel");
                node.info
                    .insert(info_keys::RAW_COST.to_string(), Value::String(raw.to_string()));
            }
        }
    }

    if let Some(rows) = ESTIMATED_ROWS
        .captures(estimate)
        .and_then(|caps| parse_numeric_text(&caps[1]))
    {
        node.info
            .insert(info_keys::ESTIMATED_ROWS.to_string(), number_value(rows));
    }

    if let Some(time) = ACTUAL_TIME
        .captures(actual)
        .and_then(|caps| parse_numeric_text(&caps[2]))
    {
        node.actual_time_ms = Some(time);
    }

    if let Some(rows) = ACTUAL_ROWS
        .captures(actual)
        .and_then(|caps| parse_numeric_text(&caps[1]))
    {
        node.info
            .insert(info_keys::ACTUAL_ROWS.to_string(), number_value(rows));
    }

    if let Some(caps) = TABLE_SCAN.captures(operation) {
        node = node.with_table(&caps[1], None);
    } else if let Some(caps) = INDEX_ACCESS.captures(operation) {
        node = node
            .with_table(&caps[1], None)
            .with_info(info_keys::INDEX, &caps[2]);
    }

    if let Some(caps) = FILTER.captures(body) {
        node.info.insert(
            info_keys::FILTER.to_string(),
            Value::String(caps[1].trim().to_string()),
        );
    }

    node.info.insert(
        info_keys::ENGINE.to_string(),
        Value::String(engine.id().to_string()),
    );
    node.info.insert(
        info_keys::OPERATION.to_string(),
        Value::String(operation.to_string()),
    );
    if config.echo_raw_payload {
        node.info.insert(
            info_keys::LINE.to_string(),
            Value::String(trimmed_line.to_string()),
        );
    }

    tracing::trace!(operation, cost = node.cost, "parsed plan line");
    node
}

/// Classifies on the text before any `:` so `Filter: a > 1` and `Sort: t.x`
/// land in their categories; unclassified operations keep the full text.
fn classify_operation(operation: &str) -> Operator {
    let head = operation.split(':').next().unwrap_or_default();
    match Operator::classify(head) {
        Operator::Other(_) => Operator::classify(operation),
        operator => operator,
    }
}
