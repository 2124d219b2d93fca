//! JSON Plan Tree Adapter
//!
//! Reads JSON EXPLAIN payloads whose nodes nest their children directly,
//! such as DuckDB's `EXPLAIN (FORMAT JSON)` and PostgreSQL's
//! `EXPLAIN (FORMAT JSON)`. A [`JsonLayout`] names the fields an engine
//! uses, so one walker serves both.
//!
//! # Example
//!
//! ```
//! use qplan_analyzer::explain::json_tree::{parse_json_plan, DUCKDB_LAYOUT};
//! use qplan_analyzer::explain::Operator;
//! use qplan_core::NormalizerConfig;
//!
//! let payload = serde_json::json!({
//!     "name": "SEQ_SCAN",
//!     "extra_info": {"Table": "title", "Estimated Cardinality": "100"}
//! });
//! let node = parse_json_plan(&payload, &DUCKDB_LAYOUT, &NormalizerConfig::default());
//! assert_eq!(node.operator, Operator::SeqScan);
//! assert_eq!(node.table_name.as_deref(), Some("title"));
//! ```

use crate::explain::fields::{
    cost_from_cardinality, number_value, parse_number, value_to_text,
};
use crate::explain::plan::{PlanNode, info_keys};
use crate::explain::taxonomy::Operator;
use qplan_core::{Engine, NormalizerConfig};
use serde_json::{Map, Value};

/// Field names of one engine's JSON plan format
#[derive(Debug, Clone, Copy)]
pub struct JsonLayout {
    pub engine: Engine,
    /// Key wrapping the root node (`"Plan"`)
    pub wrapper_key: Option<&'static str>,
    /// Operator name keys, first present wins
    pub name_keys: &'static [&'static str],
    /// Nested object holding the node's details (`"extra_info"`)
    pub detail_key: Option<&'static str>,
    pub children_key: &'static str,
    /// Total cost. When absent, cost is derived from the cardinality.
    pub cost_key: Option<&'static str>,
    pub cardinality_key: Option<&'static str>,
    pub table_key: Option<&'static str>,
    pub alias_key: Option<&'static str>,
    pub filter_keys: &'static [&'static str],
    pub join_type_key: Option<&'static str>,
    pub join_condition_keys: &'static [&'static str],
    pub actual_time_key: Option<&'static str>,
    pub actual_rows_key: Option<&'static str>,
}

pub const DUCKDB_LAYOUT: JsonLayout = JsonLayout {
    engine: Engine::DuckDb,
    wrapper_key: None,
    name_keys: &["name", "operator_name", "operator_type"],
    detail_key: Some("extra_info"),
    children_key: "children",
    cost_key: None,
    cardinality_key: Some("Estimated Cardinality"),
    table_key: Some("Table"),
    alias_key: None,
    filter_keys: &["Filters"],
    join_type_key: Some("Join Type"),
    join_condition_keys: &["Conditions"],
    actual_time_key: None,
    actual_rows_key: None,
};

pub const POSTGRES_LAYOUT: JsonLayout = JsonLayout {
    engine: Engine::Postgres,
    wrapper_key: Some("Plan"),
    name_keys: &["Node Type"],
    detail_key: None,
    children_key: "Plans",
    cost_key: Some("Total Cost"),
    cardinality_key: Some("Plan Rows"),
    table_key: Some("Relation Name"),
    alias_key: Some("Alias"),
    filter_keys: &["Filter"],
    join_type_key: Some("Join Type"),
    join_condition_keys: &["Hash Cond", "Merge Cond", "Join Filter"],
    actual_time_key: Some("Actual Total Time"),
    actual_rows_key: Some("Actual Rows"),
};

impl JsonLayout {
    /// Layout for engines that report JSON plan trees
    pub fn for_engine(engine: Engine) -> Option<&'static JsonLayout> {
        match engine {
            Engine::DuckDb => Some(&DUCKDB_LAYOUT),
            Engine::Postgres => Some(&POSTGRES_LAYOUT),
            Engine::MySql => None,
        }
    }
}

/// Converts a JSON EXPLAIN payload into a plan tree.
///
/// Never fails: unusable payloads become a single error node.
pub fn parse_json_plan(payload: &Value, layout: &JsonLayout, config: &NormalizerConfig) -> PlanNode {
    let engine = layout.engine;

    let root = match unwrap_payload(payload, layout) {
        Ok(root) => root,
        Err(message) => {
            tracing::warn!(engine = %engine, error = %message, "JSON plan payload unusable");
            return PlanNode::error(message, config.failure_cost)
                .with_info(info_keys::ENGINE, engine.id());
        }
    };

    let node = parse_node(root, layout, config);
    tracing::debug!(
        engine = %engine,
        node_count = node.node_count(),
        depth = node.depth(),
        "normalized JSON plan"
    );
    node
}

/// Finds the root node object, or explains why there is none
fn unwrap_payload<'a>(
    payload: &'a Value,
    layout: &JsonLayout,
) -> Result<&'a Map<String, Value>, String> {
    let payload = match payload {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| "empty plan array".to_string())?,
        other => other,
    };

    let Value::Object(object) = payload else {
        return Err(format!("expected a JSON object, got {}", json_kind(payload)));
    };

    if let Some(Value::String(error)) = object.get("error") {
        return Err(error.clone());
    }

    if let Some(wrapper) = layout.wrapper_key
        && let Some(inner) = object.get(wrapper)
    {
        return match inner {
            Value::Object(inner) => Ok(inner),
            other => Err(format!("expected `{wrapper}` to be an object, got {}", json_kind(other))),
        };
    }

    Ok(object)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Detail fields live in the detail object when the layout has one, but some
/// engine versions hoist them onto the node itself.
fn lookup<'a>(
    object: &'a Map<String, Value>,
    detail: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Value> {
    detail
        .and_then(|d| d.get(key))
        .or_else(|| object.get(key))
        .filter(|v| !v.is_null())
}

fn parse_node(object: &Map<String, Value>, layout: &JsonLayout, config: &NormalizerConfig) -> PlanNode {
    let detail = layout
        .detail_key
        .and_then(|key| object.get(key))
        .and_then(Value::as_object);

    let field = |key: &str| lookup(object, detail, key);

    let name = layout
        .name_keys
        .iter()
        .find_map(|key| object.get(*key))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    let operator = Operator::classify(&name);

    let mut node = PlanNode::new(operator, config.sentinel_cost);

    if let Some(cost_key) = layout.cost_key
        && let Some(raw) = field(cost_key)
    {
        match parse_number(raw).filter(|c| *c >= 0.0) {
            Some(cost) => node.cost = cost,
            None => {
                tracing::trace!(raw_cost = %raw, "unusable cost, keeping sentinel");
                node.info.insert(info_keys::RAW_COST.to_string(), raw.clone());
            }
        }
    }

    if let Some(cardinality_key) = layout.cardinality_key
        && let Some(raw) = field(cardinality_key)
    {
        match parse_number(raw).filter(|n| *n >= 0.0) {
            Some(rows) => {
                node.info
                    .insert(info_keys::ESTIMATED_ROWS.to_string(), number_value(rows));
                if layout.cost_key.is_none() {
                    node.cost = cost_from_cardinality(rows);
                }
            }
            None => {
                tracing::trace!(raw_cardinality = %raw, "unusable cardinality");
                node.info
                    .insert(info_keys::RAW_CARDINALITY.to_string(), raw.clone());
            }
        }
    }

    if let Some(table) = layout.table_key.and_then(field).map(value_to_text)
        && !table.is_empty()
    {
        let alias = layout
            .alias_key
            .and_then(field)
            .map(value_to_text)
            .filter(|a| !a.is_empty());
        node = node.with_table(table, alias);
    }

    if let Some(filter) = layout.filter_keys.iter().find_map(|key| field(*key)) {
        node.info
            .insert(info_keys::FILTER.to_string(), Value::String(value_to_text(filter)));
    }

    if let Some(join_type) = layout.join_type_key.and_then(field) {
        node.info.insert(
            info_keys::JOIN_TYPE.to_string(),
            Value::String(value_to_text(join_type)),
        );
    }

    if let Some(conditions) = layout.join_condition_keys.iter().find_map(|key| field(*key)) {
        node.info.insert(
            info_keys::JOIN_CONDITIONS.to_string(),
            Value::String(value_to_text(conditions)),
        );
    }

    if let Some(time) = layout.actual_time_key.and_then(field).and_then(parse_number) {
        node.actual_time_ms = Some(time);
    }

    if let Some(rows) = layout.actual_rows_key.and_then(field).and_then(parse_number) {
        node.info
            .insert(info_keys::ACTUAL_ROWS.to_string(), number_value(rows));
    }

    node.info.insert(
        info_keys::ENGINE.to_string(),
        Value::String(layout.engine.id().to_string()),
    );

    if config.echo_raw_payload
        && let Some(detail) = detail
    {
        node.info
            .insert(info_keys::EXTRA_INFO.to_string(), Value::Object(detail.clone()));
    }

    if let Some(children) = object.get(layout.children_key).and_then(Value::as_array) {
        for child in children {
            match child {
                Value::Object(child) => node.children.push(parse_node(child, layout, config)),
                other => {
                    tracing::trace!(kind = json_kind(other), "skipping non-object child");
                }
            }
        }
    }

    node
}
