//! Engine dispatch
//!
//! [`PlanNormalizer`] picks one adapter per `(engine, payload shape)` pair.
//! The adapters share only the taxonomy and the output type.
//!
//! # Example
//!
//! ```
//! use qplan_analyzer::explain::{Operator, PlanNormalizer, RawPlan};
//! use qplan_core::Engine;
//!
//! let normalizer = PlanNormalizer::default();
//! let raw = RawPlan::from_text("-> Table scan on title  (cost=120.5 rows=1000)");
//! let plan = normalizer.normalize(Engine::MySql, &raw);
//! assert_eq!(plan.operator, Operator::SeqScan);
//! ```

use crate::explain::box_drawing::parse_box_plan;
use crate::explain::indented::parse_indented_plan;
use crate::explain::json_tree::{JsonLayout, parse_json_plan};
use crate::explain::plan::{PlanNode, info_keys};
use qplan_core::{Engine, NormalizerConfig};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when normalizing EXPLAIN output
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type for EXPLAIN normalization
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Raw EXPLAIN output as returned by an engine
#[derive(Debug, Clone, PartialEq)]
pub enum RawPlan {
    /// A JSON plan document
    Json(Value),
    /// Text output, one entry per line
    Lines(Vec<String>),
    /// The engine returned an error instead of a plan
    Failed(String),
}

impl RawPlan {
    /// Splits text output into lines
    pub fn from_text(text: &str) -> Self {
        Self::Lines(text.lines().map(str::to_string).collect())
    }
}

/// Turns raw EXPLAIN output from any supported engine into a plan tree
#[derive(Debug, Clone, Default)]
pub struct PlanNormalizer {
    config: NormalizerConfig,
}

impl PlanNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes one payload.
    ///
    /// Never fails. Payloads an engine cannot produce, and failed EXPLAIN
    /// calls, become error nodes.
    pub fn normalize(&self, engine: Engine, raw: &RawPlan) -> PlanNode {
        match (engine, raw) {
            (_, RawPlan::Failed(message)) => {
                tracing::warn!(engine = %engine, error = %message, "EXPLAIN failed upstream");
                self.error_node(engine, message.clone())
            }
            (Engine::MySql, RawPlan::Lines(lines)) => {
                parse_indented_plan(lines.as_slice(), engine, &self.config)
            }
            (Engine::MySql, RawPlan::Json(Value::String(text))) => {
                let lines: Vec<&str> = text.lines().collect();
                parse_indented_plan(&lines, engine, &self.config)
            }
            (Engine::MySql, RawPlan::Json(_)) => {
                tracing::warn!(engine = %engine, "JSON plans are not supported for this engine");
                self.error_node(
                    engine,
                    "unsupported payload: expected EXPLAIN FORMAT=TREE text".to_string(),
                )
            }
            (Engine::DuckDb, RawPlan::Lines(lines)) => parse_box_plan(lines.as_slice(), engine, &self.config),
            (Engine::Postgres, RawPlan::Lines(_)) => {
                tracing::warn!(engine = %engine, "text plans are not supported for this engine");
                self.error_node(
                    engine,
                    "unsupported payload: request EXPLAIN (FORMAT JSON)".to_string(),
                )
            }
            (Engine::DuckDb | Engine::Postgres, RawPlan::Json(value)) => {
                match JsonLayout::for_engine(engine) {
                    Some(layout) => parse_json_plan(value, layout, &self.config),
                    None => self.error_node(engine, "no JSON layout for engine".to_string()),
                }
            }
        }
    }

    /// Parses JSON text and normalizes it.
    ///
    /// Returns [`ExplainError::InvalidJson`] when the text is not JSON at all.
    pub fn normalize_json_str(&self, engine: Engine, json: &str) -> Result<PlanNode> {
        let value: Value = serde_json::from_str(json).inspect_err(|e| {
            tracing::debug!(
                engine = %engine,
                error = %e,
                json_preview = %json.chars().take(100).collect::<String>(),
                "plan payload is not JSON"
            );
        })?;
        Ok(self.normalize(engine, &RawPlan::Json(value)))
    }

    /// Normalizes text output
    pub fn normalize_text(&self, engine: Engine, text: &str) -> PlanNode {
        self.normalize(engine, &RawPlan::from_text(text))
    }

    fn error_node(&self, engine: Engine, message: String) -> PlanNode {
        PlanNode::error(message, self.config.failure_cost).with_info(info_keys::ENGINE, engine.id())
    }
}
