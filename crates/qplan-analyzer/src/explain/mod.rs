//! Query EXPLAIN Normalization Module
//!
//! This module turns EXPLAIN output from several engines into one canonical
//! plan tree:
//! - DuckDB (JSON trees and box-drawing text renderings)
//! - MySQL (`EXPLAIN FORMAT=TREE` / `EXPLAIN ANALYZE` indented text)
//! - PostgreSQL (JSON trees)
//!
//! # Example
//!
//! ```
//! use qplan_analyzer::explain::{Operator, PlanNormalizer};
//! use qplan_core::Engine;
//!
//! let normalizer = PlanNormalizer::default();
//!
//! // DuckDB EXPLAIN (FORMAT JSON)
//! let json = r#"[{"name": "SEQ_SCAN", "extra_info": {"Table": "users"}}]"#;
//! let plan = normalizer.normalize_json_str(Engine::DuckDb, json).unwrap();
//! assert_eq!(plan.operator, Operator::SeqScan);
//!
//! // MySQL EXPLAIN FORMAT=TREE
//! let text = "-> Table scan on users  (cost=10.5 rows=100)";
//! let plan = normalizer.normalize_text(Engine::MySql, text);
//! assert_eq!(plan.table_name.as_deref(), Some("users"));
//! ```

pub mod box_drawing;
mod fields;
pub mod indented;
pub mod json_tree;
mod normalizer;
pub mod plan;
mod taxonomy;

pub use box_drawing::parse_box_plan;
pub use indented::parse_indented_plan;
pub use json_tree::{DUCKDB_LAYOUT, JsonLayout, POSTGRES_LAYOUT, parse_json_plan};
pub use normalizer::{ExplainError, PlanNormalizer, RawPlan, Result};
pub use plan::{PlanNode, PlanNodeIterator, info_keys};
pub use taxonomy::Operator;
