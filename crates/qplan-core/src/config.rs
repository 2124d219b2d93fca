//! Normalizer configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by the plan adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Cost used when an engine omits or garbles a cost value
    #[serde(default = "default_sentinel_cost")]
    pub sentinel_cost: f64,

    /// Cost assigned to error nodes
    #[serde(default)]
    pub failure_cost: f64,

    /// Marker that starts an operator line in indented text plans
    #[serde(default = "default_indent_marker")]
    pub indent_marker: String,

    /// Columns per nesting level in indented text plans
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Longest cleaned box-drawing line that may carry an operator keyword
    #[serde(default = "default_box_label_max_len")]
    pub box_label_max_len: usize,

    /// Tables listed in a synthesized `Join (...)` label
    #[serde(default = "default_box_join_label_tables")]
    pub box_join_label_tables: usize,

    /// Copy raw payload fragments into node info
    #[serde(default = "default_true")]
    pub echo_raw_payload: bool,
}

fn default_sentinel_cost() -> f64 {
    1000.0
}

fn default_indent_marker() -> String {
    "->".to_string()
}

fn default_indent_width() -> usize {
    4
}

fn default_box_label_max_len() -> usize {
    50
}

fn default_box_join_label_tables() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            sentinel_cost: default_sentinel_cost(),
            failure_cost: 0.0,
            indent_marker: default_indent_marker(),
            indent_width: default_indent_width(),
            box_label_max_len: default_box_label_max_len(),
            box_join_label_tables: default_box_join_label_tables(),
            echo_raw_payload: true,
        }
    }
}

impl NormalizerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        if config.indent_width == 0 {
            tracing::warn!("indent_width of 0 is not usable, falling back to default");
            config.indent_width = default_indent_width();
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading normalizer config");
        Self::from_toml_str(&content)
    }
}
