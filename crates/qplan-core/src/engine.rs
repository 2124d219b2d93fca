//! Engine identity
//!
//! Every raw plan payload is tagged with the engine that produced it. The tag
//! selects the dialect used before EXPLAIN is issued and the adapter used to
//! read the result.

use crate::error::{QplanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A relational engine whose EXPLAIN output can be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// DuckDB: JSON plan trees, or a box-drawing text rendering
    DuckDb,
    /// MySQL: `EXPLAIN FORMAT=TREE` / `EXPLAIN ANALYZE` indented text
    MySql,
    /// PostgreSQL: `EXPLAIN (FORMAT JSON)` plan trees
    Postgres,
}

impl Engine {
    /// All supported engines
    pub const ALL: [Engine; 3] = [Engine::DuckDb, Engine::MySql, Engine::Postgres];

    /// Stable lowercase identifier (`duckdb`, `mysql`, `postgres`)
    pub fn id(&self) -> &'static str {
        match self {
            Self::DuckDb => "duckdb",
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DuckDb => "DuckDB",
            Self::MySql => "MySQL",
            Self::Postgres => "PostgreSQL",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Engine {
    type Err = QplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "duckdb" => Ok(Self::DuckDb),
            "mysql" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(QplanError::UnsupportedEngine(s.to_string())),
        }
    }
}
