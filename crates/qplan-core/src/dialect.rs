//! Engine Dialects
//!
//! Per-engine metadata needed before a plan is requested: the identifier
//! quote, the reserved words that must be quoted when used as aliases, and
//! the EXPLAIN statement templates.

use crate::engine::Engine;
use crate::error::Result;
use crate::rewrite::AliasRewriter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const BASE_RESERVED_WORDS: &[&str] = &["at", "to", "as", "or", "and", "not", "in", "on"];
const MYSQL_EXTRA_RESERVED_WORDS: &[&str] = &["order", "group", "character"];

/// EXPLAIN templates for an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// Format string for the plain EXPLAIN (e.g., "EXPLAIN (FORMAT JSON) {sql}")
    /// Use `{sql}` as placeholder for the SQL statement
    #[serde(default = "default_explain_format")]
    pub explain_format: Cow<'static, str>,

    /// Optional format for EXPLAIN with ANALYZE (executes the query)
    /// Use `{sql}` as placeholder for the SQL statement
    #[serde(default)]
    pub analyze_format: Option<Cow<'static, str>>,
}

fn default_explain_format() -> Cow<'static, str> {
    Cow::Borrowed("EXPLAIN {sql}")
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            explain_format: default_explain_format(),
            analyze_format: None,
        }
    }
}

impl ExplainConfig {
    /// Fills the template with `sql`.
    ///
    /// Falls back to the plain format when ANALYZE is requested but the
    /// engine has no analyze format.
    pub fn render(&self, sql: &str, analyze: bool) -> String {
        let template = match (&self.analyze_format, analyze) {
            (Some(format), true) => format,
            _ => &self.explain_format,
        };
        template.replace("{sql}", sql)
    }
}

/// Dialect metadata for one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDialect {
    pub engine: Engine,

    /// Character used to quote identifiers (`"` or `` ` ``)
    #[serde(default = "default_identifier_quote")]
    pub identifier_quote: char,

    /// Words that must be quoted when they appear as table aliases
    #[serde(default)]
    pub reserved_words: Vec<String>,

    /// Also quote reserved words used as select-list aliases
    #[serde(default)]
    pub quote_select_aliases: bool,

    #[serde(default)]
    pub explain: ExplainConfig,
}

fn default_identifier_quote() -> char {
    '"'
}

impl EngineDialect {
    pub fn duckdb() -> Self {
        Self {
            engine: Engine::DuckDb,
            identifier_quote: '"',
            reserved_words: to_owned_words(BASE_RESERVED_WORDS),
            quote_select_aliases: false,
            explain: ExplainConfig {
                explain_format: Cow::Borrowed("EXPLAIN (FORMAT JSON) {sql}"),
                analyze_format: None,
            },
        }
    }

    pub fn mysql() -> Self {
        let mut reserved_words = to_owned_words(BASE_RESERVED_WORDS);
        reserved_words.extend(to_owned_words(MYSQL_EXTRA_RESERVED_WORDS));

        Self {
            engine: Engine::MySql,
            identifier_quote: '`',
            reserved_words,
            quote_select_aliases: true,
            explain: ExplainConfig {
                explain_format: Cow::Borrowed("EXPLAIN FORMAT=TREE {sql}"),
                analyze_format: Some(Cow::Borrowed("EXPLAIN ANALYZE {sql}")),
            },
        }
    }

    pub fn postgres() -> Self {
        Self {
            engine: Engine::Postgres,
            identifier_quote: '"',
            reserved_words: to_owned_words(BASE_RESERVED_WORDS),
            quote_select_aliases: false,
            explain: ExplainConfig {
                explain_format: Cow::Borrowed("EXPLAIN (FORMAT JSON) {sql}"),
                analyze_format: Some(Cow::Borrowed("EXPLAIN (ANALYZE, FORMAT JSON) {sql}")),
            },
        }
    }

    /// Built-in dialect for `engine`
    pub fn for_engine(engine: Engine) -> Self {
        match engine {
            Engine::DuckDb => Self::duckdb(),
            Engine::MySql => Self::mysql(),
            Engine::Postgres => Self::postgres(),
        }
    }

    /// Load a dialect from TOML
    ///
    /// ```toml
    /// engine = "mysql"
    /// identifier_quote = "`"
    /// reserved_words = ["at", "order"]
    /// quote_select_aliases = true
    ///
    /// [explain]
    /// explain_format = "EXPLAIN FORMAT=TREE {sql}"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let dialect: Self = toml::from_str(content)?;
        tracing::debug!(
            engine = %dialect.engine,
            reserved_words = dialect.reserved_words.len(),
            "loaded dialect from TOML"
        );
        Ok(dialect)
    }

    /// Check if a word is reserved as an alias in this dialect
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_words
            .iter()
            .any(|w| w.eq_ignore_ascii_case(word))
    }

    /// Quote reserved-word aliases so the engine accepts `sql`
    pub fn transform_sql(&self, sql: &str) -> String {
        match AliasRewriter::new(
            self.reserved_words.as_slice(),
            self.identifier_quote,
            self.quote_select_aliases,
        ) {
            Some(rewriter) => rewriter.rewrite(sql),
            None => sql.to_string(),
        }
    }

    /// Transformed EXPLAIN statement for `sql`
    pub fn explain_statement(&self, sql: &str, analyze: bool) -> String {
        let transformed = self.transform_sql(sql);
        self.explain.render(&transformed, analyze)
    }
}

fn to_owned_words(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_reserved_words() {
        assert_eq!(EngineDialect::duckdb().reserved_words.len(), 8);
        assert_eq!(EngineDialect::mysql().reserved_words.len(), 11);

        let mysql = EngineDialect::mysql();
        assert!(mysql.is_reserved("ORDER"));
        assert!(!EngineDialect::duckdb().is_reserved("order"));
    }

    #[test]
    fn test_duckdb_explain_statement() {
        let dialect = EngineDialect::for_engine(Engine::DuckDb);
        let stmt = dialect.explain_statement("SELECT x FROM foo AS at WHERE at.y = 1", false);
        assert_eq!(
            stmt,
            r#"EXPLAIN (FORMAT JSON) SELECT x FROM foo AS "at" WHERE "at".y = 1"#
        );
    }

    #[test]
    fn test_duckdb_analyze_falls_back_to_plain_format() {
        let dialect = EngineDialect::duckdb();
        assert_eq!(
            dialect.explain_statement("SELECT 1", true),
            "EXPLAIN (FORMAT JSON) SELECT 1"
        );
    }

    #[test]
    fn test_mysql_explain_statements() {
        let dialect = EngineDialect::mysql();
        let sql = "SELECT MIN(t.title) AS order FROM title AS t";

        assert_eq!(
            dialect.explain_statement(sql, false),
            "EXPLAIN FORMAT=TREE SELECT MIN(t.title) AS `order` FROM title AS t"
        );
        assert_eq!(
            dialect.explain_statement(sql, true),
            "EXPLAIN ANALYZE SELECT MIN(t.title) AS `order` FROM title AS t"
        );
    }

    #[test]
    fn test_postgres_analyze_format() {
        let dialect = EngineDialect::postgres();
        assert_eq!(
            dialect.explain_statement("SELECT 1", true),
            "EXPLAIN (ANALYZE, FORMAT JSON) SELECT 1"
        );
    }

    #[test]
    fn test_dialect_from_toml() {
        let content = r#"
engine = "mysql"
identifier_quote = "`"
reserved_words = ["at"]

[explain]
explain_format = "EXPLAIN FORMAT=TREE {sql}"
"#;
        let dialect = EngineDialect::from_toml_str(content).unwrap();

        assert_eq!(dialect.engine, Engine::MySql);
        assert_eq!(dialect.identifier_quote, '`');
        assert!(!dialect.quote_select_aliases);
        assert_eq!(dialect.explain.analyze_format, None);
        assert_eq!(
            dialect.explain_statement("SELECT a FROM b AS at", false),
            "EXPLAIN FORMAT=TREE SELECT a FROM b AS `at`"
        );
    }

    #[test]
    fn test_dialect_from_toml_rejects_unknown_engine() {
        let err = EngineDialect::from_toml_str("engine = \"oracle\"").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_empty_reserved_words_leave_sql_unchanged() {
        let dialect = EngineDialect {
            reserved_words: Vec::new(),
            ..EngineDialect::duckdb()
        };
        let sql = "SELECT x FROM foo AS at";
        assert_eq!(dialect.transform_sql(sql), sql);
    }
}
