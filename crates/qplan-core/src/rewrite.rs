//! Reserved-Word Alias Rewriting
//!
//! Benchmark queries freely use short aliases such as `at`, `on` or `order`
//! that some engines treat as reserved words. Before an EXPLAIN statement is
//! sent out, such aliases are wrapped in the engine's identifier quote.
//!
//! The rewrite works on raw text with whole-word, case-insensitive regexes.
//! It does not parse SQL. Three passes run in a fixed order:
//!
//! 1. `<word> AS <reserved>` declarations
//! 2. `<reserved>.column` references
//! 3. `AS <reserved>` in any position (select-list aliases), only for engines
//!    that reject reserved words as column aliases
//!
//! Already-quoted tokens never match, so the rewrite is idempotent.
//!
//! # Example
//!
//! ```
//! use qplan_core::rewrite::quote_reserved_aliases;
//!
//! let sql = "SELECT x FROM foo AS at WHERE at.y = 1";
//! let rewritten = quote_reserved_aliases(sql, &["at"], '"', false);
//! assert_eq!(rewritten, r#"SELECT x FROM foo AS "at" WHERE "at".y = 1"#);
//! ```

use regex::Regex;

/// Compiled rewrite passes for one reserved-word list and quote character
#[derive(Debug, Clone)]
pub struct AliasRewriter {
    declaration: Regex,
    reference: Regex,
    select_alias: Option<Regex>,
    quote: char,
}

impl AliasRewriter {
    /// Compiles the rewrite passes.
    ///
    /// Returns `None` when the reserved-word list is empty, since there is
    /// nothing to rewrite.
    pub fn new<S: AsRef<str>>(
        reserved_words: &[S],
        quote: char,
        quote_select_aliases: bool,
    ) -> Option<Self> {
        let alternatives = reserved_words
            .iter()
            .map(|w| w.as_ref().trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        if alternatives.is_empty() {
            return None;
        }

        let build = || -> Result<Self, regex::Error> {
            let declaration = Regex::new(&format!(r"(?i)\b(\w+\s+AS\s+)({alternatives})\b"))?;
            // The leading group stands in for a look-behind: the word must not
            // follow another word character, a dot or an opening quote.
            let reference = Regex::new(&format!(
                r#"(?i)(^|[^\w."'`\[])({alternatives})(\s*\.\s*\w+)"#
            ))?;
            let select_alias = if quote_select_aliases {
                Some(Regex::new(&format!(r"(?i)\b(AS\s+)({alternatives})\b"))?)
            } else {
                None
            };
            Ok(Self {
                declaration,
                reference,
                select_alias,
                quote,
            })
        };

        match build() {
            Ok(rewriter) => Some(rewriter),
            Err(e) => {
                tracing::warn!(error = %e, "failed to compile reserved alias patterns");
                None
            }
        }
    }

    /// Applies the three passes in order
    pub fn rewrite(&self, sql: &str) -> String {
        let q = self.quote;

        let declared = self
            .declaration
            .replace_all(sql, format!("${{1}}{q}${{2}}{q}").as_str());

        let referenced = self
            .reference
            .replace_all(&declared, format!("${{1}}{q}${{2}}{q}${{3}}").as_str());

        let rewritten = match &self.select_alias {
            Some(select_alias) => select_alias
                .replace_all(&referenced, format!("${{1}}{q}${{2}}{q}").as_str())
                .into_owned(),
            None => referenced.into_owned(),
        };

        if rewritten != sql {
            tracing::trace!(
                sql_preview = %sql.chars().take(80).collect::<String>(),
                "quoted reserved-word aliases"
            );
        }

        rewritten
    }
}

/// Quotes reserved words used as aliases in `sql`.
///
/// Convenience wrapper around [`AliasRewriter`] for one-off rewrites.
pub fn quote_reserved_aliases<S: AsRef<str>>(
    sql: &str,
    reserved_words: &[S],
    quote: char,
    quote_select_aliases: bool,
) -> String {
    match AliasRewriter::new(reserved_words, quote, quote_select_aliases) {
        Some(rewriter) => rewriter.rewrite(sql),
        None => sql.to_string(),
    }
}
