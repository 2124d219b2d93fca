//! Filterable attribute extraction
//!
//! Finds the columns a query filters on: columns compared against literals
//! in the `WHERE` clause, through `AND`/`OR` and parentheses.

use sqlparser::ast::{BinaryOperator, Expr, Query, SetExpr, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::collections::BTreeSet;

/// Columns compared against literals in `sql`, as written (`alias.column`).
///
/// Unparsable SQL yields an empty set.
pub fn filtered_attributes(sql: &str) -> BTreeSet<String> {
    let mut attributes = BTreeSet::new();

    let dialect = GenericDialect {};
    let Ok(statements) = Parser::parse_sql(&dialect, sql) else {
        tracing::debug!(
            sql_preview = %sql.chars().take(100).collect::<String>(),
            "failed to parse SQL, skipping attribute extraction"
        );
        return attributes;
    };

    for statement in &statements {
        if let Statement::Query(query) = statement {
            collect_query(query, &mut attributes);
        }
    }

    attributes
}

fn collect_query(query: &Query, out: &mut BTreeSet<String>) {
    collect_set_expr(&query.body, out);
}

fn collect_set_expr(body: &SetExpr, out: &mut BTreeSet<String>) {
    match body {
        SetExpr::Select(select) => {
            if let Some(selection) = &select.selection {
                collect_predicate(selection, out);
            }
        }
        SetExpr::Query(query) => collect_query(query, out),
        SetExpr::SetOperation { left, right, .. } => {
            collect_set_expr(left, out);
            collect_set_expr(right, out);
        }
        _ => {}
    }
}

fn collect_predicate(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr {
        Expr::Nested(inner) => collect_predicate(inner, out),
        Expr::UnaryOp { expr, .. } => collect_predicate(expr, out),
        Expr::BinaryOp { left, op, right } => match op {
            BinaryOperator::And | BinaryOperator::Or => {
                collect_predicate(left, out);
                collect_predicate(right, out);
            }
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq => {
                if is_literal(right) {
                    insert_column(left, out);
                } else if is_literal(left) {
                    insert_column(right, out);
                }
            }
            _ => {}
        },
        Expr::Like { expr, pattern, .. } | Expr::ILike { expr, pattern, .. } => {
            if is_literal(pattern) {
                insert_column(expr, out);
            }
        }
        Expr::InList { expr, list, .. } => {
            if list.iter().all(is_literal) {
                insert_column(expr, out);
            }
        }
        Expr::Between { expr, low, high, .. } => {
            if is_literal(low) && is_literal(high) {
                insert_column(expr, out);
            }
        }
        Expr::IsNull(expr) | Expr::IsNotNull(expr) => insert_column(expr, out),
        _ => {}
    }
}

fn is_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Value(_) | Expr::TypedString { .. } => true,
        Expr::Nested(inner) => is_literal(inner),
        Expr::UnaryOp { expr, .. } | Expr::Cast { expr, .. } => is_literal(expr),
        _ => false,
    }
}

fn insert_column(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr {
        Expr::Identifier(ident) => {
            out.insert(ident.value.clone());
        }
        Expr::CompoundIdentifier(idents) => {
            let name = idents
                .iter()
                .map(|i| i.value.as_str())
                .collect::<Vec<_>>()
                .join(".");
            out.insert(name);
        }
        Expr::Nested(inner) => insert_column(inner, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(sql: &str) -> Vec<String> {
        filtered_attributes(sql).into_iter().collect()
    }

    #[test]
    fn test_columns_compared_to_literals() {
        let sql = "SELECT MIN(t.title) FROM title AS t, movie_info AS mi \
                   WHERE t.production_year > 2000 AND mi.info IN ('Drama', 'Horror') \
                   AND t.id = mi.movie_id AND (t.title LIKE '%Star%' OR t.kind_id BETWEEN 1 AND 3)";

        assert_eq!(
            attrs(sql),
            vec!["mi.info", "t.kind_id", "t.production_year", "t.title"]
        );
    }

    #[test]
    fn test_literal_on_the_left_and_null_checks() {
        let sql = "SELECT * FROM a WHERE 5 < a.x AND a.note IS NOT NULL AND NOT a.flag = 1";
        assert_eq!(attrs(sql), vec!["a.flag", "a.note", "a.x"]);
    }

    #[test]
    fn test_join_predicates_are_ignored() {
        assert!(attrs("SELECT * FROM a, b WHERE a.id = b.id").is_empty());
    }

    #[test]
    fn test_unparsable_sql_yields_nothing() {
        assert!(attrs("SELEC broken FROM").is_empty());
    }
}
