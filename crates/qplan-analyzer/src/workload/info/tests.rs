//! Tests for the workload summary

use super::*;
use crate::explain::{Operator, PlanNormalizer};
use indoc::indoc;
use pretty_assertions::assert_eq;
use qplan_core::Engine;

fn corpus() -> Vec<PlanNode> {
    let normalizer = PlanNormalizer::default();

    let mysql = normalizer
        .normalize_text(
            Engine::MySql,
            indoc! {"
                -> Nested loop inner join  (cost=4.5 rows=3)
                    -> Filter: (t.production_year > 2000)  (cost=1.2 rows=10)
                        -> Table scan on t  (cost=1.2 rows=10)
                    -> Index lookup on mi using movie_id_movie_info (movie_id=t.id)  (cost=0.3 rows=2)
            "},
        )
        .with_info(
            info_keys::SQL_STR,
            "SELECT MIN(t.title) FROM title AS t, movie_info AS mi \
             WHERE t.production_year > 2000 AND t.id = mi.movie_id",
        );

    let postgres = normalizer
        .normalize_json_str(
            Engine::Postgres,
            r#"{"Plan": {"Node Type": "Hash Join", "Total Cost": 10.0, "Plans": [
                {"Node Type": "Seq Scan", "Relation Name": "title", "Alias": "t", "Filter": "(kind_id = 1)"},
                {"Node Type": "Hash", "Plans": [
                    {"Node Type": "Bitmap Heap Scan", "Relation Name": "kind_type", "Alias": "kt"}
                ]}
            ]}}"#,
        )
        .unwrap()
        .with_info(info_keys::SQL_STR, "SELECT * FROM title AS t WHERE t.kind_id = 1");

    vec![mysql, postgres]
}

#[test]
fn test_from_plans_collects_sorted_sets() {
    let info = WorkloadInfo::from_plans(&corpus());

    assert_eq!(info.rel_names, vec!["kind_type", "mi", "t", "title"]);
    assert_eq!(info.rel_ids, vec!["kind_type AS kt", "mi", "t", "title AS t"]);
    assert_eq!(
        info.scan_types,
        vec!["Bitmap Heap Scan", "Index Scan", "Seq Scan"]
    );
    assert_eq!(info.join_types, vec!["Hash Join", "Nested Loop"]);
    assert_eq!(
        info.all_ops,
        vec![
            "Bitmap Heap Scan",
            "Filter",
            "Hash",
            "Hash Join",
            "Index Scan",
            "Nested Loop",
            "Seq Scan"
        ]
    );
    assert_eq!(info.all_attributes, vec!["t.kind_id", "t.production_year"]);
}

#[test]
fn test_filters_are_attributed_to_tables() {
    let info = WorkloadInfo::from_plans(&corpus());

    let expected: BTreeMap<String, BTreeSet<String>> = [
        ("t", "(t.production_year > 2000)"),
        ("title AS t", "(kind_id = 1)"),
    ]
    .into_iter()
    .map(|(table, filter)| (table.to_string(), BTreeSet::from([filter.to_string()])))
    .collect();
    assert_eq!(info.all_filters, expected);
}

#[test]
fn test_postgres_merge_join_counts_as_join() {
    let plan = PlanNormalizer::default()
        .normalize_json_str(
            Engine::Postgres,
            r#"{"Plan": {"Node Type": "Aggregate", "Plans": [
                {"Node Type": "Merge Join", "Plans": [
                    {"Node Type": "Bitmap Heap Scan", "Relation Name": "title", "Alias": "t"},
                    {"Node Type": "Index Scan", "Relation Name": "movie_info", "Alias": "mi"}
                ]}
            ]}}"#,
        )
        .unwrap();

    let info = WorkloadInfo::from_plans(&[plan]);

    assert_eq!(info.join_types, vec!["Merge Join"]);
    assert_eq!(info.scan_types, vec!["Bitmap Heap Scan", "Index Scan"]);
    assert_eq!(info.rel_ids, vec!["movie_info AS mi", "title AS t"]);
}

#[test]
fn test_ambiguous_filter_is_skipped() {
    let plan = PlanNode::new(Operator::Filter, 1.0)
        .with_info(info_keys::FILTER, "a.x = b.y")
        .with_child(
            PlanNode::new(Operator::HashJoin, 1.0)
                .with_child(PlanNode::new(Operator::SeqScan, 1.0).with_table("a", None))
                .with_child(PlanNode::new(Operator::SeqScan, 1.0).with_table("b", None)),
        );

    let info = WorkloadInfo::from_plans(&[plan]);
    assert!(info.all_filters.is_empty());
}

#[test]
fn test_empty_corpus() {
    let info = WorkloadInfo::from_plans(&[]);
    assert_eq!(info, WorkloadInfo::default());
    assert!(info.has_physical_ops());
}

#[test]
fn test_set_physical_ops_replaces_scan_and_join_labels() {
    let mut info = WorkloadInfo::from_plans(&corpus());

    info.set_physical_ops(
        Some(["Merge Join", "Hash Join", "Nested Loop"]),
        Some(["Seq Scan", "Index Only Scan", "Index Scan"]),
    );

    assert_eq!(info.join_types, vec!["Hash Join", "Merge Join", "Nested Loop"]);
    assert_eq!(
        info.scan_types,
        vec!["Index Only Scan", "Index Scan", "Seq Scan"]
    );
    assert_eq!(
        info.all_ops,
        vec![
            "Filter",
            "Hash",
            "Hash Join",
            "Index Only Scan",
            "Index Scan",
            "Merge Join",
            "Nested Loop",
            "Seq Scan"
        ]
    );
}

#[test]
fn test_set_physical_ops_keeps_unset_side() {
    let mut info = WorkloadInfo::from_plans(&corpus());

    info.set_physical_ops(None::<Vec<String>>, Some(vec!["Scan".to_string()]));

    assert_eq!(info.join_types, vec!["Hash Join", "Nested Loop"]);
    assert_eq!(info.scan_types, vec!["Scan"]);
    assert!(info.all_ops.contains(&"Scan".to_string()));
    assert!(!info.all_ops.contains(&"Seq Scan".to_string()));
}

#[test]
fn test_has_physical_ops() {
    let mut info = WorkloadInfo::default();
    info.set_physical_ops(Some(["Join"]), Some(["Scan"]));
    assert!(!info.has_physical_ops());

    info.set_physical_ops(Some(["Hash Join"]), None::<[&str; 0]>);
    assert!(info.has_physical_ops());
}

#[test]
fn test_join_graph_is_symmetric() {
    let graph = HashMap::from([
        ("t".to_string(), vec!["mi".to_string(), "kt".to_string()]),
        ("mi".to_string(), vec!["t".to_string()]),
    ]);

    let info = WorkloadInfo::default().with_join_graph(&graph);

    assert_eq!(info.join_edges.len(), 4);
    assert!(info.has_join_edge("kt", "t"));
    assert!(info.has_join_edge("t", "kt"));
    assert!(!info.has_join_edge("mi", "kt"));
}

#[test]
fn test_display_summary() {
    let info = WorkloadInfo::from_plans(&corpus());
    let text = info.to_string();

    assert!(text.starts_with("rel_names: [\"kind_type\""));
    assert!(text.contains("join_types: [\"Hash Join\", \"Nested Loop\"]"));
    assert_eq!(text.lines().count(), 6);
}
