//! Tests for operator classification

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_classify_engine_spellings() {
    let cases = [
        ("Table scan on title", Operator::SeqScan),
        ("Seq Scan", Operator::SeqScan),
        ("SEQ_SCAN", Operator::SeqScan),
        ("TABLE_SCAN", Operator::SeqScan),
        ("Index Scan", Operator::IndexScan),
        ("Index Only Scan", Operator::IndexScan),
        ("Single-row index lookup on t using PRIMARY", Operator::IndexScan),
        ("Index range scan on mi using idx", Operator::IndexScan),
        ("INDEX_SCAN", Operator::IndexScan),
        ("Nested loop inner join", Operator::NestedLoop),
        ("NESTED_LOOP_JOIN", Operator::NestedLoop),
        ("Inner hash join", Operator::HashJoin),
        ("HASH_JOIN", Operator::HashJoin),
        ("UNGROUPED_AGGREGATE", Operator::Aggregate),
        ("HASH_GROUP_BY", Operator::Aggregate),
        ("Sort", Operator::Sort),
        ("ORDER_BY", Operator::Sort),
        ("TOP_N", Operator::Sort),
        ("Filter", Operator::Filter),
        ("FILTER", Operator::Filter),
        ("Hash", Operator::Hash),
    ];

    for (raw, expected) in cases {
        assert_eq!(Operator::classify(raw), expected, "classifying {raw:?}");
    }
}

#[test]
fn test_priority_order() {
    // scan patterns outrank the join patterns that also match
    assert_eq!(
        Operator::classify("index scan under hash join"),
        Operator::IndexScan
    );
    // hash join outranks the plain hash pattern
    assert_eq!(Operator::classify("hash join"), Operator::HashJoin);
    // aggregate outranks filter
    assert_eq!(
        Operator::classify("aggregate with filter"),
        Operator::Aggregate
    );
}

#[test]
fn test_unknown_text_is_kept_verbatim() {
    assert_eq!(
        Operator::classify("Bitmap Heap Scan"),
        Operator::Other("Bitmap Heap Scan".to_string())
    );
    assert_eq!(
        Operator::classify("PROJECTION").label(),
        "PROJECTION"
    );
}

#[test]
fn test_blank_text_is_unknown() {
    assert_eq!(Operator::classify(""), Operator::Other("Unknown".to_string()));
    assert_eq!(Operator::classify("   ").label(), "Unknown");
}

#[test]
fn test_classify_is_deterministic() {
    for raw in ["Materialize", "HASH_JOIN", "", "Limit: 10 row(s)"] {
        assert_eq!(Operator::classify(raw), Operator::classify(raw));
    }
}

#[test]
fn test_labels() {
    assert_eq!(Operator::SeqScan.label(), "Seq Scan");
    assert_eq!(Operator::NestedLoop.to_string(), "Nested Loop");
    assert_eq!(Operator::Error.label(), "Error");
    assert!(Operator::IndexScan.is_scan());
    assert!(Operator::HashJoin.is_join());
    assert!(!Operator::Hash.is_join());
}
