//! Scan/join skeleton extraction

use crate::explain::PlanNode;

/// Keeps only scan and join nodes, including nodes that read a table and
/// joins the taxonomy leaves as `Other`.
///
/// Other nodes collapse and their retained descendants are lifted, in order,
/// to the nearest retained ancestor. Returns `None` when nothing is
/// retained. When the root itself is dropped but several nodes survive at
/// the top, the root stays as their connecting node.
pub fn filter_scans_or_joins(root: &PlanNode) -> Option<PlanNode> {
    let mut top = retained(root);

    match top.len() {
        0 => {
            tracing::trace!(operator = %root.operator, "no scan or join nodes to keep");
            None
        }
        1 => top.pop(),
        _ => {
            let mut connector = root.without_children();
            connector.children = top;
            Some(connector)
        }
    }
}

/// Retained nodes of a subtree, outermost first
fn retained(node: &PlanNode) -> Vec<PlanNode> {
    let children: Vec<PlanNode> = node.children.iter().flat_map(retained).collect();

    if node.is_scan_like() || node.is_join_like() {
        let mut kept = node.without_children();
        kept.children = children;
        vec![kept]
    } else {
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::{Operator, PlanNormalizer};
    use pretty_assertions::assert_eq;
    use qplan_core::Engine;

    fn scan(table: &str) -> PlanNode {
        PlanNode::new(Operator::SeqScan, 1.0).with_table(table, None)
    }

    fn other(label: &str) -> PlanNode {
        PlanNode::new(Operator::Other(label.to_string()), 1.0)
    }

    #[test]
    fn test_collapses_wrappers() {
        // Aggregate -> Sort -> HashJoin(Filter(Scan a), Hash(Scan b))
        let tree = PlanNode::new(Operator::Aggregate, 9.0).with_child(
            PlanNode::new(Operator::Sort, 8.0).with_child(
                PlanNode::new(Operator::HashJoin, 7.0)
                    .with_child(PlanNode::new(Operator::Filter, 2.0).with_child(scan("a")))
                    .with_child(PlanNode::new(Operator::Hash, 2.0).with_child(scan("b"))),
            ),
        );

        let pruned = filter_scans_or_joins(&tree).unwrap();

        let expected = PlanNode::new(Operator::HashJoin, 7.0)
            .with_child(scan("a"))
            .with_child(scan("b"));
        assert_eq!(pruned, expected);
    }

    #[test]
    fn test_scan_join_tree_is_unchanged() {
        let tree = PlanNode::new(Operator::NestedLoop, 5.0)
            .with_child(scan("a"))
            .with_child(
                PlanNode::new(Operator::HashJoin, 3.0)
                    .with_child(scan("b"))
                    .with_child(scan("c")),
            );

        assert_eq!(filter_scans_or_joins(&tree), Some(tree));
    }

    #[test]
    fn test_all_other_tree_is_empty() {
        let tree = other("Result").with_child(PlanNode::new(Operator::Sort, 1.0));
        assert_eq!(filter_scans_or_joins(&tree), None);
    }

    #[test]
    fn test_root_connects_several_survivors() {
        let tree = other("UNION")
            .with_child(PlanNode::new(Operator::Filter, 1.0).with_child(scan("a")))
            .with_child(scan("b"));

        let pruned = filter_scans_or_joins(&tree).unwrap();

        assert_eq!(pruned.operator, Operator::Other("UNION".to_string()));
        assert_eq!(pruned.children, vec![scan("a"), scan("b")]);
    }

    #[test]
    fn test_order_is_preserved() {
        let tree = PlanNode::new(Operator::HashJoin, 1.0)
            .with_child(other("Projection").with_child(scan("x")))
            .with_child(scan("y"))
            .with_child(other("Materialize").with_child(scan("z")));

        let pruned = filter_scans_or_joins(&tree).unwrap();
        assert_eq!(pruned.tables(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_postgres_merge_join_and_bitmap_scan_are_kept() {
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

        let pruned = filter_scans_or_joins(&plan).unwrap();

        assert_eq!(pruned.operator, Operator::Other("Merge Join".to_string()));
        assert_eq!(pruned.children.len(), 2);
        assert_eq!(pruned.tables(), vec!["title AS t", "movie_info AS mi"]);
    }
}
