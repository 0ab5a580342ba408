use super::*;
use crate::foundation::ids::VariableId;
use crate::result::variables::VariableValue;
use glam::DVec3;

fn params() -> NodeParams<'static> {
    NodeParams {
        delta_time: 0.1,
        is_first_frame: true,
        context: None,
    }
}

fn sample_def() -> NodeDef {
    NodeDef::Sequence(vec![
        NodeDef::Offset {
            offset: DVec3::new(1.0, 0.0, 0.0),
            space: Default::default(),
        },
        NodeDef::Sequence(vec![NodeDef::Offset {
            offset: DVec3::new(0.0, 2.0, 0.0),
            space: Default::default(),
        }]),
        NodeDef::InputValue {
            variable: VariableId(1),
            value: VariableValue::Float(3.0),
        },
    ])
}

#[test]
fn build_and_run_visits_every_node() {
    let mut tree = EvaluatorTree::new();
    let root = tree.build(&sample_def(), &NodeRegistry::new()).unwrap();
    assert_eq!(tree.len(), 5);

    let mut result = EvaluationResult::valid();
    tree.run_subtree(root, &params(), &mut result);
    assert_eq!(result.pose.position(), DVec3::new(1.0, 2.0, 0.0));
}

#[test]
fn flagged_iteration_only_hits_parameter_nodes() {
    let mut tree = EvaluatorTree::new();
    tree.build(&sample_def(), &NodeRegistry::new()).unwrap();
    let mut hits = 0;
    let mut vars = crate::result::variables::VariableTable::new();
    let pose = crate::result::pose::CameraPose::default();
    tree.for_each_flagged(NodeFlags::NEEDS_PARAMETER_UPDATE, |node| {
        node.update_parameters(&params(), &pose, &mut vars);
        hits += 1;
    });
    assert_eq!(hits, 1);
    assert_eq!(vars.get_f64(VariableId(1)), Some(3.0));
}

#[test]
fn failed_build_leaves_tree_untouched() {
    let mut tree = EvaluatorTree::new();
    tree.build(&NodeDef::FieldOfView { degrees: 50.0 }, &NodeRegistry::new())
        .unwrap();
    let bad = NodeDef::Sequence(vec![
        NodeDef::FieldOfView { degrees: 10.0 },
        NodeDef::Custom {
            kind: "missing".to_string(),
            params: serde_json::Value::Null,
        },
    ]);
    let err = tree.build(&bad, &NodeRegistry::new()).unwrap_err();
    assert!(err.to_string().contains("unknown node kind 'missing'"));
    assert_eq!(tree.len(), 1);
}

#[test]
fn removed_subtrees_stop_running() {
    let mut tree = EvaluatorTree::new();
    let root = tree.build(&sample_def(), &NodeRegistry::new()).unwrap();
    tree.remove_subtree(root);
    assert!(tree.is_empty());

    let mut result = EvaluationResult::valid();
    tree.run_subtree(root, &params(), &mut result);
    assert_eq!(result.pose.position(), DVec3::ZERO);
}

#[test]
fn debug_lines_are_indented() {
    let mut tree = EvaluatorTree::new();
    let root = tree.build(&sample_def(), &NodeRegistry::new()).unwrap();
    let lines = tree.debug_lines(root);
    assert!(lines.iter().any(|l| l.starts_with("    offset")));
    assert!(lines.iter().any(|l| l.starts_with("  input")));
}
