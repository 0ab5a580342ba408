use super::*;
use crate::foundation::ids::VariableId;
use crate::result::variables::{VariableDefinition, VariableValue};

fn rig(id: u32) -> Arc<RigDescriptor> {
    Arc::new(
        RigDescriptor::new(RigId(id), format!("rig{id}"), NodeDef::FieldOfView { degrees: 60.0 })
            .with_allocation(VariableAllocation {
                definitions: vec![VariableDefinition {
                    id: VariableId(id),
                    name: format!("v{id}"),
                    default_value: VariableValue::Float(0.0),
                    private: false,
                    input: true,
                }],
            }),
    )
}

#[test]
fn plain_rig_expands_to_itself() {
    let r = rig(1);
    let expanded = expand_combination(&r);
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].id(), RigId(1));
    assert!(!r.is_combination());
}

#[test]
fn nested_combinations_flatten_in_order() {
    let inner = Arc::new(RigDescriptor::combination(
        RigId(10),
        "inner",
        vec![rig(1), rig(2)],
    ));
    let outer = Arc::new(RigDescriptor::combination(
        RigId(11),
        "outer",
        vec![inner, rig(3)],
    ));
    let ids: Vec<_> = expand_combination(&outer).iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![RigId(1), RigId(2), RigId(3)]);
}

#[test]
fn combination_unions_allocations_and_sequences_roots() {
    let combo = RigDescriptor::combination(RigId(5), "combo", vec![rig(1), rig(2), rig(1)]);
    assert_eq!(combo.allocation().definitions.len(), 2);
    match combo.root() {
        NodeDef::Sequence(children) => assert_eq!(children.len(), 3),
        other => panic!("unexpected root {other:?}"),
    }
}
