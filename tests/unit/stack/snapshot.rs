use std::sync::Arc;

use super::*;
use crate::config::BlendStackConfig;
use crate::context::arena::{ContextArena, EvaluationContext};
use crate::node::builtin::NodeDef;
use crate::node::registry::NodeRegistry;
use crate::rig::descriptor::RigDescriptor;
use crate::stack::{FrameParams, TransientBlendStack};

fn rig(id: u32, degrees: f64) -> Arc<RigDescriptor> {
    Arc::new(RigDescriptor::new(
        RigId(id),
        format!("rig{id}"),
        NodeDef::FieldOfView { degrees },
    ))
}

fn two_entry_stack(contexts: &mut ContextArena) -> TransientBlendStack {
    let player = contexts.insert(EvaluationContext::new("player"));
    let npc = contexts.insert(EvaluationContext::new("npc"));
    let mut stack = TransientBlendStack::new(
        BlendStackConfig::transient("snap"),
        Arc::new(NodeRegistry::new()),
    );
    stack.push(contexts, &rig(1, 60.0), player);
    stack.push(contexts, &rig(2, 70.0), npc);
    stack.run(contexts, &FrameParams::new(0.5), &mut EvaluationResult::new());
    stack
}

#[test]
fn capture_survives_json_and_restores() {
    let mut contexts = ContextArena::new();
    let mut stack = two_entry_stack(&mut contexts);
    let snapshot = BlendStackSnapshot::capture(stack.core());
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.entries[1].result.pose.field_of_view(), 70.0);

    let json = snapshot.to_json().unwrap();
    let loaded = BlendStackSnapshot::from_json(&json).unwrap();
    for (saved, original) in loaded.entries.iter().zip(&snapshot.entries) {
        assert_eq!(saved.rig, original.rig);
        assert_eq!(saved.flags, original.flags);
        assert_eq!(saved.result.pose.field_of_view(), original.result.pose.field_of_view());
    }

    stack.run(&contexts, &FrameParams::new(0.5), &mut EvaluationResult::new());
    loaded.apply(stack.core_mut()).unwrap();
    assert_eq!(stack.core().entries()[0].flags(), loaded.entries[0].flags);
    assert_eq!(stack.core().entries()[1].result(), &loaded.entries[1].result);
}

#[test]
fn frozen_state_is_restored() {
    let mut contexts = ContextArena::new();
    let mut stack = two_entry_stack(&mut contexts);
    let mut snapshot = BlendStackSnapshot::capture(stack.core());
    snapshot.entries[0].flags.is_frozen = true;

    snapshot.apply(stack.core_mut()).unwrap();
    let entry = &stack.core().entries()[0];
    assert!(entry.is_frozen());
    assert!(entry.context().is_none());
    assert!(entry.root_evaluator().is_none());
}

#[test]
fn mismatched_snapshots_change_nothing() {
    let mut contexts = ContextArena::new();
    let mut stack = two_entry_stack(&mut contexts);
    let good = BlendStackSnapshot::capture(stack.core());

    let mut short = good.clone();
    short.entries.pop();
    let err = short.apply(stack.core_mut()).unwrap_err();
    assert!(err.to_string().contains("1 entries but the stack has 2"));

    let mut wrong_rig = good.clone();
    wrong_rig.entries[1].rig = RigId(9);
    wrong_rig.entries[0].flags.is_frozen = true;
    assert!(matches!(
        wrong_rig.apply(stack.core_mut()),
        Err(CamStackError::Validation(_))
    ));
    assert!(!stack.core().entries()[0].is_frozen());

    let npc = stack.core().entries()[1].origin();
    stack.freeze_all(npc);
    let err = good.apply(stack.core_mut()).unwrap_err();
    assert!(err.to_string().contains("entry 1 is live"));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = BlendStackSnapshot::from_json("{\"entries\": 3}").unwrap_err();
    assert!(matches!(err, CamStackError::Serde(_)));
}
