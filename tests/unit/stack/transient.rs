use super::*;
use crate::animation::ease::Ease;
use crate::context::arena::EvaluationContext;
use crate::foundation::ids::{RigId, VariableId};
use crate::node::builtin::NodeDef;
use crate::result::variables::VariableValue;

fn stack() -> TransientBlendStack {
    TransientBlendStack::new(
        BlendStackConfig::transient("test"),
        Arc::new(NodeRegistry::new()),
    )
}

fn fov_rig(id: u32, degrees: f64) -> RigDescriptor {
    RigDescriptor::new(RigId(id), format!("rig{id}"), NodeDef::FieldOfView { degrees })
}

fn one_second_blend(name: &str) -> TransitionRule {
    TransitionRule::new(
        name,
        Some(BlendDef::Simple {
            duration_secs: 1.0,
            ease: Ease::Linear,
        }),
    )
}

fn tick(stack: &mut TransientBlendStack, contexts: &ContextArena, dt: f64) -> EvaluationResult {
    let mut out = EvaluationResult::new();
    stack.run(contexts, &FrameParams::new(dt), &mut out);
    out
}

#[test]
fn first_push_cuts_in() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let a = Arc::new(fov_rig(1, 60.0));

    assert_eq!(stack.push(&contexts, &a, ctx), PushOutcome::Pushed { index: 0 });
    let root = stack.core().entries()[0].root_evaluator().unwrap();
    assert_eq!(root.blend_evaluator().unwrap().debug_info(), "pop");

    let out = tick(&mut stack, &contexts, 0.016);
    assert!(out.is_valid);
    assert_eq!(out.pose.field_of_view(), 60.0);
}

#[test]
fn repeated_push_is_a_no_op() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let a = Arc::new(fov_rig(1, 60.0));

    stack.push(&contexts, &a, ctx);
    let id = stack.core().entries()[0].id();
    assert_eq!(stack.push(&contexts, &a, ctx), PushOutcome::AlreadyActive);
    assert_eq!(stack.core().len(), 1);
    assert_eq!(stack.core().entries()[0].id(), id);

    let other = contexts.insert(EvaluationContext::new("npc"));
    assert_eq!(stack.push(&contexts, &a, other), PushOutcome::Pushed { index: 1 });
}

#[test]
fn blended_push_trims_the_entry_below_once_complete() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let a = Arc::new(fov_rig(1, 60.0));
    let b = Arc::new(fov_rig(2, 100.0).with_enter_transition(one_second_blend("ease_in")));

    stack.push(&contexts, &a, ctx);
    tick(&mut stack, &contexts, 0.25);
    assert_eq!(stack.push(&contexts, &b, ctx), PushOutcome::Pushed { index: 1 });

    let out = tick(&mut stack, &contexts, 0.25);
    assert!((out.pose.field_of_view() - 70.0).abs() < 1e-9);
    assert_eq!(stack.core().len(), 2);

    tick(&mut stack, &contexts, 0.25);
    tick(&mut stack, &contexts, 0.25);
    assert_eq!(stack.core().len(), 2);

    let out = tick(&mut stack, &contexts, 0.25);
    assert_eq!(out.pose.field_of_view(), 100.0);
    assert_eq!(stack.core().len(), 1);
    assert_eq!(stack.core().entries()[0].rig().id(), RigId(2));
}

#[test]
fn variant_rigs_merge_when_the_transition_allows_it() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let a = Arc::new(
        fov_rig(1, 60.0)
            .with_merge_family("third_person")
            .with_exit_transition(one_second_blend("variant").allowing_merge()),
    );
    let b = Arc::new(fov_rig(2, 80.0).with_merge_family("third_person"));

    stack.push(&contexts, &a, ctx);
    let id = stack.core().entries()[0].id();
    assert_eq!(stack.push(&contexts, &b, ctx), PushOutcome::Merged);
    assert_eq!(stack.core().len(), 1);
    let top = &stack.core().entries()[0];
    assert_eq!(top.id(), id);
    assert_eq!(top.rig().id(), RigId(2));
    assert_eq!(top.root_evaluator().unwrap().layer_count(), 2);

    assert_eq!(stack.push(&contexts, &b, ctx), PushOutcome::AlreadyActive);

    let out = tick(&mut stack, &contexts, 0.5);
    assert!((out.pose.field_of_view() - 70.0).abs() < 1e-9);
}

#[test]
fn variant_rigs_stack_when_merging_is_not_allowed() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let a = Arc::new(
        fov_rig(1, 60.0)
            .with_merge_family("third_person")
            .with_exit_transition(one_second_blend("plain")),
    );
    let b = Arc::new(fov_rig(2, 80.0).with_merge_family("third_person"));

    stack.push(&contexts, &a, ctx);
    assert_eq!(stack.push(&contexts, &b, ctx), PushOutcome::Pushed { index: 1 });
}

#[test]
fn freeze_keeps_entries_in_place() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let npc = contexts.insert(EvaluationContext::new("npc"));
    let mut stack = stack();
    let a = Arc::new(fov_rig(1, 60.0));
    let b = Arc::new(fov_rig(2, 70.0).with_enter_transition(one_second_blend("slow")));

    stack.push(&contexts, &a, ctx);
    stack.push(&contexts, &b, npc);
    tick(&mut stack, &contexts, 0.1);

    assert_eq!(stack.freeze(&a, npc), 0);
    assert_eq!(stack.freeze(&a, ctx), 1);
    assert_eq!(stack.freeze(&a, ctx), 0);
    assert_eq!(stack.freeze_all(npc), 1);
    assert_eq!(stack.core().len(), 2);
    assert!(stack.core().entries().iter().all(|e| e.is_frozen()));
    assert!(stack.core().active_rig_info().is_none());
}

#[test]
fn frozen_results_are_left_untouched() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let a = Arc::new(fov_rig(1, 60.0));
    stack.push(&contexts, &a, ctx);
    tick(&mut stack, &contexts, 0.1);
    stack.freeze_all(ctx);
    let before = stack.core().entries()[0].result().clone();

    let out = tick(&mut stack, &contexts, 0.1);
    assert_eq!(stack.core().entries()[0].result(), &before);
    assert_eq!(out.pose.field_of_view(), 60.0);
}

#[test]
fn push_rejections() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();

    let broken = Arc::new(RigDescriptor::new(
        RigId(3),
        "broken",
        NodeDef::Custom {
            kind: "unregistered".to_string(),
            params: serde_json::Value::Null,
        },
    ));
    assert_eq!(stack.push(&contexts, &broken, ctx), PushOutcome::Rejected);

    contexts.remove(ctx);
    let a = Arc::new(fov_rig(1, 60.0));
    assert_eq!(stack.push(&contexts, &a, ctx), PushOutcome::Rejected);
    assert!(stack.core().is_empty());
}

#[test]
fn per_frame_flags_reset_after_run() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let rig = Arc::new(RigDescriptor::new(
        RigId(1),
        "with_input",
        NodeDef::InputValue {
            variable: VariableId(1),
            value: VariableValue::Float(2.0),
        },
    ));
    stack.push(&contexts, &rig, ctx);
    assert!(stack.core().entries()[0].flags().is_first_frame);

    let out = tick(&mut stack, &contexts, 0.1);
    assert_eq!(out.variables.get_f64(VariableId(1)), Some(2.0));

    let flags = stack.core().entries()[0].flags();
    assert!(!flags.is_first_frame);
    assert!(!flags.inputs_resolved_this_frame);
    assert!(!flags.blend_resolved_this_frame);
    assert!(!flags.force_camera_cut);
    assert!(flags.has_pre_blended_parameters);
}

#[test]
fn revalidated_context_forces_a_camera_cut() {
    let mut contexts = ContextArena::new();
    let ctx = contexts.insert(EvaluationContext::new("player"));
    let mut stack = stack();
    let a = Arc::new(fov_rig(1, 60.0));
    stack.push(&contexts, &a, ctx);
    tick(&mut stack, &contexts, 0.1);

    contexts.get_mut(ctx).unwrap().initial_result_mut().is_valid = false;
    let out = tick(&mut stack, &contexts, 0.1);
    assert!(!out.is_camera_cut);
    assert_eq!(out.pose.field_of_view(), 60.0);

    contexts.get_mut(ctx).unwrap().initial_result_mut().is_valid = true;
    let out = tick(&mut stack, &contexts, 0.1);
    assert!(out.is_camera_cut);

    let out = tick(&mut stack, &contexts, 0.1);
    assert!(!out.is_camera_cut);
}

#[test]
fn hitching_push_keeps_the_previous_rig_until_it_runs() {
    let mut contexts = ContextArena::new();
    let live = contexts.insert(EvaluationContext::new("player"));
    let late = contexts.insert(EvaluationContext::new("npc"));
    contexts.get_mut(late).unwrap().initial_result_mut().is_valid = false;
    let mut stack = stack();

    stack.push(&contexts, &Arc::new(fov_rig(1, 60.0)), live);
    tick(&mut stack, &contexts, 0.016);
    assert_eq!(
        stack.push(&contexts, &Arc::new(fov_rig(2, 100.0)), late),
        PushOutcome::Pushed { index: 1 }
    );

    let out = tick(&mut stack, &contexts, 0.016);
    assert!(out.is_valid);
    assert_eq!(out.pose.field_of_view(), 60.0);
    assert_eq!(stack.core().len(), 2);
    assert_eq!(stack.core().entries()[0].rig().id(), RigId(1));

    contexts.get_mut(late).unwrap().initial_result_mut().is_valid = true;
    let out = tick(&mut stack, &contexts, 0.016);
    assert!(out.is_valid);
    assert_eq!(out.pose.field_of_view(), 100.0);
    assert_eq!(stack.core().len(), 1);
    assert_eq!(stack.core().entries()[0].rig().id(), RigId(2));
}
