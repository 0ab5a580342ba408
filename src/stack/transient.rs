use std::sync::Arc;

use crate::config::BlendStackConfig;
use crate::context::arena::{ContextArena, ContextHandle};
use crate::node::blend::BlendDef;
use crate::node::evaluator::{InitializeParams, LastActiveRig, NodeFlags};
use crate::node::registry::NodeRegistry;
use crate::node::root::EntryComparison;
use crate::result::evaluation::EvaluationResult;
use crate::result::variables::VariableFilter;
use crate::rig::descriptor::RigDescriptor;
use crate::rig::transition::TransitionRule;
use crate::stack::resolver::{ResolvedEntry, resolve_entries};
use crate::stack::store::EntryStore;
use crate::stack::transition_finder::find_transition;
use crate::stack::{BlendStackCore, FrameParams, PushOutcome};

/// LIFO stack for whatever currently commands the camera.
///
/// The newest entry is on top. Once an entry reports its blend full and finished, every entry
/// below it is popped at the end of the frame.
#[derive(Debug)]
pub struct TransientBlendStack {
    core: BlendStackCore,
}

impl TransientBlendStack {
    pub fn new(config: BlendStackConfig, registry: Arc<NodeRegistry>) -> Self {
        Self {
            core: BlendStackCore::new(config, registry),
        }
    }

    pub fn core(&self) -> &BlendStackCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut BlendStackCore {
        &mut self.core
    }

    /// Make `rig` the active rig for `context`.
    ///
    /// Pushing what already runs on top for the same context is a no-op. A variant of the top
    /// rig is merged into the top entry when the matching transition allows it. Otherwise a new
    /// entry is pushed, blended in by the matching transition or cut in when none matches.
    pub fn push(
        &mut self,
        contexts: &ContextArena,
        rig: &Arc<RigDescriptor>,
        context: ContextHandle,
    ) -> PushOutcome {
        if !contexts.is_alive(context) {
            tracing::warn!(rig = %rig.name(), "ignoring push for a dead evaluation context");
            return PushOutcome::Rejected;
        }

        let mut transition = None;
        let mut searched = false;

        if let Some(top) = self.core.store.entries.last()
            && !top.is_frozen()
            && top.origin == context
        {
            if top.rig.id() == rig.id() {
                return PushOutcome::AlreadyActive;
            }
            let comparison = top
                .root_evaluator()
                .map_or(EntryComparison::Different, |root| root.compare(rig));
            match comparison {
                EntryComparison::Active => return PushOutcome::AlreadyActive,
                EntryComparison::EligibleForMerge => {
                    searched = true;
                    transition = find_transition(&self.core.store, contexts, rig, context);
                    if let Some(rule) = transition.clone().filter(|r| r.allow_rig_merging) {
                        return self.merge_into_top(contexts, rig, context, &rule);
                    }
                }
                EntryComparison::Different => {}
            }
        }

        if !searched {
            transition = find_transition(&self.core.store, contexts, rig, context);
        }
        self.push_new_entry(contexts, rig, context, transition.as_deref())
    }

    fn push_new_entry(
        &mut self,
        contexts: &ContextArena,
        rig: &Arc<RigDescriptor>,
        context: ContextHandle,
        transition: Option<&TransitionRule>,
    ) -> PushOutcome {
        let blend = transition
            .and_then(|t| t.blend.as_ref())
            .unwrap_or(&BlendDef::Pop);
        let core = &mut self.core;
        match core
            .store
            .build_entry(&core.registry, contexts, rig, context, Some(blend))
        {
            Ok(entry) => PushOutcome::Pushed {
                index: core.store.push_entry(entry, transition),
            },
            Err(err) => {
                tracing::error!(rig = %rig.name(), error = %err, "failed to build camera rig entry");
                PushOutcome::Rejected
            }
        }
    }

    fn merge_into_top(
        &mut self,
        contexts: &ContextArena,
        rig: &Arc<RigDescriptor>,
        context: ContextHandle,
        rule: &TransitionRule,
    ) -> PushOutcome {
        let core = &mut self.core;
        let Some(ctx) = contexts.get(context) else {
            return PushOutcome::Rejected;
        };
        let Some(top) = core.store.entries.last_mut() else {
            return PushOutcome::Rejected;
        };
        let Some(evaluators) = top.evaluators.as_mut() else {
            return PushOutcome::Rejected;
        };

        let previous_rig = Arc::clone(&top.rig);
        let previous_result = top.result.clone();
        let params = InitializeParams {
            context: Some(ctx),
            last_active: Some(LastActiveRig {
                rig: &previous_rig,
                result: &previous_result,
            }),
        };
        if let Err(err) = evaluators.root.merge_rig(
            &mut evaluators.tree,
            &core.registry,
            rig,
            rule.blend.as_ref(),
            &params,
            &mut top.result,
        ) {
            tracing::error!(rig = %rig.name(), error = %err, "failed to merge camera rig");
            return PushOutcome::Rejected;
        }

        top.result.variables.allocate_missing(rig.allocation());
        top.rig = Arc::clone(rig);
        tracing::debug!(from = %previous_rig.name(), to = %rig.name(), rule = %rule.name, "merged camera rig");
        PushOutcome::Merged
    }

    /// Freeze live entries running `rig` for `context`. They keep blending their last result.
    pub fn freeze(&mut self, rig: &RigDescriptor, context: ContextHandle) -> usize {
        self.core.store.freeze_where(|e| e.matches(rig, context))
    }

    /// Freeze every live entry pushed for `context`.
    pub fn freeze_all(&mut self, context: ContextHandle) -> usize {
        self.core.store.freeze_where(|e| e.origin == context)
    }

    /// Evaluate one frame and composite every entry into `out`.
    ///
    /// `out` is this frame's aggregate: callers hand in a reset result, or one seeded by
    /// whatever runs before this stack.
    #[tracing::instrument(level = "trace", skip_all, fields(stack = %self.core.name()))]
    pub fn run(&mut self, contexts: &ContextArena, params: &FrameParams, out: &mut EvaluationResult) {
        let log_warnings = self.core.log_context_warnings();
        let store = &mut self.core.store;

        let resolved = resolve_entries(store, contexts, log_warnings);
        pre_blend_prepare(store, &resolved, contexts, params, out);
        pre_blend_execute(store, &resolved, contexts, params, out);
        update(store, &resolved, contexts, params, out);
        if let Some(cutoff) = post_blend_execute(store, &resolved, contexts, params, out) {
            if cutoff > 0 {
                tracing::trace!(cutoff, entries = store.len(), "trimming blended-out entries");
            }
            store.pop_below(cutoff);
        }

        store.end_frame();
    }
}

/// Seed input variables, gather pre-blend parameters and advance blends.
///
/// Blends run against last frame's pose.
fn pre_blend_prepare(
    store: &mut EntryStore,
    resolved: &[ResolvedEntry],
    contexts: &ContextArena,
    params: &FrameParams,
    out: &EvaluationResult,
) {
    for view in resolved.iter().filter(|v| v.is_updatable()) {
        let entry = &mut store.entries[view.index];
        let Some(ctx) = view.context.and_then(|h| contexts.get(h)) else {
            continue;
        };
        let Some(evaluators) = entry.evaluators.as_mut() else {
            continue;
        };
        let node_params = params.node_params(entry.flags.is_first_frame, Some(ctx));

        entry.result.variables.override_all(&out.variables, true);
        entry.result.variables.override_filtered(
            &ctx.initial_result().variables,
            VariableFilter::ALL_PUBLIC | VariableFilter::PRIVATE,
        );

        if !entry.flags.inputs_resolved_this_frame {
            let pose = &entry.result.pose;
            let variables = &mut entry.result.variables;
            let mut any = false;
            evaluators
                .tree
                .for_each_flagged(NodeFlags::NEEDS_PARAMETER_UPDATE, |node| {
                    node.update_parameters(&node_params, pose, variables);
                    any = true;
                });
            entry.flags.has_pre_blended_parameters = any;
            entry.flags.inputs_resolved_this_frame = true;
        }

        if !entry.flags.blend_resolved_this_frame {
            if let Some(blend) = evaluators.root.blend_evaluator_mut() {
                blend.run(&node_params, &mut entry.result);
            }
            entry.flags.blend_resolved_this_frame = true;
        }
    }
}

/// Mix every entry's input variables into the aggregate table.
fn pre_blend_execute(
    store: &mut EntryStore,
    resolved: &[ResolvedEntry],
    contexts: &ContextArena,
    params: &FrameParams,
    out: &mut EvaluationResult,
) {
    for view in resolved {
        let entry = &mut store.entries[view.index];
        if !view.has_result(entry) {
            continue;
        }
        let ctx = view.context.and_then(|h| contexts.get(h));
        let node_params = params.node_params(entry.flags.is_first_frame, ctx);

        let blend = entry
            .evaluators
            .as_mut()
            .and_then(|e| e.root.blend_evaluator_mut());
        match blend {
            Some(blend) => {
                blend.blend_parameters(&node_params, &entry.result.variables, &mut out.variables)
            }
            None => out
                .variables
                .override_filtered(&entry.result.variables, VariableFilter::INPUT),
        }
    }
}

/// Run each live entry's content on top of the aggregate and its context's overrides.
fn update(
    store: &mut EntryStore,
    resolved: &[ResolvedEntry],
    contexts: &ContextArena,
    params: &FrameParams,
    out: &EvaluationResult,
) {
    for view in resolved.iter().filter(|v| v.is_updatable()) {
        let entry = &mut store.entries[view.index];
        let Some(ctx) = view.context.and_then(|h| contexts.get(h)) else {
            continue;
        };
        let Some(evaluators) = entry.evaluators.as_mut() else {
            continue;
        };
        let node_params = params.node_params(entry.flags.is_first_frame, Some(ctx));
        let initial = ctx.initial_result();

        entry.result.pose = out.pose.clone();
        entry.result.joints.override_all(&out.joints);
        entry.result.post_process.override_all(&out.post_process);
        entry.result.pose.override_changed(&initial.pose);
        entry.result.is_camera_cut =
            out.is_camera_cut || initial.is_camera_cut || entry.flags.force_camera_cut;
        entry.result.is_valid = true;

        evaluators
            .root
            .run_content(&mut evaluators.tree, &node_params, &mut entry.result);
    }
}

/// Composite results bottom to top. Returns the highest index that fully covers what is below.
///
/// Hitching entries still blend what they produced before but never cover what is below.
fn post_blend_execute(
    store: &mut EntryStore,
    resolved: &[ResolvedEntry],
    contexts: &ContextArena,
    params: &FrameParams,
    out: &mut EvaluationResult,
) -> Option<usize> {
    let mut cutoff = None;
    for view in resolved {
        let entry = &mut store.entries[view.index];
        if !view.has_result(entry) {
            continue;
        }
        let ctx = view.context.and_then(|h| contexts.get(h));
        let node_params = params.node_params(entry.flags.is_first_frame, ctx);

        let blend = entry
            .evaluators
            .as_mut()
            .and_then(|e| e.root.blend_evaluator_mut());
        let complete = match blend {
            Some(blend) => blend
                .blend_results(&node_params, &entry.result, out)
                .is_complete(),
            None => {
                out.override_all(&entry.result, false);
                true
            }
        };
        if complete && !view.stale {
            cutoff = Some(view.index);
        }
    }
    cutoff
}

#[cfg(test)]
#[path = "../../tests/unit/stack/transient.rs"]
mod tests;
