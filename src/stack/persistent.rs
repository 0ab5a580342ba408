use std::sync::Arc;

use crate::config::BlendStackConfig;
use crate::context::arena::{ContextArena, ContextHandle};
use crate::node::evaluator::NodeFlags;
use crate::node::registry::NodeRegistry;
use crate::result::evaluation::EvaluationResult;
use crate::result::variables::VariableFilter;
use crate::rig::descriptor::RigDescriptor;
use crate::stack::resolver::resolve_entries;
use crate::stack::{BlendStackCore, FrameParams, PushOutcome};

/// Always-on rigs layered additively in insertion order.
///
/// Nothing is ever trimmed; callers remove layers explicitly.
#[derive(Debug)]
pub struct PersistentBlendStack {
    core: BlendStackCore,
}

impl PersistentBlendStack {
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

    /// Add a layer for `rig`, unless a live one already runs it for `context`.
    pub fn insert(
        &mut self,
        contexts: &ContextArena,
        rig: &Arc<RigDescriptor>,
        context: ContextHandle,
    ) -> PushOutcome {
        if self.core.store.entries.iter().any(|e| e.matches(rig, context)) {
            return PushOutcome::AlreadyActive;
        }
        if !contexts.is_alive(context) {
            tracing::warn!(rig = %rig.name(), "ignoring insert for a dead evaluation context");
            return PushOutcome::Rejected;
        }

        let core = &mut self.core;
        match core
            .store
            .build_entry(&core.registry, contexts, rig, context, None)
        {
            Ok(entry) => PushOutcome::Pushed {
                index: core.store.push_entry(entry, None),
            },
            Err(err) => {
                tracing::error!(rig = %rig.name(), error = %err, "failed to build camera rig layer");
                PushOutcome::Rejected
            }
        }
    }

    /// Remove every layer, frozen or not, running `rig` for `context`. Returns how many went.
    pub fn remove(&mut self, rig: &RigDescriptor, context: ContextHandle) -> usize {
        let store = &mut self.core.store;
        let mut removed = 0;
        for index in (0..store.len()).rev() {
            let entry = &store.entries[index];
            if entry.rig.id() == rig.id() && entry.origin == context {
                store.pop_at(index);
                removed += 1;
            }
        }
        removed
    }

    /// Evaluate and composite every layer in order, one layer at a time.
    #[tracing::instrument(level = "trace", skip_all, fields(stack = %self.core.name()))]
    pub fn run(&mut self, contexts: &ContextArena, params: &FrameParams, out: &mut EvaluationResult) {
        let log_warnings = self.core.log_context_warnings();
        let store = &mut self.core.store;

        let resolved = resolve_entries(store, contexts, log_warnings);
        for view in &resolved {
            let entry = &mut store.entries[view.index];
            let ctx = view.context.and_then(|h| contexts.get(h));

            let (Some(ctx), Some(evaluators), false) =
                (ctx, entry.evaluators.as_mut(), view.stale)
            else {
                // Layers that never ran have nothing to offer yet.
                if entry.result.is_valid {
                    out.variables
                        .override_filtered(&entry.result.variables, VariableFilter::INPUT);
                    out.override_all(&entry.result, false);
                }
                continue;
            };
            let node_params = params.node_params(entry.flags.is_first_frame, Some(ctx));
            let initial = ctx.initial_result();

            entry.result.pose = out.pose.clone();
            entry.result.variables.override_all(&out.variables, true);
            entry.result.joints.override_all(&out.joints);
            entry.result.post_process.override_all(&out.post_process);
            entry.result.pose.override_changed(&initial.pose);
            entry.result.variables.override_filtered(
                &initial.variables,
                VariableFilter::ALL_PUBLIC | VariableFilter::PRIVATE,
            );
            entry.result.is_camera_cut =
                out.is_camera_cut || initial.is_camera_cut || entry.flags.force_camera_cut;
            entry.result.is_valid = true;

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

            match evaluators.root.blend_evaluator_mut() {
                Some(blend) => {
                    blend.run(&node_params, &mut entry.result);
                    blend.blend_parameters(&node_params, &entry.result.variables, &mut out.variables);
                }
                None => out
                    .variables
                    .override_filtered(&entry.result.variables, VariableFilter::INPUT),
            }

            evaluators
                .root
                .run_content(&mut evaluators.tree, &node_params, &mut entry.result);

            match evaluators.root.blend_evaluator_mut() {
                Some(blend) => {
                    blend.blend_results(&node_params, &entry.result, out);
                }
                None => out.override_all(&entry.result, false),
            }
        }

        store.end_frame();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stack/persistent.rs"]
mod tests;
