use std::sync::Arc;

use crate::context::arena::ContextHandle;
use crate::foundation::ids::EntryId;
use crate::node::root::StackRootEvaluator;
use crate::node::tree::EvaluatorTree;
use crate::result::evaluation::EvaluationResult;
use crate::rig::descriptor::RigDescriptor;

/// Per-entry bookkeeping. Everything but `is_frozen`, `log_warnings` and
/// `was_context_result_valid` is reset at the end of every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EntryFlags {
    pub is_first_frame: bool,
    pub inputs_resolved_this_frame: bool,
    pub blend_resolved_this_frame: bool,
    pub force_camera_cut: bool,
    pub is_frozen: bool,
    /// Armed while the entry resolves cleanly; cleared after a context warning is logged.
    pub log_warnings: bool,
    pub was_context_result_valid: bool,
    /// Some node computed pre-blend parameters during the last prepare pass.
    #[serde(default)]
    pub has_pre_blended_parameters: bool,
}

impl EntryFlags {
    pub(crate) fn fresh(context_result_valid: bool) -> Self {
        Self {
            is_first_frame: true,
            inputs_resolved_this_frame: false,
            blend_resolved_this_frame: false,
            force_camera_cut: false,
            is_frozen: false,
            log_warnings: true,
            was_context_result_valid: context_result_valid,
            has_pre_blended_parameters: false,
        }
    }

    pub(crate) fn end_frame(&mut self) {
        self.is_first_frame = false;
        self.inputs_resolved_this_frame = false;
        self.blend_resolved_this_frame = false;
        self.force_camera_cut = false;
    }
}

#[derive(Debug)]
pub(crate) struct EntryEvaluators {
    pub(crate) tree: EvaluatorTree,
    pub(crate) root: StackRootEvaluator,
}

/// One rig instance living in a blend stack.
#[derive(Debug)]
pub struct StackEntry {
    pub(crate) id: EntryId,
    pub(crate) rig: Arc<RigDescriptor>,
    /// Context the entry was pushed for. Kept after freezing so the entry can still be matched.
    pub(crate) origin: ContextHandle,
    /// Live link to the context; `None` once frozen.
    pub(crate) context: Option<ContextHandle>,
    pub(crate) evaluators: Option<EntryEvaluators>,
    pub(crate) result: EvaluationResult,
    pub(crate) flags: EntryFlags,
}

impl StackEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn rig(&self) -> &Arc<RigDescriptor> {
        &self.rig
    }

    pub fn origin(&self) -> ContextHandle {
        self.origin
    }

    pub fn context(&self) -> Option<ContextHandle> {
        self.context
    }

    pub fn result(&self) -> &EvaluationResult {
        &self.result
    }

    pub fn flags(&self) -> EntryFlags {
        self.flags
    }

    pub fn is_frozen(&self) -> bool {
        self.flags.is_frozen
    }

    pub fn root_evaluator(&self) -> Option<&StackRootEvaluator> {
        self.evaluators.as_ref().map(|e| &e.root)
    }

    /// Live, non-frozen entry for this rig and context.
    pub(crate) fn matches(&self, rig: &RigDescriptor, context: ContextHandle) -> bool {
        !self.flags.is_frozen && self.rig.id() == rig.id() && self.origin == context
    }

    /// Drop the evaluators and the context link. The last result stays.
    pub(crate) fn freeze(&mut self) {
        self.evaluators = None;
        self.context = None;
        self.flags.is_frozen = true;
    }
}
