use std::sync::Arc;

use crate::context::arena::{ContextArena, ContextHandle};
use crate::foundation::error::CamStackResult;
use crate::foundation::ids::EntryId;
use crate::node::blend::BlendDef;
use crate::node::evaluator::{InitializeParams, LastActiveRig};
use crate::node::registry::NodeRegistry;
use crate::node::root::StackRootEvaluator;
use crate::node::tree::EvaluatorTree;
use crate::result::evaluation::EvaluationResult;
use crate::rig::descriptor::RigDescriptor;
use crate::rig::transition::TransitionRule;
use crate::stack::entry::{EntryEvaluators, EntryFlags, StackEntry};
use crate::stack::events::{BlendStackEvent, BlendStackEventKind, EventSink};

/// What is running right now, as reported to outside callers.
#[derive(Clone, Copy, Debug)]
pub struct RigEvaluationInfo<'a> {
    pub entry: EntryId,
    pub rig: &'a Arc<RigDescriptor>,
    pub context: Option<ContextHandle>,
    pub result: &'a EvaluationResult,
    pub root: Option<&'a StackRootEvaluator>,
}

/// Ordered entries, bottom (oldest) first, plus the listeners told about every push and pop.
#[derive(Debug, Default)]
pub(crate) struct EntryStore {
    pub(crate) entries: Vec<StackEntry>,
    pub(crate) events: EventSink,
    next_id: u64,
}

impl EntryStore {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Build and initialize an entry for `rig`, without adding it.
    pub(crate) fn build_entry(
        &mut self,
        registry: &NodeRegistry,
        contexts: &ContextArena,
        rig: &Arc<RigDescriptor>,
        context: ContextHandle,
        blend: Option<&BlendDef>,
    ) -> CamStackResult<StackEntry> {
        let ctx = contexts.try_get(context)?;

        let mut tree = EvaluatorTree::new();
        let mut root = StackRootEvaluator::build(&mut tree, registry, rig, blend)?;

        let mut result = EvaluationResult::new();
        result.variables.initialize(rig.allocation());

        let last_active = self.active_index().map(|index| {
            let active = &self.entries[index];
            LastActiveRig {
                rig: &active.rig,
                result: &active.result,
            }
        });
        let params = InitializeParams {
            context: Some(ctx),
            last_active,
        };
        root.initialize(&mut tree, &params, &mut result);

        let id = EntryId(self.next_id);
        self.next_id += 1;
        Ok(StackEntry {
            id,
            rig: Arc::clone(rig),
            origin: context,
            context: Some(context),
            evaluators: Some(EntryEvaluators { tree, root }),
            result,
            flags: EntryFlags::fresh(ctx.initial_result().is_valid),
        })
    }

    /// Append `entry` on top and announce it. Returns its index.
    pub(crate) fn push_entry(&mut self, entry: StackEntry, transition: Option<&TransitionRule>) -> usize {
        tracing::debug!(rig = %entry.rig.name(), index = self.entries.len(), "pushed entry");
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        let event = BlendStackEvent {
            kind: BlendStackEventKind::Pushed,
            entry: &self.entries[index],
            transition,
        };
        self.events.broadcast(&event);
        index
    }

    pub(crate) fn pop_at(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        let entry = self.entries.remove(index);
        tracing::debug!(rig = %entry.rig.name(), index, "popped entry");
        self.events.broadcast(&BlendStackEvent {
            kind: BlendStackEventKind::Popped,
            entry: &entry,
            transition: None,
        });
    }

    /// Pop the bottom `first_to_keep` entries, oldest first.
    pub(crate) fn pop_below(&mut self, first_to_keep: usize) {
        for _ in 0..first_to_keep.min(self.entries.len()) {
            self.pop_at(0);
        }
    }

    /// Freeze every entry `pred` selects. Returns how many were frozen.
    pub(crate) fn freeze_where(&mut self, mut pred: impl FnMut(&StackEntry) -> bool) -> usize {
        let mut frozen = 0;
        for entry in self.entries.iter_mut().filter(|e| !e.flags.is_frozen) {
            if pred(entry) {
                tracing::debug!(rig = %entry.rig.name(), "froze entry");
                entry.freeze();
                frozen += 1;
            }
        }
        frozen
    }

    /// Topmost entry that is not frozen.
    pub(crate) fn active_index(&self) -> Option<usize> {
        self.entries.iter().rposition(|e| !e.flags.is_frozen)
    }

    pub(crate) fn active_rig_info(&self) -> Option<RigEvaluationInfo<'_>> {
        let entry = &self.entries[self.active_index()?];
        Some(RigEvaluationInfo {
            entry: entry.id,
            rig: &entry.rig,
            context: entry.context,
            result: &entry.result,
            root: entry.root_evaluator(),
        })
    }

    pub(crate) fn end_frame(&mut self) {
        for entry in &mut self.entries {
            entry.flags.end_frame();
        }
    }
}
