use smallvec::SmallVec;

use crate::foundation::error::CamStackResult;
use crate::foundation::ids::NodeHandle;
use crate::node::builtin::NodeDef;
use crate::node::evaluator::{InitializeParams, NodeEvaluator, NodeFlags, NodeParams};
use crate::node::registry::NodeRegistry;
use crate::result::evaluation::EvaluationResult;

#[derive(Debug)]
struct TreeSlot {
    evaluator: Box<dyn NodeEvaluator>,
    children: SmallVec<[NodeHandle; 4]>,
}

/// Arena of one entry's node evaluators, addressed by [`NodeHandle`].
///
/// Removed subtrees leave empty slots behind; handles are never reused within a tree.
#[derive(Debug, Default)]
pub struct EvaluatorTree {
    slots: Vec<Option<TreeSlot>>,
}

impl EvaluatorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live evaluators.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build `def` and its children. On failure the tree is left as it was.
    pub fn build(&mut self, def: &NodeDef, registry: &NodeRegistry) -> CamStackResult<NodeHandle> {
        let mark = self.slots.len();
        let built = self.build_node(def, registry);
        if built.is_err() {
            self.slots.truncate(mark);
        }
        built
    }

    fn build_node(&mut self, def: &NodeDef, registry: &NodeRegistry) -> CamStackResult<NodeHandle> {
        let evaluator = def.instantiate(registry)?;
        let handle = NodeHandle(self.slots.len() as u32);
        self.slots.push(Some(TreeSlot {
            evaluator,
            children: SmallVec::new(),
        }));
        for child_def in def.children() {
            let child = self.build_node(child_def, registry)?;
            if let Some(slot) = self.slots[handle.index()].as_mut() {
                slot.children.push(child);
            }
        }
        Ok(handle)
    }

    fn children_of(&self, handle: NodeHandle) -> SmallVec<[NodeHandle; 4]> {
        self.slots
            .get(handle.index())
            .and_then(Option::as_ref)
            .map(|slot| slot.children.clone())
            .unwrap_or_default()
    }

    pub fn initialize_subtree(
        &mut self,
        handle: NodeHandle,
        params: &InitializeParams<'_>,
        result: &mut EvaluationResult,
    ) {
        let Some(slot) = self.slots.get_mut(handle.index()).and_then(Option::as_mut) else {
            return;
        };
        slot.evaluator.initialize(params, result);
        for child in self.children_of(handle) {
            self.initialize_subtree(child, params, result);
        }
    }

    /// Run `handle` then its children, depth first.
    pub fn run_subtree(
        &mut self,
        handle: NodeHandle,
        params: &NodeParams<'_>,
        result: &mut EvaluationResult,
    ) {
        let Some(slot) = self.slots.get_mut(handle.index()).and_then(Option::as_mut) else {
            return;
        };
        slot.evaluator.run(params, result);
        for child in self.children_of(handle) {
            self.run_subtree(child, params, result);
        }
    }

    /// Visit every live evaluator carrying `flags`, in build order.
    pub fn for_each_flagged(&mut self, flags: NodeFlags, mut f: impl FnMut(&mut dyn NodeEvaluator)) {
        for slot in self.slots.iter_mut().flatten() {
            if slot.evaluator.flags().contains(flags) {
                f(slot.evaluator.as_mut());
            }
        }
    }

    pub fn remove_subtree(&mut self, handle: NodeHandle) {
        let Some(slot) = self.slots.get_mut(handle.index()).and_then(Option::take) else {
            return;
        };
        for child in slot.children {
            self.remove_subtree(child);
        }
    }

    /// Debug lines for the subtree at `handle`, indented by depth.
    pub fn debug_lines(&self, handle: NodeHandle) -> Vec<String> {
        let mut lines = Vec::new();
        self.push_debug_lines(handle, 0, &mut lines);
        lines
    }

    fn push_debug_lines(&self, handle: NodeHandle, depth: usize, lines: &mut Vec<String>) {
        let Some(slot) = self.slots.get(handle.index()).and_then(Option::as_ref) else {
            return;
        };
        if let Some(info) = slot.evaluator.debug_info() {
            lines.push(format!("{}{info}", "  ".repeat(depth)));
        }
        for child in &slot.children {
            self.push_debug_lines(*child, depth + 1, lines);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/tree.rs"]
mod tests;
