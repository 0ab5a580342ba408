use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::ids::{AssetId, RigId};
use crate::node::builtin::NodeDef;
use crate::result::variables::VariableAllocation;
use crate::rig::transition::TransitionRule;

/// Read-only description of a rig: its node graph, variable needs and transition rules.
///
/// Shared between stack entries through `Arc`; entries never mutate it.
#[derive(Clone, Debug)]
pub struct RigDescriptor {
    id: RigId,
    name: String,
    root: NodeDef,
    allocation: VariableAllocation,
    enter_transitions: Vec<Arc<TransitionRule>>,
    exit_transitions: Vec<Arc<TransitionRule>>,
    merge_family: Option<String>,
    combination: Vec<Arc<RigDescriptor>>,
}

impl RigDescriptor {
    pub fn new(id: RigId, name: impl Into<String>, root: NodeDef) -> Self {
        Self {
            id,
            name: name.into(),
            root,
            allocation: VariableAllocation::default(),
            enter_transitions: Vec::new(),
            exit_transitions: Vec::new(),
            merge_family: None,
            combination: Vec::new(),
        }
    }

    /// A rig bundling several rigs in one stack slot. Its node graph runs every constituent in
    /// order and its variable allocation is the union of theirs.
    pub fn combination(id: RigId, name: impl Into<String>, rigs: Vec<Arc<RigDescriptor>>) -> Self {
        let root = NodeDef::Sequence(rigs.iter().map(|r| r.root.clone()).collect());
        let mut allocation = VariableAllocation::default();
        for rig in &rigs {
            for def in &rig.allocation.definitions {
                if !allocation.definitions.iter().any(|d| d.id == def.id) {
                    allocation.definitions.push(def.clone());
                }
            }
        }
        Self {
            allocation,
            combination: rigs,
            ..Self::new(id, name, root)
        }
    }

    pub fn with_allocation(mut self, allocation: VariableAllocation) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_enter_transition(mut self, rule: TransitionRule) -> Self {
        self.enter_transitions.push(Arc::new(rule));
        self
    }

    pub fn with_exit_transition(mut self, rule: TransitionRule) -> Self {
        self.exit_transitions.push(Arc::new(rule));
        self
    }

    /// Rigs of the same family are variants of one prefab and may share a stack slot.
    pub fn with_merge_family(mut self, family: impl Into<String>) -> Self {
        self.merge_family = Some(family.into());
        self
    }

    pub fn id(&self) -> RigId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &NodeDef {
        &self.root
    }

    pub fn allocation(&self) -> &VariableAllocation {
        &self.allocation
    }

    pub fn enter_transitions(&self) -> &[Arc<TransitionRule>] {
        &self.enter_transitions
    }

    pub fn exit_transitions(&self) -> &[Arc<TransitionRule>] {
        &self.exit_transitions
    }

    pub fn merge_family(&self) -> Option<&str> {
        self.merge_family.as_deref()
    }

    pub fn is_combination(&self) -> bool {
        !self.combination.is_empty()
    }
}

/// Flatten a rig into the rigs it combines, recursively. A plain rig expands to itself.
pub fn expand_combination(rig: &Arc<RigDescriptor>) -> SmallVec<[Arc<RigDescriptor>; 4]> {
    let mut out = SmallVec::new();
    push_combined(rig, &mut out);
    out
}

fn push_combined(rig: &Arc<RigDescriptor>, out: &mut SmallVec<[Arc<RigDescriptor>; 4]>) {
    if rig.combination.is_empty() {
        out.push(Arc::clone(rig));
        return;
    }
    for inner in &rig.combination {
        push_combined(inner, out);
    }
}

/// Asset owning a set of rigs; its transitions are the fallback when rigs declare none that
/// match.
#[derive(Clone, Debug)]
pub struct CameraAsset {
    id: AssetId,
    name: String,
    enter_transitions: Vec<Arc<TransitionRule>>,
    exit_transitions: Vec<Arc<TransitionRule>>,
}

impl CameraAsset {
    pub fn new(id: AssetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enter_transitions: Vec::new(),
            exit_transitions: Vec::new(),
        }
    }

    pub fn with_enter_transition(mut self, rule: TransitionRule) -> Self {
        self.enter_transitions.push(Arc::new(rule));
        self
    }

    pub fn with_exit_transition(mut self, rule: TransitionRule) -> Self {
        self.exit_transitions.push(Arc::new(rule));
        self
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enter_transitions(&self) -> &[Arc<TransitionRule>] {
        &self.enter_transitions
    }

    pub fn exit_transitions(&self) -> &[Arc<TransitionRule>] {
        &self.exit_transitions
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/descriptor.rs"]
mod tests;
