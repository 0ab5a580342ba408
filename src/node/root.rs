use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::error::CamStackResult;
use crate::foundation::ids::{NodeHandle, RigId};
use crate::node::blend::{BlendDef, BlendEvaluator};
use crate::node::evaluator::{InitializeParams, NodeParams};
use crate::node::registry::NodeRegistry;
use crate::node::tree::EvaluatorTree;
use crate::result::evaluation::EvaluationResult;
use crate::rig::descriptor::RigDescriptor;

/// How a requested rig relates to what an entry is already running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryComparison {
    /// The entry already runs this rig.
    Active,
    /// The rig is a variant of the running one and may be merged into the entry.
    EligibleForMerge,
    Different,
}

#[derive(Debug)]
struct ContentLayer {
    rig: RigId,
    content: NodeHandle,
    /// Blends this layer over the layers below it. The base layer has none.
    blend: Option<Box<dyn BlendEvaluator>>,
}

/// Root of one stack entry: the blend used to bring the entry in, plus its content.
///
/// Content is a list of layers. A fresh entry has exactly one; merging a variant rig adds a
/// layer blended over the previous ones, and layers are collapsed once the newest is fully in.
#[derive(Debug)]
pub struct StackRootEvaluator {
    blend: Option<Box<dyn BlendEvaluator>>,
    layers: SmallVec<[ContentLayer; 2]>,
    merge_family: Option<String>,
}

impl StackRootEvaluator {
    /// Build `rig`'s content into `tree`, wrapped by `blend` when given.
    pub fn build(
        tree: &mut EvaluatorTree,
        registry: &NodeRegistry,
        rig: &Arc<RigDescriptor>,
        blend: Option<&BlendDef>,
    ) -> CamStackResult<Self> {
        let content = tree.build(rig.root(), registry)?;
        let mut layers = SmallVec::new();
        layers.push(ContentLayer {
            rig: rig.id(),
            content,
            blend: None,
        });
        Ok(Self {
            blend: blend.map(BlendDef::build),
            layers,
            merge_family: rig.merge_family().map(str::to_owned),
        })
    }

    pub fn blend_evaluator(&self) -> Option<&dyn BlendEvaluator> {
        self.blend.as_deref()
    }

    pub fn blend_evaluator_mut(&mut self) -> Option<&mut (dyn BlendEvaluator + 'static)> {
        self.blend.as_deref_mut()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn compare(&self, rig: &RigDescriptor) -> EntryComparison {
        if self.layers.last().is_some_and(|l| l.rig == rig.id()) {
            return EntryComparison::Active;
        }
        match (self.merge_family.as_deref(), rig.merge_family()) {
            (Some(ours), Some(theirs)) if ours == theirs => EntryComparison::EligibleForMerge,
            _ => EntryComparison::Different,
        }
    }

    pub fn initialize(
        &mut self,
        tree: &mut EvaluatorTree,
        params: &InitializeParams<'_>,
        result: &mut EvaluationResult,
    ) {
        if let Some(blend) = self.blend.as_mut() {
            blend.initialize(params);
        }
        for layer in &self.layers {
            tree.initialize_subtree(layer.content, params, result);
        }
    }

    /// Add `rig`'s content as a new layer blended in by `blend` (an instant cut when `None`).
    pub fn merge_rig(
        &mut self,
        tree: &mut EvaluatorTree,
        registry: &NodeRegistry,
        rig: &Arc<RigDescriptor>,
        blend: Option<&BlendDef>,
        params: &InitializeParams<'_>,
        result: &mut EvaluationResult,
    ) -> CamStackResult<()> {
        let content = tree.build(rig.root(), registry)?;
        tree.initialize_subtree(content, params, result);

        let mut blend = blend.unwrap_or(&BlendDef::Pop).build();
        blend.initialize(params);
        self.layers.push(ContentLayer {
            rig: rig.id(),
            content,
            blend: Some(blend),
        });
        self.merge_family = rig.merge_family().map(str::to_owned);
        Ok(())
    }

    /// Run every content layer into `result`, which arrives seeded for this frame.
    pub fn run_content(
        &mut self,
        tree: &mut EvaluatorTree,
        params: &NodeParams<'_>,
        result: &mut EvaluationResult,
    ) {
        if let [only] = self.layers.as_slice() {
            tree.run_subtree(only.content, params, result);
            return;
        }

        let seed = result.clone();
        let mut keep_from = 0;
        for (index, layer) in self.layers.iter_mut().enumerate() {
            let mut layer_result = seed.clone();
            tree.run_subtree(layer.content, params, &mut layer_result);

            match layer.blend.as_mut() {
                Some(blend) if index > 0 => {
                    blend.run(params, &mut layer_result);
                    if blend.blend_results(params, &layer_result, result).is_complete() {
                        keep_from = index;
                    }
                }
                _ => *result = layer_result,
            }
        }

        if keep_from > 0 {
            for layer in self.layers.drain(..keep_from) {
                tree.remove_subtree(layer.content);
            }
            if let Some(base) = self.layers.first_mut() {
                base.blend = None;
            }
        }
    }

    pub fn debug_lines(&self, tree: &EvaluatorTree) -> Vec<String> {
        let mut lines = Vec::new();
        for (index, layer) in self.layers.iter().enumerate() {
            match &layer.blend {
                Some(blend) => lines.push(format!("layer {index} {:?} [{}]", layer.rig, blend.debug_info())),
                None => lines.push(format!("layer {index} {:?}", layer.rig)),
            }
            lines.extend(tree.debug_lines(layer.content).into_iter().map(|l| format!("  {l}")));
        }
        lines
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/root.rs"]
mod tests;
