use std::sync::Arc;

use crate::foundation::error::{CamStackError, CamStackResult};
use crate::result::evaluation::EvaluationResult;
use crate::rig::descriptor::CameraAsset;

/// External owner that requests rigs and supplies the baseline they layer on top of.
#[derive(Clone, Debug)]
pub struct EvaluationContext {
    name: String,
    camera_asset: Option<Arc<CameraAsset>>,
    initial_result: EvaluationResult,
}

impl EvaluationContext {
    /// A context whose initial result is valid from the start.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            camera_asset: None,
            initial_result: EvaluationResult::valid(),
        }
    }

    pub fn with_camera_asset(mut self, asset: Arc<CameraAsset>) -> Self {
        self.camera_asset = Some(asset);
        self
    }

    pub fn with_initial_result(mut self, result: EvaluationResult) -> Self {
        self.initial_result = result;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera_asset(&self) -> Option<&Arc<CameraAsset>> {
        self.camera_asset.as_ref()
    }

    pub fn initial_result(&self) -> &EvaluationResult {
        &self.initial_result
    }

    pub fn initial_result_mut(&mut self) -> &mut EvaluationResult {
        &mut self.initial_result
    }
}

/// Weak reference to a context: an arena slot plus the generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    context: Option<EvaluationContext>,
}

/// Generational storage for evaluation contexts.
///
/// Removing a context bumps its slot generation, so every outstanding handle stops resolving.
#[derive(Debug, Default)]
pub struct ContextArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ContextArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, context: EvaluationContext) -> ContextHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.context = Some(context);
            return ContextHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            context: Some(context),
        });
        ContextHandle {
            index,
            generation: 0,
        }
    }

    pub fn remove(&mut self, handle: ContextHandle) -> Option<EvaluationContext> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let context = slot.context.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(context)
    }

    /// Resolve a handle. `None` once the context has been removed.
    pub fn get(&self, handle: ContextHandle) -> Option<&EvaluationContext> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.context.as_ref())
    }

    pub fn get_mut(&mut self, handle: ContextHandle) -> Option<&mut EvaluationContext> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.context.as_mut())
    }

    pub fn try_get(&self, handle: ContextHandle) -> CamStackResult<&EvaluationContext> {
        self.get(handle)
            .ok_or_else(|| CamStackError::validation("evaluation context handle is stale"))
    }

    pub fn is_alive(&self, handle: ContextHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/context/arena.rs"]
mod tests;
