use std::sync::Arc;

use smallvec::SmallVec;

use crate::context::arena::{ContextArena, ContextHandle};
use crate::rig::descriptor::{CameraAsset, RigDescriptor, expand_combination};
use crate::rig::transition::{TransitionMatch, TransitionRule};
use crate::stack::store::EntryStore;

#[derive(Clone, Copy, Debug)]
enum Step {
    RigExit,
    AssetExit,
    RigEnter,
    AssetEnter,
}

impl Step {
    const ORDER: [Step; 4] = [Step::RigExit, Step::AssetExit, Step::RigEnter, Step::AssetEnter];

    fn scans_outgoing(self) -> bool {
        matches!(self, Step::RigExit | Step::AssetExit)
    }
}

struct Finder<'a> {
    from_rigs: SmallVec<[Arc<RigDescriptor>; 4]>,
    to_rigs: SmallVec<[Arc<RigDescriptor>; 4]>,
    from_asset: Option<&'a CameraAsset>,
    to_asset: Option<&'a CameraAsset>,
    from_frozen: bool,
}

impl Finder<'_> {
    fn scan(&self, step: Step) -> Option<Arc<TransitionRule>> {
        let (outer, inner) = if step.scans_outgoing() {
            (&self.from_rigs, &self.to_rigs)
        } else {
            (&self.to_rigs, &self.from_rigs)
        };

        for outer_rig in outer {
            let rules: &[Arc<TransitionRule>] = match step {
                Step::RigExit => outer_rig.exit_transitions(),
                Step::AssetExit => self
                    .from_asset
                    .map(CameraAsset::exit_transitions)
                    .unwrap_or_default(),
                Step::RigEnter => outer_rig.enter_transitions(),
                Step::AssetEnter => self
                    .to_asset
                    .map(CameraAsset::enter_transitions)
                    .unwrap_or_default(),
            };
            if rules.is_empty() {
                continue;
            }

            for inner_rig in inner {
                let (from_rig, to_rig) = if step.scans_outgoing() {
                    (outer_rig, inner_rig)
                } else {
                    (inner_rig, outer_rig)
                };
                let m = TransitionMatch {
                    from_rig,
                    from_asset: self.from_asset,
                    from_frozen: self.from_frozen,
                    to_rig,
                    to_asset: self.to_asset,
                };
                if let Some(rule) = rules.iter().find(|r| r.all_conditions_match(&m)) {
                    tracing::trace!(rule = %rule.name, ?step, "found transition");
                    return Some(Arc::clone(rule));
                }
            }
        }
        None
    }
}

/// Pick the rule governing a switch from the current top entry to `to_rig`.
///
/// Lookup order, first match wins: exit rules of the outgoing rig(s), exit rules of the
/// outgoing asset, enter rules of the incoming rig(s), enter rules of the incoming asset.
/// Combination rigs are expanded on both sides. `None` for an empty stack.
pub(crate) fn find_transition(
    store: &EntryStore,
    contexts: &ContextArena,
    to_rig: &Arc<RigDescriptor>,
    to_context: ContextHandle,
) -> Option<Arc<TransitionRule>> {
    let top = store.entries.last()?;

    let finder = Finder {
        from_rigs: expand_combination(&top.rig),
        to_rigs: expand_combination(to_rig),
        from_asset: contexts
            .get(top.origin)
            .and_then(|c| c.camera_asset())
            .map(Arc::as_ref),
        to_asset: contexts
            .get(to_context)
            .and_then(|c| c.camera_asset())
            .map(Arc::as_ref),
        from_frozen: top.flags.is_frozen,
    };

    Step::ORDER.into_iter().find_map(|step| finder.scan(step))
}

#[cfg(test)]
#[path = "../../tests/unit/stack/transition_finder.rs"]
mod tests;
